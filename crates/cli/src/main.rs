//! idmark command-line front end
//!
//! Reads a PDF from disk, overlays an identity or custom watermark and
//! writes the result next to the input (or to `--output`).

use anyhow::{bail, Context, Result};
use clap::Parser;
use idmark_core::{
    apply_watermark_async, compose_user_watermark, is_pdf_like, watermarked_file_name, Color,
    FontChoice, WatermarkRequest, WatermarkStyle, WatermarkedFile,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "idmark")]
#[command(version, about = "Overlay an identity watermark on every page of a PDF")]
struct Args {
    /// Input PDF file
    input: PathBuf,

    /// Output file (default: <input>_watermarked.pdf next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Full name of the user
    #[arg(long, requires = "department", required_unless_present = "lines")]
    name: Option<String>,

    /// Department of the user
    #[arg(long, requires = "name")]
    department: Option<String>,

    /// Leave out the timestamp line
    #[arg(long, requires = "name")]
    no_timestamp: bool,

    /// Custom watermark line, top to bottom (repeatable)
    #[arg(long = "line", value_name = "TEXT", conflicts_with = "name")]
    lines: Vec<String>,

    /// JSON style file
    #[arg(long, env = "IDMARK_STYLE")]
    style: Option<PathBuf>,

    /// Opacity of the primary block (0-1)
    #[arg(long)]
    opacity: Option<f64>,

    /// Font size in points
    #[arg(long)]
    font_size: Option<f64>,

    /// Rotation in degrees, counter-clockwise
    #[arg(long, allow_hyphen_values = true)]
    angle: Option<f64>,

    /// Fill color as R,G,B with channels in 0-1
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// TrueType font to embed instead of Helvetica
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_color(value: &str) -> std::result::Result<Color, String> {
    let channels = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid color channel: {e}"))?;

    match channels.as_slice() {
        [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
        _ => Err(format!("expected R,G,B, got {} channels", channels.len())),
    }
}

/// Style file (if any) with command-line overrides applied
fn resolve_style(args: &Args) -> Result<WatermarkStyle> {
    let mut style = match &args.style {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading style file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing style file {}", path.display()))?
        }
        None => WatermarkStyle::default(),
    };

    if let Some(opacity) = args.opacity {
        style.opacity = opacity;
    }
    if let Some(font_size) = args.font_size {
        style.font_size = font_size;
    }
    if let Some(angle) = args.angle {
        style.angle = angle;
    }
    if let Some(color) = args.color {
        style.color = color;
    }

    Ok(style)
}

fn build_request(args: &Args) -> Result<WatermarkRequest> {
    let lines = match (&args.name, &args.department) {
        (Some(name), Some(department)) => {
            compose_user_watermark(name, department, !args.no_timestamp)
        }
        _ if !args.lines.is_empty() => args.lines.clone(),
        _ => bail!("either --name/--department or at least one --line is required"),
    };

    let font = match &args.font {
        Some(path) => FontChoice::TrueType(
            std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?,
        ),
        None => FontChoice::Helvetica,
    };

    Ok(WatermarkRequest::new(lines)
        .with_style(resolve_style(args)?)
        .with_font(font))
}

/// Write the result and return where it went
///
/// `--output` is used verbatim; otherwise the file lands next to the input
/// as `<stem>_watermarked.pdf`.
fn write_output(args: &Args, bytes: Vec<u8>) -> Result<PathBuf> {
    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
            Ok(path.clone())
        }
        None => {
            let dir = args.input.parent().map(Path::to_path_buf).unwrap_or_default();
            let file_name = watermarked_file_name(&args.input.to_string_lossy());
            WatermarkedFile::pdf(file_name, bytes)
                .save_in(&dir)
                .with_context(|| format!("writing output into {}", dir.display()))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let input_name = args.input.to_string_lossy().into_owned();
    if !is_pdf_like(&input_name, None) {
        bail!("{input_name} does not look like a PDF file");
    }

    let request = build_request(&args)?;
    let pdf_bytes = std::fs::read(&args.input).with_context(|| format!("reading {input_name}"))?;

    let output = apply_watermark_async(pdf_bytes, request)
        .await
        .with_context(|| format!("watermarking {input_name}"))?;

    let path = write_output(&args, output)?;

    tracing::info!(output = %path.display(), "watermark written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("idmark").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_identity_args() {
        let args = parse(&["in.pdf", "--name", "Nguyen Van Anh", "--department", "IT"]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.lines.len(), 3);
        assert_eq!(request.lines[0], "Nguyen Van Anh");
        assert_eq!(request.lines[1], "IT");
        assert_eq!(request.font, FontChoice::Helvetica);
    }

    #[test]
    fn test_identity_without_timestamp() {
        let args = parse(&["in.pdf", "--name", "A", "--department", "B", "--no-timestamp"]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.lines, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_custom_lines() {
        let args = parse(&["in.pdf", "--line", "CONFIDENTIAL", "--line", "Do not copy"]);
        let request = build_request(&args).unwrap();
        assert_eq!(
            request.lines,
            vec!["CONFIDENTIAL".to_string(), "Do not copy".to_string()]
        );
    }

    #[test]
    fn test_name_requires_department() {
        let result = Args::try_parse_from(["idmark", "in.pdf", "--name", "A"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lines_conflict_with_name() {
        let result = Args::try_parse_from([
            "idmark",
            "in.pdf",
            "--name",
            "A",
            "--department",
            "B",
            "--line",
            "X",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_style_overrides() {
        let args = parse(&[
            "in.pdf",
            "--line",
            "X",
            "--opacity",
            "0.5",
            "--angle",
            "-30",
            "--color",
            "1, 0, 0",
        ]);
        let style = resolve_style(&args).unwrap();
        assert_eq!(style.opacity, 0.5);
        assert_eq!(style.angle, -30.0);
        assert_eq!(style.color, Color::red());
        assert_eq!(style.font_size, 42.0);
    }

    #[test]
    fn test_parse_color_rejects_wrong_arity() {
        assert!(parse_color("1,0").is_err());
        assert!(parse_color("a,b,c").is_err());
        assert_eq!(parse_color("0.6,0.6,0.6").unwrap(), Color::mid_gray());
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("idmark-cli-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_write_output_default_name() {
        let dir = scratch_dir("default");
        let input = dir.join("report.pdf");
        let args = parse(&[input.to_str().unwrap(), "--line", "X"]);

        let path = write_output(&args, b"%PDF-1.5".to_vec()).unwrap();
        assert_eq!(path, dir.join("report_watermarked.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5".to_vec());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_output_explicit_path_verbatim() {
        let dir = scratch_dir("explicit");
        let target = dir.join("final");
        let args = parse(&["report.pdf", "--line", "X", "-o", target.to_str().unwrap()]);

        let path = write_output(&args, b"%PDF-1.5".to_vec()).unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.5".to_vec());
        assert!(!dir.join("final.pdf").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
