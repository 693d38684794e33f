//! File-level helpers around the watermark engine

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// MIME type of PDF documents
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Check if a file looks like a PDF by extension or MIME type
///
/// Both checks are case-insensitive; MIME parameters such as
/// `; charset=binary` are ignored.
pub fn is_pdf_like(file_name: &str, content_type: Option<&str>) -> bool {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let by_content_type = content_type.is_some_and(|value| {
        value
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
    });

    by_extension || by_content_type
}

/// File name for the watermarked copy of `original`: `<stem>_watermarked.pdf`
pub fn watermarked_file_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("document");
    format!("{stem}_watermarked.pdf")
}

/// Watermarked output ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl WatermarkedFile {
    /// Wrap PDF bytes, appending `.pdf` to the name when missing
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mut file_name = file_name.into();
        if !is_pdf_like(&file_name, None) {
            file_name.push_str(".pdf");
        }
        Self {
            file_name,
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes,
        }
    }

    /// Write the file into `dir` and return its path
    pub fn save_in(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
