//! Watermark fonts: metrics, text encoding and PDF embedding

use crate::request::FontChoice;
use crate::{Result, WatermarkError};
use latin_text::{sanitize, sanitize_for};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// A character the font has no glyph for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no glyph for {0:?}")]
pub struct UnsupportedGlyph(pub char);

/// Per-font text measurement
pub trait GlyphMetrics {
    /// Rendered width of `text` in points at `font_size`
    fn width_of(&self, text: &str, font_size: f64) -> std::result::Result<f64, UnsupportedGlyph>;

    /// Check if the font can draw `c`
    fn supports(&self, c: char) -> bool;
}

/// Helvetica advances for WinAnsi codes 32..=126, in 1/1000 em
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica advances for WinAnsi codes 128..=255, in 1/1000 em (0 = unassigned)
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, //
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667, //
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, //
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, //
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, //
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, //
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Map a character to its WinAnsi code
fn winansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

fn helvetica_advance(code: u8) -> u16 {
    match code {
        32..=126 => HELVETICA_ASCII_WIDTHS[(code - 32) as usize],
        128..=255 => HELVETICA_HIGH_WIDTHS[(code - 128) as usize],
        _ => 0,
    }
}

/// The standard Helvetica font, WinAnsi encoded
///
/// Nothing is embedded; viewers supply the font. Only the WinAnsi
/// repertoire can be measured or drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    pub const BASE_FONT: &'static str = "Helvetica";

    /// Encode text as a PDF literal string, `?` for unencodable characters
    pub fn encode_literal(text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('(');
        for code in text.chars().map(|c| winansi_code(c).unwrap_or(b'?')) {
            match code {
                b'(' | b')' | b'\\' => {
                    out.push('\\');
                    out.push(code as char);
                }
                0x20..=0x7E => out.push(code as char),
                _ => out.push_str(&format!("\\{code:03o}")),
            }
        }
        out.push(')');
        out
    }

    fn font_dictionary() -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Self::BASE_FONT.into()),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

impl GlyphMetrics for Helvetica {
    fn width_of(&self, text: &str, font_size: f64) -> std::result::Result<f64, UnsupportedGlyph> {
        let mut units = 0u32;
        for c in text.chars() {
            let code = winansi_code(c).ok_or(UnsupportedGlyph(c))?;
            units += u32::from(helvetica_advance(code));
        }
        Ok(f64::from(units) / 1000.0 * font_size)
    }

    fn supports(&self, c: char) -> bool {
        winansi_code(c).is_some_and(|code| helvetica_advance(code) != 0)
    }
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

/// Glyph lookups read from the face once, at load time
#[derive(Debug, Clone, Default)]
struct GlyphTable {
    /// Unicode mapping, glyph 0 excluded
    cmap: HashMap<char, u16>,
    /// Horizontal advance per glyph ID, in font units
    advances: Vec<u16>,
    units_per_em: u16,
}

impl GlyphTable {
    fn from_face(face: &ttf_parser::Face<'_>) -> Self {
        let mut codepoints = BTreeSet::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|st| st.is_unicode()) {
                subtable.codepoints(|cp| {
                    codepoints.insert(cp);
                });
            }
        }

        let cmap = codepoints
            .into_iter()
            .filter_map(char::from_u32)
            .filter_map(|c| face.glyph_index(c).map(|id| (c, id.0)))
            .filter(|(_, gid)| *gid != 0)
            .collect();

        let advances = (0..face.number_of_glyphs())
            .map(|gid| face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0))
            .collect();

        Self {
            cmap,
            advances,
            units_per_em: face.units_per_em(),
        }
    }

    fn glyph(&self, c: char) -> Option<u16> {
        self.cmap.get(&c).copied()
    }

    fn advance(&self, gid: u16) -> u16 {
        self.advances.get(usize::from(gid)).copied().unwrap_or(0)
    }
}

/// A TrueType font embedded as Type0 / CIDFontType2 with Identity-H encoding
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    /// PostScript name written as BaseFont
    pub name: String,
    /// Raw TTF data
    ttf_data: Vec<u8>,
    glyphs: GlyphTable,
    /// Characters drawn so far (for /W and ToUnicode)
    used_chars: BTreeSet<char>,
}

impl TrueTypeFont {
    /// Create font data from TTF bytes
    pub fn from_ttf(ttf_data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| WatermarkError::FontEmbedding(format!("{e:?}")))?;
        let name = postscript_name(&face).unwrap_or_else(|| "IdmarkEmbedded".to_string());

        Ok(Self {
            name,
            ttf_data: ttf_data.to_vec(),
            glyphs: GlyphTable::from_face(&face),
            used_chars: BTreeSet::new(),
        })
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Get glyph ID for a character (`None` when the font maps it to .notdef)
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.glyphs.glyph(c)
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).is_some()
    }

    /// Keep characters the font can draw, fold the others
    pub fn prepare_line(&self, text: &str) -> String {
        sanitize_for(text, |c| self.supports(c))
    }

    /// Encode text as hex glyph IDs for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let face = ttf_parser::Face::parse(&self.ttf_data, 0)
            .map_err(|e| WatermarkError::FontEmbedding(format!("{}: {e:?}", self.name)))?;
        let font_name = Object::Name(self.name.clone().into_bytes());
        let scale = 1000.0 / f64::from(face.units_per_em());
        let to_pdf_units = |v: i16| (f64::from(v) * scale).round() as i64;

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode_content.into_bytes());

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let bbox = face.global_bounding_box();
        let font_bbox: Vec<Object> = vec![
            to_pdf_units(bbox.x_min).into(),
            to_pdf_units(bbox.y_min).into(),
            to_pdf_units(bbox.x_max).into(),
            to_pdf_units(bbox.y_max).into(),
        ];
        let ascent = to_pdf_units(face.ascender());
        let descent = to_pdf_units(face.descender());
        let cap_height = face.capital_height().map(to_pdf_units).unwrap_or(ascent);

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", cap_height.into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array(scale).into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate /W array for the glyphs in use: `[gid [width] ...]`
    fn generate_widths_array(&self, scale: f64) -> Vec<Object> {
        let gids: BTreeSet<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c))
            .collect();

        let mut widths = Vec::with_capacity(gids.len() * 2);
        for gid in gids {
            let advance = (f64::from(self.glyphs.advance(gid)) * scale).round() as i64;
            widths.push(i64::from(gid).into());
            widths.push(Object::Array(vec![Object::Integer(advance)]));
        }
        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mapped: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c).map(|gid| (gid, c)))
            .collect();

        // bfchar sections are limited to 100 entries
        for chunk in mapped.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }

    /// Write the font objects, with the Type0 dictionary at `font_id`
    fn embed(&self, doc: &mut Document, font_id: ObjectId) -> Result<()> {
        let objects = self.to_pdf_objects()?;

        let font_file_id = doc.add_object(objects.font_file_stream);

        let mut font_descriptor = objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = doc.add_object(font_descriptor);

        let mut cid_font = objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = doc.add_object(cid_font);

        let tounicode_id = doc.add_object(objects.tounicode_stream);

        let mut type0_font = objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));

        doc.objects.insert(font_id, Object::Dictionary(type0_font));
        Ok(())
    }
}

impl GlyphMetrics for TrueTypeFont {
    fn width_of(&self, text: &str, font_size: f64) -> std::result::Result<f64, UnsupportedGlyph> {
        let mut units = 0u32;
        for c in text.chars() {
            let gid = self.glyph_id(c).ok_or(UnsupportedGlyph(c))?;
            units += u32::from(self.glyphs.advance(gid));
        }
        if units == 0 {
            return Ok(0.0);
        }
        Ok(f64::from(units) / f64::from(self.glyphs.units_per_em) * font_size)
    }

    fn supports(&self, c: char) -> bool {
        self.has_glyph(c)
    }
}

/// The one font a watermark run embeds
#[derive(Debug, Clone)]
pub enum WatermarkFont {
    Helvetica(Helvetica),
    TrueType(TrueTypeFont),
}

impl WatermarkFont {
    /// Load the font named by a request
    pub fn load(choice: &FontChoice) -> Result<Self> {
        match choice {
            FontChoice::Helvetica => Ok(Self::Helvetica(Helvetica)),
            FontChoice::TrueType(data) => TrueTypeFont::from_ttf(data).map(Self::TrueType),
        }
    }

    /// Fold a line into the font's repertoire
    pub fn prepare_line(&self, text: &str) -> String {
        match self {
            Self::Helvetica(_) => sanitize(text),
            Self::TrueType(font) => font.prepare_line(text),
        }
    }

    /// Encode text as a PDF string operand for Tj
    pub fn encode(&self, text: &str) -> String {
        match self {
            Self::Helvetica(_) => Helvetica::encode_literal(text),
            Self::TrueType(font) => font.encode_text_hex(text),
        }
    }

    /// Record characters drawn with this font
    pub fn record_usage(&mut self, text: &str) {
        if let Self::TrueType(font) = self {
            font.add_chars(text);
        }
    }

    /// Write the font into the document, with its font dictionary at `font_id`
    pub fn embed(&self, doc: &mut Document, font_id: ObjectId) -> Result<()> {
        match self {
            Self::Helvetica(_) => {
                doc.objects
                    .insert(font_id, Object::Dictionary(Helvetica::font_dictionary()));
                Ok(())
            }
            Self::TrueType(font) => font.embed(doc, font_id),
        }
    }
}

impl GlyphMetrics for WatermarkFont {
    fn width_of(&self, text: &str, font_size: f64) -> std::result::Result<f64, UnsupportedGlyph> {
        match self {
            Self::Helvetica(font) => font.width_of(text, font_size),
            Self::TrueType(font) => font.width_of(text, font_size),
        }
    }

    fn supports(&self, c: char) -> bool {
        match self {
            Self::Helvetica(font) => font.supports(c),
            Self::TrueType(font) => font.supports(c),
        }
    }
}

/// PostScript name from the `name` table, reduced to PDF-name-safe characters
fn postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
        .map(|name| {
            name.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|name| !name.is_empty())
}
