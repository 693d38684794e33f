//! PDF Document wrapper

use crate::layout::{PageGeometry, Point};
use crate::page::OverlayResources;
use crate::{Result, WatermarkError};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use tracing::warn;

/// Maximum depth followed through `/Parent` for inherited attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Page rectangle taken from the MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x
    pub llx: f64,
    /// Lower-left y
    pub lly: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    /// A4 portrait, used when a page has no readable MediaBox
    pub const A4: PageBox = PageBox {
        llx: 0.0,
        lly: 0.0,
        width: 595.28,
        height: 841.89,
    };

    /// Build a box from two opposite corners in any order
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            llx: x1.min(x2),
            lly: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.llx, self.lly)
    }
}

/// PDF Document wrapper providing the overlay operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(WatermarkError::MalformedDocument)?;
        Ok(Self { inner })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get all page object IDs in page order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get a mutable reference to the underlying lopdf document
    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    /// Reserve an object ID to be filled in later
    pub fn reserve_object_id(&mut self) -> ObjectId {
        self.inner.new_object_id()
    }

    /// Add an ExtGState setting both fill and stroke opacity
    pub fn add_opacity_state(&mut self, opacity: f64) -> ObjectId {
        self.inner.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(opacity as _),
            "CA" => Object::Real(opacity as _),
        })
    }

    /// Get the page box, following the parent chain if needed
    ///
    /// Falls back to A4 when no usable MediaBox is found.
    pub fn page_box(&self, page_id: ObjectId) -> Result<PageBox> {
        let media_box = self
            .inherited_attribute(page_id, b"MediaBox")?
            .and_then(|object| self.parse_box(&object));

        match media_box {
            Some(page_box) if page_box.width > 0.0 && page_box.height > 0.0 => Ok(page_box),
            _ => {
                warn!(?page_id, "page has no usable MediaBox, assuming A4");
                Ok(PageBox::A4)
            }
        }
    }

    /// Add the overlay font and opacity states to a page's resources
    ///
    /// Inherited resources are copied onto the page first. Resource names are
    /// chosen so they never collide with names already on the page.
    pub fn register_overlay_resources(
        &mut self,
        page_id: ObjectId,
        font_id: ObjectId,
        primary_gs_id: ObjectId,
        tile_gs_id: ObjectId,
    ) -> Result<OverlayResources> {
        let mut resources = match self.inherited_attribute(page_id, b"Resources")? {
            Some(object) => self.resolve_dictionary(&object)?,
            None => Dictionary::new(),
        };

        let mut font_dict = self.sub_dictionary(&resources, b"Font")?;
        let font = unique_name(&font_dict, "WmF");
        font_dict.set(font.as_bytes(), Object::Reference(font_id));

        let mut gs_dict = self.sub_dictionary(&resources, b"ExtGState")?;
        let primary_gs = unique_name(&gs_dict, "WmGS");
        gs_dict.set(primary_gs.as_bytes(), Object::Reference(primary_gs_id));
        let tile_gs = unique_name(&gs_dict, "WmGS");
        gs_dict.set(tile_gs.as_bytes(), Object::Reference(tile_gs_id));

        resources.set("Font", Object::Dictionary(font_dict));
        resources.set("ExtGState", Object::Dictionary(gs_dict));

        let mut page_dict = self.page_dictionary(page_id)?;
        page_dict.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(OverlayResources {
            font,
            primary_gs,
            tile_gs,
        })
    }

    /// Paint overlay operators on top of a page
    ///
    /// The existing content streams are kept as they are and bracketed by a
    /// save/restore pair, so `/Contents` becomes
    /// `[q, original streams.., Q + overlay]`.
    pub fn append_overlay(&mut self, page_id: ObjectId, overlay: &[u8]) -> Result<()> {
        let mut page_dict = self.page_dictionary(page_id)?;

        let existing: Vec<Object> = match page_dict.get(b"Contents") {
            Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*ref_id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(Object::Stream(stream)) => {
                // Direct streams are not allowed in /Contents arrays
                let stream_id = self.inner.add_object(stream.clone());
                vec![Object::Reference(stream_id)]
            }
            _ => Vec::new(),
        };

        let save_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

        let mut overlay_content = Vec::with_capacity(overlay.len() + 2);
        overlay_content.extend_from_slice(b"Q\n");
        overlay_content.extend_from_slice(overlay);
        let overlay_id = self.inner.add_object(compressed_stream(&overlay_content)?);

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(overlay_id));

        page_dict.set("Contents", Object::Array(contents));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| WatermarkError::Serialization(e.to_string()))?;
        Ok(buffer)
    }

    fn page_dictionary(&self, page_id: ObjectId) -> Result<Dictionary> {
        self.inner
            .get_object(page_id)?
            .as_dict()
            .cloned()
            .map_err(|_| {
                WatermarkError::InvalidStructure(format!("page {page_id:?} is not a dictionary"))
            })
    }

    /// Look up a page attribute on the page or its ancestors
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.inner.get_object(current_id)?.as_dict().map_err(|_| {
                WatermarkError::InvalidStructure(format!(
                    "page tree node {current_id:?} is not a dictionary"
                ))
            })?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Resolve a dictionary entry; `null` (direct or referenced) reads as empty
    fn resolve_dictionary(&self, object: &Object) -> Result<Dictionary> {
        match object {
            Object::Dictionary(dict) => Ok(dict.clone()),
            Object::Null => Ok(Dictionary::new()),
            Object::Reference(ref_id) => match self.inner.get_object(*ref_id)? {
                Object::Dictionary(dict) => Ok(dict.clone()),
                Object::Null => Ok(Dictionary::new()),
                _ => Err(WatermarkError::InvalidStructure(format!(
                    "object {ref_id:?} is not a dictionary"
                ))),
            },
            _ => Err(WatermarkError::InvalidStructure(
                "expected a dictionary".to_string(),
            )),
        }
    }

    /// Get a resource category (Font, ExtGState, ..) as an owned dictionary
    fn sub_dictionary(&self, resources: &Dictionary, key: &[u8]) -> Result<Dictionary> {
        match resources.get(key) {
            Ok(object) => self.resolve_dictionary(object),
            Err(_) => Ok(Dictionary::new()),
        }
    }

    fn parse_box(&self, object: &Object) -> Option<PageBox> {
        let array = match object {
            Object::Array(arr) => arr.clone(),
            Object::Reference(ref_id) => self.inner.get_object(*ref_id).ok()?.as_array().ok()?.clone(),
            _ => return None,
        };
        if array.len() < 4 {
            return None;
        }

        let mut coords = [0.0f64; 4];
        for (slot, item) in coords.iter_mut().zip(&array) {
            *slot = self.number(item)?;
        }
        Some(PageBox::from_corners(coords[0], coords[1], coords[2], coords[3]))
    }

    fn number(&self, object: &Object) -> Option<f64> {
        let value = match object {
            Object::Integer(value) => Some(*value as f64),
            Object::Real(value) => Some(f64::from(*value)),
            Object::Reference(ref_id) => self
                .inner
                .get_object(*ref_id)
                .ok()
                .and_then(|target| self.number(target)),
            _ => None,
        };
        value.filter(|value| value.is_finite())
    }
}

/// First `<prefix><n>` not already used as a key in `dict`
fn unique_name(dict: &Dictionary, prefix: &str) -> String {
    (1u32..)
        .map(|n| format!("{prefix}{n}"))
        .find(|name| !dict.has(name.as_bytes()))
        .unwrap_or_else(|| prefix.to_string())
}

/// Flate-compress content into a stream object
fn compressed_stream(content: &[u8]) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(content)
        .map_err(|e| WatermarkError::Serialization(e.to_string()))?;
    let data = encoder
        .finish()
        .map_err(|e| WatermarkError::Serialization(e.to_string()))?;

    Ok(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        data,
    ))
}
