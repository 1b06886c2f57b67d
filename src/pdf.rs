//! Source PDF access via MuPDF
//!
//! MuPDF documents are not thread-safe, so [`SourceDocument`] stores only
//! the document data (bytes or path), opens a fresh MuPDF document for each
//! operation, and serializes access with a `parking_lot::Mutex`. Rasters
//! come back as in-memory JPEG buffers sized for grid slots.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use mupdf::{Colorspace, Document, Matrix};
use parking_lot::Mutex;
use thiserror::Error;

/// Fixed upscale factor for page rasterization. 2x the native page size
/// keeps slide text readable after it is squeezed into a grid slot.
pub const RASTER_SCALE: f32 = 2.0;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: usize },

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Failed to encode raster image: {0}")]
    Encode(String),
}

/// Source data for a document
#[derive(Clone)]
enum DocumentSource {
    Bytes(Arc<Vec<u8>>),
    Path(PathBuf),
}

/// A rasterized page, JPEG-encoded.
pub struct RasterImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// An uploaded PDF opened for page counting and rasterization.
///
/// Each operation opens a clean MuPDF document from the stored source, so
/// no MuPDF state outlives a single call.
pub struct SourceDocument {
    source: DocumentSource,
    page_count: usize,
    lock: Mutex<()>,
}

impl SourceDocument {
    /// Open from owned bytes, validating that MuPDF can parse them.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PdfError> {
        let page_count = count_pages(&data)?;
        Ok(Self {
            source: DocumentSource::Bytes(Arc::new(data)),
            page_count,
            lock: Mutex::new(()),
        })
    }

    /// Open from a stored file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let path_buf = path.as_ref().to_path_buf();
        let path_str = path_buf.to_string_lossy();
        let doc = Document::open(&*path_str).map_err(|e| PdfError::Open(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| PdfError::Open(e.to_string()))? as usize;

        Ok(Self {
            source: DocumentSource::Path(path_buf),
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn open_document(&self) -> Result<Document, PdfError> {
        match &self.source {
            DocumentSource::Bytes(data) => Document::from_bytes(data, "application/pdf")
                .map_err(|e| PdfError::Open(e.to_string())),
            DocumentSource::Path(path) => {
                let path_str = path.to_string_lossy();
                Document::open(&*path_str).map_err(|e| PdfError::Open(e.to_string()))
            }
        }
    }

    /// Rasterize one page (1-based) at [`RASTER_SCALE`] into an RGB JPEG.
    pub fn rasterize_page(&self, page_number: u32) -> Result<RasterImage, PdfError> {
        if page_number < 1 || page_number as usize > self.page_count {
            return Err(PdfError::PageOutOfRange {
                page: page_number,
                total: self.page_count,
            });
        }

        let _guard = self.lock.lock();
        let doc = self.open_document()?;
        let page = doc
            .load_page(page_number as i32 - 1)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        let matrix = Matrix::new_scale(RASTER_SCALE, RASTER_SCALE);
        let colorspace = Colorspace::device_rgb();
        // No alpha: the JPEG encoder takes plain RGB and blank areas come
        // out white instead of transparent.
        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, true)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        encode_pixmap(&pixmap)
    }
}

/// Parse a PDF from bytes and return its page count.
pub fn count_pages(data: &[u8]) -> Result<usize, PdfError> {
    let doc = Document::from_bytes(data, "application/pdf")
        .map_err(|e| PdfError::Open(e.to_string()))?;
    let count = doc
        .page_count()
        .map_err(|e| PdfError::Open(e.to_string()))?;
    Ok(count as usize)
}

fn encode_pixmap(pixmap: &mupdf::Pixmap) -> Result<RasterImage, PdfError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(255);
            let g = samples.get(offset + 1).copied().unwrap_or(255);
            let b = samples.get(offset + 2).copied().unwrap_or(255);
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = image::RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| PdfError::Encode("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Jpeg)
        .map_err(|e| PdfError::Encode(e.to_string()))?;

    Ok(RasterImage {
        data: output,
        width,
        height,
    })
}
