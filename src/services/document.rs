use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Pages are rasterized at their natural size: one PDF point per pixel
pub const RENDER_SCALE: f32 = 1.0;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("PDFium library could not be loaded: {0}")]
    PdfiumUnavailable(String),

    #[error("Failed to open PDF {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u16, page_count: u16 },

    #[error("Failed to render page {page}: {message}")]
    Render { page: u16, message: String },
}

/// Bind PDFium once for the lifetime of the process, preferring an explicit
/// library path and falling back to the system library
pub fn init_pdfium(library: Option<&Path>) -> Result<&'static Pdfium, DocumentError> {
    let bindings = match library {
        Some(path) => Pdfium::bind_to_library(path).or_else(|e| {
            debug!("Binding PDFium from {} failed: {}", path.display(), e);
            Pdfium::bind_to_system_library()
        }),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DocumentError::PdfiumUnavailable(e.to_string()))?;

    Ok(std::boxed::Box::leak(std::boxed::Box::new(Pdfium::new(bindings))))
}

/// Pixels of the last completed render, tagged with the page they show
#[derive(Debug, Clone)]
pub struct SurfaceBitmap {
    pub page: u16,
    pub image: RgbaImage,
}

impl SurfaceBitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A loaded PDF. Page numbers are 1-based throughout.
pub struct Document {
    inner: PdfDocument<'static>,
    page_count: u16,
}

impl Document {
    pub fn open(pdfium: &'static Pdfium, path: &Path) -> Result<Self, DocumentError> {
        let inner = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| DocumentError::Open {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let page_count = inner.pages().len();
        info!("Opened {} ({} pages)", path.display(), page_count);

        Ok(Self {
            inner,
            page_count,
        })
    }

    pub fn page_count(&self) -> u16 {
        self.page_count
    }

    pub fn render_page(&self, page: u16) -> Result<SurfaceBitmap, DocumentError> {
        if page == 0 || page > self.page_count {
            return Err(DocumentError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }

        let render_error = |e: PdfiumError| DocumentError::Render {
            page,
            message: e.to_string(),
        };

        let pdf_page = self.inner.pages().get(page - 1).map_err(render_error)?;
        let config = create_render_config();
        let bitmap = pdf_page.render_with_config(&config).map_err(render_error)?;

        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let image = bgra_to_rgba(bitmap.as_raw_bytes(), width, height).ok_or_else(|| {
            DocumentError::Render {
                page,
                message: format!("unexpected bitmap size for {}x{}", width, height),
            }
        })?;

        debug!("Rendered page {} at {}x{}", page, width, height);
        Ok(SurfaceBitmap { page, image })
    }
}

pub fn create_render_config() -> PdfRenderConfig {
    PdfRenderConfig::new()
        .scale_page_by_factor(RENDER_SCALE)
        .set_format(PdfBitmapFormat::BGRA)
}

/// Swap PDFium's BGRA byte order into an RGBA image
pub fn bgra_to_rgba(mut bytes: Vec<u8>, width: u32, height: u32) -> Option<RgbaImage> {
    for pixel in bytes.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
    RgbaImage::from_raw(width, height, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_to_rgba_swaps_channels() {
        let bytes = vec![1, 2, 3, 255, 10, 20, 30, 128];
        let image = bgra_to_rgba(bytes, 2, 1).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [3, 2, 1, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [30, 20, 10, 128]);
    }

    #[test]
    fn test_bgra_to_rgba_rejects_short_buffer() {
        assert!(bgra_to_rgba(vec![0; 7], 2, 1).is_none());
    }

    #[test]
    fn test_page_out_of_range_message() {
        let err = DocumentError::PageOutOfRange {
            page: 9,
            page_count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Page 9 is out of range (document has 3 pages)"
        );
    }
}
