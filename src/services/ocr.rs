use image::RgbaImage;
use leptess::LepTess;
use thiserror::Error;
use tracing::debug;

use crate::word_map::RawBounds;

pub const DEFAULT_LANGUAGE: &str = "eng";

/// A word as reported by the recognizer, in the submitted image's coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWord {
    pub text: String,
    pub bbox: RawBounds,
}

impl RawWord {
    pub fn new(text: impl Into<String>, bbox: RawBounds) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize Tesseract with language '{language}': {message}")]
    Init { language: String, message: String },

    #[error("Failed to encode selection for recognition: {0}")]
    Encode(String),

    #[error("Failed to run OCR: {0}")]
    Recognition(String),

    #[error("Recognition worker stopped without a result")]
    WorkerGone,
}

/// An OCR backend. Progress is reported in `0.0..=1.0` and may be called
/// any number of times; only the latest value matters.
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        image: &RgbaImage,
        progress: &dyn Fn(f64),
    ) -> Result<Vec<RawWord>, OcrError>;
}

/// Tesseract through leptess. A fresh Tesseract instance is created per
/// call so the engine can be shared across worker threads.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn init(&self) -> Result<LepTess, OcrError> {
        LepTess::new(None, &self.language).map_err(|e| OcrError::Init {
            language: self.language.clone(),
            message: e.to_string(),
        })
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(
        &self,
        image: &RgbaImage,
        progress: &dyn Fn(f64),
    ) -> Result<Vec<RawWord>, OcrError> {
        progress(0.0);
        let mut lt = self.init()?;
        progress(0.1);

        // leptess decodes from an encoded buffer
        let mut png_buf = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .map_err(|e| OcrError::Encode(e.to_string()))?;

        lt.set_image_from_mem(png_buf.get_ref())
            .map_err(|e| OcrError::Recognition(format!("Failed to set image: {}", e)))?;
        progress(0.2);

        // No boxes means no text, not a failure
        let boxes = match lt.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true)
        {
            Some(boxes) => boxes,
            None => {
                progress(1.0);
                return Ok(Vec::new());
            }
        };

        let geometries: Vec<_> = (&boxes).into_iter().map(|b| b.get_geometry()).collect();
        let total = geometries.len().max(1) as f64;
        let mut words = Vec::with_capacity(geometries.len());

        for (i, geom) in geometries.into_iter().enumerate() {
            lt.set_rectangle(geom.x, geom.y, geom.w, geom.h);
            let text = lt.get_utf8_text().unwrap_or_default().trim().to_string();

            if !text.is_empty() {
                debug!(
                    "OCR word '{}' at ({}, {}, {}x{})",
                    text, geom.x, geom.y, geom.w, geom.h
                );
                words.push(RawWord::new(
                    text,
                    RawBounds::new(geom.x, geom.y, geom.x + geom.w, geom.y + geom.h),
                ));
            }

            progress(0.2 + 0.8 * (i + 1) as f64 / total);
        }

        progress(1.0);
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language() {
        let engine = TesseractEngine::default();
        assert_eq!(engine.language, "eng");
    }

    #[test]
    fn test_error_messages() {
        let err = OcrError::Init {
            language: "xyz".to_string(),
            message: "no data".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to initialize Tesseract with language 'xyz': no data"
        );
        assert_eq!(
            OcrError::WorkerGone.to_string(),
            "Recognition worker stopped without a result"
        );
    }
}
