use image::RgbaImage;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use tracing::debug;

use crate::services::document::SurfaceBitmap;
use crate::services::ocr::{OcrEngine, OcrError, RawWord};
use crate::word_map::{SurfaceRect, WordBox};

/// Identifies the page and selection a recognition was issued for, so a
/// late result can be recognized as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionTag {
    pub generation: u64,
    pub page: u16,
}

/// Messages from a recognition worker
#[derive(Debug)]
pub enum RecognitionEvent {
    Progress(f64),
    Finished(Result<Vec<WordBox>, OcrError>),
}

/// The pixels under a committed selection, copied out of the surface at
/// commit time
#[derive(Debug, Clone)]
pub struct SelectionCrop {
    /// Selection clamped to the surface; the crop's origin on the page
    pub rect: SurfaceRect,
    pub image: RgbaImage,
}

impl SelectionCrop {
    /// `None` for a zero-area selection or one entirely off the surface,
    /// which means there is nothing to recognize
    pub fn capture(bitmap: &SurfaceBitmap, selection: SurfaceRect) -> Option<Self> {
        if selection.is_empty() {
            return None;
        }
        let rect = selection.clamp_to(bitmap.width(), bitmap.height())?;
        let image = image::imageops::crop_imm(
            &bitmap.image,
            rect.x as u32,
            rect.y as u32,
            rect.width as u32,
            rect.height as u32,
        )
        .to_image();

        Some(Self { rect, image })
    }

    /// Run the engine on the crop and map its words onto the surface
    pub fn recognize(
        &self,
        engine: &dyn OcrEngine,
        progress: &dyn Fn(f64),
    ) -> Result<Vec<WordBox>, OcrError> {
        let raw = engine.recognize(&self.image, progress)?;
        Ok(map_words(raw, self.rect))
    }
}

/// Translate recognizer output into padded surface-space word boxes,
/// keeping recognizer order and skipping blank words
pub fn map_words(raw: Vec<RawWord>, selection: SurfaceRect) -> Vec<WordBox> {
    raw.into_iter()
        .filter(|word| !word.text.trim().is_empty())
        .map(|word| WordBox::from_raw(word.text.trim(), word.bbox, selection))
        .collect()
}

/// Run a recognition on a worker thread. The receiver yields any number of
/// progress events followed by exactly one `Finished`.
pub fn spawn_recognition(
    engine: Arc<dyn OcrEngine>,
    crop: SelectionCrop,
) -> Receiver<RecognitionEvent> {
    let (sender, receiver) = mpsc::channel::<RecognitionEvent>();

    std::thread::spawn(move || {
        let progress_sender = sender.clone();
        let progress = move |p: f64| {
            let _ = progress_sender.send(RecognitionEvent::Progress(p.clamp(0.0, 1.0)));
        };
        let result = crop.recognize(engine.as_ref(), &progress);
        debug!(
            "Recognition of {:?} finished: {:?}",
            crop.rect,
            result.as_ref().map(Vec::len)
        );
        let _ = sender.send(RecognitionEvent::Finished(result));
    });

    receiver
}
