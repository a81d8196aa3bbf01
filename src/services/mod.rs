pub mod document;
pub mod ocr;
pub mod recognition;
pub mod render_queue;
pub mod speech;
