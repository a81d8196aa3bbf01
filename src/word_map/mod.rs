pub mod geometry;
pub mod transcript;
pub mod word_box;

pub use geometry::{RawBounds, SurfacePoint, SurfaceRect};
pub use transcript::Transcript;
pub use word_box::{WordBox, WordBoxSet};
