pub mod selection_mode;

pub use selection_mode::SelectionTracker;
