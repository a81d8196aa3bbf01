mod page_view;
mod reader_header_bar;
mod selection_overlay;
mod status_bar;
mod transcript_panel;
mod wordspeak_window;

pub use page_view::PageView;
pub use reader_header_bar::ReaderHeaderBar;
pub use selection_overlay::SelectionOverlay;
pub use status_bar::StatusBar;
pub use transcript_panel::TranscriptPanel;
pub use wordspeak_window::WordspeakWindow;
