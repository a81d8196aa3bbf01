use glib::subclass::Signal;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Box, GestureDrag, Orientation, Overlay, Picture};
use pdfium_render::prelude::*;
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::services::document::{Document, SurfaceBitmap};
use crate::services::ocr::{OcrEngine, OcrError, TesseractEngine};
use crate::services::recognition::{
    spawn_recognition, RecognitionEvent, RecognitionTag, SelectionCrop,
};
use crate::services::speech::{ProcessSpeaker, Speaker};
use crate::session::{PageRender, ReaderSession};
use crate::word_map::{SurfacePoint, SurfaceRect, WordBox};
use crate::widgets::SelectionOverlay;

/// Pointer travel below which a press/release pair counts as a click
const CLICK_TOLERANCE: f64 = 5.0;
const RECOGNITION_POLL_MS: u64 = 50;

mod imp {
    use super::*;

    pub struct PageView {
        pub pdfium: RefCell<Option<&'static Pdfium>>,
        pub document: RefCell<Option<Document>>,
        pub session: RefCell<ReaderSession>,
        /// Pixels of the last completed render
        pub surface: RefCell<Option<SurfaceBitmap>>,
        pub engine: RefCell<Arc<dyn OcrEngine>>,
        pub speaker: RefCell<std::boxed::Box<dyn Speaker>>,
        pub picture: Picture,
        pub page_overlay: Overlay,
        pub selection_overlay: SelectionOverlay,
        /// True while the current drag is a selection rather than a click
        pub selecting: Cell<bool>,
    }

    impl Default for PageView {
        fn default() -> Self {
            Self {
                pdfium: RefCell::new(None),
                document: RefCell::new(None),
                session: RefCell::new(ReaderSession::default()),
                surface: RefCell::new(None),
                engine: RefCell::new(Arc::new(TesseractEngine::default())),
                speaker: RefCell::new(std::boxed::Box::new(ProcessSpeaker::default())),
                picture: Picture::new(),
                page_overlay: Overlay::new(),
                selection_overlay: SelectionOverlay::new(),
                selecting: Cell::new(false),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PageView {
        const NAME: &'static str = "PageView";
        type Type = super::PageView;
        type ParentType = Box;
    }

    impl ObjectImpl for PageView {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }

        fn signals() -> &'static [Signal] {
            static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
            SIGNALS.get_or_init(|| {
                vec![
                    Signal::builder("page-rendered")
                        .param_types([u32::static_type(), u32::static_type()])
                        .build(),
                    Signal::builder("recognition-progress")
                        .param_types([f64::static_type()])
                        .build(),
                    Signal::builder("word-clicked")
                        .param_types([String::static_type()])
                        .build(),
                    Signal::builder("error-reported")
                        .param_types([String::static_type()])
                        .build(),
                ]
            })
        }
    }

    impl WidgetImpl for PageView {}
    impl BoxImpl for PageView {}
}

glib::wrapper! {
    /// Shows one PDF page with a selection/word overlay on top and turns
    /// pointer input into selections and word clicks.
    pub struct PageView(ObjectSubclass<imp::PageView>)
        @extends Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl PageView {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        self.set_orientation(Orientation::Vertical);
        self.set_halign(gtk::Align::Center);
        self.set_valign(gtk::Align::Start);
        self.set_margin_top(10);
        self.set_margin_bottom(10);

        imp.picture.set_can_shrink(false);
        imp.picture.add_css_class("pdf-page");

        // The overlay hugs the picture so pointer coordinates are surface
        // coordinates
        imp.page_overlay.set_halign(gtk::Align::Start);
        imp.page_overlay.set_valign(gtk::Align::Start);
        imp.page_overlay.set_child(Some(&imp.picture));
        imp.page_overlay.add_overlay(&imp.selection_overlay);

        self.append(&imp.page_overlay);
        self.setup_pointer_gesture();
    }

    pub fn set_pdfium(&self, pdfium: &'static Pdfium) {
        self.imp().pdfium.replace(Some(pdfium));
    }

    pub fn set_engine(&self, engine: Arc<dyn OcrEngine>) {
        self.imp().engine.replace(engine);
    }

    pub fn set_speaker(&self, speaker: std::boxed::Box<dyn Speaker>) {
        self.imp().speaker.replace(speaker);
    }

    pub fn set_outline_every_n_moves(&self, n: u32) {
        self.imp().session.replace(ReaderSession::new(n));
    }

    /// Transcript words, most recently clicked first
    pub fn transcript_words(&self) -> Vec<String> {
        self.imp()
            .session
            .borrow()
            .transcript()
            .most_recent_first()
            .map(str::to_string)
            .collect()
    }

    // ------------------------------------------------------------------
    // Document and rendering
    // ------------------------------------------------------------------

    pub fn load_pdf(&self, path: &Path) -> Result<(), String> {
        let pdfium = self
            .imp()
            .pdfium
            .borrow()
            .ok_or_else(|| "Pdfium not initialized".to_string())?;

        let document = Document::open(pdfium, path).map_err(|e| e.to_string())?;
        let page_count = document.page_count();

        self.imp().document.replace(Some(document));
        self.imp().surface.replace(None);
        self.imp().selection_overlay.clear();
        self.imp().selecting.set(false);
        self.set_cursor_from_name(None);

        let first = self.imp().session.borrow_mut().document_loaded(page_count);
        if let Some(render) = first {
            self.schedule_render(render);
        }
        Ok(())
    }

    /// Rasterize on a later main loop turn; the session already counts the
    /// page as in flight
    fn schedule_render(&self, render: PageRender) {
        let view_weak = self.downgrade();
        glib::idle_add_local_once(move || {
            if let Some(view) = view_weak.upgrade() {
                view.render_now(render);
            }
        });
    }

    fn render_now(&self, render: PageRender) {
        // Queued before another document was opened
        if !self.imp().session.borrow().is_current_render(render) {
            debug!("Dropping render of page {} from an earlier document", render.page);
            return;
        }

        let result = match self.imp().document.borrow().as_ref() {
            Some(document) => document.render_page(render.page),
            None => return,
        };

        match result {
            Ok(bitmap) => self.show_bitmap(bitmap),
            Err(e) => {
                warn!("{}", e);
                self.report_error(&e.to_string());
            }
        }

        let next = self.imp().session.borrow_mut().render_finished(render);
        if let Some(next) = next {
            self.schedule_render(next);
        }
    }

    fn show_bitmap(&self, bitmap: SurfaceBitmap) {
        let imp = self.imp();
        let width = bitmap.width() as i32;
        let height = bitmap.height() as i32;

        let bytes = glib::Bytes::from(bitmap.image.as_raw());
        let texture = gtk::gdk::MemoryTexture::new(
            width,
            height,
            gtk::gdk::MemoryFormat::R8g8b8a8,
            &bytes,
            (width * 4) as usize,
        );

        imp.picture.set_paintable(Some(&texture));
        imp.picture.set_size_request(width, height);
        imp.selection_overlay.set_content_width(width);
        imp.selection_overlay.set_content_height(height);
        self.refresh_word_overlay();

        let page = bitmap.page;
        imp.surface.replace(Some(bitmap));

        let page_count = imp.session.borrow().page_count();
        self.emit_by_name::<()>("page-rendered", &[&(page as u32), &(page_count as u32)]);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn show_prev(&self) {
        let start = self.imp().session.borrow_mut().prev();
        self.after_navigation(start);
    }

    pub fn show_next(&self) {
        let start = self.imp().session.borrow_mut().next();
        self.after_navigation(start);
    }

    fn after_navigation(&self, start: Option<PageRender>) {
        // The session dropped words and any drag on a page change
        self.imp().selecting.set(false);
        self.set_cursor_from_name(None);
        self.imp().selection_overlay.clear();

        if let Some(render) = start {
            self.schedule_render(render);
        }
    }

    // ------------------------------------------------------------------
    // Selection and recognition
    // ------------------------------------------------------------------

    pub fn arm_selection(&self) {
        if self.imp().session.borrow_mut().arm_selection() {
            self.set_cursor_from_name(Some("crosshair"));
        }
    }

    fn setup_pointer_gesture(&self) {
        let gesture = GestureDrag::new();
        gesture.set_button(gtk::gdk::BUTTON_PRIMARY);

        let view_weak = self.downgrade();
        gesture.connect_drag_begin(move |_, x, y| {
            if let Some(view) = view_weak.upgrade() {
                view.handle_pointer_down(SurfacePoint::new(x, y));
            }
        });

        let view_weak = self.downgrade();
        gesture.connect_drag_update(move |gesture, dx, dy| {
            if let (Some(view), Some((x, y))) = (view_weak.upgrade(), gesture.start_point()) {
                view.handle_pointer_move(SurfacePoint::new(x + dx, y + dy));
            }
        });

        let view_weak = self.downgrade();
        gesture.connect_drag_end(move |gesture, dx, dy| {
            if let (Some(view), Some((x, y))) = (view_weak.upgrade(), gesture.start_point()) {
                view.handle_pointer_up(SurfacePoint::new(x, y), dx, dy);
            }
        });

        self.imp().page_overlay.add_controller(gesture);
    }

    fn handle_pointer_down(&self, point: SurfacePoint) {
        let started = self.imp().session.borrow_mut().pointer_pressed(point);
        self.imp().selecting.set(started);
        if started {
            self.refresh_word_overlay();
        }
    }

    fn handle_pointer_move(&self, point: SurfacePoint) {
        if !self.imp().selecting.get() {
            return;
        }
        let outline = self.imp().session.borrow_mut().pointer_moved(point);
        if outline.is_some() {
            self.imp().selection_overlay.set_outline(outline);
        }
    }

    fn handle_pointer_up(&self, start: SurfacePoint, dx: f64, dy: f64) {
        let imp = self.imp();

        if !imp.selecting.replace(false) {
            if dx.hypot(dy) <= CLICK_TOLERANCE {
                self.handle_click(start);
            }
            return;
        }

        let release = SurfacePoint::new(start.x + dx, start.y + dy);
        let committed = imp.session.borrow_mut().pointer_released(release);
        imp.selection_overlay.set_outline(None);
        self.set_cursor_from_name(None);

        if let Some((rect, tag)) = committed {
            self.start_recognition(rect, tag);
        }
    }

    fn start_recognition(&self, rect: SurfaceRect, tag: RecognitionTag) {
        let crop = match self.imp().surface.borrow().as_ref() {
            // A page change may still be rendering; its old pixels are not
            // what the user meant to select
            Some(surface) if surface.page == tag.page => SelectionCrop::capture(surface, rect),
            _ => None,
        };

        let crop = match crop {
            Some(crop) => crop,
            None => {
                debug!("Nothing to recognize in {:?}", rect);
                self.finish_recognition(tag, Ok(Vec::new()));
                return;
            }
        };

        info!("Recognizing {:?} on page {}", crop.rect, tag.page);
        self.emit_by_name::<()>("recognition-progress", &[&0.0f64]);

        let engine = self.imp().engine.borrow().clone();
        let receiver = spawn_recognition(engine, crop);

        let view_weak = self.downgrade();
        glib::timeout_add_local(Duration::from_millis(RECOGNITION_POLL_MS), move || {
            match view_weak.upgrade() {
                Some(view) => view.poll_recognition(&receiver, tag),
                None => glib::ControlFlow::Break,
            }
        });
    }

    fn poll_recognition(
        &self,
        receiver: &Receiver<RecognitionEvent>,
        tag: RecognitionTag,
    ) -> glib::ControlFlow {
        loop {
            match receiver.try_recv() {
                Ok(RecognitionEvent::Progress(progress)) => {
                    // A superseded job must not move the current job's bar
                    if self.imp().session.borrow().is_current(tag) {
                        self.emit_by_name::<()>("recognition-progress", &[&progress]);
                    }
                }
                Ok(RecognitionEvent::Finished(result)) => {
                    self.finish_recognition(tag, result);
                    return glib::ControlFlow::Break;
                }
                Err(TryRecvError::Empty) => return glib::ControlFlow::Continue,
                Err(TryRecvError::Disconnected) => {
                    self.finish_recognition(tag, Err(OcrError::WorkerGone));
                    return glib::ControlFlow::Break;
                }
            }
        }
    }

    fn finish_recognition(&self, tag: RecognitionTag, result: Result<Vec<WordBox>, OcrError>) {
        match result {
            Ok(words) => {
                let accepted = self
                    .imp()
                    .session
                    .borrow_mut()
                    .recognition_finished(tag, words);
                if accepted {
                    self.refresh_word_overlay();
                    self.emit_by_name::<()>("recognition-progress", &[&1.0f64]);
                } else {
                    self.emit_by_name::<()>("recognition-progress", &[&0.0f64]);
                }
            }
            Err(e) if !self.imp().session.borrow().is_current(tag) => {
                debug!("Stale recognition failed: {}", e);
            }
            Err(e) => {
                warn!("{}", e);
                self.emit_by_name::<()>("recognition-progress", &[&0.0f64]);
                self.report_error(&e.to_string());
            }
        }
    }

    fn refresh_word_overlay(&self) {
        let rects: Vec<SurfaceRect> = self
            .imp()
            .session
            .borrow()
            .word_boxes()
            .iter()
            .map(|word| word.rect)
            .collect();
        self.imp().selection_overlay.set_words(rects);
    }

    // ------------------------------------------------------------------
    // Words
    // ------------------------------------------------------------------

    fn handle_click(&self, point: SurfacePoint) {
        let imp = self.imp();
        let clicked = {
            let speaker = imp.speaker.borrow();
            imp.session
                .borrow_mut()
                .resolve_click(point, speaker.as_ref())
        };

        if let Some(word) = clicked {
            debug!("Clicked word '{}'", word);
            self.emit_by_name::<()>("word-clicked", &[&word]);
        }
    }

    /// Speak a word picked from the transcript again
    pub fn repeat_word(&self, word: &str) {
        let imp = self.imp();
        let speaker = imp.speaker.borrow();
        imp.session.borrow().repeat_word(word, speaker.as_ref());
    }

    fn report_error(&self, message: &str) {
        self.emit_by_name::<()>("error-reported", &[&message.to_string()]);
    }
}

impl Default for PageView {
    fn default() -> Self {
        Self::new()
    }
}
