use gtk::gio;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{ApplicationWindow, Box, Orientation, Paned, PolicyType, ScrolledWindow};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::services::document::init_pdfium;
use crate::services::ocr::TesseractEngine;
use crate::services::speech::ProcessSpeaker;
use crate::widgets::{PageView, ReaderHeaderBar, StatusBar, TranscriptPanel};

mod imp {
    use super::*;

    pub struct WordspeakWindow {
        pub header_bar: ReaderHeaderBar,
        pub page_view: PageView,
        pub transcript_panel: TranscriptPanel,
        pub status_bar: StatusBar,
    }

    impl Default for WordspeakWindow {
        fn default() -> Self {
            Self {
                header_bar: ReaderHeaderBar::new(),
                page_view: PageView::new(),
                transcript_panel: TranscriptPanel::new(),
                status_bar: StatusBar::new(),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for WordspeakWindow {
        const NAME: &'static str = "WordspeakWindow";
        type Type = super::WordspeakWindow;
        type ParentType = ApplicationWindow;
    }

    impl ObjectImpl for WordspeakWindow {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }

    impl WidgetImpl for WordspeakWindow {}
    impl WindowImpl for WordspeakWindow {}
    impl ApplicationWindowImpl for WordspeakWindow {}
}

glib::wrapper! {
    pub struct WordspeakWindow(ObjectSubclass<imp::WordspeakWindow>)
        @extends ApplicationWindow, gtk::Window, gtk::Widget,
        @implements gio::ActionGroup, gio::ActionMap, gtk::Accessible, gtk::Buildable,
                    gtk::ConstraintTarget, gtk::Native, gtk::Root, gtk::ShortcutManager;
}

impl WordspeakWindow {
    pub fn new(app: &gtk::Application, config: &Config) -> Self {
        let window: Self = glib::Object::builder()
            .property("application", app)
            .property("title", "Wordspeak")
            .property("default-width", 1000)
            .property("default-height", 750)
            .build();

        window.configure(config);
        window
    }

    fn configure(&self, config: &Config) {
        let imp = self.imp();

        imp.page_view
            .set_outline_every_n_moves(config.selection.outline_every_n_moves);
        imp.page_view
            .set_engine(Arc::new(TesseractEngine::new(config.ocr.language.clone())));
        imp.page_view.set_speaker(std::boxed::Box::new(ProcessSpeaker::new(
            config.speech.program.clone(),
            config.speech.voice(),
        )));

        match init_pdfium(config.pdfium_library.as_deref()) {
            Ok(pdfium) => imp.page_view.set_pdfium(pdfium),
            Err(e) => {
                error!("{}", e);
                imp.status_bar.set_error(&e.to_string());
                imp.header_bar.open_button().set_sensitive(false);
            }
        }
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        self.set_titlebar(Some(imp.header_bar.widget()));
        self.setup_header_buttons();

        let paned = Paned::builder()
            .orientation(Orientation::Horizontal)
            .build();
        paned.set_wide_handle(true);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Automatic)
            .vscrollbar_policy(PolicyType::Automatic)
            .vexpand(true)
            .hexpand(true)
            .child(&imp.page_view)
            .build();

        paned.set_start_child(Some(&scrolled_window));
        paned.set_end_child(Some(&imp.transcript_panel));
        paned.set_resize_start_child(true);
        paned.set_shrink_start_child(false);
        paned.set_resize_end_child(false);
        paned.set_shrink_end_child(false);
        paned.set_position(780);

        let main_box = Box::builder().orientation(Orientation::Vertical).build();
        main_box.append(&paned);
        main_box.append(&imp.status_bar);

        self.set_child(Some(&main_box));

        self.setup_page_view_signals();
        self.setup_transcript_panel();
        self.setup_keyboard_controller();
    }

    fn setup_header_buttons(&self) {
        let imp = self.imp();

        let window_weak = self.downgrade();
        imp.header_bar.open_button().connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.show_open_dialog();
            }
        });

        let view = imp.page_view.clone();
        imp.header_bar.prev_button().connect_clicked(move |_| {
            view.show_prev();
        });

        let view = imp.page_view.clone();
        imp.header_bar.next_button().connect_clicked(move |_| {
            view.show_next();
        });

        let view = imp.page_view.clone();
        imp.header_bar.select_button().connect_clicked(move |_| {
            view.arm_selection();
        });
    }

    fn setup_page_view_signals(&self) {
        let imp = self.imp();

        let status_bar = imp.status_bar.clone();
        imp.page_view.connect_closure(
            "page-rendered",
            false,
            glib::closure_local!(move |_view: &PageView, page: u32, page_count: u32| {
                status_bar.set_page(page, page_count);
            }),
        );

        let status_bar = imp.status_bar.clone();
        imp.page_view.connect_closure(
            "recognition-progress",
            false,
            glib::closure_local!(move |_view: &PageView, progress: f64| {
                status_bar.set_progress(progress);
            }),
        );

        let status_bar = imp.status_bar.clone();
        imp.page_view.connect_closure(
            "error-reported",
            false,
            glib::closure_local!(move |_view: &PageView, message: &str| {
                status_bar.set_error(message);
            }),
        );

        let panel = imp.transcript_panel.clone();
        imp.page_view.connect_closure(
            "word-clicked",
            false,
            glib::closure_local!(move |view: &PageView, _word: &str| {
                let words = view.transcript_words();
                panel.populate(words.iter().map(String::as_str));
            }),
        );
    }

    fn setup_transcript_panel(&self) {
        let view = self.imp().page_view.clone();
        self.imp().transcript_panel.connect_closure(
            "word-activated",
            false,
            glib::closure_local!(move |_panel: &TranscriptPanel, word: &str| {
                view.repeat_word(word);
            }),
        );
    }

    fn setup_keyboard_controller(&self) {
        let controller = gtk::EventControllerKey::new();
        let window_weak = self.downgrade();

        controller.connect_key_pressed(move |_, key, _, _| {
            let Some(window) = window_weak.upgrade() else {
                return glib::Propagation::Proceed;
            };
            if !window.imp().header_bar.document_loaded() {
                return glib::Propagation::Proceed;
            }
            let view = &window.imp().page_view;

            match key {
                gtk::gdk::Key::Left | gtk::gdk::Key::Page_Up => {
                    view.show_prev();
                    glib::Propagation::Stop
                }
                gtk::gdk::Key::Right | gtk::gdk::Key::Page_Down => {
                    view.show_next();
                    glib::Propagation::Stop
                }
                _ => glib::Propagation::Proceed,
            }
        });

        self.add_controller(controller);
    }

    fn show_open_dialog(&self) {
        let filter = gtk::FileFilter::new();
        filter.set_name(Some("PDF documents"));
        filter.add_mime_type("application/pdf");
        filter.add_suffix("pdf");

        let filters = gio::ListStore::new::<gtk::FileFilter>();
        filters.append(&filter);

        let dialog = gtk::FileDialog::builder()
            .title("Select a PDF")
            .filters(&filters)
            .build();
        let window_weak = self.downgrade();

        dialog.open(Some(self), None::<&gio::Cancellable>, move |result| {
            if let Some(window) = window_weak.upgrade() {
                window.handle_file_dialog_result(result);
            }
        });
    }

    fn handle_file_dialog_result(&self, result: Result<gio::File, glib::Error>) {
        let file = match result {
            Ok(f) => f,
            Err(_) => return,
        };

        if let Some(path) = file.path() {
            self.open_document(&path);
        }
    }

    /// Load a document. A failure leaves the error in the status bar and
    /// the page controls disabled.
    pub fn open_document(&self, path: &Path) {
        let imp = self.imp();

        match imp.page_view.load_pdf(path) {
            Ok(()) => {
                info!("Opened {}", path.display());
                imp.status_bar.clear_error();
                imp.status_bar.set_progress(0.0);
                imp.header_bar.set_document_loaded(true);
                if let Some(name) = path.file_name() {
                    self.set_title(Some(&format!("Wordspeak - {}", name.to_string_lossy())));
                }
            }
            Err(e) => {
                error!("Failed to open {}: {}", path.display(), e);
                imp.status_bar.set_error(&e);
                imp.header_bar.set_document_loaded(false);
            }
        }
    }
}
