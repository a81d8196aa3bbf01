use glib::subclass::Signal;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Box, Label, ListBox, Orientation, ScrolledWindow};
use std::cell::RefCell;
use std::sync::OnceLock;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct TranscriptPanel {
        pub list_box: ListBox,
        pub title_label: Label,
        /// Words in display order, parallel to the list rows
        pub rows: RefCell<Vec<String>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for TranscriptPanel {
        const NAME: &'static str = "TranscriptPanel";
        type Type = super::TranscriptPanel;
        type ParentType = Box;
    }

    impl ObjectImpl for TranscriptPanel {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }

        fn signals() -> &'static [Signal] {
            static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
            SIGNALS.get_or_init(|| {
                vec![
                    Signal::builder("word-activated")
                        .param_types([String::static_type()])
                        .build(),
                ]
            })
        }
    }

    impl WidgetImpl for TranscriptPanel {}
    impl BoxImpl for TranscriptPanel {}
}

glib::wrapper! {
    pub struct TranscriptPanel(ObjectSubclass<imp::TranscriptPanel>)
        @extends Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl TranscriptPanel {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        self.set_orientation(Orientation::Vertical);
        self.set_spacing(0);
        self.set_size_request(200, -1);

        imp.title_label.set_margin_start(12);
        imp.title_label.set_margin_end(12);
        imp.title_label.set_margin_top(12);
        imp.title_label.set_margin_bottom(8);
        imp.title_label.set_xalign(0.0);
        imp.title_label.add_css_class("heading");
        self.append(&imp.title_label);

        let scrolled_window = ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();

        imp.list_box.set_selection_mode(gtk::SelectionMode::None);
        imp.list_box.set_activate_on_single_click(true);
        imp.list_box.add_css_class("transcript-list");
        scrolled_window.set_child(Some(&imp.list_box));

        self.append(&scrolled_window);
        self.add_css_class("transcript-panel");

        let panel_weak = self.downgrade();
        imp.list_box.connect_row_activated(move |_, row| {
            if let Some(panel) = panel_weak.upgrade() {
                let word = panel.imp().rows.borrow().get(row.index() as usize).cloned();
                if let Some(word) = word {
                    panel.emit_by_name::<()>("word-activated", &[&word]);
                }
            }
        });

        self.populate(std::iter::empty::<&str>());
    }

    /// Replace the list with `words`, already in display order
    pub fn populate<'a>(&self, words: impl IntoIterator<Item = &'a str>) {
        let imp = self.imp();

        while let Some(row) = imp.list_box.first_child() {
            imp.list_box.remove(&row);
        }

        let words: Vec<String> = words.into_iter().map(str::to_string).collect();
        imp.title_label
            .set_text(&format!("Clicked words ({})", words.len()));

        for word in &words {
            let label = Label::new(Some(word));
            label.set_xalign(0.0);
            label.set_margin_start(12);
            label.set_margin_end(12);
            label.set_margin_top(4);
            label.set_margin_bottom(4);
            label.add_css_class("transcript-entry");

            let list_row = gtk::ListBoxRow::builder().child(&label).build();
            imp.list_box.append(&list_row);
        }

        imp.rows.replace(words);
    }
}

impl Default for TranscriptPanel {
    fn default() -> Self {
        Self::new()
    }
}
