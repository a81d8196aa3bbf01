use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct StatusBar {
        pub page_label: gtk::Label,
        pub progress_bar: gtk::ProgressBar,
        pub error_label: gtk::Label,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for StatusBar {
        const NAME: &'static str = "WordspeakStatusBar";
        type Type = super::StatusBar;
        type ParentType = gtk::Box;
    }

    impl ObjectImpl for StatusBar {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();

            obj.set_orientation(gtk::Orientation::Horizontal);
            obj.set_spacing(12);
            obj.set_margin_start(12);
            obj.set_margin_end(12);
            obj.set_margin_top(6);
            obj.set_margin_bottom(6);
            obj.add_css_class("status-bar");

            self.page_label.set_xalign(0.0);
            self.page_label.add_css_class("status-bar-label");
            obj.append(&self.page_label);

            self.progress_bar.set_hexpand(true);
            self.progress_bar.set_valign(gtk::Align::Center);
            self.progress_bar.set_fraction(0.0);
            obj.append(&self.progress_bar);

            self.error_label.set_xalign(1.0);
            self.error_label.set_wrap(true);
            self.error_label.set_selectable(true);
            self.error_label.set_visible(false);
            obj.append(&self.error_label);
        }
    }

    impl WidgetImpl for StatusBar {}
    impl BoxImpl for StatusBar {}
}

glib::wrapper! {
    /// StatusBar shows the page readout, OCR progress and the last error.
    pub struct StatusBar(ObjectSubclass<imp::StatusBar>)
        @extends gtk::Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    pub fn set_page(&self, page: u32, page_count: u32) {
        self.imp()
            .page_label
            .set_text(&format!("Page {} of {}", page, page_count));
    }

    /// Latest value wins; `progress` is clamped to `0.0..=1.0`
    pub fn set_progress(&self, progress: f64) {
        self.imp().progress_bar.set_fraction(progress.clamp(0.0, 1.0));
    }

    pub fn set_error(&self, error: &str) {
        let label = &self.imp().error_label;
        label.set_markup(&format!(
            "<span color='red'>{}</span>",
            glib::markup_escape_text(error)
        ));
        label.set_visible(true);
    }

    pub fn clear_error(&self) {
        let label = &self.imp().error_label;
        label.set_text("");
        label.set_visible(false);
    }
}
