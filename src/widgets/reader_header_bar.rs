use glib::Properties;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Box, Button, HeaderBar, Orientation};
use std::cell::Cell;

mod imp {
    use super::*;

    #[derive(Properties, Default)]
    #[properties(wrapper_type = super::ReaderHeaderBar)]
    pub struct ReaderHeaderBar {
        pub header_bar: HeaderBar,
        pub open_button: Button,
        pub prev_button: Button,
        pub next_button: Button,
        pub select_button: Button,

        /// Navigation and selection only make sense with a document open
        #[property(get, set, default = false)]
        pub document_loaded: Cell<bool>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for ReaderHeaderBar {
        const NAME: &'static str = "ReaderHeaderBar";
        type Type = super::ReaderHeaderBar;
        type ParentType = glib::Object;
    }

    #[glib::derived_properties]
    impl ObjectImpl for ReaderHeaderBar {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }
}

glib::wrapper! {
    pub struct ReaderHeaderBar(ObjectSubclass<imp::ReaderHeaderBar>);
}

impl ReaderHeaderBar {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        imp.header_bar
            .set_title_widget(Some(&gtk::Label::new(Some("Wordspeak"))));
        imp.header_bar.set_show_title_buttons(true);

        imp.open_button.set_label("Open PDF");
        imp.header_bar.pack_start(&imp.open_button);

        // Prev/next as one linked group
        let nav_box = Box::builder().orientation(Orientation::Horizontal).build();
        nav_box.add_css_class("linked");

        imp.prev_button.set_icon_name("go-previous-symbolic");
        imp.prev_button.set_tooltip_text(Some("Previous page"));
        nav_box.append(&imp.prev_button);

        imp.next_button.set_icon_name("go-next-symbolic");
        imp.next_button.set_tooltip_text(Some("Next page"));
        nav_box.append(&imp.next_button);

        imp.header_bar.pack_start(&nav_box);

        imp.select_button.set_label("Select");
        imp.select_button
            .set_tooltip_text(Some("Drag a rectangle over the page to recognize its words"));
        imp.header_bar.pack_end(&imp.select_button);

        for button in [&imp.prev_button, &imp.next_button, &imp.select_button] {
            self.bind_property("document-loaded", button, "sensitive")
                .sync_create()
                .build();
        }
    }

    /// Returns the HeaderBar widget to be used with set_titlebar()
    pub fn widget(&self) -> &HeaderBar {
        &self.imp().header_bar
    }

    pub fn open_button(&self) -> &Button {
        &self.imp().open_button
    }

    pub fn prev_button(&self) -> &Button {
        &self.imp().prev_button
    }

    pub fn next_button(&self) -> &Button {
        &self.imp().next_button
    }

    pub fn select_button(&self) -> &Button {
        &self.imp().select_button
    }
}

impl Default for ReaderHeaderBar {
    fn default() -> Self {
        Self::new()
    }
}
