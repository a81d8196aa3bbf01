use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use std::cell::RefCell;

use crate::word_map::SurfaceRect;

/// What the overlay paints on top of the page
#[derive(Debug, Clone, Default)]
pub struct OverlayShapes {
    /// Live selection outline while dragging
    pub outline: Option<SurfaceRect>,
    /// Clickable recognized words
    pub words: Vec<SurfaceRect>,
}

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct SelectionOverlay {
        pub shapes: RefCell<OverlayShapes>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for SelectionOverlay {
        const NAME: &'static str = "SelectionOverlay";
        type Type = super::SelectionOverlay;
        type ParentType = gtk::DrawingArea;
    }

    impl ObjectImpl for SelectionOverlay {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_drawing();
        }
    }

    impl WidgetImpl for SelectionOverlay {}
    impl DrawingAreaImpl for SelectionOverlay {}
}

glib::wrapper! {
    pub struct SelectionOverlay(ObjectSubclass<imp::SelectionOverlay>)
        @extends gtk::DrawingArea, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget;
}

impl SelectionOverlay {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_drawing(&self) {
        // Pointer events belong to the page underneath
        self.set_can_target(false);

        let overlay_weak = self.downgrade();
        self.set_draw_func(move |_area, cr, _width, _height| {
            if let Some(overlay) = overlay_weak.upgrade() {
                overlay.draw(cr);
            }
        });
    }

    fn draw(&self, cr: &gtk::cairo::Context) {
        let shapes = self.imp().shapes.borrow();

        for rect in &shapes.words {
            self.draw_word_rect(cr, rect);
        }

        if let Some(outline) = &shapes.outline {
            self.draw_outline(cr, outline);
        }
    }

    fn draw_word_rect(&self, cr: &gtk::cairo::Context, rect: &SurfaceRect) {
        cr.set_source_rgba(0.2, 0.4, 0.8, 0.15);
        cr.rectangle(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        );
        let _ = cr.fill_preserve();

        cr.set_source_rgba(0.2, 0.4, 0.8, 0.7);
        cr.set_line_width(1.0);
        let _ = cr.stroke();
    }

    fn draw_outline(&self, cr: &gtk::cairo::Context, rect: &SurfaceRect) {
        cr.set_source_rgb(1.0, 0.0, 0.0);
        cr.set_line_width(2.0);
        cr.rectangle(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        );
        let _ = cr.stroke();
    }

    pub fn set_outline(&self, rect: Option<SurfaceRect>) {
        self.imp().shapes.borrow_mut().outline = rect;
        self.queue_draw();
    }

    pub fn set_words(&self, rects: Vec<SurfaceRect>) {
        self.imp().shapes.borrow_mut().words = rects;
        self.queue_draw();
    }

    /// Clear outline and words
    pub fn clear(&self) {
        let mut shapes = self.imp().shapes.borrow_mut();
        shapes.outline = None;
        shapes.words.clear();
        drop(shapes);
        self.queue_draw();
    }
}

impl Default for SelectionOverlay {
    fn default() -> Self {
        Self::new()
    }
}
