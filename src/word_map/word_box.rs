use crate::word_map::geometry::{RawBounds, SurfacePoint, SurfaceRect};

/// Padding added around each recognized word on every side, in pixels
pub const WORD_BOX_MARGIN: i32 = 2;

/// A recognized word and its padded bounding rectangle in surface coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBox {
    pub text: String,
    pub rect: SurfaceRect,
}

impl WordBox {
    pub fn new(text: impl Into<String>, rect: SurfaceRect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }

    /// Map recognizer geometry from the cropped image back onto the full
    /// surface, offset by the selection's top-left corner and padded
    pub fn from_raw(text: impl Into<String>, raw: RawBounds, selection: SurfaceRect) -> Self {
        let rect = SurfaceRect::new(
            selection.x + raw.x0 - WORD_BOX_MARGIN,
            selection.y + raw.y0 - WORD_BOX_MARGIN,
            (raw.x1 - raw.x0) + 2 * WORD_BOX_MARGIN,
            (raw.y1 - raw.y0) + 2 * WORD_BOX_MARGIN,
        );
        Self::new(text, rect)
    }
}

/// Clickable words for the current page and selection, in recognizer order
#[derive(Debug, Clone, Default)]
pub struct WordBoxSet {
    boxes: Vec<WordBox>,
}

impl WordBoxSet {
    pub fn replace(&mut self, boxes: Vec<WordBox>) {
        self.boxes = boxes;
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordBox> {
        self.boxes.iter()
    }

    /// First box containing the point; overlapping boxes resolve to the
    /// earliest inserted one
    pub fn hit_test(&self, point: SurfacePoint) -> Option<&WordBox> {
        self.boxes.iter().find(|word| word.rect.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_offsets_and_pads() {
        let selection = SurfaceRect::new(100, 50, 300, 200);
        let raw = RawBounds::new(7, 3, 47, 21);

        let word = WordBox::from_raw("feet", raw, selection);

        assert_eq!(word.text, "feet");
        assert_eq!(word.rect, SurfaceRect::new(105, 51, 44, 22));
    }

    #[test]
    fn test_from_raw_at_origin() {
        let word = WordBox::from_raw("a", RawBounds::new(0, 0, 10, 10), SurfaceRect::default());
        assert_eq!(word.rect, SurfaceRect::new(-2, -2, 14, 14));
    }

    #[test]
    fn test_hit_test_prefers_first_inserted() {
        let mut set = WordBoxSet::default();
        set.replace(vec![
            WordBox::new("big", SurfaceRect::new(0, 0, 100, 100)),
            WordBox::new("small", SurfaceRect::new(10, 10, 5, 5)),
        ]);

        let hit = set.hit_test(SurfacePoint::new(12.0, 12.0));
        assert_eq!(hit.map(|w| w.text.as_str()), Some("big"));
    }

    #[test]
    fn test_hit_test_miss_and_empty() {
        let mut set = WordBoxSet::default();
        assert!(set.hit_test(SurfacePoint::new(1.0, 1.0)).is_none());

        set.replace(vec![WordBox::new("duck", SurfaceRect::new(10, 10, 20, 10))]);
        assert!(set.hit_test(SurfacePoint::new(100.0, 100.0)).is_none());
        assert_eq!(set.iter().count(), 1);

        set.clear();
        assert!(set.is_empty());
    }
}
