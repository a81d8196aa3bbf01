use crate::word_map::{SurfacePoint, SurfaceRect};

/// Default number of pointer-move events between live outline redraws
pub const DEFAULT_OUTLINE_EVERY_N_MOVES: u32 = 4;

/// The state of the rectangle selection gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionMode {
    /// Clicks resolve words, pointer moves are ignored
    #[default]
    Idle,
    /// The user asked to select; the next press on the page starts a drag
    Armed,
    /// Pointer is down, the anchor is fixed
    Dragging {
        anchor: SurfacePoint,
        /// Move events seen since the press, for outline throttling
        moves: u32,
    },
}

impl SelectionMode {
    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionMode::Idle)
    }

    /// Check if waiting for the press that starts a drag
    pub fn is_armed(&self) -> bool {
        matches!(self, SelectionMode::Armed)
    }
}

/// Turns pointer down/move/up into a committed selection rectangle
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    mode: SelectionMode,
    outline_every_n_moves: u32,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLINE_EVERY_N_MOVES)
    }
}

impl SelectionTracker {
    /// `outline_every_n_moves` of 0 or 1 redraws on every move
    pub fn new(outline_every_n_moves: u32) -> Self {
        Self {
            mode: SelectionMode::Idle,
            outline_every_n_moves: outline_every_n_moves.max(1),
        }
    }

    #[cfg(test)]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Idle -> Armed. Returns false when a selection is already underway.
    pub fn arm(&mut self) -> bool {
        if !self.mode.is_idle() {
            return false;
        }
        self.mode = SelectionMode::Armed;
        true
    }

    /// Armed -> Dragging. Returns false when the press is not part of a
    /// selection, so the caller can treat it as an ordinary click.
    pub fn press(&mut self, point: SurfacePoint) -> bool {
        if !self.mode.is_armed() {
            return false;
        }
        self.mode = SelectionMode::Dragging {
            anchor: point,
            moves: 0,
        };
        true
    }

    /// Live outline from the anchor to `point`, yielded only every Nth move
    pub fn motion(&mut self, point: SurfacePoint) -> Option<SurfaceRect> {
        let SelectionMode::Dragging { anchor, moves } = &mut self.mode else {
            return None;
        };

        *moves += 1;
        if *moves % self.outline_every_n_moves != 0 {
            return None;
        }
        Some(SurfaceRect::from_corners(*anchor, point))
    }

    /// Dragging -> Idle, producing the normalized selection. Zero-area
    /// selections are returned as well.
    pub fn release(&mut self, point: SurfacePoint) -> Option<SurfaceRect> {
        let SelectionMode::Dragging { anchor, .. } = self.mode else {
            return None;
        };
        self.mode = SelectionMode::Idle;
        Some(SurfaceRect::from_corners(anchor, point))
    }

    /// Drop any selection in progress
    pub fn cancel(&mut self) {
        self.mode = SelectionMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> SurfacePoint {
        SurfacePoint::new(x, y)
    }

    #[test]
    fn test_full_gesture() {
        let mut tracker = SelectionTracker::new(1);
        assert!(tracker.mode().is_idle());

        assert!(tracker.arm());
        assert!(tracker.mode().is_armed());

        assert!(tracker.press(pt(50.0, 40.0)));
        assert!(matches!(
            tracker.mode(),
            SelectionMode::Dragging { moves: 0, .. }
        ));

        assert_eq!(
            tracker.motion(pt(60.0, 45.0)),
            Some(SurfaceRect::new(50, 40, 10, 5))
        );

        let rect = tracker.release(pt(20.0, 10.0));
        assert_eq!(rect, Some(SurfaceRect::new(20, 10, 30, 30)));
        assert!(tracker.mode().is_idle());
    }

    #[test]
    fn test_press_without_arming_is_a_click() {
        let mut tracker = SelectionTracker::default();
        assert!(!tracker.press(pt(1.0, 1.0)));
        assert!(tracker.mode().is_idle());
        assert_eq!(tracker.release(pt(5.0, 5.0)), None);
    }

    #[test]
    fn test_motion_ignored_outside_drag() {
        let mut tracker = SelectionTracker::new(1);
        assert_eq!(tracker.motion(pt(3.0, 3.0)), None);
        tracker.arm();
        assert_eq!(tracker.motion(pt(3.0, 3.0)), None);
        assert!(tracker.mode().is_armed());
    }

    #[test]
    fn test_motion_is_throttled() {
        let mut tracker = SelectionTracker::new(3);
        tracker.arm();
        tracker.press(pt(0.0, 0.0));

        let outlines: Vec<bool> = (1..=7)
            .map(|i| tracker.motion(pt(i as f64, i as f64)).is_some())
            .collect();

        assert_eq!(outlines, [false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_zero_throttle_means_every_move() {
        let mut tracker = SelectionTracker::new(0);
        tracker.arm();
        tracker.press(pt(0.0, 0.0));
        assert!(tracker.motion(pt(1.0, 1.0)).is_some());
        assert!(tracker.motion(pt(2.0, 2.0)).is_some());
    }

    #[test]
    fn test_zero_area_release_is_accepted() {
        let mut tracker = SelectionTracker::default();
        tracker.arm();
        tracker.press(pt(8.0, 8.0));
        let rect = tracker.release(pt(8.0, 8.0));
        assert_eq!(rect, Some(SurfaceRect::new(8, 8, 0, 0)));
    }

    #[test]
    fn test_arm_twice_and_cancel() {
        let mut tracker = SelectionTracker::default();
        assert!(tracker.arm());
        assert!(!tracker.arm());
        tracker.press(pt(1.0, 1.0));
        assert!(!tracker.arm());
        tracker.cancel();
        assert_eq!(tracker.mode(), SelectionMode::Idle);
    }
}
