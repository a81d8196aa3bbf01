use tracing::{debug, info};

use crate::modes::SelectionTracker;
use crate::services::recognition::RecognitionTag;
use crate::services::render_queue::{RenderQueue, RenderRequest};
use crate::services::speech::Speaker;
use crate::word_map::{SurfacePoint, SurfaceRect, Transcript, WordBox, WordBoxSet};

/// All interaction state of the reader, independent of any toolkit. The
/// window owns one session and turns widget events into calls on it.
///
/// Methods that return a [`PageRender`] hand the caller a render that must
/// be started now; when it finishes the caller reports back via
/// [`ReaderSession::render_finished`].
/// A render the caller must perform, stamped with the document load it was
/// issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRender {
    pub page: u16,
    pub load: u64,
}

#[derive(Debug, Default)]
pub struct ReaderSession {
    page_count: u16,
    current_page: u16,
    render_queue: RenderQueue,
    tracker: SelectionTracker,
    word_boxes: WordBoxSet,
    transcript: Transcript,
    generation: u64,
    /// Bumped per opened document; renders from an earlier load are void
    load: u64,
}

impl ReaderSession {
    pub fn new(outline_every_n_moves: u32) -> Self {
        Self {
            tracker: SelectionTracker::new(outline_every_n_moves),
            ..Self::default()
        }
    }

    pub fn has_document(&self) -> bool {
        self.page_count > 0
    }

    pub fn page_count(&self) -> u16 {
        self.page_count
    }

    /// 1-based; 0 when no document is loaded
    #[cfg(test)]
    pub fn current_page(&self) -> u16 {
        self.current_page
    }

    pub fn word_boxes(&self) -> &WordBoxSet {
        &self.word_boxes
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[cfg(test)]
    pub fn is_rendering(&self) -> bool {
        self.render_queue.is_rendering()
    }

    /// Start over on a freshly opened document. The transcript survives.
    pub fn document_loaded(&mut self, page_count: u16) -> Option<PageRender> {
        self.load += 1;
        self.page_count = page_count;
        self.current_page = if page_count > 0 { 1 } else { 0 };
        self.render_queue.reset();
        self.invalidate_words();

        if page_count == 0 {
            return None;
        }
        self.request_render(1)
    }

    /// Go back a page; `None` when already on the first page or while the
    /// new page's render is queued behind the one in flight
    pub fn prev(&mut self) -> Option<PageRender> {
        if !self.has_document() || self.current_page <= 1 {
            return None;
        }
        self.current_page -= 1;
        self.page_changed()
    }

    pub fn next(&mut self) -> Option<PageRender> {
        if !self.has_document() || self.current_page >= self.page_count {
            return None;
        }
        self.current_page += 1;
        self.page_changed()
    }

    fn page_changed(&mut self) -> Option<PageRender> {
        debug!("Page changed to {}", self.current_page);
        self.invalidate_words();
        self.request_render(self.current_page)
    }

    /// Ask for `page` to be rendered, coalescing with a render in flight
    pub fn request_render(&mut self, page: u16) -> Option<PageRender> {
        match self.render_queue.request(page) {
            RenderRequest::Start(page) => Some(self.stamp(page)),
            RenderRequest::Deferred => {
                debug!("Render of page {} deferred", page);
                None
            }
        }
    }

    fn stamp(&self, page: u16) -> PageRender {
        PageRender {
            page,
            load: self.load,
        }
    }

    /// False for a render issued before the current document was opened
    pub fn is_current_render(&self, render: PageRender) -> bool {
        render.load == self.load
    }

    /// `render` is done (or failed); returns the pending page to render next,
    /// if any. A render from an earlier document leaves the queue alone.
    pub fn render_finished(&mut self, render: PageRender) -> Option<PageRender> {
        if !self.is_current_render(render) {
            debug!("Ignoring finished render of page {} from an earlier document", render.page);
            return None;
        }
        let next = self.render_queue.complete()?;
        Some(self.stamp(next))
    }

    /// Forget word boxes and any gesture in progress, and make outstanding
    /// recognitions stale
    fn invalidate_words(&mut self) {
        self.generation += 1;
        self.word_boxes.clear();
        self.tracker.cancel();
    }

    pub fn arm_selection(&mut self) -> bool {
        self.has_document() && self.tracker.arm()
    }

    /// Pointer down. Returns true when it started a selection drag; a new
    /// selection drops the previous word boxes.
    pub fn pointer_pressed(&mut self, point: SurfacePoint) -> bool {
        if !self.tracker.press(point) {
            return false;
        }
        self.generation += 1;
        self.word_boxes.clear();
        true
    }

    /// Live outline to draw, if this move is one that should redraw
    pub fn pointer_moved(&mut self, point: SurfacePoint) -> Option<SurfaceRect> {
        self.tracker.motion(point)
    }

    /// Pointer up. Returns the committed selection and the tag its
    /// recognition must carry.
    pub fn pointer_released(&mut self, point: SurfacePoint) -> Option<(SurfaceRect, RecognitionTag)> {
        let rect = self.tracker.release(point)?;
        Some((rect, self.current_tag()))
    }

    pub fn current_tag(&self) -> RecognitionTag {
        RecognitionTag {
            generation: self.generation,
            page: self.current_page,
        }
    }

    /// Whether a recognition issued under `tag` still belongs to the page
    /// and selection on screen
    pub fn is_current(&self, tag: RecognitionTag) -> bool {
        tag == self.current_tag()
    }

    /// Install recognized words unless the page or selection moved on since
    /// the recognition was issued. Returns whether they were accepted.
    pub fn recognition_finished(&mut self, tag: RecognitionTag, words: Vec<WordBox>) -> bool {
        if !self.is_current(tag) {
            info!(
                "Discarding {} stale words for {:?} (now {:?})",
                words.len(),
                tag,
                self.current_tag()
            );
            return false;
        }
        self.word_boxes.replace(words);
        true
    }

    /// Resolve a click against the word boxes; a hit is appended to the
    /// transcript and spoken in lowercase. Returns the clicked word.
    pub fn resolve_click(&mut self, point: SurfacePoint, speaker: &dyn Speaker) -> Option<String> {
        let word = self.word_boxes.hit_test(point)?.text.clone();
        self.transcript.push(word.clone());
        speaker.speak(&word.to_lowercase());
        Some(word)
    }

    /// Speak a transcript entry again without recording it
    pub fn repeat_word(&self, word: &str, speaker: &dyn Speaker) {
        speaker.speak(&word.to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSpeaker {
        spoken: RefCell<Vec<String>>,
    }

    impl Speaker for RecordingSpeaker {
        fn speak(&self, text: &str) {
            self.spoken.borrow_mut().push(text.to_string());
        }
    }

    fn pt(x: f64, y: f64) -> SurfacePoint {
        SurfacePoint::new(x, y)
    }

    /// A session on `page_count` pages whose initial render already finished
    fn loaded(page_count: u16) -> ReaderSession {
        let mut session = ReaderSession::new(1);
        let first = session.document_loaded(page_count).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(session.render_finished(first), None);
        session
    }

    fn page(render: Option<PageRender>) -> Option<u16> {
        render.map(|r| r.page)
    }

    /// Finish the render in flight and every render queued behind it,
    /// returning the pages rendered after `first`
    fn drain(session: &mut ReaderSession, first: PageRender) -> Vec<u16> {
        let mut pages = Vec::new();
        let mut current = first;
        while let Some(next) = session.render_finished(current) {
            pages.push(next.page);
            current = next;
        }
        pages
    }

    fn select(session: &mut ReaderSession, from: SurfacePoint, to: SurfacePoint) -> RecognitionTag {
        assert!(session.arm_selection());
        assert!(session.pointer_pressed(from));
        session.pointer_released(to).unwrap().1
    }

    fn duck_page() -> ReaderSession {
        let mut session = loaded(3);
        let tag = select(&mut session, pt(0.0, 0.0), pt(50.0, 50.0));
        assert!(session.recognition_finished(
            tag,
            vec![WordBox::new("duck", SurfaceRect::new(10, 10, 20, 10))],
        ));
        session
    }

    #[test]
    fn test_prev_next_round_trip() {
        let mut session = loaded(5);
        for _ in 0..2 {
            let render = session.next().unwrap();
            session.render_finished(render);
        }
        assert_eq!(session.current_page(), 3);

        let render = session.prev().unwrap();
        assert_eq!(render.page, 2);
        session.render_finished(render);
        let render = session.next().unwrap();
        assert_eq!(render.page, 3);
        session.render_finished(render);
        assert_eq!(session.current_page(), 3);
    }

    #[test]
    fn test_navigation_bounds_are_noops() {
        let mut session = loaded(2);
        assert_eq!(session.prev(), None);
        assert_eq!(session.current_page(), 1);
        assert!(!session.is_rendering());

        let render = session.next().unwrap();
        assert_eq!(render.page, 2);
        session.render_finished(render);
        assert_eq!(session.next(), None);
        assert_eq!(session.current_page(), 2);
        assert!(!session.is_rendering());
    }

    #[test]
    fn test_navigation_without_document() {
        let mut session = ReaderSession::default();
        assert_eq!(session.next(), None);
        assert_eq!(session.prev(), None);
        assert!(!session.arm_selection());
    }

    #[test]
    fn test_click_scenario() {
        let mut session = duck_page();
        let speaker = RecordingSpeaker::default();

        let hit = session.resolve_click(pt(15.0, 15.0), &speaker);
        assert_eq!(hit.as_deref(), Some("duck"));
        assert_eq!(session.transcript().words(), ["duck"]);
        assert_eq!(*speaker.spoken.borrow(), ["duck"]);

        assert_eq!(session.resolve_click(pt(100.0, 100.0), &speaker), None);
        assert_eq!(session.transcript().words(), ["duck"]);
        assert_eq!(speaker.spoken.borrow().len(), 1);
    }

    #[test]
    fn test_click_speaks_lowercase_but_records_original() {
        let mut session = loaded(1);
        let tag = select(&mut session, pt(0.0, 0.0), pt(9.0, 9.0));
        session.recognition_finished(tag, vec![WordBox::new("Duck", SurfaceRect::new(0, 0, 9, 9))]);
        let speaker = RecordingSpeaker::default();

        session.resolve_click(pt(1.0, 1.0), &speaker);
        session.repeat_word("Duck", &speaker);

        assert_eq!(session.transcript().words(), ["Duck"]);
        assert_eq!(*speaker.spoken.borrow(), ["duck", "duck"]);
    }

    #[test]
    fn test_page_change_clears_word_boxes() {
        let mut session = duck_page();
        let speaker = RecordingSpeaker::default();

        session.next();
        assert!(session.word_boxes().is_empty());
        assert_eq!(session.resolve_click(pt(15.0, 15.0), &speaker), None);
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_stale_recognition_is_discarded_after_page_change() {
        let mut session = loaded(3);
        let tag = select(&mut session, pt(0.0, 0.0), pt(40.0, 40.0));

        session.next();
        let accepted = session.recognition_finished(
            tag,
            vec![WordBox::new("old", SurfaceRect::new(0, 0, 10, 10))],
        );

        assert!(!accepted);
        assert!(session.word_boxes().is_empty());
    }

    #[test]
    fn test_stale_recognition_is_discarded_after_new_selection() {
        let mut session = loaded(1);
        let first = select(&mut session, pt(0.0, 0.0), pt(40.0, 40.0));
        let second = select(&mut session, pt(50.0, 50.0), pt(90.0, 90.0));

        let fresh = vec![WordBox::new("new", SurfaceRect::new(50, 50, 10, 10))];
        assert!(session.recognition_finished(second, fresh));
        assert!(!session.recognition_finished(
            first,
            vec![WordBox::new("old", SurfaceRect::new(0, 0, 10, 10))],
        ));

        let texts: Vec<&str> = session.word_boxes().iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["new"]);
    }

    #[test]
    fn test_new_selection_clears_previous_words() {
        let mut session = duck_page();
        assert!(session.arm_selection());
        assert!(!session.word_boxes().is_empty());
        session.pointer_pressed(pt(1.0, 1.0));
        assert!(session.word_boxes().is_empty());
    }

    #[test]
    fn test_press_without_arming_does_not_clear_words() {
        let mut session = duck_page();
        assert!(!session.pointer_pressed(pt(15.0, 15.0)));
        assert_eq!(session.word_boxes().iter().count(), 1);
    }

    #[test]
    fn test_coalesced_navigation_renders() {
        let mut session = loaded(9);

        let first = session.request_render(3).unwrap();
        assert_eq!(session.request_render(4), None);
        assert_eq!(session.request_render(5), None);

        assert_eq!(first.page, 3);
        assert_eq!(drain(&mut session, first), [5]);
    }

    #[test]
    fn test_rapid_next_renders_latest_page() {
        let mut session = loaded(5);
        let first = session.next().unwrap();
        assert_eq!(first.page, 2);
        assert_eq!(session.next(), None);
        assert_eq!(session.next(), None);
        assert_eq!(session.current_page(), 4);

        assert_eq!(drain(&mut session, first), [4]);
        assert!(!session.is_rendering());
    }

    #[test]
    fn test_page_change_cancels_drag() {
        let mut session = loaded(2);
        session.arm_selection();
        session.pointer_pressed(pt(1.0, 1.0));
        session.next();
        assert!(session.tracker.mode().is_idle());
        assert_eq!(session.pointer_released(pt(5.0, 5.0)), None);
    }

    #[test]
    fn test_reload_keeps_transcript() {
        let mut session = duck_page();
        let speaker = RecordingSpeaker::default();
        session.resolve_click(pt(15.0, 15.0), &speaker);

        assert_eq!(page(session.document_loaded(4)), Some(1));
        assert_eq!(session.current_page(), 1);
        assert!(session.word_boxes().is_empty());
        assert_eq!(session.transcript().words(), ["duck"]);
    }

    #[test]
    fn test_render_from_previous_document_is_ignored() {
        let mut session = loaded(9);
        let old = session.next().unwrap();
        assert_eq!(old.page, 2);

        // A new, shorter document replaces the old one before page 2 rendered
        let first = session.document_loaded(1).unwrap();
        assert!(!session.is_current_render(old));
        assert!(session.is_current_render(first));

        // The stale completion must not release page 1's slot
        assert_eq!(session.render_finished(old), None);
        assert!(session.is_rendering());
        assert_eq!(session.request_render(1), None);

        assert_eq!(drain(&mut session, first), [1]);
        assert!(!session.is_rendering());
    }

    #[test]
    fn test_superseded_recognition_is_not_current() {
        let mut session = loaded(2);
        let first = select(&mut session, pt(0.0, 0.0), pt(40.0, 40.0));
        assert!(session.is_current(first));

        let second = select(&mut session, pt(5.0, 5.0), pt(30.0, 30.0));
        assert!(!session.is_current(first));
        assert!(session.is_current(second));

        session.next();
        assert!(!session.is_current(second));
    }
}
