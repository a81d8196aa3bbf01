/// Outcome of asking the queue to render a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// Nothing was in flight; the caller must start rendering this page now
    Start(u16),
    /// A render is in flight; the page was parked as the single pending one
    Deferred,
}

/// Single-flight render coalescing: at most one render runs, and while it
/// runs only the latest requested page is remembered
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    in_flight: Option<u16>,
    pending: Option<u16>,
}

impl RenderQueue {
    pub fn request(&mut self, page: u16) -> RenderRequest {
        if self.in_flight.is_some() {
            self.pending = Some(page);
            return RenderRequest::Deferred;
        }
        self.in_flight = Some(page);
        RenderRequest::Start(page)
    }

    /// Mark the in-flight render finished, successful or not. Returns the
    /// pending page, which is now in flight and must be started by the caller.
    pub fn complete(&mut self) -> Option<u16> {
        self.in_flight = self.pending.take();
        self.in_flight
    }

    #[cfg(test)]
    pub fn is_rendering(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Forget everything, used when a new document replaces the old one
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.pending = None;
    }
}
