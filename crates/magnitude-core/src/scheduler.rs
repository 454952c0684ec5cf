//! Coalesces render requests into at most one refresh callback per frame.

#[derive(Clone, Copy, Debug, Default)]
pub struct RenderScheduler {
    pending: bool,
    callback_scheduled: bool,
}

impl RenderScheduler {
    /// Mark the next frame dirty.
    #[inline]
    pub fn request_render(&mut self) {
        self.pending = true;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True exactly once per pending frame: the caller must then schedule a
    /// refresh callback.
    pub fn claim_callback(&mut self) -> bool {
        if self.pending && !self.callback_scheduled {
            self.callback_scheduled = true;
            true
        } else {
            false
        }
    }

    /// Called at the top of the refresh callback; true when a render is due.
    pub fn begin_frame(&mut self) -> bool {
        self.callback_scheduled = false;
        std::mem::take(&mut self.pending)
    }

    /// Keep the loop alive for animations still in flight.
    pub fn end_frame(&mut self, keep_alive: bool) {
        if keep_alive {
            self.pending = true;
        }
    }
}
