/// The recurring per-refresh task.
///
/// A running loop reschedules itself on every entry; stopping only clears the flag, and the next
/// entry observes it. Nothing is preempted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameLoop {
    scheduled: bool,
    ticks: u64,
}

impl FrameLoop {
    /// Schedule the loop. Starting a running loop is a no-op.
    pub fn start(&mut self) {
        if !self.scheduled {
            self.scheduled = true;
            tracing::trace!(ticks = self.ticks, "frame loop scheduled");
        }
    }

    /// Cancel the loop; observed at the next entry.
    pub fn stop(&mut self) {
        self.scheduled = false;
    }

    /// `true` while the loop is scheduled.
    pub fn is_running(&self) -> bool {
        self.scheduled
    }

    /// Loop entry. Returns the index of this tick, or `None` once the loop has been stopped.
    pub fn enter(&mut self) -> Option<u64> {
        if !self.scheduled {
            return None;
        }
        let tick = self.ticks;
        self.ticks += 1;
        Some(tick)
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/frame_loop.rs"]
mod tests;
