//! Display-refresh scheduling
//!
//! Loops are cooperative: a loop asks the host for the next refresh, does its
//! work when that refresh fires, then asks again. Stopping a loop cancels the
//! outstanding request so the host holds no callback for it.

use std::collections::BTreeSet;
use std::fmt;

/// Handle for one requested display refresh
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRequest(pub u64);

impl fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

/// Source of display-refresh callbacks supplied by the host
pub trait RefreshScheduler {
    /// Ask for a callback on the next refresh
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a pending request. Unknown or already-fired requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// In-process refresh source: each `fire` is one display refresh
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: BTreeSet<FrameRequest>,
    refreshes: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one refresh: every pending request fires, in request order
    pub fn fire(&mut self) -> Vec<FrameRequest> {
        self.refreshes += 1;
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn is_pending(&self, request: FrameRequest) -> bool {
        self.pending.contains(&request)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl RefreshScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id);
        self.next_id += 1;
        self.pending.insert(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.remove(&request);
    }
}

/// A cancellable request-next-tick loop
#[derive(Debug)]
pub struct TickLoop {
    /// Name used in logs
    name: &'static str,
    /// Loop wants to keep running
    running: bool,
    /// Outstanding refresh request
    pending: Option<FrameRequest>,
    /// Refreshes this loop has handled
    ticks: u64,
}

impl TickLoop {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: false,
            pending: None,
            ticks: 0,
        }
    }

    /// Start the loop. Returns false if it was already running.
    pub fn start<S: RefreshScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.pending = Some(scheduler.request_frame());
        tracing::trace!(name = self.name, "tick loop started");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Consume this loop's request if it is among the fired ones.
    /// Returns true when the loop should run its tick now.
    pub fn take_fired(&mut self, fired: &[FrameRequest]) -> bool {
        match self.pending {
            Some(request) if self.running && fired.contains(&request) => {
                self.pending = None;
                self.ticks += 1;
                true
            }
            _ => false,
        }
    }

    /// Request the next refresh after a tick, unless the loop was stopped
    /// during that tick.
    pub fn rearm<S: RefreshScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.running && self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }

    /// Stop the loop and release its pending request.
    /// Idempotent: returns true only for the call that actually stopped it.
    pub fn stop<S: RefreshScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if let Some(request) = self.pending.take() {
            scheduler.cancel_frame(request);
        }
        let was_running = self.running;
        self.running = false;
        if was_running {
            tracing::trace!(name = self.name, ticks = self.ticks, "tick loop stopped");
        }
        was_running
    }
}
