//! Animation loop lifecycle: scheduling, ticking, cancellation.
//!
//! The loop is a self-perpetuating chain of single-shot callbacks: each tick
//! requests the next one and stores its handle so teardown can cancel the
//! pending callback. The GPU side never sees any of this; it only receives
//! the elapsed seconds the loop hands out per tick.

/// Opaque identifier for a scheduled next-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Next-display-refresh scheduler, the platform's requestAnimationFrame
/// equivalent.
///
/// `cancel_tick` must tolerate stale or already-fired handles (no-op).
/// Platforms without a refresh-synced primitive may back this with a
/// fixed-interval timer; every other contract is unaffected.
pub trait TickScheduler {
    /// Ask for one callback on the next display refresh.
    fn request_tick(&mut self) -> TickHandle;

    /// Cancel a pending callback. Safe to call with a handle that already
    /// fired.
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Lifecycle phase of the renderer component.
///
/// `Disabled` and `Stopped` are terminal: nothing transitions back to
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
    Disabled,
    Stopped,
}

/// Drives the tick lifecycle over a [`TickScheduler`].
///
/// The owner calls [`start`](Self::start) once initialization succeeded (or
/// [`disable`](Self::disable) when it failed), forwards each fired callback
/// to [`tick`](Self::tick), and calls [`stop`](Self::stop) on teardown
/// before releasing the GPU context.
pub struct AnimationLoop<S: TickScheduler> {
    scheduler: S,
    phase: Phase,
    pending: Option<TickHandle>,
}

impl<S: TickScheduler> AnimationLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            phase: Phase::Uninitialized,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Enter `Running` and request the first tick.
    ///
    /// Only valid from `Uninitialized`; terminal phases stay put.
    pub fn start(&mut self) {
        if self.phase != Phase::Uninitialized {
            return;
        }
        self.phase = Phase::Running;
        self.pending = Some(self.scheduler.request_tick());
    }

    /// Mark initialization as failed. Terminal.
    pub fn disable(&mut self) {
        if matches!(self.phase, Phase::Disabled | Phase::Stopped) {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        self.phase = Phase::Disabled;
    }

    /// Process one fired callback.
    ///
    /// Returns the time uniform in seconds (the scheduler's timestamp scaled
    /// by 0.001, no independent clock) and schedules the next tick, replacing
    /// the stored handle. Returns `None` outside `Running`, so a callback
    /// that was already in flight when the loop stopped is dropped.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f32> {
        if self.phase != Phase::Running {
            return None;
        }
        self.pending = Some(self.scheduler.request_tick());
        Some((timestamp_ms * 1e-3) as f32)
    }

    /// Cancel the pending callback, if any, and enter `Stopped`. Terminal.
    ///
    /// Must run before the GPU context is torn down. Calling it with no tick
    /// pending is a no-op rather than an error.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        self.phase = Phase::Stopped;
    }
}
