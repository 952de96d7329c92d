//! The idle-detection state machine.
//!
//! The detector distinguishes "process busy" from "process idle" without any
//! visibility into the host's pending work, using a debounce timer:
//!
//! - While `Running`, every before-wait phase re-arms a one-shot timer for
//!   the full interval. A busy loop iterates often enough that the timer is
//!   replaced before it ever fires.
//! - A loop that goes idle stops iterating and blocks in its poll phase; the
//!   pending timer survives untouched and fires during the block, invoking
//!   the idle-notification hook.
//! - When the hook reports no further benefit the detector drops to `Paused`.
//!   Two consecutive `Paused` observations straddling an iteration boundary
//!   (sampled by the after-wait hook) re-arm `Running`, so later idle
//!   accumulation is still detected instead of freezing in `Paused` forever.

use crate::config::{sanitize_interval, IdleWatchConfig};
use crate::error::Result;
use crate::hooks::{HookLiveness, IdleNotify, LoopAdapter};

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

/// Detector lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetectorState {
    /// Inactive: no hooks registered, no timer pending.
    #[default]
    Stopped,
    /// Actively probing for idleness.
    Running,
    /// The idle hook last reported no further benefit; probing is parked
    /// until the next full idle iteration.
    Paused,
}

impl fmt::Display for DetectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectorState::Stopped => "STOP",
            DetectorState::Running => "RUN",
            DetectorState::Paused => "PAUSE",
        };
        f.write_str(s)
    }
}

/// Event-loop idle detector.
///
/// A single owned instance drives a [`LoopAdapter`] (the host loop's hook and
/// timer surface) and an [`IdleNotify`] hook (the host's deferred-work
/// primitive). The host's loop-integration layer forwards its three callbacks
/// to [`on_before_wait`](Self::on_before_wait),
/// [`on_after_wait`](Self::on_after_wait) and [`on_timer`](Self::on_timer);
/// everything runs on the loop's single logical thread, so the detector holds
/// no locks.
///
/// # Examples
///
/// ```ignore
/// use idlewatch::IdleWatchBuilder;
///
/// let mut detector = IdleWatchBuilder::new()
///     .env_prefix("MYAPP")
///     .build(my_loop_adapter, || heap.idle_cleanup())?;
///
/// detector.start(Some(1000))?;
/// // ... host loop forwards its per-iteration callbacks ...
/// detector.stop();
/// ```
pub struct IdleDetector<L, N> {
    adapter: L,
    notify: N,
    state: DetectorState,
    prev_state: DetectorState,
    interval: Duration,
    trace: bool,
}

impl<L, N> IdleDetector<L, N>
where
    L: LoopAdapter,
    N: IdleNotify,
{
    /// Create a detector from a configuration.
    ///
    /// This is typically called via [`IdleWatchBuilder::build`]. The trace
    /// flag is resolved here and immutable afterwards.
    ///
    /// [`IdleWatchBuilder::build`]: crate::IdleWatchBuilder::build
    pub fn from_config(config: &IdleWatchConfig, adapter: L, notify: N) -> Self {
        Self {
            adapter,
            notify,
            state: DetectorState::Stopped,
            prev_state: DetectorState::Stopped,
            interval: config.effective_interval(),
            trace: config.effective_trace(),
        }
    }

    /// Start probing for idleness.
    ///
    /// Performs an implicit [`stop`](Self::stop) first, so calling `start`
    /// while already running supersedes the previous interval and hook
    /// registrations rather than double-registering. A missing or
    /// non-positive `interval_ms` is replaced with the 5000 ms default.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's hook-registration failure; the detector is
    /// rolled back to `Stopped` before the error is returned.
    pub fn start(&mut self, interval_ms: Option<i64>) -> Result<()> {
        self.stop();

        self.interval = Duration::from_millis(sanitize_interval(interval_ms) as u64);
        self.state = DetectorState::Running;
        if let Err(err) = self.adapter.register_hooks(HookLiveness::Weak) {
            self.stop();
            return Err(err);
        }

        debug!(interval_ms = self.interval.as_millis() as u64, "idle detector started");
        Ok(())
    }

    /// Stop probing: cancel any pending timer and unregister both hooks.
    ///
    /// Idempotent; calling while already stopped is a no-op. Safe to call
    /// from within `on_timer` or the loop hooks — the cancellation takes
    /// effect before any further scheduled callback fires.
    pub fn stop(&mut self) {
        let was_active = self.state != DetectorState::Stopped;
        self.state = DetectorState::Stopped;
        self.adapter.cancel_timer();
        self.adapter.unregister_hooks();
        if was_active {
            debug!("idle detector stopped");
        }
    }

    /// After-wait hook: sample the state at the end of the iteration's wait
    /// phase.
    ///
    /// The sample feeds the resume rule in [`on_before_wait`]; the host must
    /// deliver this strictly before the next before-wait callback.
    ///
    /// [`on_before_wait`]: Self::on_before_wait
    pub fn on_after_wait(&mut self) {
        self.prev_state = self.state;
    }

    /// Before-wait hook: run just before the loop blocks.
    ///
    /// Two consecutive `Paused` samples mean the loop completed a full idle
    /// cycle since the hook declined work, so probing resumes. While
    /// `Running`, the debounce timer is re-armed for the full interval; only
    /// an iteration gap longer than the interval lets it fire.
    pub fn on_before_wait(&mut self) {
        if self.state == DetectorState::Paused && self.prev_state == DetectorState::Paused {
            self.state = DetectorState::Running;
        }
        if self.state == DetectorState::Running {
            self.adapter.schedule_once(self.interval);
        }
    }

    /// Timer callback: the loop went a full interval without iterating.
    ///
    /// Invokes the idle-notification hook; a `false` return (no further
    /// benefit) parks the detector in `Paused`.
    pub fn on_timer(&mut self) {
        if !self.notify.idle_notification() {
            self.state = DetectorState::Paused;
        }
        if self.trace {
            info!(target: "idlewatch", "prev_state={} state={}", self.prev_state, self.state);
        }
    }

    /// Current detector state.
    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// The effective debounce interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether transition tracing is enabled.
    pub fn trace_enabled(&self) -> bool {
        self.trace
    }

    /// Borrow the loop adapter.
    pub fn adapter(&self) -> &L {
        &self.adapter
    }

    /// Mutably borrow the loop adapter.
    pub fn adapter_mut(&mut self) -> &mut L {
        &mut self.adapter
    }

    /// Borrow the idle-notification hook.
    pub fn notify(&self) -> &N {
        &self.notify
    }
}

impl<L, N> fmt::Debug for IdleDetector<L, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdleDetector")
            .field("state", &self.state)
            .field("prev_state", &self.prev_state)
            .field("interval", &self.interval)
            .field("trace", &self.trace)
            .finish_non_exhaustive()
    }
}
