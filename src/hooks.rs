//! Collaborator seams between the detector and its host.
//!
//! The detector never talks to an event loop directly. It drives a
//! [`LoopAdapter`] (the host's per-iteration hooks and one-shot timer) and an
//! [`IdleNotify`] hook (the host's deferred-work primitive, conventionally a
//! GC assist). Both are traits so tests and embedders can inject their own
//! implementations.

use crate::error::Result;
use std::time::Duration;

/// Liveness of the handles an adapter registers on the host loop.
///
/// The detector always registers [`HookLiveness::Weak`]: its hooks and timer
/// must not, by themselves, keep the host loop running when no other work is
/// pending. Adapters for platforms without a native weak-handle notion must
/// emulate it (e.g. by decrementing the loop's liveness refcount).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookLiveness {
    /// Handles do not hold the loop open.
    Weak,
    /// Handles count toward loop liveness.
    Strong,
}

/// The host event loop's integration surface.
///
/// Implementations wrap three host primitives:
///
/// - a per-iteration **before-wait** hook, run just before the loop blocks
///   waiting for events;
/// - a per-iteration **after-wait** hook, run just after the poll/wait phase
///   completes;
/// - a cancellable **one-shot timer** occupying a single slot.
///
/// # Contract
///
/// The host must invoke the detector's `on_after_wait` strictly before the
/// next `on_before_wait`; the resume-from-paused rule samples state across
/// that boundary and misfires if the ordering is violated. All callbacks are
/// dispatched on the loop's single logical thread, mutually exclusive and
/// totally ordered within an iteration.
pub trait LoopAdapter {
    /// Register both per-iteration hooks with the requested liveness.
    ///
    /// The only fallible adapter operation: host resource exhaustion
    /// propagates to the `start` caller.
    fn register_hooks(&mut self, liveness: HookLiveness) -> Result<()>;

    /// Unregister both per-iteration hooks. Idempotent.
    fn unregister_hooks(&mut self);

    /// Arm the one-shot timer to fire after `delay`.
    ///
    /// The timer occupies a single slot: arming while a callback is still
    /// pending replaces it, so at most one callback is ever pending. This
    /// replace-on-schedule behavior is what turns per-iteration rescheduling
    /// into a debounce.
    fn schedule_once(&mut self, delay: Duration);

    /// Cancel any pending timer callback. Idempotent.
    fn cancel_timer(&mut self);
}

/// The host's idle-work primitive.
///
/// One call performs one unit of deferred cleanup work (e.g. a garbage
/// collection assist) and reports whether further such work remains useful.
pub trait IdleNotify {
    /// Perform one unit of idle work; returns `true` if more remains.
    fn idle_notification(&mut self) -> bool;
}

impl<F> IdleNotify for F
where
    F: FnMut() -> bool,
{
    fn idle_notification(&mut self) -> bool {
        self()
    }
}
