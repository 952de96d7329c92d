//! End-to-end scenarios driving the detector through simulated loop
//! iterations via the public API.

use idlewatch::{
    DetectorState, HookLiveness, IdleDetector, IdleNotify, IdleWatchBuilder, IdleWatchError,
    LoopAdapter, Result,
};

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Loop double exposing the single timer slot so tests can decide when the
/// simulated loop has blocked long enough for the timer to fire.
#[derive(Debug, Default)]
struct SimLoop {
    registered: bool,
    liveness: Option<HookLiveness>,
    pending: Option<Duration>,
    timer_fires: usize,
}

impl SimLoop {
    fn fire_due(&mut self) -> bool {
        if self.pending.take().is_some() {
            self.timer_fires += 1;
            true
        } else {
            false
        }
    }
}

impl LoopAdapter for SimLoop {
    fn register_hooks(&mut self, liveness: HookLiveness) -> Result<()> {
        self.registered = true;
        self.liveness = Some(liveness);
        Ok(())
    }

    fn unregister_hooks(&mut self) {
        self.registered = false;
    }

    fn schedule_once(&mut self, delay: Duration) {
        self.pending = Some(delay);
    }

    fn cancel_timer(&mut self) {
        self.pending = None;
    }
}

/// Idle hook double counting invocations, with a scripted first response.
struct CountingHook {
    first: bool,
    rest: bool,
    calls: usize,
}

impl CountingHook {
    fn new(first: bool, rest: bool) -> Self {
        Self { first, rest, calls: 0 }
    }
}

impl IdleNotify for CountingHook {
    fn idle_notification(&mut self) -> bool {
        self.calls += 1;
        if self.calls == 1 {
            self.first
        } else {
            self.rest
        }
    }
}

fn build_detector(hook: CountingHook) -> IdleDetector<SimLoop, CountingHook> {
    IdleWatchBuilder::new()
        .trace(false)
        .build(SimLoop::default(), hook)
        .unwrap()
}

/// Run one simulated loop iteration: wait phase ends (firing the timer if
/// the loop blocked past the debounce window), then the next before-wait.
fn iterate(det: &mut IdleDetector<SimLoop, CountingHook>, loop_was_idle: bool) {
    if loop_was_idle && det.adapter_mut().fire_due() {
        det.on_timer();
    }
    det.on_after_wait();
    det.on_before_wait();
}

/// Scenario A: start(0) falls back to the 5000 ms default interval.
#[test]
fn scenario_non_positive_interval_uses_default() {
    let mut det = build_detector(CountingHook::new(true, true));
    det.start(Some(0)).unwrap();
    assert_eq!(det.interval(), Duration::from_millis(5000));
}

/// Scenario B: a hook that always reports more work keeps the detector
/// Running across any number of timer firings.
#[test]
fn scenario_hook_with_work_keeps_running() {
    let mut det = build_detector(CountingHook::new(true, true));
    det.start(Some(1000)).unwrap();

    det.on_before_wait();
    for _ in 0..5 {
        iterate(&mut det, true);
        assert_eq!(det.state(), DetectorState::Running);
    }
    assert_eq!(det.notify().calls, 5);
}

/// Scenario C: a hook declining work pauses the detector; one full
/// after-wait/before-wait boundary resumes it with no extra hook calls.
#[test]
fn scenario_pause_and_resume_across_iteration_boundary() {
    let mut det = build_detector(CountingHook::new(false, true));
    det.start(Some(1000)).unwrap();

    det.on_before_wait();
    det.adapter_mut().fire_due();
    det.on_timer();
    assert_eq!(det.state(), DetectorState::Paused);

    // One full boundary: the wait-phase sample sees Paused, the next
    // before-wait sees it twice and resumes.
    det.on_after_wait();
    det.on_before_wait();
    assert_eq!(det.state(), DetectorState::Running);
    assert_eq!(det.notify().calls, 1);
}

/// Scenario D: stop() while already Stopped is a harmless no-op.
#[test]
fn scenario_stop_while_stopped() {
    let mut det = build_detector(CountingHook::new(true, true));
    det.stop();
    det.stop();
    assert_eq!(det.state(), DetectorState::Stopped);
    assert!(!det.adapter().registered);
    assert!(det.adapter().pending.is_none());
}

/// Scenario E: a busy loop re-arms the debounce timer every iteration and
/// the idle hook never runs until iterations stop arriving.
#[test]
fn scenario_busy_loop_suppresses_timer() {
    let mut det = build_detector(CountingHook::new(true, true));
    det.start(Some(1000)).unwrap();

    det.on_before_wait();
    for _ in 0..100 {
        // Iterations arrive faster than the interval: the host never gets
        // to fire the pending slot before it is replaced.
        iterate(&mut det, false);
    }
    assert_eq!(det.notify().calls, 0);
    assert_eq!(det.adapter().timer_fires, 0);

    // The loop finally blocks for the full window.
    iterate(&mut det, true);
    assert_eq!(det.notify().calls, 1);
}

/// The full backoff cycle: probe, pause (no timer armed while parked),
/// resume after a full idle iteration, probe again.
#[test]
fn scenario_backoff_cycle_repeats() {
    let mut det = build_detector(CountingHook::new(false, false));
    det.start(Some(1000)).unwrap();

    det.on_after_wait();
    det.on_before_wait();
    det.adapter_mut().fire_due();
    det.on_timer();
    assert_eq!(det.state(), DetectorState::Paused);

    // Same iteration's before-wait still sees the old wait-phase sample:
    // the detector stays parked and arms nothing, so an idle loop can
    // block indefinitely without further probing.
    det.on_before_wait();
    assert_eq!(det.state(), DetectorState::Paused);
    assert!(det.adapter().pending.is_none());

    // New activity wakes the loop; the boundary sample sees Paused twice
    // and probing resumes.
    det.on_after_wait();
    det.on_before_wait();
    assert_eq!(det.state(), DetectorState::Running);
    assert!(det.adapter().pending.is_some());

    det.adapter_mut().fire_due();
    det.on_timer();
    assert_eq!(det.state(), DetectorState::Paused);
    assert_eq!(det.notify().calls, 2);
}

/// Restarting while running swaps in the new interval without leaking the
/// old registration or timer.
#[test]
fn scenario_restart_supersedes() {
    let mut det = build_detector(CountingHook::new(true, true));
    det.start(Some(1000)).unwrap();
    det.on_before_wait();
    assert_eq!(det.adapter().pending, Some(Duration::from_millis(1000)));

    det.start(Some(250)).unwrap();
    assert_eq!(det.interval(), Duration::from_millis(250));
    // The implicit stop cancelled the stale timer.
    assert!(det.adapter().pending.is_none());
    assert!(det.adapter().registered);

    det.on_before_wait();
    assert_eq!(det.adapter().pending, Some(Duration::from_millis(250)));
}

/// Hooks are always registered as weak participants in loop liveness.
#[test]
fn scenario_hooks_registered_weak() {
    let mut det = build_detector(CountingHook::new(true, true));
    det.start(None).unwrap();
    assert_eq!(det.adapter().liveness, Some(HookLiveness::Weak));
}

/// Adapter registration failure propagates and leaves the detector Stopped.
#[test]
fn scenario_registration_failure_propagates() {
    struct BrokenLoop;

    impl LoopAdapter for BrokenLoop {
        fn register_hooks(&mut self, _liveness: HookLiveness) -> Result<()> {
            Err(IdleWatchError::hook_registration(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "handle table full",
            )))
        }
        fn unregister_hooks(&mut self) {}
        fn schedule_once(&mut self, _delay: Duration) {}
        fn cancel_timer(&mut self) {}
    }

    let mut det = IdleWatchBuilder::new()
        .trace(false)
        .build(BrokenLoop, || true)
        .unwrap();

    let err = det.start(Some(1000)).unwrap_err();
    assert!(matches!(err, IdleWatchError::HookRegistration(_)));
    assert_eq!(det.state(), DetectorState::Stopped);
}

/// Shared buffer writer for capturing tracing output.
#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl CaptureWriter {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// With tracing enabled, on_timer reports the (prev_state, state) pair in
/// the documented format.
#[test]
fn scenario_trace_line_format() {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut det = IdleWatchBuilder::new()
            .trace(true)
            .build(SimLoop::default(), CountingHook::new(false, true))
            .unwrap();
        det.start(Some(1000)).unwrap();

        det.on_after_wait();
        det.on_before_wait();
        det.adapter_mut().fire_due();
        det.on_timer();
    });

    assert!(writer.contents().contains("prev_state=RUN state=PAUSE"));
}

/// With tracing disabled, on_timer emits no transition line.
#[test]
fn scenario_trace_disabled_is_silent() {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut det = build_detector(CountingHook::new(false, true));
        det.start(Some(1000)).unwrap();

        det.on_before_wait();
        det.adapter_mut().fire_due();
        det.on_timer();
    });

    assert!(!writer.contents().contains("prev_state="));
}
