//! # idlewatch
//!
//! **Detecting idle event-loop windows and putting them to work**
//!
//! A small state machine that notices when a host event loop has gone idle
//! and, during those windows, periodically invokes a host-supplied idle-work
//! hook (conventionally a garbage-collection assist), backing off once the
//! hook reports no further benefit and resuming as new idle periods recur.
//!
//! ## How it works
//!
//! The detector plugs into the host loop's per-iteration lifecycle through a
//! [`LoopAdapter`]: a before-wait hook, an after-wait hook, and a one-shot
//! timer on a single replaceable slot. While running, every before-wait
//! phase re-arms the timer for the full interval, so a busy loop keeps
//! resetting it and it never fires. Only when the loop genuinely blocks for
//! the whole interval does the timer fire and the [`IdleNotify`] hook run.
//! No visibility into the host's other pending work is needed.
//!
//! ## Quick Start
//!
//! ```ignore
//! use idlewatch::IdleWatchBuilder;
//!
//! let mut detector = IdleWatchBuilder::new()
//!     .env_prefix("MYAPP")
//!     .interval_ms(1000)
//!     .build(my_loop_adapter, || heap.idle_cleanup())?;
//!
//! detector.start(None)?; // sanitized to the 5000 ms default
//! // ... the host loop forwards on_before_wait / on_after_wait / on_timer ...
//! detector.stop();
//! ```
//!
//! ## Configuration
//!
//! Configuration merges defaults, config files (TOML/YAML/JSON),
//! environment variables, programmatic overrides, and clap CLI arguments,
//! in that order. Setting the `IDLEWATCH_TRACE` environment variable to a
//! non-zero integer enables one `tracing` line per recorded transition of
//! the form `prev_state=<STATE> state=<STATE>`.
//!
//! ## Host contract
//!
//! All detector callbacks run on the loop's single logical thread, mutually
//! exclusive and strictly ordered within an iteration (after-wait before the
//! next before-wait). Registered hooks and the timer are weak participants
//! in the loop's liveness accounting: they must not keep the process alive
//! on their own. See [`LoopAdapter`] for the full contract.

pub mod builder;
pub mod config;
pub mod detector;
pub mod error;
pub mod hooks;

pub use builder::{IdleWatchArgs, IdleWatchBuilder};
pub use config::{IdleWatchConfig, DEFAULT_INTERVAL_MS, TRACE_ENV_VAR};
pub use detector::{DetectorState, IdleDetector};
pub use error::{IdleWatchError, Result};
pub use hooks::{HookLiveness, IdleNotify, LoopAdapter};
