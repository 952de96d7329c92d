//! Builder pattern for constructing idle detectors.
//!
//! The builder supports multiple configuration sources using figment:
//! - Default values
//! - Config files (TOML, YAML, JSON)
//! - Environment variables
//! - Programmatic overrides
//! - CLI arguments via clap

use crate::config::IdleWatchConfig;
use crate::detector::IdleDetector;
use crate::error::Result;
use crate::hooks::{IdleNotify, LoopAdapter};

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::Path;

/// Builder for constructing an [`IdleDetector`].
///
/// Configuration sources are merged in the following order (later sources
/// override earlier):
/// 1. Default values
/// 2. Config files (in order added)
/// 3. Environment variables
/// 4. Programmatic overrides
///
/// # Examples
///
/// ```ignore
/// use idlewatch::IdleWatchBuilder;
///
/// let detector = IdleWatchBuilder::new()
///     .file("idlewatch.toml")
///     .env_prefix("MYAPP")
///     .interval_ms(1000)
///     .build(adapter, notify)?;
/// ```
#[derive(Debug)]
pub struct IdleWatchBuilder {
    figment: Figment,
}

impl Default for IdleWatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleWatchBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(IdleWatchConfig::default())),
        }
    }

    /// Add a configuration file.
    ///
    /// Supports TOML, YAML, and JSON formats (detected by extension).
    /// Files are merged in the order they are added.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        self.figment = match extension.to_lowercase().as_str() {
            "toml" => self.figment.merge(Toml::file(path)),
            "yaml" | "yml" => self.figment.merge(Yaml::file(path)),
            "json" => self.figment.merge(Json::file(path)),
            _ => {
                // Default to TOML
                self.figment.merge(Toml::file(path))
            }
        };
        self
    }

    /// Add environment variables with a prefix.
    ///
    /// Environment variables are expected in the format `{PREFIX}_{KEY}`,
    /// e.g., `MYAPP_INTERVAL_MS`, `MYAPP_TRACE`.
    ///
    /// Note that the [`TRACE_ENV_VAR`](crate::TRACE_ENV_VAR) toggle is read
    /// separately at build time when no explicit `trace` value is configured,
    /// with lenient integer parsing that never rejects malformed values.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.figment = self.figment.merge(Env::prefixed(prefix).split("_"));
        self
    }

    /// Set the debounce interval in milliseconds.
    ///
    /// Non-positive values are sanitized to the 5000 ms default at build
    /// time rather than rejected.
    pub fn interval_ms(mut self, ms: i64) -> Self {
        self.figment = self.figment.merge(Serialized::default("interval_ms", ms));
        self
    }

    /// Explicitly enable or disable transition tracing.
    ///
    /// When never called, the [`TRACE_ENV_VAR`](crate::TRACE_ENV_VAR)
    /// environment toggle decides.
    pub fn trace(mut self, enabled: bool) -> Self {
        self.figment = self.figment.merge(Serialized::default("trace", enabled));
        self
    }

    /// Apply CLI argument overrides.
    ///
    /// This method applies any non-None values from the [`IdleWatchArgs`]
    /// struct.
    pub fn with_cli_args(mut self, args: &IdleWatchArgs) -> Self {
        if let Some(ms) = args.idle_interval_ms {
            self.figment = self.figment.merge(Serialized::default("interval_ms", ms));
        }
        if let Some(trace) = args.idle_trace {
            self.figment = self.figment.merge(Serialized::default("trace", trace));
        }
        self
    }

    /// Extract the merged configuration without building a detector.
    pub fn config(&self) -> Result<IdleWatchConfig> {
        Ok(self.figment.extract().map_err(Box::new)?)
    }

    /// Build the detector around the host's loop adapter and idle hook.
    ///
    /// The detector starts in the `Stopped` state; call
    /// [`IdleDetector::start`] to begin probing.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration extraction fails.
    pub fn build<L, N>(self, adapter: L, notify: N) -> Result<IdleDetector<L, N>>
    where
        L: LoopAdapter,
        N: IdleNotify,
    {
        let config = self.config()?;
        Ok(IdleDetector::from_config(&config, adapter, notify))
    }
}

/// CLI arguments for idlewatch configuration.
///
/// Use with clap's `Parser` derive macro. These arguments can be applied to
/// an [`IdleWatchBuilder`] using
/// [`with_cli_args`](IdleWatchBuilder::with_cli_args).
///
/// # Examples
///
/// ```ignore
/// use clap::Parser;
/// use idlewatch::{IdleWatchArgs, IdleWatchBuilder};
///
/// #[derive(Parser)]
/// struct MyArgs {
///     #[command(flatten)]
///     idle: IdleWatchArgs,
///     // ... other args
/// }
///
/// let args = MyArgs::parse();
/// let detector = IdleWatchBuilder::new()
///     .with_cli_args(&args.idle)
///     .build(adapter, notify)?;
/// ```
#[derive(Debug, Default, Clone, clap::Args)]
pub struct IdleWatchArgs {
    /// Idle probe interval in milliseconds
    #[arg(long)]
    pub idle_interval_ms: Option<i64>,

    /// Trace idle-detector state transitions
    #[arg(long)]
    pub idle_trace: Option<bool>,
}
