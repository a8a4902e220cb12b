//! # Emitter configuration.
//!
//! Provides [`Config`], the settings an [`Emitter`](crate::Emitter) is built with.
//!
//! Config is used in two ways:
//! 1. **Direct construction**: `Emitter::with_config(config)`
//! 2. **Builder**: `Emitter::builder().config(config)` plus per-field overrides
//!
//! ## Environment
//! [`DEBUG_ENV`](crate::DEBUG_ENV) holds a comma-separated list of emitter names, or `*`
//! for all of them. It is read once per process and applies to every emitter whose
//! name matches, however it was built. [`Config::from_env`] additionally sets
//! [`DebugConfig::enabled`] from the current value.

use std::fmt;
use std::sync::OnceLock;

use crate::debug::{is_debug_enabled, DebugLogger, DebugWriter, DEBUG_ENV};

/// Debug hook settings.
///
/// ## Field semantics
/// - `name`: emitter name shown in debug records
/// - `enabled`: turns the hook on for this emitter (the process-wide switch also does)
/// - `logger`: custom logger; `None` uses [`DebugWriter`]
#[derive(Clone)]
pub struct DebugConfig {
    /// Emitter name shown in debug records.
    pub name: String,

    /// Whether this emitter reports operations to its logger.
    pub enabled: bool,

    /// Custom logger; `None` writes through `tracing`.
    pub logger: Option<DebugLogger>,
}

impl DebugConfig {
    /// Returns the logger to use if the hook is active right now.
    #[inline]
    pub(crate) fn active_logger(&self) -> Option<DebugLogger> {
        self.logger_for(env_list())
    }

    /// Same as [`DebugConfig::active_logger`] against an explicit [`DEBUG_ENV`] value.
    pub(crate) fn logger_for(&self, env: Option<&str>) -> Option<DebugLogger> {
        let named = env.is_some_and(|list| debug_list_matches(list, &self.name));
        if !(self.enabled || named || is_debug_enabled()) {
            return None;
        }
        Some(
            self.logger
                .clone()
                .unwrap_or_else(|| DebugWriter::new().into_logger()),
        )
    }
}

impl Default for DebugConfig {
    /// Default debug settings:
    ///
    /// - `name = "emitter"`
    /// - `enabled = false`
    /// - `logger = None` (tracing)
    fn default() -> Self {
        Self {
            name: "emitter".to_string(),
            enabled: false,
            logger: None,
        }
    }
}

impl fmt::Debug for DebugConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugConfig")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("logger", &self.logger.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Configuration for an emitter.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Debug hook settings.
    pub debug: DebugConfig,
}

impl Config {
    /// Default configuration with debugging enabled when [`DEBUG_ENV`] names the
    /// default emitter or is `*`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.debug.enabled = env_enables(&cfg.debug.name);
        cfg
    }

    /// Same as [`Config::from_env`] for an emitter with the given debug name.
    pub fn from_env_named(name: impl Into<String>) -> Self {
        let mut cfg = Self::default();
        cfg.debug.name = name.into();
        cfg.debug.enabled = env_enables(&cfg.debug.name);
        cfg
    }
}

/// [`DEBUG_ENV`] as seen by the first emitter operation of the process.
fn env_list() -> Option<&'static str> {
    static LIST: OnceLock<Option<String>> = OnceLock::new();
    LIST.get_or_init(|| std::env::var(DEBUG_ENV).ok()).as_deref()
}

fn env_enables(name: &str) -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| debug_list_matches(&value, name))
        .unwrap_or(false)
}

fn debug_list_matches(list: &str, name: &str) -> bool {
    list.split(',')
        .map(str::trim)
        .any(|item| item == "*" || item == name)
}
