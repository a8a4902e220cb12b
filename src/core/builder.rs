use std::marker::PhantomData;

use super::config::Config;
use super::emitter::Emitter;
use crate::debug::DebugLogger;

/// Builder for constructing an [`Emitter`] with optional debug settings.
pub struct EmitterBuilder<T> {
    cfg: Config,
    _payload: PhantomData<fn() -> T>,
}

impl<T: Clone + Send + 'static> EmitterBuilder<T> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            _payload: PhantomData,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the name shown in debug records.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.cfg.debug.name = name.into();
        self
    }

    /// Turns the debug hook on or off for this emitter.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.cfg.debug.enabled = enabled;
        self
    }

    /// Sets a custom debug logger.
    ///
    /// The logger only runs while debugging is active (see [`EmitterBuilder::debug`]).
    pub fn logger(mut self, logger: DebugLogger) -> Self {
        self.cfg.debug.logger = Some(logger);
        self
    }

    /// Builds the emitter.
    pub fn build(self) -> Emitter<T> {
        Emitter::with_config(self.cfg)
    }
}
