//! Result reporting shared by every public control operation.
//!
//! Internal helpers return `Result<_, AudioError>` and use `?` freely.
//! Public methods hand their final result to `Boundary::report`, which logs
//! a failure once and passes the result through unchanged.

use std::sync::Arc;

use crate::models::config::AudioSystemConfig;
use crate::models::error::AudioError;

/// Settings and log sink shared by an `AudioSystem` and all its wrappers.
pub(crate) struct Boundary {
    config: AudioSystemConfig,
}

impl Boundary {
    pub(crate) fn new(config: AudioSystemConfig) -> Arc<Self> {
        Arc::new(Self { config })
    }

    pub(crate) fn config(&self) -> &AudioSystemConfig {
        &self.config
    }

    /// Fire-and-forget write to the injected sink, if any.
    pub(crate) fn log_line(&self, line: &str) {
        if let Some(ref sink) = self.config.log_sink {
            sink.write_line(line);
        }
    }

    pub(crate) fn report<T>(&self, operation: &str, result: Result<T, AudioError>) -> Result<T, AudioError> {
        if let Err(ref e) = result {
            log::warn!("{} failed: {}", operation, e);
            self.log_line(&format!("{} failed: {} (0x{:08X})", operation, e, e.code() as u32));
        }
        result
    }
}
