use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::traits::log_sink::LogSink;

/// Placeholder returned when no window title could be found for a session.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder returned for sessions named as system sounds.
pub const SYSTEM_SOUNDS_NAME: &str = "System Sounds";

/// Which default device the provider should resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    Console,
    #[default]
    Multimedia,
    Communications,
}

/// Configuration for an `AudioSystem`.
#[derive(Clone)]
pub struct AudioSystemConfig {
    /// Role used when resolving the default render device (default: multimedia).
    pub device_role: DeviceRole,

    /// Event context attached to volume and mute writes so change
    /// notifications can be attributed to this program. `None` sends no context.
    pub event_context: Option<Uuid>,

    /// Display name used when a session's owning window can't be found.
    pub unknown_name: String,

    /// Display name used for sessions reported as system sounds.
    pub system_sounds_name: String,

    /// Optional line sink for operation logs.
    pub log_sink: Option<Arc<dyn LogSink>>,
}

impl AudioSystemConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.unknown_name.trim().is_empty() {
            return Err("unknown name placeholder must not be empty".into());
        }
        if self.system_sounds_name.trim().is_empty() {
            return Err("system sounds placeholder must not be empty".into());
        }
        Ok(())
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }
}

impl Default for AudioSystemConfig {
    fn default() -> Self {
        Self {
            device_role: DeviceRole::default(),
            event_context: Some(Uuid::new_v4()),
            unknown_name: UNKNOWN_NAME.into(),
            system_sounds_name: SYSTEM_SOUNDS_NAME.into(),
            log_sink: None,
        }
    }
}

impl fmt::Debug for AudioSystemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSystemConfig")
            .field("device_role", &self.device_role)
            .field("event_context", &self.event_context)
            .field("unknown_name", &self.unknown_name)
            .field("system_sounds_name", &self.system_sounds_name)
            .field("log_sink", &self.log_sink.is_some())
            .finish()
    }
}
