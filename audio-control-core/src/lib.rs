//! # audio-control-core
//!
//! Platform-agnostic control surface over a host audio subsystem.
//!
//! Discovers output devices and the per-application sessions routed through
//! them, and reads or writes volume and mute state on either. Platform
//! backends (Windows WASAPI) implement the `AudioBackend` / `AudioConnection`
//! traits and plug into the generic `AudioSystem`.
//!
//! ## Architecture
//!
//! ```text
//! audio-control-core (this crate)
//! ├── traits/       ← AudioBackend, AudioConnection, VolumeControl, PropertyStore, LogSink
//! ├── models/       ← AudioError, NativeIdentity, AudioSystemConfig, DeviceInfo, SessionInfo
//! ├── collections/  ← IdentityCache, LazyIterator
//! └── control/      ← AudioSystem → AudioEndpoint → AudioSession
//! ```
//!
//! ## Usage
//! ```ignore
//! use audio_control_core::AudioSystem;
//! use audio_control_windows::WasapiBackend;
//!
//! let system = AudioSystem::connect(&WasapiBackend)?;
//! for session in system.default_device()?.sessions()? {
//!     if !session.info()?.is_system_sounds {
//!         session.set_mute(true)?;
//!     }
//! }
//! ```

pub mod collections;
pub mod control;
pub mod models;
pub mod traits;

#[cfg(test)]
mod mock;

// Re-export key types at crate root for convenience.
pub use collections::identity_cache::{CacheValues, IdentityCache, Teardown};
pub use collections::lazy_iterator::{IteratorProfile, IteratorState, LazyIterator, VecProfile};
pub use control::endpoint::{AudioEndpoint, SessionIterator};
pub use control::naming::{find_main_window, session_display_name};
pub use control::session::AudioSession;
pub use control::system::{AudioSystem, DeviceIterator};
pub use models::config::{AudioSystemConfig, DeviceRole, SYSTEM_SOUNDS_NAME, UNKNOWN_NAME};
pub use models::error::AudioError;
pub use models::identity::NativeIdentity;
pub use models::snapshot::{DeviceInfo, SessionInfo};
pub use models::window::WindowInfo;
pub use traits::log_sink::{LogCrateSink, LogSink};
pub use traits::provider::{AudioBackend, AudioConnection, PropertyStore, VolumeControl};
