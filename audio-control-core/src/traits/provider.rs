use uuid::Uuid;

use crate::collections::lazy_iterator::IteratorProfile;
use crate::models::config::DeviceRole;
use crate::models::error::AudioError;
use crate::models::identity::NativeIdentity;
use crate::models::window::WindowInfo;

/// Entry point of a platform audio provider.
///
/// Implemented by:
/// - `WasapiBackend` (Windows)
pub trait AudioBackend {
    type Connection: AudioConnection;

    /// Open a connection to the host audio subsystem.
    ///
    /// This is the only place provider initialization may fail; return
    /// `AudioError::ProviderUnavailable` when it does.
    fn connect(&self) -> Result<Self::Connection, AudioError>;
}

/// An open connection to the host audio subsystem.
///
/// Native objects (`Device`, `Session`) and opened handles are owned values;
/// dropping them releases the underlying native reference.
pub trait AudioConnection: 'static {
    /// Raw reference to one output device.
    type Device: 'static;
    /// Raw reference to one application session.
    type Session: 'static;
    /// Index-addressable result of a device enumeration.
    type DeviceList: IteratorProfile<Item = Self::Device>;
    /// Index-addressable result of a session enumeration.
    type SessionList: IteratorProfile<Item = Self::Session>;
    type DeviceVolume: VolumeControl + 'static;
    type SessionVolume: VolumeControl + 'static;
    type Properties: PropertyStore + 'static;

    /// Enumerate active render (output) devices.
    fn enumerate_render_devices(&self) -> Result<Self::DeviceList, AudioError>;

    /// Resolve the current default render device for `role`.
    fn default_render_device(&self, role: DeviceRole) -> Result<Self::Device, AudioError>;

    fn device_identity(&self, device: &Self::Device) -> Result<NativeIdentity, AudioError>;

    fn open_device_volume(&self, device: &Self::Device) -> Result<Self::DeviceVolume, AudioError>;

    fn open_device_properties(&self, device: &Self::Device) -> Result<Self::Properties, AudioError>;

    /// Enumerate the sessions currently routed through `device`.
    fn enumerate_sessions(&self, device: &Self::Device) -> Result<Self::SessionList, AudioError>;

    fn session_identity(&self, session: &Self::Session) -> Result<NativeIdentity, AudioError>;

    fn open_session_volume(&self, session: &Self::Session) -> Result<Self::SessionVolume, AudioError>;

    /// Whether `session` is the host's synthetic system-sounds session.
    fn is_system_sounds_session(&self, session: &Self::Session) -> Result<bool, AudioError>;

    fn session_process_id(&self, session: &Self::Session) -> Result<u32, AudioError>;

    /// Top-level windows owned by `process_id`, in the host's enumeration order.
    fn top_level_windows(&self, process_id: u32) -> Result<Vec<WindowInfo>, AudioError>;
}

/// Volume and mute primitives on a device or session.
pub trait VolumeControl {
    /// Scalar volume, `0.0..=1.0`.
    fn volume(&self) -> Result<f32, AudioError>;

    /// Write a scalar volume. Range handling is left to the provider.
    fn set_volume(&self, level: f32, event_context: Option<&Uuid>) -> Result<(), AudioError>;

    fn is_muted(&self) -> Result<bool, AudioError>;

    fn set_mute(&self, muted: bool, event_context: Option<&Uuid>) -> Result<(), AudioError>;
}

/// Read access to a device's property store.
pub trait PropertyStore {
    fn friendly_name(&self) -> Result<String, AudioError>;
}
