//! WASAPI provider: devices via the MMDevice API, sessions via
//! `IAudioSessionManager2`, volume via `IAudioEndpointVolume` and
//! `ISimpleAudioVolume`.

use uuid::Uuid;
use windows::core::{Interface, BOOL};
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::UI::Shell::PropertiesSystem::IPropertyStore;

use audio_control_core::collections::lazy_iterator::IteratorProfile;
use audio_control_core::models::config::DeviceRole;
use audio_control_core::models::error::AudioError;
use audio_control_core::models::identity::NativeIdentity;
use audio_control_core::models::window::WindowInfo;
use audio_control_core::traits::provider::{AudioBackend, AudioConnection, PropertyStore, VolumeControl};

use crate::com::{device_error, event_guid, guid_ptr, session_error, take_pwstr, ComGuard};
use crate::top_level_windows;

/// Connects to the Windows audio subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasapiBackend;

impl AudioBackend for WasapiBackend {
    type Connection = WasapiConnection;

    /// Initializes COM on the calling thread and creates the device enumerator.
    ///
    /// Everything obtained through the connection must stay on this thread.
    fn connect(&self) -> Result<WasapiConnection, AudioError> {
        let com = ComGuard::init()?;
        let enumerator: IMMDeviceEnumerator = unsafe {
            CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(|e| {
                AudioError::ProviderUnavailable(format!("failed to create enumerator: {}", e))
            })?
        };
        log::debug!("MMDeviceEnumerator created");
        Ok(WasapiConnection {
            enumerator,
            _com: com,
        })
    }
}

/// Open MMDevice enumerator. COM is released after the enumerator.
pub struct WasapiConnection {
    enumerator: IMMDeviceEnumerator,
    _com: ComGuard,
}

impl AudioConnection for WasapiConnection {
    type Device = IMMDevice;
    type Session = IAudioSessionControl;
    type DeviceList = DeviceCollection;
    type SessionList = SessionCollection;
    type DeviceVolume = EndpointVolume;
    type SessionVolume = SessionVolume;
    type Properties = DeviceProperties;

    fn enumerate_render_devices(&self) -> Result<DeviceCollection, AudioError> {
        unsafe {
            self.enumerator
                .EnumAudioEndpoints(eRender, DEVICE_STATE_ACTIVE)
                .map(DeviceCollection)
                .map_err(|e| device_error("EnumAudioEndpoints", e))
        }
    }

    fn default_render_device(&self, role: DeviceRole) -> Result<IMMDevice, AudioError> {
        let role = match role {
            DeviceRole::Console => eConsole,
            DeviceRole::Multimedia => eMultimedia,
            DeviceRole::Communications => eCommunications,
        };
        unsafe {
            self.enumerator
                .GetDefaultAudioEndpoint(eRender, role)
                .map_err(|e| device_error("GetDefaultAudioEndpoint", e))
        }
    }

    fn device_identity(&self, device: &IMMDevice) -> Result<NativeIdentity, AudioError> {
        unsafe {
            let id = device.GetId().map_err(|e| device_error("GetId", e))?;
            take_pwstr(id).map(NativeIdentity::from)
        }
    }

    fn open_device_volume(&self, device: &IMMDevice) -> Result<EndpointVolume, AudioError> {
        unsafe {
            device
                .Activate::<IAudioEndpointVolume>(CLSCTX_ALL, None)
                .map(EndpointVolume)
                .map_err(|e| device_error("Activate(IAudioEndpointVolume)", e))
        }
    }

    fn open_device_properties(&self, device: &IMMDevice) -> Result<DeviceProperties, AudioError> {
        unsafe {
            device
                .OpenPropertyStore(STGM_READ)
                .map(DeviceProperties)
                .map_err(|e| device_error("OpenPropertyStore", e))
        }
    }

    fn enumerate_sessions(&self, device: &IMMDevice) -> Result<SessionCollection, AudioError> {
        unsafe {
            let manager = device
                .Activate::<IAudioSessionManager2>(CLSCTX_ALL, None)
                .map_err(|e| device_error("Activate(IAudioSessionManager2)", e))?;
            manager
                .GetSessionEnumerator()
                .map(SessionCollection)
                .map_err(|e| device_error("GetSessionEnumerator", e))
        }
    }

    fn session_identity(&self, session: &IAudioSessionControl) -> Result<NativeIdentity, AudioError> {
        unsafe {
            let control = control2(session)?;
            let id = control
                .GetSessionInstanceIdentifier()
                .map_err(|e| session_error("GetSessionInstanceIdentifier", e))?;
            take_pwstr(id).map(NativeIdentity::from)
        }
    }

    fn open_session_volume(&self, session: &IAudioSessionControl) -> Result<SessionVolume, AudioError> {
        session
            .cast::<ISimpleAudioVolume>()
            .map(SessionVolume)
            .map_err(|e| session_error("QueryInterface(ISimpleAudioVolume)", e))
    }

    fn is_system_sounds_session(&self, session: &IAudioSessionControl) -> Result<bool, AudioError> {
        unsafe {
            // S_OK means system sounds, S_FALSE means an ordinary session.
            let hr = control2(session)?.IsSystemSoundsSession();
            if hr.is_err() {
                return Err(session_error("IsSystemSoundsSession", hr.into()));
            }
            Ok(hr.0 == 0)
        }
    }

    fn session_process_id(&self, session: &IAudioSessionControl) -> Result<u32, AudioError> {
        unsafe {
            control2(session)?
                .GetProcessId()
                .map_err(|e| session_error("GetProcessId", e))
        }
    }

    fn top_level_windows(&self, process_id: u32) -> Result<Vec<WindowInfo>, AudioError> {
        top_level_windows::for_process(process_id)
    }
}

fn control2(session: &IAudioSessionControl) -> Result<IAudioSessionControl2, AudioError> {
    session
        .cast::<IAudioSessionControl2>()
        .map_err(|e| session_error("QueryInterface(IAudioSessionControl2)", e))
}

/// Active render endpoints, read lazily from `IMMDeviceCollection`.
pub struct DeviceCollection(IMMDeviceCollection);

impl IteratorProfile for DeviceCollection {
    type Item = IMMDevice;

    fn count(&self) -> Result<usize, AudioError> {
        unsafe {
            self.0
                .GetCount()
                .map(|n| n as usize)
                .map_err(|e| device_error("IMMDeviceCollection::GetCount", e))
        }
    }

    fn get(&self, index: usize) -> Result<IMMDevice, AudioError> {
        let index = u32::try_from(index).map_err(|_| AudioError::OutOfRange)?;
        unsafe {
            self.0
                .Item(index)
                .map_err(|e| device_error("IMMDeviceCollection::Item", e))
        }
    }
}

/// A device's sessions, read lazily from `IAudioSessionEnumerator`.
pub struct SessionCollection(IAudioSessionEnumerator);

impl IteratorProfile for SessionCollection {
    type Item = IAudioSessionControl;

    fn count(&self) -> Result<usize, AudioError> {
        unsafe {
            self.0
                .GetCount()
                .map(|n| n.max(0) as usize)
                .map_err(|e| device_error("IAudioSessionEnumerator::GetCount", e))
        }
    }

    fn get(&self, index: usize) -> Result<IAudioSessionControl, AudioError> {
        let index = i32::try_from(index).map_err(|_| AudioError::OutOfRange)?;
        unsafe {
            self.0
                .GetSession(index)
                .map_err(|e| session_error("IAudioSessionEnumerator::GetSession", e))
        }
    }
}

/// Master volume of a render endpoint.
pub struct EndpointVolume(IAudioEndpointVolume);

impl VolumeControl for EndpointVolume {
    fn volume(&self) -> Result<f32, AudioError> {
        unsafe {
            self.0
                .GetMasterVolumeLevelScalar()
                .map_err(|e| device_error("GetMasterVolumeLevelScalar", e))
        }
    }

    fn set_volume(&self, level: f32, event_context: Option<&Uuid>) -> Result<(), AudioError> {
        let guid = event_guid(event_context);
        unsafe {
            self.0
                .SetMasterVolumeLevelScalar(level, guid_ptr(&guid))
                .map_err(|e| device_error("SetMasterVolumeLevelScalar", e))
        }
    }

    fn is_muted(&self) -> Result<bool, AudioError> {
        unsafe {
            self.0
                .GetMute()
                .map(|m| m.as_bool())
                .map_err(|e| device_error("IAudioEndpointVolume::GetMute", e))
        }
    }

    fn set_mute(&self, muted: bool, event_context: Option<&Uuid>) -> Result<(), AudioError> {
        let guid = event_guid(event_context);
        unsafe {
            self.0
                .SetMute(BOOL::from(muted), guid_ptr(&guid))
                .map_err(|e| device_error("IAudioEndpointVolume::SetMute", e))
        }
    }
}

/// Per-session volume.
pub struct SessionVolume(ISimpleAudioVolume);

impl VolumeControl for SessionVolume {
    fn volume(&self) -> Result<f32, AudioError> {
        unsafe {
            self.0
                .GetMasterVolume()
                .map_err(|e| session_error("GetMasterVolume", e))
        }
    }

    fn set_volume(&self, level: f32, event_context: Option<&Uuid>) -> Result<(), AudioError> {
        let guid = event_guid(event_context);
        unsafe {
            self.0
                .SetMasterVolume(level, guid_ptr(&guid))
                .map_err(|e| session_error("SetMasterVolume", e))
        }
    }

    fn is_muted(&self) -> Result<bool, AudioError> {
        unsafe {
            self.0
                .GetMute()
                .map(|m| m.as_bool())
                .map_err(|e| session_error("ISimpleAudioVolume::GetMute", e))
        }
    }

    fn set_mute(&self, muted: bool, event_context: Option<&Uuid>) -> Result<(), AudioError> {
        let guid = event_guid(event_context);
        unsafe {
            self.0
                .SetMute(BOOL::from(muted), guid_ptr(&guid))
                .map_err(|e| session_error("ISimpleAudioVolume::SetMute", e))
        }
    }
}

/// Read-only property store of a device.
pub struct DeviceProperties(IPropertyStore);

impl PropertyStore for DeviceProperties {
    /// Read `PKEY_Device_FriendlyName`.
    fn friendly_name(&self) -> Result<String, AudioError> {
        // PROPVARIANT clears itself on drop
        let prop = unsafe {
            self.0
                .GetValue(&PKEY_Device_FriendlyName)
                .map_err(|_| AudioError::PropertyUnavailable("friendly name".into()))?
        };
        let name = prop.to_string();
        if name.is_empty() {
            return Err(AudioError::PropertyUnavailable("friendly name".into()));
        }
        Ok(name)
    }
}
