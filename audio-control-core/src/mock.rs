//! In-memory audio provider for unit tests.
//!
//! Devices, sessions and windows are plain records in a shared
//! `MockState`. Every opened handle logs `open <kind> <id>` on creation and
//! `release <kind> <id>` on drop so tests can check instantiation counts and
//! teardown order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::collections::lazy_iterator::VecProfile;
use crate::models::config::DeviceRole;
use crate::models::error::AudioError;
use crate::models::identity::NativeIdentity;
use crate::models::window::WindowInfo;
use crate::traits::provider::{AudioBackend, AudioConnection, PropertyStore, VolumeControl};

#[derive(Debug, Clone)]
struct Level {
    volume: f32,
    muted: bool,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    id: String,
    process_id: u32,
    system_sounds: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    devices: Vec<String>,
    names: HashMap<String, String>,
    sessions: HashMap<String, Vec<SessionRecord>>,
    levels: HashMap<String, Level>,
    windows: HashMap<u32, Vec<WindowInfo>>,
    default_device: Option<String>,
    unavailable: bool,
    denied: bool,
    properties_broken: bool,
    events: Vec<String>,
    last_event_context: Option<Uuid>,
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, id: &str, name: &str) {
        let mut s = self.state.lock();
        s.devices.push(id.into());
        s.names.insert(id.into(), name.into());
        s.levels.insert(id.into(), Level { volume: 1.0, muted: false });
        if s.default_device.is_none() {
            s.default_device = Some(id.into());
        }
    }

    pub fn add_session(&self, device: &str, id: &str, process_id: u32, system_sounds: bool) {
        let mut s = self.state.lock();
        s.sessions.entry(device.into()).or_default().push(SessionRecord {
            id: id.into(),
            process_id,
            system_sounds,
        });
        s.levels.insert(id.into(), Level { volume: 1.0, muted: false });
    }

    pub fn set_windows(&self, process_id: u32, windows: Vec<WindowInfo>) {
        self.state.lock().windows.insert(process_id, windows);
    }

    pub fn set_default(&self, id: &str) {
        self.state.lock().default_device = Some(id.into());
    }

    pub fn remove_name(&self, id: &str) {
        self.state.lock().names.remove(id);
    }

    /// Unplug a device: it leaves enumeration and its level record goes away.
    pub fn unplug(&self, id: &str) {
        let mut s = self.state.lock();
        s.devices.retain(|d| d != id);
        s.levels.remove(id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    pub fn set_denied(&self, denied: bool) {
        self.state.lock().denied = denied;
    }

    /// Make every property store open fail, after the volume handle opened.
    pub fn set_properties_broken(&self, broken: bool) {
        self.state.lock().properties_broken = broken;
    }

    /// Change a level behind the wrappers' back.
    pub fn set_external_mute(&self, id: &str, muted: bool) {
        if let Some(level) = self.state.lock().levels.get_mut(id) {
            level.muted = muted;
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().events.clone()
    }

    pub fn count_events(&self, event: &str) -> usize {
        self.state.lock().events.iter().filter(|e| *e == event).count()
    }

    pub fn last_event_context(&self) -> Option<Uuid> {
        self.state.lock().last_event_context
    }
}

impl AudioBackend for MockBackend {
    type Connection = MockConnection;

    fn connect(&self) -> Result<MockConnection, AudioError> {
        let mut s = self.state.lock();
        if s.unavailable {
            return Err(AudioError::ProviderUnavailable("mock provider offline".into()));
        }
        s.events.push("open connection".into());
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }
}

pub(crate) struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.state.lock().events.push("release connection".into());
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MockDevice(String);

#[derive(Debug, Clone)]
pub(crate) struct MockSession(SessionRecord);

pub(crate) struct MockVolume {
    kind: &'static str,
    id: String,
    state: Arc<Mutex<MockState>>,
}

impl MockVolume {
    fn open(kind: &'static str, id: &str, state: &Arc<Mutex<MockState>>) -> Result<Self, AudioError> {
        let mut s = state.lock();
        if s.denied {
            return Err(AudioError::AccessDenied);
        }
        s.events.push(format!("open {} {}", kind, id));
        Ok(Self {
            kind,
            id: id.into(),
            state: Arc::clone(state),
        })
    }

    fn gone(&self) -> AudioError {
        if self.kind == "session-volume" {
            AudioError::SessionInvalid
        } else {
            AudioError::DeviceInvalid
        }
    }
}

impl Drop for MockVolume {
    fn drop(&mut self) {
        self.state.lock().events.push(format!("release {} {}", self.kind, self.id));
    }
}

impl VolumeControl for MockVolume {
    fn volume(&self) -> Result<f32, AudioError> {
        let s = self.state.lock();
        s.levels.get(&self.id).map(|l| l.volume).ok_or_else(|| self.gone())
    }

    fn set_volume(&self, level: f32, event_context: Option<&Uuid>) -> Result<(), AudioError> {
        let mut s = self.state.lock();
        s.last_event_context = event_context.copied();
        let gone = self.gone();
        let entry = s.levels.get_mut(&self.id).ok_or(gone)?;
        // Providers store levels with limited precision
        entry.volume = (level.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0;
        Ok(())
    }

    fn is_muted(&self) -> Result<bool, AudioError> {
        let s = self.state.lock();
        s.levels.get(&self.id).map(|l| l.muted).ok_or_else(|| self.gone())
    }

    fn set_mute(&self, muted: bool, event_context: Option<&Uuid>) -> Result<(), AudioError> {
        let mut s = self.state.lock();
        s.last_event_context = event_context.copied();
        let gone = self.gone();
        s.levels.get_mut(&self.id).ok_or(gone)?.muted = muted;
        Ok(())
    }
}

pub(crate) struct MockProperties {
    id: String,
    state: Arc<Mutex<MockState>>,
}

impl Drop for MockProperties {
    fn drop(&mut self) {
        self.state.lock().events.push(format!("release properties {}", self.id));
    }
}

impl PropertyStore for MockProperties {
    fn friendly_name(&self) -> Result<String, AudioError> {
        self.state
            .lock()
            .names
            .get(&self.id)
            .cloned()
            .ok_or_else(|| AudioError::PropertyUnavailable("friendly name".into()))
    }
}

impl AudioConnection for MockConnection {
    type Device = MockDevice;
    type Session = MockSession;
    type DeviceList = VecProfile<MockDevice>;
    type SessionList = VecProfile<MockSession>;
    type DeviceVolume = MockVolume;
    type SessionVolume = MockVolume;
    type Properties = MockProperties;

    fn enumerate_render_devices(&self) -> Result<Self::DeviceList, AudioError> {
        let s = self.state.lock();
        Ok(VecProfile::new(s.devices.iter().cloned().map(MockDevice).collect()))
    }

    fn default_render_device(&self, _role: DeviceRole) -> Result<MockDevice, AudioError> {
        let s = self.state.lock();
        s.default_device
            .clone()
            .map(MockDevice)
            .ok_or_else(|| AudioError::Generic("no default device".into()))
    }

    fn device_identity(&self, device: &MockDevice) -> Result<NativeIdentity, AudioError> {
        Ok(NativeIdentity::new(device.0.as_str()))
    }

    fn open_device_volume(&self, device: &MockDevice) -> Result<MockVolume, AudioError> {
        MockVolume::open("device-volume", &device.0, &self.state)
    }

    fn open_device_properties(&self, device: &MockDevice) -> Result<MockProperties, AudioError> {
        let mut s = self.state.lock();
        if s.properties_broken {
            return Err(AudioError::PropertyUnavailable("property store".into()));
        }
        s.events.push(format!("open properties {}", device.0));
        Ok(MockProperties {
            id: device.0.clone(),
            state: Arc::clone(&self.state),
        })
    }

    fn enumerate_sessions(&self, device: &MockDevice) -> Result<Self::SessionList, AudioError> {
        let s = self.state.lock();
        if !s.devices.contains(&device.0) {
            return Err(AudioError::DeviceInvalid);
        }
        let sessions = s.sessions.get(&device.0).cloned().unwrap_or_default();
        Ok(VecProfile::new(sessions.into_iter().map(MockSession).collect()))
    }

    fn session_identity(&self, session: &MockSession) -> Result<NativeIdentity, AudioError> {
        Ok(NativeIdentity::new(session.0.id.as_str()))
    }

    fn open_session_volume(&self, session: &MockSession) -> Result<MockVolume, AudioError> {
        MockVolume::open("session-volume", &session.0.id, &self.state)
    }

    fn is_system_sounds_session(&self, session: &MockSession) -> Result<bool, AudioError> {
        Ok(session.0.system_sounds)
    }

    fn session_process_id(&self, session: &MockSession) -> Result<u32, AudioError> {
        Ok(session.0.process_id)
    }

    fn top_level_windows(&self, process_id: u32) -> Result<Vec<WindowInfo>, AudioError> {
        Ok(self.state.lock().windows.get(&process_id).cloned().unwrap_or_default())
    }
}
