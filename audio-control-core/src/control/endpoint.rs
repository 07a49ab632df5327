use std::sync::Arc;

use parking_lot::Mutex;

use super::boundary::Boundary;
use super::session::AudioSession;
use crate::collections::identity_cache::{CacheValues, IdentityCache, Teardown};
use crate::collections::lazy_iterator::LazyIterator;
use crate::models::error::AudioError;
use crate::models::identity::NativeIdentity;
use crate::models::snapshot::DeviceInfo;
use crate::traits::provider::{AudioConnection, PropertyStore, VolumeControl};

/// Iterator over the sessions cached by one `AudioEndpoint`.
pub type SessionIterator<'a, C> = LazyIterator<CacheValues<'a, NativeIdentity, AudioSession<C>>>;

/// Native resources owned by one device wrapper. Fields drop in order:
/// volume handle, property store, device reference, connection share.
struct EndpointHandles<C: AudioConnection> {
    volume: C::DeviceVolume,
    properties: C::Properties,
    device: C::Device,
    connection: Arc<C>,
}

/// One audio output device.
///
/// Owned by the `AudioSystem` device cache; there is exactly one
/// `AudioEndpoint` per native device identity for the life of the system.
/// Owns the cache of its sessions.
pub struct AudioEndpoint<C: AudioConnection> {
    identity: NativeIdentity,
    handles: Mutex<Option<EndpointHandles<C>>>,
    sessions: IdentityCache<NativeIdentity, AudioSession<C>>,
    boundary: Arc<Boundary>,
}

impl<C: AudioConnection> AudioEndpoint<C> {
    /// Acquire the device's volume and property handles.
    ///
    /// If the second acquisition fails the first handle is dropped, and with
    /// it released, before the error is returned.
    pub(crate) fn open(
        connection: &Arc<C>,
        device: C::Device,
        identity: NativeIdentity,
        boundary: &Arc<Boundary>,
    ) -> Result<Self, AudioError> {
        let volume = connection.open_device_volume(&device)?;
        let properties = connection.open_device_properties(&device)?;
        log::debug!("opened device {}", identity);

        Ok(Self {
            identity,
            handles: Mutex::new(Some(EndpointHandles {
                volume,
                properties,
                device,
                connection: Arc::clone(connection),
            })),
            sessions: IdentityCache::new(),
            boundary: Arc::clone(boundary),
        })
    }

    pub fn identity(&self) -> &NativeIdentity {
        &self.identity
    }

    /// Whether the owner has not yet torn this device down.
    pub fn is_valid(&self) -> bool {
        self.handles.lock().is_some()
    }

    /// Set the master volume scalar. Values outside `0.0..=1.0` are passed
    /// through to the provider as is.
    pub fn set_volume(&self, level: f32) -> Result<(), AudioError> {
        let context = self.boundary.config().event_context;
        let result = self.with_handles(|h| h.volume.set_volume(level, context.as_ref()));
        self.boundary.report("AudioEndpoint::set_volume", result)
    }

    pub fn volume(&self) -> Result<f32, AudioError> {
        let result = self.with_handles(|h| h.volume.volume());
        self.boundary.report("AudioEndpoint::volume", result)
    }

    /// Toggle mute and return the new state. Calling it twice restores the
    /// original state.
    pub fn mute(&self) -> Result<bool, AudioError> {
        let context = self.boundary.config().event_context;
        let result = self.with_handles(|h| {
            let muted = !h.volume.is_muted()?;
            h.volume.set_mute(muted, context.as_ref())?;
            Ok(muted)
        });
        self.boundary.report("AudioEndpoint::mute", result)
    }

    pub fn set_mute(&self, muted: bool) -> Result<(), AudioError> {
        let context = self.boundary.config().event_context;
        let result = self.with_handles(|h| h.volume.set_mute(muted, context.as_ref()));
        self.boundary.report("AudioEndpoint::set_mute", result)
    }

    pub fn is_muted(&self) -> Result<bool, AudioError> {
        let result = self.with_handles(|h| h.volume.is_muted());
        self.boundary.report("AudioEndpoint::is_muted", result)
    }

    /// Friendly display name from the device's property store.
    pub fn name(&self) -> Result<String, AudioError> {
        let result = self.with_handles(|h| h.properties.friendly_name());
        self.boundary.report("AudioEndpoint::name", result)
    }

    /// Discover this device's sessions, then iterate every cached session.
    ///
    /// Discovery adds wrappers for sessions not seen before; sessions seen on
    /// an earlier call stay in the cache even if they have since ended.
    pub fn session_iterator(&self) -> Result<SessionIterator<'_, C>, AudioError> {
        let result = self
            .populate_sessions()
            .map(|()| LazyIterator::new(self.sessions.profile()));
        self.boundary.report("AudioEndpoint::session_iterator", result)
    }

    /// Discover and collect every cached session.
    pub fn sessions(&self) -> Result<Vec<Arc<AudioSession<C>>>, AudioError> {
        self.session_iterator()?.collect()
    }

    /// Snapshot of name, volume and mute state.
    pub fn info(&self, is_default: bool) -> Result<DeviceInfo, AudioError> {
        let result = self.with_handles(|h| {
            Ok(DeviceInfo {
                id: self.identity.clone(),
                name: h.properties.friendly_name()?,
                volume: h.volume.volume()?,
                muted: h.volume.is_muted()?,
                is_default,
            })
        });
        self.boundary.report("AudioEndpoint::info", result)
    }

    /// Drop one session from the cache, releasing its handles.
    pub fn invalidate_session(&self, identity: &NativeIdentity) -> bool {
        self.sessions.invalidate(identity)
    }

    pub fn cached_session_count(&self) -> usize {
        self.sessions.len()
    }

    // --- Internal helpers ---

    fn with_handles<T>(&self, f: impl FnOnce(&EndpointHandles<C>) -> Result<T, AudioError>) -> Result<T, AudioError> {
        let guard = self.handles.lock();
        let handles = guard.as_ref().ok_or(AudioError::DeviceInvalid)?;
        f(handles)
    }

    fn populate_sessions(&self) -> Result<(), AudioError> {
        let mut opened = Vec::new();
        let result = self.with_handles(|h| {
            let mut native = LazyIterator::new(h.connection.enumerate_sessions(&h.device)?);
            while native.has_next()? {
                let session = native.try_next()?;
                let identity = h.connection.session_identity(&session)?;
                if self.sessions.contains(&identity) {
                    continue;
                }
                self.sessions.get_or_create(identity.clone(), |id| {
                    AudioSession::open(&h.connection, session, id.clone(), &self.boundary)
                })?;
                opened.push(identity);
            }
            Ok(())
        });
        // Written after the handle and cache locks are released
        for identity in &opened {
            self.boundary.log_line(&format!("session {} opened", identity));
        }
        result
    }
}

impl<C: AudioConnection> Teardown for AudioEndpoint<C> {
    /// Sessions first, then this device's own handles.
    fn teardown(&self) {
        self.sessions.clear();
        if self.handles.lock().take().is_some() {
            log::debug!("released device {}", self.identity);
            self.boundary.log_line(&format!("device {} released", self.identity));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use crate::control::system::AudioSystem;
    use crate::mock::MockBackend;
    use crate::models::error::AudioError;

    fn backend() -> MockBackend {
        let mock = MockBackend::new();
        mock.add_device("speakers", "Speakers (Realtek)");
        mock.add_session("speakers", "chrome", 200, false);
        mock.add_session("speakers", "spotify", 100, false);
        mock
    }

    #[test]
    fn volume_round_trip() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        device.set_volume(0.2).unwrap();
        assert_abs_diff_eq!(device.volume().unwrap(), 0.2, epsilon = 1e-3);
        device.set_volume(1.0).unwrap();
        assert_abs_diff_eq!(device.volume().unwrap(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn volume_writes_carry_event_context() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        device.set_volume(0.4).unwrap();
        assert_eq!(mock.last_event_context(), system.config().event_context);
    }

    #[test]
    fn out_of_range_volume_is_left_to_provider() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        // The mock clamps, like the platform does
        device.set_volume(1.5).unwrap();
        assert_abs_diff_eq!(device.volume().unwrap(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn mute_is_an_involution() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        let original = device.is_muted().unwrap();
        assert_eq!(device.mute().unwrap(), !original);
        assert_eq!(device.mute().unwrap(), original);
        assert_eq!(device.is_muted().unwrap(), original);
    }

    #[test]
    fn name_comes_from_properties() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        assert_eq!(device.name().unwrap(), "Speakers (Realtek)");

        mock.remove_name("speakers");
        assert!(matches!(device.name(), Err(AudioError::PropertyUnavailable(_))));
    }

    #[test]
    fn sessions_are_singletons_across_passes() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        let first = device.sessions().unwrap();
        let second = device.sessions().unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(device.cached_session_count(), 2);
        for (a, b) in first.iter().zip(second.iter()) {
            assert!(Arc::ptr_eq(a, b));
        }
        assert_eq!(mock.count_events("open session-volume chrome"), 1);
        assert_eq!(mock.count_events("open session-volume spotify"), 1);
    }

    #[test]
    fn new_sessions_are_added_to_the_cache() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();
        assert_eq!(device.sessions().unwrap().len(), 2);

        mock.add_session("speakers", "discord", 300, false);
        let ids: Vec<String> = device
            .sessions()
            .unwrap()
            .iter()
            .map(|s| s.identity().to_string())
            .collect();
        assert_eq!(ids, vec!["chrome", "spotify", "discord"]);
    }

    #[test]
    fn session_iterator_exhausts() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        let mut it = device.session_iterator().unwrap();
        assert!(it.try_next().is_ok());
        assert!(it.try_next().is_ok());
        assert!(!it.has_next().unwrap());
        assert_eq!(it.try_next().err(), Some(AudioError::OutOfRange));
    }

    #[test]
    fn unplugged_device_reports_invalid() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        mock.unplug("speakers");

        assert_eq!(device.volume(), Err(AudioError::DeviceInvalid));
        assert_eq!(device.mute(), Err(AudioError::DeviceInvalid));
        assert!(device.session_iterator().is_err());
    }

    #[test]
    fn failed_session_open_aborts_discovery() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();

        mock.set_denied(true);
        assert_eq!(device.sessions().err(), Some(AudioError::AccessDenied));
        assert_eq!(device.cached_session_count(), 0);

        mock.set_denied(false);
        assert_eq!(device.sessions().unwrap().len(), 2);
    }

    #[test]
    fn partial_open_releases_the_volume_handle() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();

        mock.set_properties_broken(true);
        assert!(matches!(system.default_device(), Err(AudioError::PropertyUnavailable(_))));
        assert_eq!(system.cached_device_count(), 0);
        assert_eq!(mock.count_events("open device-volume speakers"), 1);
        assert_eq!(mock.count_events("release device-volume speakers"), 1);
        assert_eq!(mock.count_events("open properties speakers"), 0);

        mock.set_properties_broken(false);
        let device = system.default_device().unwrap();
        assert_eq!(device.name().unwrap(), "Speakers (Realtek)");
        assert_eq!(system.cached_device_count(), 1);
    }

    #[test]
    fn info_snapshot() {
        let mock = backend();
        let system = AudioSystem::connect(&mock).unwrap();
        let device = system.default_device().unwrap();
        device.set_mute(true).unwrap();

        let info = device.info(true).unwrap();
        assert_eq!(info.id.as_str(), "speakers");
        assert_eq!(info.name, "Speakers (Realtek)");
        assert!(info.muted);
        assert!(info.is_default);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], "speakers");
        assert_eq!(json["is_default"], true);
    }
}
