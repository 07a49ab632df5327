use std::sync::Arc;

use super::boundary::Boundary;
use super::endpoint::AudioEndpoint;
use crate::collections::identity_cache::{CacheValues, IdentityCache};
use crate::collections::lazy_iterator::LazyIterator;
use crate::models::config::AudioSystemConfig;
use crate::models::error::AudioError;
use crate::models::identity::NativeIdentity;
use crate::models::snapshot::DeviceInfo;
use crate::traits::provider::{AudioBackend, AudioConnection};

/// Iterator over the devices cached by an `AudioSystem`.
pub type DeviceIterator<'a, C> = LazyIterator<CacheValues<'a, NativeIdentity, AudioEndpoint<C>>>;

/// Root of the control surface: one provider connection and the cache of
/// every device seen through it.
///
/// Dropping the system tears down every device (and, through them, every
/// session) before the provider connection is released.
pub struct AudioSystem<C: AudioConnection> {
    devices: IdentityCache<NativeIdentity, AudioEndpoint<C>>,
    connection: Arc<C>,
    boundary: Arc<Boundary>,
}

impl<C: AudioConnection> AudioSystem<C> {
    /// Connect with the default configuration.
    pub fn connect<B>(backend: &B) -> Result<Self, AudioError>
    where
        B: AudioBackend<Connection = C>,
    {
        Self::connect_with(backend, AudioSystemConfig::default())
    }

    pub fn connect_with<B>(backend: &B, config: AudioSystemConfig) -> Result<Self, AudioError>
    where
        B: AudioBackend<Connection = C>,
    {
        config.validate().map_err(AudioError::Generic)?;
        let boundary = Boundary::new(config);

        boundary.log_line("connecting to audio provider");
        let connection = boundary.report("AudioSystem::connect", backend.connect())?;
        log::debug!("audio provider connected");
        boundary.log_line("audio provider connected");

        Ok(Self {
            devices: IdentityCache::new(),
            connection: Arc::new(connection),
            boundary,
        })
    }

    pub fn config(&self) -> &AudioSystemConfig {
        self.boundary.config()
    }

    /// The provider's current default output device for the configured role.
    pub fn default_device(&self) -> Result<Arc<AudioEndpoint<C>>, AudioError> {
        let result = self.fetch_default_device();
        self.boundary.report("AudioSystem::default_device", result)
    }

    /// Whether `endpoint` is the default device right now.
    ///
    /// The default is resolved again on every call, so changes made in the
    /// OS since an earlier `default_device` are reflected.
    pub fn is_default_device(&self, endpoint: &AudioEndpoint<C>) -> Result<bool, AudioError> {
        let result = self
            .fetch_default_identity()
            .map(|default| &default == endpoint.identity());
        self.boundary.report("AudioSystem::is_default_device", result)
    }

    /// Discover active output devices, then iterate every cached device.
    ///
    /// Discovery adds wrappers for identities not seen before. Devices seen on
    /// an earlier call remain in the cache after they disappear; use
    /// `invalidate_device` to drop one.
    pub fn device_iterator(&self) -> Result<DeviceIterator<'_, C>, AudioError> {
        let result = self
            .populate_devices()
            .map(|()| LazyIterator::new(self.devices.profile()));
        self.boundary.report("AudioSystem::device_iterator", result)
    }

    /// Discover and collect every cached device.
    pub fn devices(&self) -> Result<Vec<Arc<AudioEndpoint<C>>>, AudioError> {
        self.device_iterator()?.collect()
    }

    /// Snapshots of every cached device, with the live default flagged.
    ///
    /// Cached devices the provider reports as gone are skipped; any other
    /// failure aborts the listing.
    pub fn device_infos(&self) -> Result<Vec<DeviceInfo>, AudioError> {
        let devices = self.devices()?;
        let default = self.boundary.report("AudioSystem::device_infos", self.fetch_default_identity())?;
        let mut infos = Vec::with_capacity(devices.len());
        for device in &devices {
            match device.info(device.identity() == &default) {
                Ok(info) => infos.push(info),
                Err(e) if e.is_invalidated() => {
                    log::debug!("skipping stale device {}", device.identity());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(infos)
    }

    /// Drop one device from the cache, tearing down it and its sessions.
    pub fn invalidate_device(&self, identity: &NativeIdentity) -> bool {
        let removed = self.devices.invalidate(identity);
        if removed {
            self.boundary.log_line(&format!("device {} invalidated", identity));
        }
        removed
    }

    pub fn cached_device_count(&self) -> usize {
        self.devices.len()
    }

    // --- Internal helpers ---

    fn fetch_default_identity(&self) -> Result<NativeIdentity, AudioError> {
        let device = self.connection.default_render_device(self.config().device_role)?;
        self.connection.device_identity(&device)
    }

    fn fetch_default_device(&self) -> Result<Arc<AudioEndpoint<C>>, AudioError> {
        let device = self.connection.default_render_device(self.config().device_role)?;
        let identity = self.connection.device_identity(&device)?;
        self.wrap_device(identity, device)
    }

    fn wrap_device(&self, identity: NativeIdentity, device: C::Device) -> Result<Arc<AudioEndpoint<C>>, AudioError> {
        // The sink hears about new wrappers only after the cache lock is released
        let known = self.devices.contains(&identity);
        let endpoint = self
            .devices
            .get_or_create(identity, |id| AudioEndpoint::open(&self.connection, device, id.clone(), &self.boundary))?;
        if !known {
            self.boundary.log_line(&format!("device {} opened", endpoint.identity()));
        }
        Ok(endpoint)
    }

    fn populate_devices(&self) -> Result<(), AudioError> {
        let mut native = LazyIterator::new(self.connection.enumerate_render_devices()?);
        while native.has_next()? {
            let device = native.try_next()?;
            let identity = self.connection.device_identity(&device)?;
            self.wrap_device(identity, device)?;
        }
        Ok(())
    }
}

impl<C: AudioConnection> Drop for AudioSystem<C> {
    fn drop(&mut self) {
        let released = self.devices.clear();
        log::debug!("audio system closed, {} devices released", released);
        self.boundary.log_line("audio provider disconnected");
    }
}
