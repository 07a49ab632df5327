use std::sync::Arc;

use parking_lot::Mutex;

use super::boundary::Boundary;
use super::naming;
use crate::collections::identity_cache::Teardown;
use crate::models::error::AudioError;
use crate::models::identity::NativeIdentity;
use crate::models::snapshot::SessionInfo;
use crate::traits::provider::{AudioConnection, VolumeControl};

/// Native resources owned by one session wrapper. Fields drop in order.
struct SessionHandles<C: AudioConnection> {
    volume: C::SessionVolume,
    session: C::Session,
    connection: Arc<C>,
}

/// One application's audio session on a device.
///
/// Created and owned by its `AudioEndpoint`'s session cache. Once the owner
/// tears it down, every operation fails with `SessionInvalid`.
pub struct AudioSession<C: AudioConnection> {
    identity: NativeIdentity,
    handles: Mutex<Option<SessionHandles<C>>>,
    boundary: Arc<Boundary>,
}

impl<C: AudioConnection> AudioSession<C> {
    pub(crate) fn open(
        connection: &Arc<C>,
        session: C::Session,
        identity: NativeIdentity,
        boundary: &Arc<Boundary>,
    ) -> Result<Self, AudioError> {
        let volume = connection.open_session_volume(&session)?;
        log::debug!("opened session {}", identity);

        Ok(Self {
            identity,
            handles: Mutex::new(Some(SessionHandles {
                volume,
                session,
                connection: Arc::clone(connection),
            })),
            boundary: Arc::clone(boundary),
        })
    }

    pub fn identity(&self) -> &NativeIdentity {
        &self.identity
    }

    /// Whether the owner has not yet torn this session down.
    pub fn is_valid(&self) -> bool {
        self.handles.lock().is_some()
    }

    pub fn set_volume(&self, level: f32) -> Result<(), AudioError> {
        let context = self.boundary.config().event_context;
        let result = self.with_handles(|h| h.volume.set_volume(level, context.as_ref()));
        self.boundary.report("AudioSession::set_volume", result)
    }

    pub fn volume(&self) -> Result<f32, AudioError> {
        let result = self.with_handles(|h| h.volume.volume());
        self.boundary.report("AudioSession::volume", result)
    }

    /// Toggle mute and return the new state.
    pub fn mute(&self) -> Result<bool, AudioError> {
        let result = self.with_handles(|h| {
            let muted = !h.volume.is_muted()?;
            h.volume.set_mute(muted, self.boundary.config().event_context.as_ref())?;
            Ok(muted)
        });
        self.boundary.report("AudioSession::mute", result)
    }

    pub fn set_mute(&self, muted: bool) -> Result<(), AudioError> {
        let context = self.boundary.config().event_context;
        let result = self.with_handles(|h| h.volume.set_mute(muted, context.as_ref()));
        self.boundary.report("AudioSession::set_mute", result)
    }

    pub fn is_muted(&self) -> Result<bool, AudioError> {
        let result = self.with_handles(|h| h.volume.is_muted());
        self.boundary.report("AudioSession::is_muted", result)
    }

    pub fn display_name(&self) -> Result<String, AudioError> {
        let result = self.with_handles(|h| self.fetch_display_name(h));
        self.boundary.report("AudioSession::display_name", result)
    }

    pub fn info(&self) -> Result<SessionInfo, AudioError> {
        let result = self.with_handles(|h| {
            Ok(SessionInfo {
                id: self.identity.clone(),
                display_name: self.fetch_display_name(h)?,
                volume: h.volume.volume()?,
                muted: h.volume.is_muted()?,
                is_system_sounds: h.connection.is_system_sounds_session(&h.session)?,
            })
        });
        self.boundary.report("AudioSession::info", result)
    }

    // --- Internal helpers ---

    fn with_handles<T>(&self, f: impl FnOnce(&SessionHandles<C>) -> Result<T, AudioError>) -> Result<T, AudioError> {
        let guard = self.handles.lock();
        let handles = guard.as_ref().ok_or(AudioError::SessionInvalid)?;
        f(handles)
    }

    fn fetch_display_name(&self, h: &SessionHandles<C>) -> Result<String, AudioError> {
        let config = self.boundary.config();
        let flagged = h.connection.is_system_sounds_session(&h.session)?;
        naming::session_display_name(
            flagged,
            || {
                let process_id = h.connection.session_process_id(&h.session)?;
                h.connection.top_level_windows(process_id)
            },
            &config.unknown_name,
            &config.system_sounds_name,
        )
    }
}

impl<C: AudioConnection> Teardown for AudioSession<C> {
    fn teardown(&self) {
        if self.handles.lock().take().is_some() {
            log::debug!("released session {}", self.identity);
            self.boundary.log_line(&format!("session {} released", self.identity));
        }
    }
}
