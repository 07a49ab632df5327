//! COM lifetime and error translation helpers.

use windows::core::{GUID, HRESULT, PWSTR};
use windows::Win32::System::Com::*;

use audio_control_core::models::error::AudioError;

const E_ACCESSDENIED: HRESULT = HRESULT(0x8007_0005_u32 as i32);
const E_NOTFOUND: HRESULT = HRESULT(0x8007_0490_u32 as i32);
const AUDCLNT_E_DEVICE_INVALIDATED: HRESULT = HRESULT(0x8889_0004_u32 as i32);
const CO_E_NOTINITIALIZED: HRESULT = HRESULT(0x8004_01F0_u32 as i32);
const REGDB_E_CLASSNOTREG: HRESULT = HRESULT(0x8004_0154_u32 as i32);
const RPC_E_CHANGED_MODE: HRESULT = HRESULT(0x8001_0106_u32 as i32);

/// Keeps COM initialized on the current thread for as long as it lives.
pub(crate) struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    pub(crate) fn init() -> Result<Self, AudioError> {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            // Someone else owns this apartment; use it without balancing.
            log::debug!("COM already initialized with a different apartment model");
            return Ok(Self { initialized: false });
        }
        hr.ok()
            .map_err(|e| AudioError::ProviderUnavailable(format!("CoInitializeEx failed: {}", e)))?;
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Translate a native error on a device (or provider-wide) call.
pub(crate) fn device_error(context: &str, e: windows::core::Error) -> AudioError {
    let code = e.code();
    if code == E_ACCESSDENIED {
        AudioError::AccessDenied
    } else if code == AUDCLNT_E_DEVICE_INVALIDATED || code == E_NOTFOUND {
        AudioError::DeviceInvalid
    } else if code == CO_E_NOTINITIALIZED || code == REGDB_E_CLASSNOTREG {
        AudioError::ProviderUnavailable(format!("{} failed: {}", context, e))
    } else {
        AudioError::Generic(format!("{} failed: {}", context, e))
    }
}

/// Same as `device_error`, but an invalidated object is a session.
pub(crate) fn session_error(context: &str, e: windows::core::Error) -> AudioError {
    match device_error(context, e) {
        AudioError::DeviceInvalid => AudioError::SessionInvalid,
        other => other,
    }
}

/// Copy a COM-allocated wide string and free it.
pub(crate) unsafe fn take_pwstr(value: PWSTR) -> Result<String, AudioError> {
    if value.is_null() {
        return Err(AudioError::Generic("provider returned a null string".into()));
    }
    let text = value.to_string();
    CoTaskMemFree(Some(value.0 as *const _));
    text.map_err(|e| AudioError::Generic(format!("invalid UTF-16 from provider: {}", e)))
}

/// Event-context GUID for volume and mute writes.
pub(crate) fn event_guid(context: Option<&uuid::Uuid>) -> Option<GUID> {
    context.map(|id| GUID::from_u128(id.as_u128()))
}

pub(crate) fn guid_ptr(guid: &Option<GUID>) -> *const GUID {
    guid.as_ref().map_or(std::ptr::null(), |g| g as *const GUID)
}
