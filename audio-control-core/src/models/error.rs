use thiserror::Error;

/// Errors that can occur while controlling devices and sessions.
///
/// Every public operation on `AudioSystem`, `AudioEndpoint` and `AudioSession`
/// returns this type; platform backends convert their native errors into it
/// before anything reaches the core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("device is no longer valid")]
    DeviceInvalid,

    #[error("session is no longer valid")]
    SessionInvalid,

    #[error("access denied")]
    AccessDenied,

    #[error("property unavailable: {0}")]
    PropertyUnavailable(String),

    #[error("iterator advanced past its end")]
    OutOfRange,

    #[error("provider error: {0}")]
    Generic(String),
}

impl AudioError {
    /// Flat status code for callers that want a single integer result.
    ///
    /// Values follow HRESULT conventions so they read naturally next to
    /// native error codes. `0` is reserved for success and never returned.
    pub fn code(&self) -> i32 {
        match self {
            Self::ProviderUnavailable(_) => 0x8004_0154_u32 as i32,
            Self::DeviceInvalid => 0x8889_0004_u32 as i32,
            Self::SessionInvalid => 0x8889_0024_u32 as i32,
            Self::AccessDenied => 0x8007_0005_u32 as i32,
            Self::PropertyUnavailable(_) => 0x8007_0490_u32 as i32,
            Self::OutOfRange => 0x8000_000B_u32 as i32,
            Self::Generic(_) => 0x8000_4005_u32 as i32,
        }
    }

    /// Whether the error means the wrapped native object is gone.
    pub fn is_invalidated(&self) -> bool {
        matches!(self, Self::DeviceInvalid | Self::SessionInvalid)
    }
}
