use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque token identifying one native device or session.
///
/// Backends build it from whatever the platform considers stable for the
/// object's lifetime (an MMDevice endpoint id, a session instance
/// identifier). The core only compares and hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeIdentity(Arc<str>);

impl NativeIdentity {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NativeIdentity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NativeIdentity {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
