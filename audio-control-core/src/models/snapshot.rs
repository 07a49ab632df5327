use serde::{Deserialize, Serialize};

use super::identity::NativeIdentity;

/// Point-in-time view of an output device, for listing in a UI or CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: NativeIdentity,
    pub name: String,
    pub volume: f32,
    pub muted: bool,
    pub is_default: bool,
}

/// Point-in-time view of an application session on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: NativeIdentity,
    pub display_name: String,
    pub volume: f32,
    pub muted: bool,
    pub is_system_sounds: bool,
}
