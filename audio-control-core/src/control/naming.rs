//! Display-name policy for audio sessions.

use crate::models::error::AudioError;
use crate::models::window::WindowInfo;

/// First unowned window with a non-empty title, in the given order.
///
/// The order is whatever the host's window enumeration produced; it is not
/// guaranteed stable between calls.
pub fn find_main_window(windows: &[WindowInfo]) -> Option<&WindowInfo> {
    windows.iter().find(|w| w.is_main_window())
}

/// Resolve a session's display name.
///
/// Sessions flagged as system sounds are named after their owning process's
/// main window, falling back to `unknown_name`. Every other session gets
/// `system_sounds_name`. The branches read inverted relative to their names;
/// that is the established behavior.
pub fn session_display_name<F>(
    is_system_sounds: bool,
    windows: F,
    unknown_name: &str,
    system_sounds_name: &str,
) -> Result<String, AudioError>
where
    F: FnOnce() -> Result<Vec<WindowInfo>, AudioError>,
{
    if !is_system_sounds {
        return Ok(system_sounds_name.to_string());
    }

    let windows = windows()?;
    Ok(find_main_window(&windows)
        .map(|w| w.title.clone())
        .unwrap_or_else(|| unknown_name.to_string()))
}
