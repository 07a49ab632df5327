//! Top-level window lookup used to name sessions after their process.

use windows::core::BOOL;
use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindow, GetWindowTextW, GetWindowThreadProcessId, GW_OWNER,
};

use audio_control_core::models::error::AudioError;
use audio_control_core::models::window::WindowInfo;

const MAX_TITLE: usize = 512;

struct Search {
    process_id: u32,
    windows: Vec<WindowInfo>,
}

/// Every top-level window owned by `process_id`, in `EnumWindows` order.
pub fn for_process(process_id: u32) -> Result<Vec<WindowInfo>, AudioError> {
    let mut search = Search {
        process_id,
        windows: Vec::new(),
    };
    unsafe {
        EnumWindows(Some(collect_window), LPARAM(&mut search as *mut Search as isize))
            .map_err(|e| AudioError::Generic(format!("EnumWindows failed: {}", e)))?;
    }
    Ok(search.windows)
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let search = &mut *(lparam.0 as *mut Search);

    let mut owner_pid = 0u32;
    GetWindowThreadProcessId(hwnd, Some(&mut owner_pid as *mut u32));
    if owner_pid != search.process_id {
        return BOOL(1);
    }

    let has_owner = GetWindow(hwnd, GW_OWNER).map(|h| !h.is_invalid()).unwrap_or(false);
    let mut buf = [0u16; MAX_TITLE];
    let len = GetWindowTextW(hwnd, &mut buf).max(0) as usize;
    let title = String::from_utf16_lossy(&buf[..len]);

    search.windows.push(WindowInfo { has_owner, title });
    BOOL(1)
}
