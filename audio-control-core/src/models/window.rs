/// A top-level window belonging to a process, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowInfo {
    /// The window has an owner window (dialogs, tool windows).
    pub has_owner: bool,
    /// Window title; empty when the window has none.
    pub title: String,
}

impl WindowInfo {
    pub fn new(has_owner: bool, title: impl Into<String>) -> Self {
        Self {
            has_owner,
            title: title.into(),
        }
    }

    /// Unowned and titled: the window a user would call the app's main window.
    pub fn is_main_window(&self) -> bool {
        !self.has_owner && !self.title.is_empty()
    }
}
