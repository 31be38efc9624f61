//! Application state definitions
//!
//! Presentation-only state: list cursors, focus, the status line and the
//! progress render model. Settings themselves live in the wizard's screen
//! records; the cursors here only mirror them.

use crate::inventory::{DiskInfo, NetworkInfo};
use crate::progress::ProgressView;
use crate::types::ConnectionType;

/// Top-level application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Configuration screens, navigation allowed
    #[default]
    Wizard,
    /// Pipeline running; navigation and quitting are refused
    Installing,
    /// Pipeline reached a terminal state; the view is frozen
    Finished,
}

/// Which list has focus on the keyboard screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardFocus {
    #[default]
    Layout,
    Variant,
}

/// Which list has focus on the disk screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiskFocus {
    #[default]
    Disks,
    Scheme,
}

/// Network screen focus. The password field only takes focus while the
/// chosen network asks for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFocus {
    #[default]
    List,
    Password,
}

/// Input fields of the user account form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserField {
    #[default]
    FullName,
    Username,
    Password,
    ConfirmPassword,
    Administrator,
    AutoLogin,
}

impl UserField {
    pub fn all() -> &'static [Self] {
        &[
            Self::FullName,
            Self::Username,
            Self::Password,
            Self::ConfirmPassword,
            Self::Administrator,
            Self::AutoLogin,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Username => "Username",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm Password",
            Self::Administrator => "Make this user an administrator",
            Self::AutoLogin => "Log in automatically",
        }
    }

    /// Record field this input edits
    pub fn key(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Username => "username",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
            Self::Administrator => "administrator",
            Self::AutoLogin => "autologin",
        }
    }

    pub fn is_password(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }

    /// Checkbox rather than text input
    pub fn is_toggle(self) -> bool {
        matches!(self, Self::Administrator | Self::AutoLogin)
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let i = all.iter().position(|f| *f == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }

    pub fn previous(self) -> Self {
        let all = Self::all();
        let i = all.iter().position(|f| *f == self).unwrap_or(0);
        all[(i + all.len() - 1) % all.len()]
    }
}

/// Move a list cursor up, stopping at the top.
pub fn cursor_up(cursor: &mut usize) {
    *cursor = cursor.saturating_sub(1);
}

/// Move a list cursor down, stopping at the last row.
pub fn cursor_down(cursor: &mut usize, len: usize) {
    if *cursor + 1 < len {
        *cursor += 1;
    }
}

/// Main application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub mode: AppMode,
    /// Status message for user feedback
    pub status_message: String,
    /// Whether the status message reports a problem
    pub status_is_error: bool,

    pub language_cursor: usize,
    pub timezone_cursor: usize,

    pub keyboard_focus: KeyboardFocus,
    pub layout_cursor: usize,
    pub variant_cursor: usize,

    pub disk_focus: DiskFocus,
    pub disk_cursor: usize,
    pub scheme_cursor: usize,
    pub disks: Vec<DiskInfo>,

    /// Tab shown on the network screen
    pub network_kind: ConnectionType,
    pub network_cursor: usize,
    pub networks: Vec<NetworkInfo>,
    pub network_focus: NetworkFocus,

    pub user_field: UserField,
    /// Set once the user types into the username field; stops auto-suggestion
    pub username_touched: bool,

    /// Render model of the running or finished installation
    pub progress: Option<ProgressView>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_field_cycle_wraps() {
        assert_eq!(UserField::FullName.previous(), UserField::AutoLogin);
        assert_eq!(UserField::AutoLogin.next(), UserField::FullName);
        assert_eq!(UserField::Username.next(), UserField::Password);
    }

    #[test]
    fn test_user_field_kinds() {
        assert!(UserField::ConfirmPassword.is_password());
        assert!(!UserField::Username.is_password());
        assert!(UserField::Administrator.is_toggle());
        assert_eq!(UserField::AutoLogin.key(), "autologin");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut cursor = 0;
        cursor_up(&mut cursor);
        assert_eq!(cursor, 0);

        cursor_down(&mut cursor, 2);
        cursor_down(&mut cursor, 2);
        assert_eq!(cursor, 1);

        cursor_down(&mut cursor, 0);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_status_error_flag() {
        let mut state = AppState::new();
        state.set_error("Language is required");
        assert!(state.status_is_error);
        state.set_status("Moved to Timezone");
        assert!(!state.status_is_error);
        state.clear_status();
        assert!(state.status_message.is_empty());
    }
}
