//! Application event loop
//!
//! [`App`] owns the wizard, the presentation state and, once installation
//! starts, the pipeline handle. Key presses become typed wizard commands;
//! every loop iteration drains queued progress events into the
//! [`ProgressView`] before drawing.

pub mod state;

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::Backend};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::config::InstallerConfig;
use crate::error::Result;
use crate::inventory::{DeviceInventory, KEYBOARD_LAYOUTS, LANGUAGES, TIMEZONES, keyboard_variants};
use crate::pipeline::{InstallPipeline, PipelineHandle, PipelineOutcome};
use crate::plan::InstallPlan;
use crate::progress::ProgressView;
use crate::types::{ConnectionType, PartitionScheme, ScreenId};
use crate::ui;
use crate::validation::suggest_username;
use crate::wizard::{Transition, WizardCommand, WizardController, WizardError};

pub use state::{AppMode, AppState, DiskFocus, KeyboardFocus, NetworkFocus, UserField};
use state::{cursor_down, cursor_up};

/// Move `cursor` for Up/Down. Returns true when it moved.
fn step_cursor(cursor: &mut usize, code: KeyCode, len: usize) -> bool {
    let before = *cursor;
    match code {
        KeyCode::Up => cursor_up(cursor),
        KeyCode::Down => cursor_down(cursor, len),
        _ => {}
    }
    *cursor != before
}

/// Main application
pub struct App {
    wizard: WizardController,
    state: AppState,
    config: InstallerConfig,
    inventory: Box<dyn DeviceInventory>,
    /// Where to save the plan once the wizard hands it off
    save_plan: Option<PathBuf>,
    fail_at: Option<usize>,
    pipeline: Option<PipelineHandle>,
}

impl App {
    pub fn new(
        config: InstallerConfig,
        inventory: Box<dyn DeviceInventory>,
        save_plan: Option<PathBuf>,
        fail_at: Option<usize>,
    ) -> Self {
        Self {
            wizard: WizardController::new(),
            state: AppState::new(),
            config,
            inventory,
            save_plan,
            fail_at,
            pipeline: None,
        }
    }

    pub fn wizard(&self) -> &WizardController {
        &self.wizard
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Final result of the installation, once it has one.
    pub fn outcome(&self) -> Option<PipelineOutcome> {
        self.state
            .progress
            .as_ref()
            .and_then(|view| view.outcome().cloned())
            .or_else(|| self.pipeline.as_ref().and_then(PipelineHandle::outcome))
    }

    /// Run the main application loop until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Option<PipelineOutcome>> {
        info!("Starting main application loop");

        loop {
            self.tick()?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key)? {
                        break;
                    }
                }
            }

            terminal.draw(|f| ui::render(f, self))?;
        }

        info!("Leaving main application loop");
        Ok(self.outcome())
    }

    /// Deliver queued progress events and notice when the pipeline finishes.
    pub fn tick(&mut self) -> Result<()> {
        let finished = match (self.pipeline.as_mut(), self.state.progress.as_mut()) {
            (Some(handle), Some(view)) => {
                handle.drain(view);
                handle.is_finished()
            }
            _ => return Ok(()),
        };
        if !finished || self.state.mode != AppMode::Installing {
            return Ok(());
        }

        if let Some(handle) = self.pipeline.as_mut() {
            handle.join()?;
        }
        self.state.mode = AppMode::Finished;

        match self.outcome() {
            Some(PipelineOutcome::Completed) => {
                info!("Installation completed");
                self.state
                    .set_status("Installation complete! Press Enter to exit.");
            }
            Some(PipelineOutcome::Failed { reason }) => {
                warn!("Installation failed: {}", reason);
                self.state
                    .set_error(format!("Installation failed: {}. Press Enter to exit.", reason));
            }
            None => self
                .state
                .set_error("Installer stopped without a result. Press Enter to exit."),
        }
        Ok(())
    }

    /// Handle one key press. Returns true when the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            return Ok(self.request_quit());
        }

        match self.state.mode {
            AppMode::Wizard => {
                self.handle_wizard_key(key)?;
                Ok(false)
            }
            AppMode::Installing => {
                if key.code == KeyCode::Esc {
                    self.state
                        .set_error("Installation in progress; going back is disabled");
                }
                Ok(false)
            }
            AppMode::Finished => Ok(matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')
            )),
        }
    }

    fn request_quit(&mut self) -> bool {
        if self.state.mode == AppMode::Installing {
            self.state
                .set_error("Installation in progress; quitting is disabled until it finishes");
            return false;
        }
        info!("Quit requested");
        true
    }

    fn handle_wizard_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => self.advance()?,
            KeyCode::Esc => self.retreat(),
            _ => match self.wizard.current_screen().id {
                ScreenId::Language => self.language_key(key.code),
                ScreenId::Timezone => self.timezone_key(key.code),
                ScreenId::Keyboard => self.keyboard_key(key.code),
                ScreenId::Disk => self.disk_key(key.code),
                ScreenId::Network => self.network_key(key),
                ScreenId::User => self.user_key(key),
                ScreenId::Welcome | ScreenId::Install => {}
            },
        }
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn advance(&mut self) -> Result<()> {
        match self.wizard.dispatch(WizardCommand::Advance) {
            Ok(Transition::Moved { to, .. }) => {
                self.state.clear_status();
                self.enter_screen(to);
            }
            Ok(Transition::InstallRequested(plan)) => self.start_pipeline(*plan)?,
            Ok(_) => {}
            Err(err) => self.report(err),
        }
        Ok(())
    }

    fn retreat(&mut self) {
        match self.wizard.dispatch(WizardCommand::Retreat) {
            Ok(Transition::Moved { to, .. }) => {
                self.state.clear_status();
                self.enter_screen(to);
            }
            Ok(_) => {}
            Err(err) => self.report(err),
        }
    }

    /// Show a wizard error on the status line.
    fn report(&mut self, err: WizardError) {
        let message = match &err {
            WizardError::Validation(v) => match v.reasons.split_first() {
                Some((first, [])) => first.clone(),
                Some((first, rest)) => format!("{} (+{} more)", first, rest.len()),
                None => v.to_string(),
            },
            other => other.to_string(),
        };
        debug!("Wizard command rejected: {}", err);
        self.state.set_error(message);
    }

    /// Sync cursors with the record and fill in defaults for a screen just entered.
    fn enter_screen(&mut self, screen: ScreenId) {
        match screen {
            ScreenId::Language => {
                let current = self.value("language");
                self.state.language_cursor = LANGUAGES
                    .iter()
                    .position(|l| l.code == current)
                    .unwrap_or(0);
                if current.is_empty() {
                    self.choose_language();
                }
            }
            ScreenId::Timezone => {
                let current = self.value("timezone");
                self.state.timezone_cursor = TIMEZONES
                    .iter()
                    .position(|t| t.zone == current)
                    .unwrap_or(0);
                if current.is_empty() {
                    self.choose_timezone();
                }
            }
            ScreenId::Keyboard => {
                let layout = self.value("layout");
                let variant = self.value("variant");
                self.state.keyboard_focus = KeyboardFocus::Layout;
                self.state.layout_cursor = KEYBOARD_LAYOUTS
                    .iter()
                    .position(|k| k.code == layout)
                    .unwrap_or(0);
                self.state.variant_cursor = keyboard_variants(&layout)
                    .iter()
                    .position(|k| k.code == variant)
                    .unwrap_or(0);
                if layout.is_empty() {
                    self.choose_layout();
                }
            }
            ScreenId::Disk => {
                self.state.disks = self.inventory.disks();
                let device = self.value("device");
                self.state.disk_focus = DiskFocus::Disks;
                self.state.disk_cursor = self
                    .state
                    .disks
                    .iter()
                    .position(|d| d.device.to_string_lossy() == device)
                    .unwrap_or(0);

                let scheme = self.value("partition_scheme");
                self.state.scheme_cursor = PartitionScheme::iter()
                    .position(|s| s.to_string() == scheme)
                    .unwrap_or(0);
                if scheme.is_empty() {
                    self.set("partition_scheme", PartitionScheme::default().to_string());
                }
                debug!(count = self.state.disks.len(), "Disk list loaded");
            }
            ScreenId::Network => {
                let kind: ConnectionType =
                    self.value("connection_type").parse().unwrap_or_default();
                if self.value("connection_type").is_empty() {
                    self.set("connection_type", kind.to_string());
                }
                self.show_networks(kind);
            }
            ScreenId::User => {
                self.state.user_field = UserField::FullName;
                self.state.username_touched = !self.value("username").is_empty();
                if self.value("administrator").is_empty() {
                    self.set("administrator", "true");
                }
                if self.value("autologin").is_empty() {
                    self.set("autologin", "false");
                }
            }
            ScreenId::Welcome | ScreenId::Install => {}
        }
    }

    fn start_pipeline(&mut self, plan: InstallPlan) -> Result<()> {
        let mut save_error = None;
        if let Some(path) = &self.save_plan {
            match plan.save_to_file(path) {
                Ok(()) => info!(path = %path.display(), "Saved install plan"),
                Err(e) => {
                    warn!("Could not save install plan: {:#}", e);
                    save_error = Some(format!("Could not save install plan: {:#}", e));
                }
            }
        }

        let pipeline =
            InstallPipeline::new(self.config.stages.clone(), plan, self.config.pipeline_options())?;
        let backend = pipeline.simulated_backend(self.fail_at)?;

        self.state.progress = Some(ProgressView::new(
            pipeline.stages().len(),
            pipeline.total_duration_secs(),
        ));
        self.pipeline = Some(pipeline.start(backend)?);
        self.state.mode = AppMode::Installing;

        match save_error {
            Some(message) => self.state.set_error(message),
            None => self.state.set_status("Installation started"),
        }
        Ok(())
    }

    // =========================================================================
    // Record access
    // =========================================================================

    /// Current screen's value for `field`, trimmed; empty when unset.
    fn value(&self, field: &str) -> String {
        self.wizard
            .current_record()
            .map(|r| r.trimmed(field).to_string())
            .unwrap_or_default()
    }

    /// The untrimmed text of `field` after applying a typed character or
    /// Backspace. `None` for any other key.
    ///
    /// Sized up front so a password never reallocates and leaves a copy behind.
    fn edited_text(&self, field: &str, key: KeyEvent) -> Option<String> {
        let current = self
            .wizard
            .current_record()
            .and_then(|r| r.get(field))
            .unwrap_or_default();
        let mut text = String::with_capacity(current.len() + 4);
        text.push_str(current);
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                text.push(c)
            }
            KeyCode::Backspace => {
                text.pop();
            }
            _ => return None,
        }
        Some(text)
    }

    fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        if let Err(err) = self.wizard.dispatch(WizardCommand::FieldChanged {
            field: field.to_string(),
            value,
        }) {
            self.report(err);
        }
    }

    // =========================================================================
    // Per-screen input
    // =========================================================================

    fn choose_language(&mut self) {
        if let Some(language) = LANGUAGES.get(self.state.language_cursor) {
            self.set("language", language.code);
        }
    }

    fn choose_timezone(&mut self) {
        if let Some(timezone) = TIMEZONES.get(self.state.timezone_cursor) {
            self.set("timezone", timezone.zone);
        }
    }

    /// Store the layout under the cursor and reset its variant.
    fn choose_layout(&mut self) {
        if let Some(layout) = KEYBOARD_LAYOUTS.get(self.state.layout_cursor) {
            self.set("layout", layout.code);
            self.set("variant", "");
            self.state.variant_cursor = 0;
        }
    }

    fn language_key(&mut self, code: KeyCode) {
        if step_cursor(&mut self.state.language_cursor, code, LANGUAGES.len()) {
            self.choose_language();
        }
    }

    fn timezone_key(&mut self, code: KeyCode) {
        if step_cursor(&mut self.state.timezone_cursor, code, TIMEZONES.len()) {
            self.choose_timezone();
        }
    }

    fn keyboard_key(&mut self, code: KeyCode) {
        match (code, self.state.keyboard_focus) {
            (KeyCode::Tab | KeyCode::BackTab, KeyboardFocus::Layout) => {
                self.state.keyboard_focus = KeyboardFocus::Variant;
            }
            (KeyCode::Tab | KeyCode::BackTab, KeyboardFocus::Variant) => {
                self.state.keyboard_focus = KeyboardFocus::Layout;
            }
            (_, KeyboardFocus::Layout) => {
                if step_cursor(&mut self.state.layout_cursor, code, KEYBOARD_LAYOUTS.len()) {
                    self.choose_layout();
                }
            }
            (_, KeyboardFocus::Variant) => {
                let variants = keyboard_variants(&self.value("layout"));
                if step_cursor(&mut self.state.variant_cursor, code, variants.len()) {
                    if let Some(variant) = variants.get(self.state.variant_cursor) {
                        self.set("variant", variant.code);
                    }
                }
            }
        }
    }

    fn disk_key(&mut self, code: KeyCode) {
        match (code, self.state.disk_focus) {
            (KeyCode::Tab | KeyCode::BackTab, DiskFocus::Disks) => {
                self.state.disk_focus = DiskFocus::Scheme;
            }
            (KeyCode::Tab | KeyCode::BackTab, DiskFocus::Scheme) => {
                self.state.disk_focus = DiskFocus::Disks;
            }
            (KeyCode::Char(' '), DiskFocus::Disks) => {
                let device = self
                    .state
                    .disks
                    .get(self.state.disk_cursor)
                    .map(|d| d.device.to_string_lossy().into_owned());
                if let Some(device) = device {
                    info!(%device, "Disk selected");
                    self.state
                        .set_status(format!("{} will be erased during installation", device));
                    self.set("device", device);
                }
            }
            (_, DiskFocus::Disks) => {
                step_cursor(&mut self.state.disk_cursor, code, self.state.disks.len());
            }
            (_, DiskFocus::Scheme) => {
                let count = PartitionScheme::iter().count();
                if step_cursor(&mut self.state.scheme_cursor, code, count) {
                    if let Some(scheme) = PartitionScheme::iter().nth(self.state.scheme_cursor) {
                        self.set("partition_scheme", scheme.to_string());
                    }
                }
            }
        }
    }

    fn show_networks(&mut self, kind: ConnectionType) {
        self.state.network_kind = kind;
        self.state.network_focus = NetworkFocus::List;
        self.state.networks = self.inventory.networks(kind);
        let connection = self.value("connection");
        let chosen_kind = self.value("connection_type");
        self.state.network_cursor = self
            .state
            .networks
            .iter()
            .position(|n| n.name == connection && n.kind.to_string() == chosen_kind)
            .unwrap_or(0);
    }

    /// The chosen network is waiting on a passphrase field.
    fn wants_wifi_password(&self) -> bool {
        !self.value("connection").is_empty() && self.value("secured") == "true"
    }

    fn network_key(&mut self, key: KeyEvent) {
        if self.state.network_focus == NetworkFocus::Password {
            match key.code {
                KeyCode::Tab | KeyCode::BackTab => self.state.network_focus = NetworkFocus::List,
                _ => {
                    if let Some(text) = self.edited_text("wifi_password", key) {
                        self.set("wifi_password", text);
                    }
                }
            }
            return;
        }

        match key.code {
            KeyCode::Left | KeyCode::Right => {
                self.show_networks(self.state.network_kind.toggled());
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if self.wants_wifi_password() {
                    self.state.network_focus = NetworkFocus::Password;
                } else {
                    self.show_networks(self.state.network_kind.toggled());
                }
            }
            KeyCode::Char(' ') => self.toggle_network(),
            code => {
                step_cursor(&mut self.state.network_cursor, code, self.state.networks.len());
            }
        }
    }

    /// Select the network under the cursor, or deselect it when already chosen.
    fn toggle_network(&mut self) {
        let kind = self.state.network_kind;
        let Some(network) = self.state.networks.get(self.state.network_cursor).cloned() else {
            return;
        };

        let already_chosen = self.value("connection") == network.name
            && self.value("connection_type") == kind.to_string();
        // A passphrase never carries over to another network
        self.set("wifi_password", "");

        if already_chosen {
            self.set("connection", "");
            self.set("secured", "");
            self.state
                .set_status("No network selected; it can be configured later");
            return;
        }

        let needs_password = network.needs_password();
        self.set("connection_type", kind.to_string());
        self.set("connection", network.name.as_str());
        self.set("secured", needs_password.to_string());
        if needs_password {
            self.state.network_focus = NetworkFocus::Password;
            self.state
                .set_status(format!("Enter the Wi-Fi password for {}", network.name));
        } else {
            self.state.set_status(format!("Selected network: {}", network.name));
        }
    }

    fn user_key(&mut self, key: KeyEvent) {
        let field = self.state.user_field;
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.state.user_field = field.next(),
            KeyCode::BackTab | KeyCode::Up => self.state.user_field = field.previous(),
            KeyCode::Char(' ') if field.is_toggle() => {
                let flipped = if self.value(field.key()) == "true" { "false" } else { "true" };
                self.set(field.key(), flipped);
            }
            _ if !field.is_toggle() => {
                if let Some(text) = self.edited_text(field.key(), key) {
                    self.edit_user_text(field, text);
                }
            }
            _ => {}
        }
    }

    fn edit_user_text(&mut self, field: UserField, text: String) {
        match field {
            UserField::Username => self.state.username_touched = !text.is_empty(),
            UserField::FullName if !self.state.username_touched => {
                self.set("username", suggest_username(&text));
            }
            _ => {}
        }
        self.set(field.key(), text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MockInventory;

    fn test_app(fail_at: Option<usize>) -> App {
        let config = InstallerConfig {
            tick_interval_ms: 0,
            ..InstallerConfig::default()
        };
        App::new(config, Box::new(MockInventory), None, fail_at)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .expect("key handled")
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn raw(app: &App, field: &str) -> String {
        app.wizard()
            .current_record()
            .and_then(|r| r.get(field))
            .unwrap_or_default()
            .to_string()
    }

    fn screen(app: &App) -> ScreenId {
        app.wizard().current_screen().id
    }

    /// Walk from Welcome to the Install screen with valid answers.
    fn fill_wizard(app: &mut App) {
        press(app, KeyCode::Enter); // Welcome
        press(app, KeyCode::Enter); // Language (default en_US)
        press(app, KeyCode::Enter); // Timezone (default UTC)
        press(app, KeyCode::Enter); // Keyboard (default us)
        press(app, KeyCode::Char(' '));
        press(app, KeyCode::Enter); // Disk
        press(app, KeyCode::Enter); // Network (skipped)
        type_text(app, "John Doe");
        press(app, KeyCode::Tab);
        press(app, KeyCode::Tab);
        type_text(app, "Passw0rd!");
        press(app, KeyCode::Tab);
        type_text(app, "Passw0rd!");
        press(app, KeyCode::Enter); // User
        assert_eq!(screen(app), ScreenId::Install);
    }

    fn run_to_end(app: &mut App) {
        for _ in 0..10_000 {
            app.tick().expect("tick");
            if app.state().mode == AppMode::Finished {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("installation did not finish");
    }

    #[test]
    fn test_entering_screens_applies_defaults() {
        let mut app = test_app(None);
        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::Language);
        assert_eq!(app.value("language"), "en_US");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.value("timezone"), "UTC");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.value("layout"), "us");
        assert_eq!(app.value("variant"), "");
    }

    #[test]
    fn test_language_cursor_updates_record() {
        let mut app = test_app(None);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.value("language"), "es_ES");
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.value("language"), "en_US");
    }

    #[test]
    fn test_changing_layout_resets_variant() {
        let mut app = test_app(None);
        for _ in 0..3 {
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.value("variant"), "intl");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.value("layout"), "gb");
        assert_eq!(app.value("variant"), "");
        assert_eq!(app.state().variant_cursor, 0);
    }

    #[test]
    fn test_disk_requires_explicit_selection() {
        let mut app = test_app(None);
        for _ in 0..4 {
            press(&mut app, KeyCode::Enter);
        }
        assert_eq!(screen(&app), ScreenId::Disk);
        assert_eq!(app.value("partition_scheme"), "auto");

        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::Disk);
        assert!(app.state().status_is_error);
        assert_eq!(app.state().status_message, "Disk is required");

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.value("device"), "/dev/sdb");
        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::Network);
    }

    fn walk_to_network(app: &mut App) {
        for _ in 0..4 {
            press(app, KeyCode::Enter);
        }
        press(app, KeyCode::Char(' '));
        press(app, KeyCode::Enter);
        assert_eq!(screen(app), ScreenId::Network);
    }

    #[test]
    fn test_network_select_and_deselect() {
        let mut app = test_app(None);
        walk_to_network(&mut app);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state().network_kind, ConnectionType::Wifi);
        for _ in 0..3 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.value("connection_type"), "wifi");
        assert_eq!(app.value("connection"), "Public_WiFi");
        assert_eq!(app.value("secured"), "false");
        assert_eq!(app.state().network_focus, NetworkFocus::List);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.value("connection").is_empty());

        press(&mut app, KeyCode::Left);
        assert_eq!(app.state().network_kind, ConnectionType::Ethernet);
    }

    #[test]
    fn test_secured_network_asks_for_password() {
        let mut app = test_app(None);
        walk_to_network(&mut app);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.value("connection"), "Home_WiFi_5G");
        assert_eq!(app.value("secured"), "true");
        assert_eq!(app.state().network_focus, NetworkFocus::Password);

        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::Network);
        assert_eq!(app.state().status_message, "Wi-Fi password is required");

        type_text(&mut app, "open sesame");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(raw(&app, "wifi_password"), "open sesam");

        // Tab leaves the field; Space then deselects and drops the passphrase
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state().network_focus, NetworkFocus::List);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.value("connection").is_empty());
        assert_eq!(raw(&app, "wifi_password"), "");

        press(&mut app, KeyCode::Char(' '));
        type_text(&mut app, "open sesame");
        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::User);
    }

    #[test]
    fn test_wifi_password_reaches_plan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plan.json");
        let config = InstallerConfig {
            tick_interval_ms: 0,
            ..InstallerConfig::default()
        };
        let mut app = App::new(config, Box::new(MockInventory), Some(path.clone()), None);
        walk_to_network(&mut app);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        type_text(&mut app, "p4ss phrase");
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "Jo Doe");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Passw0rd!");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Passw0rd!");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        run_to_end(&mut app);

        let plan = InstallPlan::load_from_file(&path).expect("saved plan");
        assert_eq!(plan.network.connection.as_deref(), Some("Home_WiFi_2.4G"));
        assert!(plan.network.secured);
        assert_eq!(plan.network.wifi_password.as_deref(), Some("p4ss phrase"));
    }

    #[test]
    fn test_username_suggested_until_edited() {
        let mut app = test_app(None);
        for _ in 0..4 {
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::User);

        type_text(&mut app, "Ada Lovelace");
        assert_eq!(app.value("username"), "ada.lovelace");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.value("username"), "ada.lovelac");

        press(&mut app, KeyCode::BackTab);
        type_text(&mut app, "X");
        assert_eq!(app.value("full_name"), "Ada LovelaceX");
        assert_eq!(app.value("username"), "ada.lovelac");
    }

    #[test]
    fn test_user_toggles_and_status_summary() {
        let mut app = test_app(None);
        for _ in 0..4 {
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.value("administrator"), "true");
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.state().user_field, UserField::Administrator);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.value("administrator"), "false");

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.state().status_message,
            "Full name is required (+3 more)"
        );
    }

    #[test]
    fn test_retreat_keeps_answers_and_cursor() {
        let mut app = test_app(None);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(screen(&app), ScreenId::Timezone);

        press(&mut app, KeyCode::Esc);
        assert_eq!(screen(&app), ScreenId::Language);
        assert_eq!(app.value("language"), "fr_FR");
        assert_eq!(app.state().language_cursor, 2);
    }

    #[test]
    fn test_full_install_completes() {
        let mut app = test_app(None);
        fill_wizard(&mut app);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::Installing);
        assert!(app.wizard().is_handed_off());

        run_to_end(&mut app);
        assert_eq!(app.outcome(), Some(PipelineOutcome::Completed));
        let view = app.state().progress.as_ref().expect("progress view");
        assert_eq!(view.percent(), 100);
        assert_eq!(view.stages_completed(), 10);

        assert!(press(&mut app, KeyCode::Enter));
    }

    #[test]
    fn test_quit_and_back_refused_while_installing() {
        let mut app = test_app(None);
        fill_wizard(&mut app);
        press(&mut app, KeyCode::Enter);

        let quit = app
            .handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .expect("key handled");
        assert!(!quit);
        assert!(app.state().status_is_error);

        press(&mut app, KeyCode::Esc);
        assert_eq!(screen(&app), ScreenId::Install);

        run_to_end(&mut app);
    }

    #[test]
    fn test_injected_fault_fails_install() {
        let mut app = test_app(Some(2));
        fill_wizard(&mut app);
        press(&mut app, KeyCode::Enter);
        run_to_end(&mut app);

        match app.outcome() {
            Some(PipelineOutcome::Failed { reason }) => {
                assert!(reason.starts_with("Formatting partitions"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(app.state().status_is_error);
    }

    #[test]
    fn test_fault_past_last_stage_refuses_to_start() {
        let mut app = test_app(Some(10));
        fill_wizard(&mut app);

        let err = app
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: fault stage 10 is out of range for 10 stages"
        );
        assert_eq!(app.state().mode, AppMode::Wizard);
        assert!(app.outcome().is_none());
    }

    #[test]
    fn test_save_plan_written_on_install() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plan.json");
        let config = InstallerConfig {
            tick_interval_ms: 0,
            ..InstallerConfig::default()
        };
        let mut app = App::new(config, Box::new(MockInventory), Some(path.clone()), None);
        fill_wizard(&mut app);
        press(&mut app, KeyCode::Enter);
        run_to_end(&mut app);

        let plan = InstallPlan::load_from_file(&path).expect("saved plan");
        assert_eq!(plan.user.username, "john.doe");
        assert_eq!(plan.disk.device, "/dev/sda");
        assert!(plan.network.is_skipped());
    }

    #[test]
    fn test_ctrl_q_quits_from_wizard() {
        let mut app = test_app(None);
        let quit = app
            .handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .expect("key handled");
        assert!(quit);
    }
}
