//! Wizard navigation state machine
//!
//! [`WizardController`] owns the ordered screens, the current position and
//! one [`ScreenRecord`] per visited screen. Forward movement is gated on the
//! current screen's validation; backward movement never is.
//!
//! # Record lifecycle
//!
//! - Created empty the first time its screen is entered.
//! - Editable while its screen is current.
//! - Frozen whenever navigation leaves the screen, in either direction.
//! - Thawed again when navigation re-enters the screen.
//!
//! Records of screens after the current one therefore stay frozen until the
//! user walks forward through them again, and are re-validated on the way.
//!
//! Reaching the last screen (the install trigger) and confirming hands the
//! frozen records to the install pipeline as an [`InstallPlan`]. After that
//! the wizard rejects every command.

use thiserror::Error;
use tracing::{debug, info};

use crate::error::InstallerError;
use crate::plan::InstallPlan;
use crate::record::ScreenRecord;
use crate::types::ScreenId;
use crate::validation::{ValidationError, ValidationResult, validate_screen};

/// Static description of one wizard screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenDescriptor {
    pub id: ScreenId,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub required_fields: &'static [&'static str],
}

impl From<ScreenId> for ScreenDescriptor {
    fn from(id: ScreenId) -> Self {
        Self {
            id,
            title: id.title(),
            subtitle: id.subtitle(),
            required_fields: id.required_fields(),
        }
    }
}

/// Position in the screen sequence. Only the controller moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    current_index: usize,
    screen_count: usize,
}

impl NavigationState {
    fn new(screen_count: usize) -> Self {
        Self {
            current_index: 0,
            screen_count,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn screen_count(&self) -> usize {
        self.screen_count
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.screen_count
    }

    /// 1-based step number for display
    pub fn step_number(&self) -> usize {
        self.current_index + 1
    }
}

/// Actions the presentation layer can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    Advance,
    Retreat,
    FieldChanged { field: String, value: String },
    StartInstall,
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved { from: ScreenId, to: ScreenId },
    /// Command accepted, nothing changed (retreat on the first screen)
    Stayed,
    FieldUpdated { field: String },
    /// The plan is frozen; start the pipeline with it
    InstallRequested(Box<InstallPlan>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{screen} settings are locked")]
    FrozenRecord { screen: ScreenId },

    #[error("installation can only be started from the {trigger} screen (currently on {current})")]
    NotAtInstallTrigger { current: ScreenId, trigger: ScreenId },

    #[error("installation has started; the wizard no longer accepts commands")]
    HandedOff,
}

impl From<WizardError> for InstallerError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Validation(v) => v.into(),
            other => InstallerError::Wizard(other.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct WizardController {
    screens: Vec<ScreenDescriptor>,
    records: Vec<Option<ScreenRecord>>,
    nav: NavigationState,
    handed_off: bool,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        let screens: Vec<ScreenDescriptor> = ScreenId::ordered()
            .into_iter()
            .map(ScreenDescriptor::from)
            .collect();
        let mut records: Vec<Option<ScreenRecord>> = vec![None; screens.len()];
        records[0] = Some(ScreenRecord::new(screens[0].id));

        Self {
            nav: NavigationState::new(screens.len()),
            screens,
            records,
            handed_off: false,
        }
    }

    pub fn screens(&self) -> &[ScreenDescriptor] {
        &self.screens
    }

    pub fn navigation(&self) -> NavigationState {
        self.nav
    }

    pub fn current_index(&self) -> usize {
        self.nav.current_index
    }

    /// Descriptor of the screen being shown.
    pub fn current_screen(&self) -> &ScreenDescriptor {
        &self.screens[self.nav.current_index]
    }

    pub fn is_handed_off(&self) -> bool {
        self.handed_off
    }

    /// Record for `screen`, if that screen has been entered.
    pub fn record(&self, screen: ScreenId) -> Option<&ScreenRecord> {
        self.screens
            .iter()
            .position(|s| s.id == screen)
            .and_then(|i| self.records[i].as_ref())
    }

    pub fn current_record(&self) -> Option<&ScreenRecord> {
        self.records[self.nav.current_index].as_ref()
    }

    /// Validate the current screen without moving.
    pub fn validate_current(&self) -> ValidationResult {
        let id = self.current_screen().id;
        match self.current_record() {
            Some(record) => validate_screen(id, record),
            None => validate_screen(id, &ScreenRecord::new(id)),
        }
    }

    /// Single entry point for presentation actions.
    pub fn dispatch(&mut self, command: WizardCommand) -> Result<Transition, WizardError> {
        match command {
            WizardCommand::Advance => self.advance(),
            WizardCommand::Retreat => self.retreat(),
            WizardCommand::FieldChanged { field, value } => self.set_field(field, value),
            WizardCommand::StartInstall => self.start_install(),
        }
    }

    /// Move forward one screen if the current screen validates. On the
    /// install-trigger screen this is the same as [`Self::start_install`].
    pub fn advance(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;
        if self.nav.is_last() {
            return self.start_install();
        }

        let from = self.current_screen().id;
        self.validate_current().into_result(from)?;

        self.leave_current();
        self.nav.current_index += 1;
        let to = self.enter_current();

        debug!(%from, %to, "Wizard advanced");
        Ok(Transition::Moved { from, to })
    }

    /// Move back one screen. Never validates; a no-op on the first screen.
    pub fn retreat(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;
        if self.nav.is_first() {
            return Ok(Transition::Stayed);
        }

        let from = self.current_screen().id;
        self.leave_current();
        self.nav.current_index -= 1;
        let to = self.enter_current();

        debug!(%from, %to, "Wizard went back");
        Ok(Transition::Moved { from, to })
    }

    /// Set a field on the current screen's record.
    pub fn set_field(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Transition, WizardError> {
        self.ensure_active()?;
        let screen = self.current_screen().id;
        let field = field.into();

        let record = self.records[self.nav.current_index]
            .get_or_insert_with(|| ScreenRecord::new(screen));
        if !record.set(field.clone(), value) {
            return Err(WizardError::FrozenRecord { screen });
        }
        Ok(Transition::FieldUpdated { field })
    }

    /// Build the plan the install screen would hand off, without freezing
    /// anything. Used for the review summary.
    pub fn preview_plan(&self) -> Result<InstallPlan, ValidationError> {
        let records: Vec<ScreenRecord> = self.records.iter().flatten().cloned().collect();
        InstallPlan::from_records(&records)
    }

    /// Re-validate everything, freeze all records and hand the plan off.
    pub fn start_install(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;
        if !self.nav.is_last() {
            return Err(WizardError::NotAtInstallTrigger {
                current: self.current_screen().id,
                trigger: self.screens[self.screens.len() - 1].id,
            });
        }

        let records: Vec<ScreenRecord> = self.records.iter().flatten().cloned().collect();
        let plan = InstallPlan::from_records(&records)?;

        for record in self.records.iter_mut().flatten() {
            record.freeze();
        }
        self.handed_off = true;

        info!(
            disk = %plan.disk.device,
            user = %plan.user.username,
            "Wizard complete; handing install plan to the pipeline"
        );
        Ok(Transition::InstallRequested(Box::new(plan)))
    }

    fn ensure_active(&self) -> Result<(), WizardError> {
        if self.handed_off {
            Err(WizardError::HandedOff)
        } else {
            Ok(())
        }
    }

    fn leave_current(&mut self) {
        if let Some(record) = self.records[self.nav.current_index].as_mut() {
            record.freeze();
        }
    }

    fn enter_current(&mut self) -> ScreenId {
        let id = self.current_screen().id;
        self.records[self.nav.current_index]
            .get_or_insert_with(|| ScreenRecord::new(id))
            .thaw();
        id
    }
}
