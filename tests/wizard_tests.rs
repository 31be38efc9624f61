//! Wizard navigation tests
//!
//! These tests verify:
//! - Retreat on the first screen is a no-op and never validates
//! - Records behind the cursor are frozen; re-entry thaws them
//! - Later answers are re-validated when the user advances again
//! - Hand-off freezes everything and rejects further commands

use wave_installer::types::ScreenId;
use wave_installer::wizard::{Transition, WizardCommand, WizardController, WizardError};

fn set(wizard: &mut WizardController, field: &str, value: &str) {
    wizard
        .dispatch(WizardCommand::FieldChanged {
            field: field.to_string(),
            value: value.to_string(),
        })
        .expect("field accepted");
}

fn advance(wizard: &mut WizardController) {
    match wizard.advance() {
        Ok(Transition::Moved { .. }) => {}
        other => panic!("expected to move forward, got {other:?}"),
    }
}

/// Fill in the current screen with valid answers.
fn answer_current(wizard: &mut WizardController) {
    match wizard.current_screen().id {
        ScreenId::Welcome | ScreenId::Network | ScreenId::Install => {}
        ScreenId::Language => set(wizard, "language", "de_DE"),
        ScreenId::Timezone => set(wizard, "timezone", "Europe/Berlin"),
        ScreenId::Keyboard => {
            set(wizard, "layout", "de");
            set(wizard, "variant", "nodeadkeys");
        }
        ScreenId::Disk => {
            set(wizard, "device", "/dev/sdb");
            set(wizard, "partition_scheme", "manual");
        }
        ScreenId::User => {
            set(wizard, "full_name", "Max Mustermann");
            set(wizard, "username", "max.mustermann");
            set(wizard, "password", "Sicher!Passwort9");
            set(wizard, "confirm_password", "Sicher!Passwort9");
        }
    }
}

fn walk_to(wizard: &mut WizardController, target: ScreenId) {
    while wizard.current_screen().id != target {
        answer_current(wizard);
        advance(wizard);
    }
}

// =============================================================================
// Retreat
// =============================================================================

#[test]
fn test_retreat_at_first_screen_is_noop() {
    let mut wizard = WizardController::new();
    for _ in 0..3 {
        assert_eq!(wizard.dispatch(WizardCommand::Retreat), Ok(Transition::Stayed));
    }
    assert_eq!(wizard.current_index(), 0);
    assert!(!wizard.current_record().expect("welcome record").is_frozen());
}

#[test]
fn test_retreat_never_validates() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Timezone);

    // Timezone is blank and would fail validation; going back is still allowed
    assert!(!wizard.validate_current().is_valid());
    assert_eq!(
        wizard.retreat(),
        Ok(Transition::Moved {
            from: ScreenId::Timezone,
            to: ScreenId::Language
        })
    );
}

// =============================================================================
// Record lifecycle
// =============================================================================

#[test]
fn test_records_behind_cursor_are_frozen() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Disk);

    for screen in [ScreenId::Welcome, ScreenId::Language, ScreenId::Timezone, ScreenId::Keyboard] {
        assert!(wizard.record(screen).expect("visited").is_frozen(), "{screen}");
    }
    assert!(!wizard.current_record().expect("disk record").is_frozen());
    assert!(wizard.record(ScreenId::Network).is_none());
}

#[test]
fn test_back_navigation_thaws_only_current_screen() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Disk);

    wizard.retreat().expect("back to keyboard");
    wizard.retreat().expect("back to timezone");
    assert_eq!(wizard.current_screen().id, ScreenId::Timezone);

    // Current screen editable again, later ones still frozen
    set(&mut wizard, "timezone", "UTC");
    assert!(wizard.record(ScreenId::Keyboard).expect("visited").is_frozen());
    assert!(wizard.record(ScreenId::Disk).expect("visited").is_frozen());
    assert_eq!(
        wizard.record(ScreenId::Keyboard).expect("visited").get("layout"),
        Some("de")
    );
}

#[test]
fn test_field_change_rejected_after_hand_off() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Install);

    assert!(matches!(
        wizard.dispatch(WizardCommand::StartInstall),
        Ok(Transition::InstallRequested(_))
    ));
    let err = wizard
        .dispatch(WizardCommand::FieldChanged {
            field: "language".to_string(),
            value: "fr_FR".to_string(),
        })
        .unwrap_err();
    assert_eq!(err, WizardError::HandedOff);
    assert_eq!(
        wizard.record(ScreenId::Language).expect("visited").get("language"),
        Some("de_DE")
    );
}

#[test]
fn test_readvance_revalidates_changed_answers() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Disk);
    answer_current(&mut wizard);
    wizard.retreat().expect("back to keyboard");
    assert!(wizard.record(ScreenId::Disk).expect("visited").is_frozen());

    set(&mut wizard, "layout", "");
    let err = wizard.advance().unwrap_err();
    match err {
        WizardError::Validation(v) => {
            assert_eq!(v.screen, ScreenId::Keyboard);
            assert_eq!(v.reasons, vec!["Keyboard layout is required".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(wizard.current_screen().id, ScreenId::Keyboard);

    set(&mut wizard, "layout", "fr");
    advance(&mut wizard);
    assert_eq!(wizard.current_screen().id, ScreenId::Disk);
    assert_eq!(
        wizard.record(ScreenId::Disk).expect("visited").get("device"),
        Some("/dev/sdb")
    );
}

#[test]
fn test_invalid_formats_are_distinct_from_missing() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::User);

    set(&mut wizard, "full_name", "Max");
    set(&mut wizard, "username", "Max!");
    set(&mut wizard, "password", "short");
    set(&mut wizard, "confirm_password", "shorter");

    let result = wizard.validate_current();
    assert!(!result.is_valid());
    assert!(result.issues().iter().all(|issue| !issue.is_missing()));
    let reasons = result.reasons();
    assert!(reasons.iter().any(|r| r.contains("lowercase letters")));
    assert!(reasons.iter().any(|r| r.contains("too weak")));
    assert!(reasons.contains(&"Passwords do not match".to_string()));
}

// =============================================================================
// Install trigger and hand-off
// =============================================================================

#[test]
fn test_advance_on_trigger_starts_install() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Install);
    assert!(wizard.navigation().is_last());

    let plan = match wizard.advance() {
        Ok(Transition::InstallRequested(plan)) => plan,
        other => panic!("expected install request, got {other:?}"),
    };
    assert_eq!(plan.language, "de_DE");
    assert_eq!(plan.keyboard.variant, "nodeadkeys");
    assert_eq!(plan.disk.device, "/dev/sdb");
    assert!(plan.network.is_skipped());
    assert!(plan.user.administrator);

    assert!(wizard.is_handed_off());
    for screen in ScreenId::ordered() {
        assert!(wizard.record(screen).expect("visited").is_frozen(), "{screen}");
    }
}

#[test]
fn test_commands_rejected_after_hand_off() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Install);
    wizard.start_install().expect("install requested");

    assert_eq!(wizard.retreat(), Err(WizardError::HandedOff));
    assert_eq!(wizard.advance(), Err(WizardError::HandedOff));
    assert_eq!(wizard.start_install(), Err(WizardError::HandedOff));
    assert_eq!(wizard.current_screen().id, ScreenId::Install);
}

#[test]
fn test_preview_plan_does_not_hand_off() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::Install);

    let plan = wizard.preview_plan().expect("complete answers");
    assert_eq!(plan.timezone, "Europe/Berlin");
    assert!(!wizard.is_handed_off());
    assert!(wizard.retreat().is_ok());
}

#[test]
fn test_start_install_before_trigger_is_rejected() {
    let mut wizard = WizardController::new();
    walk_to(&mut wizard, ScreenId::User);
    answer_current(&mut wizard);

    assert_eq!(
        wizard.start_install(),
        Err(WizardError::NotAtInstallTrigger {
            current: ScreenId::User,
            trigger: ScreenId::Install
        })
    );
    assert!(!wizard.is_handed_off());
}
