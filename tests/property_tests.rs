//! Property-Based Tests for the Wave installer
//!
//! Uses proptest for testing invariants and edge cases
//!
//! These tests verify:
//! - Pipeline event ordering for arbitrary stage lists
//! - Monotonic progress and elapsed + remaining = total
//! - Validation rules (username, password strength)
//! - Time-remaining formatting

use std::time::Duration;

use proptest::prelude::*;

use wave_installer::pipeline::{
    InstallPipeline, PipelineOptions, ProgressEvent, SimulatedBackend, Stage, format_remaining,
};
use wave_installer::plan::InstallPlan;
use wave_installer::validation::{
    MIN_USERNAME_LEN, PasswordStrength, is_valid_username, password_strength, suggest_username,
};

fn plan() -> InstallPlan {
    serde_json::from_str(
        r#"{
            "language": "en_US",
            "timezone": "UTC",
            "keyboard": {"layout": "us"},
            "disk": {"device": "/dev/sda", "partition_scheme": "auto"},
            "user": {"full_name": "Prop Test", "username": "prop.test", "password": "Passw0rd!"}
        }"#,
    )
    .expect("valid plan JSON")
}

/// Strategy for short stage lists with small positive durations
fn stages_strategy() -> impl Strategy<Value = Vec<Stage>> {
    prop::collection::vec(1u32..=5, 1..=6).prop_map(|durations| {
        durations
            .into_iter()
            .enumerate()
            .map(|(i, secs)| Stage::new(format!("Stage {}", i), secs))
            .collect()
    })
}

fn run(stages: Vec<Stage>, queue_capacity: usize, fail_at: Option<usize>) -> Vec<ProgressEvent> {
    let options = PipelineOptions {
        tick_interval: Duration::ZERO,
        queue_capacity,
    };
    let pipeline = InstallPipeline::new(stages, plan(), options).expect("valid pipeline");
    let backend = match fail_at {
        Some(i) => SimulatedBackend::failing_at(i),
        None => SimulatedBackend::new(),
    };
    let mut handle = pipeline.start(backend).expect("started");
    let mut events: Vec<ProgressEvent> = Vec::new();
    handle.wait(&mut events).expect("finished");
    events
}

// =============================================================================
// Pipeline Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Exactly one terminal event, and it is last
    #[test]
    fn terminal_event_is_last(stages in stages_strategy(), capacity in 1usize..8) {
        let events = run(stages, capacity, None);
        let terminal = events.iter().filter(|e| e.is_terminal()).count();
        prop_assert_eq!(terminal, 1);
        prop_assert_eq!(events.last(), Some(&ProgressEvent::PipelineCompleted));
    }

    /// No event mentions stage i after StageCompleted{i}
    #[test]
    fn nothing_for_a_stage_after_it_completes(stages in stages_strategy()) {
        let events = run(stages, 64, None);
        let mut completed: Vec<usize> = Vec::new();
        for event in &events {
            match event {
                ProgressEvent::StageStarted { index, .. } => {
                    prop_assert!(!completed.contains(index));
                }
                ProgressEvent::StageCompleted { index, .. } => {
                    prop_assert!(!completed.contains(index));
                    completed.push(*index);
                }
                _ => {}
            }
        }
    }

    /// Percent never decreases; elapsed + remaining always equals total
    #[test]
    fn progress_is_monotonic_and_balanced(stages in stages_strategy()) {
        let total: u64 = stages.iter().map(|s| u64::from(s.estimated_duration_secs)).sum();
        let events = run(stages, 64, None);

        let mut last_percent = 0u8;
        let mut last_elapsed = 0u64;
        for event in &events {
            if let ProgressEvent::ProgressTick { elapsed_secs, percent, remaining_secs } = event {
                prop_assert!(*percent >= last_percent);
                prop_assert_eq!(*elapsed_secs, last_elapsed + 1);
                prop_assert_eq!(elapsed_secs + remaining_secs, total);
                prop_assert_eq!(u64::from(*percent), 100 * elapsed_secs / total);
                last_percent = *percent;
                last_elapsed = *elapsed_secs;
            }
        }
        prop_assert_eq!(last_elapsed, total);
        prop_assert_eq!(last_percent, 100);
    }

    /// A fault at stage k ends with PipelineFailed and nothing past stage k starts
    #[test]
    fn fault_stops_at_stage(stages in stages_strategy(), k in 0usize..6) {
        let k = k % stages.len();
        let events = run(stages, 4, Some(k));

        let started: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::StageStarted { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        prop_assert_eq!(started, (0..=k).collect::<Vec<_>>());
        let is_failed = matches!(events.last(), Some(ProgressEvent::PipelineFailed { .. }));
        prop_assert!(is_failed);
    }
}

// =============================================================================
// Validation Property Tests
// =============================================================================

proptest! {
    /// Usernames built from the allowed alphabet are valid at 3+ characters
    #[test]
    fn username_alphabet_accepted(name in "[a-z0-9.-]{3,32}") {
        prop_assert!(is_valid_username(&name));
    }

    /// Anything shorter than the minimum is rejected
    #[test]
    fn short_usernames_rejected(name in "[a-z0-9.-]{0,2}") {
        prop_assert!(name.chars().count() < MIN_USERNAME_LEN);
        prop_assert!(!is_valid_username(&name));
    }

    /// Uppercase letters are never allowed
    #[test]
    fn uppercase_usernames_rejected(prefix in "[a-z]{2,8}", upper in "[A-Z]{1,4}") {
        let name = format!("{}{}", prefix, upper);
        prop_assert!(!is_valid_username(&name));
    }

    /// Strength is always 0..=4 and 0 only for the empty password
    #[test]
    fn password_strength_bounded(password in ".{0,40}") {
        let score = password_strength(&password);
        prop_assert!(score <= 4);
        if password.is_empty() {
            prop_assert_eq!(score, 0);
        }
        let band = PasswordStrength::from_score(score);
        prop_assert_eq!(band == PasswordStrength::None, score == 0);
    }

    /// Appending characters never lowers the score
    #[test]
    fn password_strength_monotonic(base in "[a-zA-Z0-9!@#]{0,20}", extra in "[a-zA-Z0-9!@#]{1,10}") {
        let longer = format!("{}{}", base, extra);
        prop_assert!(password_strength(&longer) >= password_strength(&base));
    }

    /// Suggestions derived from plain names are valid or too short, never malformed
    #[test]
    fn suggested_usernames_use_allowed_alphabet(first in "[A-Za-z]{1,10}", last in "[A-Za-z]{1,10}") {
        let suggestion = suggest_username(&format!("{} {}", first, last));
        prop_assert!(suggestion.len() <= 20);
        prop_assert!(suggestion.chars().all(|c| c.is_ascii_lowercase() || c == '.'));
        if suggestion.len() >= MIN_USERNAME_LEN {
            prop_assert!(is_valid_username(&suggestion));
        }
    }
}

// =============================================================================
// Formatting Property Tests
// =============================================================================

proptest! {
    /// Under a minute renders as plain seconds
    #[test]
    fn format_remaining_seconds(secs in 0u64..60) {
        prop_assert_eq!(format_remaining(secs), format!("{}s", secs));
    }

    /// A minute or more renders as minutes and seconds
    #[test]
    fn format_remaining_minutes(secs in 60u64..100_000) {
        prop_assert_eq!(format_remaining(secs), format!("{}m {}s", secs / 60, secs % 60));
    }
}
