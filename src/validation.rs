//! Screen validation policy
//!
//! Pure functions that decide whether one screen's field set is complete and
//! well-formed. Every call builds a fresh [`ValidationResult`]; nothing here
//! holds state between calls.
//!
//! # Rules
//!
//! - Required fields must be non-blank. A missing field is reported as
//!   [`ValidationIssue::Missing`], never folded into a format message.
//!   Password fields are taken verbatim: only an empty value is missing.
//! - A chosen Wi-Fi network marked `secured` needs a `wifi_password`.
//! - Username: `^[a-z0-9.-]+$`, at least 3 characters.
//! - Password strength is scored 0-4 and must reach [`MIN_PASSWORD_STRENGTH`].
//! - Confirm-password must equal the password exactly.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::record::{ScreenRecord, is_sensitive};
use crate::types::{ConnectionType, PartitionScheme, ScreenId};

/// Minimum password score accepted by the user screen ("Fair").
pub const MIN_PASSWORD_STRENGTH: u8 = 2;

/// Minimum username length.
pub const MIN_USERNAME_LEN: usize = 3;

/// Characters that count as symbols for password scoring.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Longest username produced by [`suggest_username`].
const SUGGESTED_USERNAME_MAX: usize = 20;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+$").expect("username pattern compiles"));

static LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}_[A-Z]{2}$").expect("locale pattern compiles"));

static TIMEZONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(UTC|[A-Z][A-Za-z_-]*(/[A-Z][A-Za-z_-]*)+)$").expect("timezone pattern compiles")
});

static KEYMAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("keymap pattern compiles"));

/// One reason a screen failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A required field is absent or blank.
    Missing { field: String },
    /// A field is present but violates its format rule.
    Invalid { field: String, message: String },
}

impl ValidationIssue {
    fn missing(field: &str) -> Self {
        Self::Missing {
            field: field.to_string(),
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } => field,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "{} is required", field_label(field)),
            Self::Invalid { message, .. } => f.write_str(message),
        }
    }
}

/// Outcome of validating one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Human-readable reasons, in rule order.
    pub fn reasons(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// Convert into an error for `screen`, or `Ok(())` when valid.
    pub fn into_result(self, screen: ScreenId) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError {
                screen,
                reasons: self.reasons(),
            })
        }
    }
}

/// A screen's data failed validation. Recovered by re-prompting the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{screen} screen is incomplete: {}", reasons.join("; "))]
pub struct ValidationError {
    pub screen: ScreenId,
    pub reasons: Vec<String>,
}

impl From<ValidationError> for crate::error::InstallerError {
    fn from(err: ValidationError) -> Self {
        crate::error::InstallerError::Validation {
            screen: err.screen.to_string(),
            reasons: err.reasons,
        }
    }
}

/// Password strength bands shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    None,
    Weak,
    Fair,
    Good,
    Strong,
}

impl PasswordStrength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::None,
            1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Good,
            _ => Self::Strong,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }
}

/// Validate a username: lowercase letters, digits, dots and dashes, 3+ chars.
pub fn is_valid_username(username: &str) -> bool {
    username.chars().count() >= MIN_USERNAME_LEN && USERNAME_RE.is_match(username)
}

/// Score a password from 0 to 4.
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }

    let len = password.chars().count();
    let mut score = 0u8;

    if len >= 8 {
        score += 1;
    }
    if len >= 12 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
    {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        score += 1;
    }

    score.min(4)
}

/// Derive a username from a full name: lowercase, strip punctuation, join
/// words with dots, at most 20 characters.
pub fn suggest_username(full_name: &str) -> String {
    let cleaned: String = full_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .chars()
        .take(SUGGESTED_USERNAME_MAX)
        .collect()
}

/// Validate the record collected by `screen`.
pub fn validate_screen(screen: ScreenId, record: &ScreenRecord) -> ValidationResult {
    let mut issues: Vec<ValidationIssue> = screen
        .required_fields()
        .iter()
        .filter(|field| is_absent(record, field))
        .map(|field| ValidationIssue::missing(field))
        .collect();

    match screen {
        ScreenId::Welcome | ScreenId::Install => {}
        ScreenId::Language => check_language(record, &mut issues),
        ScreenId::Timezone => check_timezone(record, &mut issues),
        ScreenId::Keyboard => check_keyboard(record, &mut issues),
        ScreenId::Disk => check_disk(record, &mut issues),
        ScreenId::Network => check_network(record, &mut issues),
        ScreenId::User => check_user(record, &mut issues),
    }

    ValidationResult::from_issues(issues)
}

/// Secrets are never trimmed, so whitespace is a legal password.
fn is_absent(record: &ScreenRecord, field: &str) -> bool {
    if is_sensitive(field) {
        record.get(field).is_none_or(str::is_empty)
    } else {
        record.is_blank(field)
    }
}

fn check_language(record: &ScreenRecord, issues: &mut Vec<ValidationIssue>) {
    let language = record.trimmed("language");
    if !language.is_empty() && !LOCALE_RE.is_match(language) {
        issues.push(ValidationIssue::invalid(
            "language",
            format!("Language code '{}' must look like en_US", language),
        ));
    }
}

fn check_timezone(record: &ScreenRecord, issues: &mut Vec<ValidationIssue>) {
    let timezone = record.trimmed("timezone");
    if !timezone.is_empty() && !TIMEZONE_RE.is_match(timezone) {
        issues.push(ValidationIssue::invalid(
            "timezone",
            format!("Timezone '{}' must be UTC or Area/Location", timezone),
        ));
    }
}

fn check_keyboard(record: &ScreenRecord, issues: &mut Vec<ValidationIssue>) {
    for field in ["layout", "variant"] {
        let value = record.trimmed(field);
        if !value.is_empty() && !KEYMAP_RE.is_match(value) {
            issues.push(ValidationIssue::invalid(
                field,
                format!("Keyboard {} '{}' is not a valid keymap name", field, value),
            ));
        }
    }
}

fn check_disk(record: &ScreenRecord, issues: &mut Vec<ValidationIssue>) {
    let device = record.trimmed("device");
    if !device.is_empty() && (!device.starts_with("/dev/") || device.len() == "/dev/".len()) {
        issues.push(ValidationIssue::invalid(
            "device",
            "Disk must be a valid device path (e.g., /dev/sda)",
        ));
    }

    let scheme = record.trimmed("partition_scheme");
    if !scheme.is_empty() && scheme.parse::<PartitionScheme>().is_err() {
        issues.push(ValidationIssue::invalid(
            "partition_scheme",
            format!("Partition scheme '{}' must be auto or manual", scheme),
        ));
    }
}

fn check_network(record: &ScreenRecord, issues: &mut Vec<ValidationIssue>) {
    let kind = record.trimmed("connection_type");
    if !kind.is_empty() && kind.parse::<ConnectionType>().is_err() {
        issues.push(ValidationIssue::invalid(
            "connection_type",
            format!("Connection type '{}' must be ethernet or wifi", kind),
        ));
    }

    let secured = record.trimmed("secured");
    if !secured.is_empty() && secured != "true" && secured != "false" {
        issues.push(ValidationIssue::invalid(
            "secured",
            format!("{} must be true or false", field_label("secured")),
        ));
    }

    let needs_password = kind == ConnectionType::Wifi.to_string()
        && !record.is_blank("connection")
        && secured == "true";
    if needs_password && is_absent(record, "wifi_password") {
        issues.push(ValidationIssue::missing("wifi_password"));
    }
}

fn check_user(record: &ScreenRecord, issues: &mut Vec<ValidationIssue>) {
    let username = record.trimmed("username");
    if !username.is_empty() {
        if username.chars().count() < MIN_USERNAME_LEN {
            issues.push(ValidationIssue::invalid(
                "username",
                format!("Username must be at least {} characters", MIN_USERNAME_LEN),
            ));
        }
        if !USERNAME_RE.is_match(username) {
            issues.push(ValidationIssue::invalid(
                "username",
                "Username may only contain lowercase letters, numbers, dots and dashes",
            ));
        }
    }

    let password = record.get("password").unwrap_or("");
    if !password.is_empty() {
        let score = password_strength(password);
        if score < MIN_PASSWORD_STRENGTH {
            issues.push(ValidationIssue::invalid(
                "password",
                format!(
                    "Password is too weak ({}); use at least 8 characters mixing case, digits or symbols",
                    PasswordStrength::from_score(score).label()
                ),
            ));
        }
    }

    let confirm = record.get("confirm_password").unwrap_or("");
    if !password.is_empty() && !confirm.is_empty() && password != confirm {
        issues.push(ValidationIssue::invalid("confirm_password", "Passwords do not match"));
    }

    for flag in ["administrator", "autologin"] {
        let value = record.trimmed(flag);
        if !value.is_empty() && value != "true" && value != "false" {
            issues.push(ValidationIssue::invalid(
                flag,
                format!("{} must be true or false", field_label(flag)),
            ));
        }
    }
}

/// Display label for a record field name.
pub fn field_label(field: &str) -> &str {
    match field {
        "language" => "Language",
        "timezone" => "Timezone",
        "layout" => "Keyboard layout",
        "variant" => "Keyboard variant",
        "device" => "Disk",
        "partition_scheme" => "Partition scheme",
        "connection_type" => "Connection type",
        "connection" => "Network",
        "secured" => "Secured",
        "wifi_password" => "Wi-Fi password",
        "full_name" => "Full name",
        "username" => "Username",
        "password" => "Password",
        "confirm_password" => "Password confirmation",
        "administrator" => "Administrator",
        "autologin" => "Auto-login",
        other => other,
    }
}
