//! Install plan
//!
//! The typed, frozen aggregate of every wizard screen record. The wizard
//! builds one on the install-trigger screen; headless runs load one from a
//! JSON file saved earlier with `--save-plan`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::record::ScreenRecord;
use crate::types::{ConnectionType, PartitionScheme, ScreenId};
use crate::validation::{ValidationError, validate_screen};

/// Screens whose records feed the plan.
pub const SETTINGS_SCREENS: [ScreenId; 6] = [
    ScreenId::Language,
    ScreenId::Timezone,
    ScreenId::Keyboard,
    ScreenId::Disk,
    ScreenId::Network,
    ScreenId::User,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardChoice {
    pub layout: String,
    /// Empty for the layout's default variant
    #[serde(default)]
    pub variant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskChoice {
    pub device: String,
    pub partition_scheme: PartitionScheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkChoice {
    pub connection_type: ConnectionType,
    /// `None` when the network step was skipped
    #[serde(default)]
    pub connection: Option<String>,
    /// The chosen network asks for a passphrase
    #[serde(default)]
    pub secured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_password: Option<String>,
}

impl NetworkChoice {
    pub fn is_skipped(&self) -> bool {
        self.connection.is_none()
    }

    pub fn zero_sensitive_data(&mut self) {
        self.wifi_password.zeroize();
    }
}

impl Drop for NetworkChoice {
    fn drop(&mut self) {
        self.zero_sensitive_data();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub full_name: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub administrator: bool,
    #[serde(default)]
    pub autologin: bool,
}

fn default_true() -> bool {
    true
}

impl UserAccount {
    pub fn zero_sensitive_data(&mut self) {
        self.password.zeroize();
    }
}

impl Drop for UserAccount {
    fn drop(&mut self) {
        self.zero_sensitive_data();
    }
}

fn network_choice(record: &ScreenRecord) -> NetworkChoice {
    let connection = Some(record.trimmed("connection"))
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let chosen = connection.is_some();

    NetworkChoice {
        connection_type: record.trimmed("connection_type").parse().unwrap_or_default(),
        connection,
        secured: chosen && record.trimmed("secured") == "true",
        wifi_password: record
            .get("wifi_password")
            .filter(|passphrase| chosen && !passphrase.is_empty())
            .map(str::to_string),
    }
}

/// Everything the install pipeline needs to know about the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPlan {
    pub language: String,
    pub timezone: String,
    pub keyboard: KeyboardChoice,
    pub disk: DiskChoice,
    #[serde(default)]
    pub network: NetworkChoice,
    pub user: UserAccount,
}

impl InstallPlan {
    /// Build a plan from the wizard's screen records.
    ///
    /// Every settings screen is validated first; the first invalid screen
    /// is returned as the error.
    pub fn from_records(records: &[ScreenRecord]) -> std::result::Result<Self, ValidationError> {
        let resolved = SETTINGS_SCREENS.map(|screen| {
            records
                .iter()
                .find(|r| r.screen() == screen)
                .cloned()
                .unwrap_or_else(|| ScreenRecord::new(screen))
        });

        for record in &resolved {
            validate_screen(record.screen(), record).into_result(record.screen())?;
        }

        let [language, timezone, keyboard, disk, network, user] = resolved;

        // Formats were checked above, so the parses below only fall back on
        // fields that were legitimately left out.
        Ok(Self {
            language: language.trimmed("language").to_string(),
            timezone: timezone.trimmed("timezone").to_string(),
            keyboard: KeyboardChoice {
                layout: keyboard.trimmed("layout").to_string(),
                variant: keyboard.trimmed("variant").to_string(),
            },
            disk: DiskChoice {
                device: disk.trimmed("device").to_string(),
                partition_scheme: disk.trimmed("partition_scheme").parse().unwrap_or_default(),
            },
            network: network_choice(&network),
            user: UserAccount {
                full_name: user.trimmed("full_name").to_string(),
                username: user.trimmed("username").to_string(),
                password: user.get("password").unwrap_or_default().to_string(),
                administrator: user.trimmed("administrator") != "false",
                autologin: user.trimmed("autologin") == "true",
            },
        })
    }

    /// Expand the plan back into screen records, e.g. to pre-fill the wizard.
    pub fn to_records(&self) -> Vec<ScreenRecord> {
        let mut network = ScreenRecord::new(ScreenId::Network)
            .with("connection_type", self.network.connection_type.to_string());
        if let Some(name) = &self.network.connection {
            network.set("connection", name.as_str());
            network.set("secured", self.network.secured.to_string());
        }
        if let Some(passphrase) = &self.network.wifi_password {
            network.set("wifi_password", passphrase.as_str());
        }

        vec![
            ScreenRecord::new(ScreenId::Language).with("language", self.language.as_str()),
            ScreenRecord::new(ScreenId::Timezone).with("timezone", self.timezone.as_str()),
            ScreenRecord::new(ScreenId::Keyboard)
                .with("layout", self.keyboard.layout.as_str())
                .with("variant", self.keyboard.variant.as_str()),
            ScreenRecord::new(ScreenId::Disk)
                .with("device", self.disk.device.as_str())
                .with("partition_scheme", self.disk.partition_scheme.to_string()),
            network,
            ScreenRecord::new(ScreenId::User)
                .with("full_name", self.user.full_name.as_str())
                .with("username", self.user.username.as_str())
                .with("password", self.user.password.as_str())
                .with("confirm_password", self.user.password.as_str())
                .with("administrator", self.user.administrator.to_string())
                .with("autologin", self.user.autologin.to_string()),
        ]
    }

    /// Run every screen's validation rules against the plan.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        for record in self.to_records() {
            validate_screen(record.screen(), &record).into_result(record.screen())?;
        }
        Ok(())
    }

    /// Label/value pairs for the review panel and `validate` output.
    /// The password is never included.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let keyboard = if self.keyboard.variant.is_empty() {
            self.keyboard.layout.clone()
        } else {
            format!("{} ({})", self.keyboard.layout, self.keyboard.variant)
        };
        let network = match &self.network.connection {
            Some(name) => format!("{} ({})", name, self.network.connection_type),
            None => "Skipped".to_string(),
        };
        let mut account = format!("{} <{}>", self.user.full_name, self.user.username);
        if self.user.administrator {
            account.push_str(", administrator");
        }
        if self.user.autologin {
            account.push_str(", auto-login");
        }

        vec![
            ("Language", self.language.clone()),
            ("Timezone", self.timezone.clone()),
            ("Keyboard", keyboard),
            (
                "Disk",
                format!("{} ({})", self.disk.device, self.disk.partition_scheme.label()),
            ),
            ("Network", network),
            ("User", account),
        ]
    }

    /// Save the plan to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialize install plan to JSON")?;

        let written = fs::write(&path, json.as_bytes())
            .with_context(|| format!("Failed to write install plan to {:?}", path.as_ref()));
        // The serialized text carries the passwords
        json.zeroize();
        written
    }

    /// Load a plan from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read install plan from {:?}", path.as_ref()))?;

        let parsed = serde_json::from_str(&content).context("Failed to parse install plan JSON");
        content.zeroize();
        parsed
    }
}
