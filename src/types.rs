//! Type-safe identifiers and choices shared across the installer
//!
//! Screen identifiers and the enumerated choices a user can make are proper
//! Rust enums instead of strings, so wizard records can be parsed into them
//! once and matched exhaustively afterwards.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One step of the configuration wizard, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum ScreenId {
    Welcome,
    Language,
    Timezone,
    Keyboard,
    Disk,
    Network,
    User,
    /// Install-trigger screen: reaching it hands control to the pipeline.
    Install,
}

impl ScreenId {
    /// All screens in wizard order.
    pub fn ordered() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Title shown at the top of the screen.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome to Wave OS",
            Self::Language => "Choose Your Language",
            Self::Timezone => "Select Your Timezone",
            Self::Keyboard => "Keyboard Layout",
            Self::Disk => "Select Installation Disk",
            Self::Network => "Network Connection",
            Self::User => "Create User Account",
            Self::Install => "Installing Wave OS",
        }
    }

    /// One-line explanation shown under the title.
    pub const fn subtitle(self) -> &'static str {
        match self {
            Self::Welcome => "This wizard will guide you through installing Wave OS",
            Self::Language => "Select the language for your system",
            Self::Timezone => "Choose the timezone for your location",
            Self::Keyboard => "Select your keyboard layout and variant",
            Self::Disk => "All data on the selected disk will be erased",
            Self::Network => "Connect to a network now, or skip and configure it later",
            Self::User => "Set up your user account for the new system",
            Self::Install => "Please wait while we install your new operating system",
        }
    }

    /// Fields that must be non-empty before the wizard moves past this screen.
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Welcome | Self::Network | Self::Install => &[],
            Self::Language => &["language"],
            Self::Timezone => &["timezone"],
            Self::Keyboard => &["layout"],
            Self::Disk => &["device", "partition_scheme"],
            Self::User => &["full_name", "username", "password", "confirm_password"],
        }
    }
}

/// Disk partitioning strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum PartitionScheme {
    /// Erase the disk and partition it automatically (recommended)
    #[default]
    #[strum(serialize = "auto")]
    Auto,
    #[strum(serialize = "manual")]
    Manual,
}

impl PartitionScheme {
    /// Label used by the disk screen.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "Automatic (Recommended)",
            Self::Manual => "Manual partitioning",
        }
    }
}

/// Kind of network connection offered on the network screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    #[strum(serialize = "ethernet")]
    Ethernet,
    #[strum(serialize = "wifi")]
    Wifi,
}

impl ConnectionType {
    /// The other connection type (the network screen toggles between two tabs).
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ethernet => Self::Wifi,
            Self::Wifi => Self::Ethernet,
        }
    }
}
