//! Device inventory and selection catalogs
//!
//! Disk and network enumeration belong to external collaborators (`lsblk`,
//! NetworkManager). They are reached through [`DeviceInventory`]; the
//! bundled [`MockInventory`] returns a fixed set of devices so the wizard
//! can be exercised anywhere.
//!
//! The language, timezone and keyboard catalogs are static tables.

use std::fmt;
use std::path::PathBuf;

use crate::types::ConnectionType;

/// Information about a detected disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskInfo {
    /// Device path (e.g., `/dev/sda`).
    pub device: PathBuf,
    pub model: String,
    /// Human-readable size (e.g., "1TB").
    pub size: String,
    pub size_bytes: u64,
    /// Interface label (e.g., "NVMe", "SATA", "USB 3.0").
    pub interface: String,
    pub removable: bool,
    pub partitions: Vec<PartitionInfo>,
}

impl DiskInfo {
    /// Format disk info for display in the list.
    pub fn display_line(&self) -> String {
        let warning = if self.removable { " [REMOVABLE]" } else { "" };
        let parts = match self.partitions.len() {
            0 => String::new(),
            1 => ", 1 partition".to_string(),
            n => format!(", {} partitions", n),
        };
        format!(
            "{} - {} ({} {}{}){}",
            self.device.display(),
            self.model,
            self.size,
            self.interface,
            parts,
            warning
        )
    }
}

/// An existing partition on a disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    pub name: String,
    pub size: String,
    pub filesystem: String,
    pub mount: Option<String>,
}

/// A connectable network interface or access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub name: String,
    pub kind: ConnectionType,
    pub connected: bool,
    /// Signal strength 0-100
    pub signal: u8,
    pub secured: bool,
    pub ip: Option<String>,
}

impl NetworkInfo {
    /// A secured wireless network not already joined asks for a passphrase.
    pub fn needs_password(&self) -> bool {
        self.kind == ConnectionType::Wifi && self.secured && !self.connected
    }

    pub fn signal_label(&self) -> &'static str {
        match self.signal {
            71.. => "Excellent",
            51..=70 => "Good",
            31..=50 => "Fair",
            _ => "Weak",
        }
    }
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match self.kind {
            ConnectionType::Wifi => {
                write!(f, " ({}% {})", self.signal, self.signal_label())?;
                if self.secured {
                    write!(f, " [secured]")?;
                }
            }
            ConnectionType::Ethernet => {}
        }
        if self.connected {
            match &self.ip {
                Some(ip) => write!(f, " - connected, {}", ip)?,
                None => write!(f, " - connected")?,
            }
        }
        Ok(())
    }
}

/// Source of disks and networks offered by the wizard.
pub trait DeviceInventory {
    fn disks(&self) -> Vec<DiskInfo>;
    fn networks(&self, kind: ConnectionType) -> Vec<NetworkInfo>;
}

/// Fixed demonstration inventory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockInventory;

impl DeviceInventory for MockInventory {
    fn disks(&self) -> Vec<DiskInfo> {
        vec![
            DiskInfo {
                device: PathBuf::from("/dev/sda"),
                model: "Samsung SSD 970 EVO Plus".to_string(),
                size: "1TB".to_string(),
                size_bytes: 1_000_204_886_016,
                interface: "NVMe".to_string(),
                removable: false,
                partitions: Vec::new(),
            },
            DiskInfo {
                device: PathBuf::from("/dev/sdb"),
                model: "Western Digital Blue".to_string(),
                size: "2TB".to_string(),
                size_bytes: 2_000_398_934_016,
                interface: "SATA".to_string(),
                removable: false,
                partitions: vec![
                    PartitionInfo {
                        name: "/dev/sdb1".to_string(),
                        size: "500GB".to_string(),
                        filesystem: "ntfs".to_string(),
                        mount: Some("/mnt/windows".to_string()),
                    },
                    PartitionInfo {
                        name: "/dev/sdb2".to_string(),
                        size: "1.5TB".to_string(),
                        filesystem: "ext4".to_string(),
                        mount: Some("/mnt/data".to_string()),
                    },
                ],
            },
            DiskInfo {
                device: PathBuf::from("/dev/sdc"),
                model: "Kingston DataTraveler".to_string(),
                size: "32GB".to_string(),
                size_bytes: 32_017_047_552,
                interface: "USB 3.0".to_string(),
                removable: true,
                partitions: Vec::new(),
            },
        ]
    }

    fn networks(&self, kind: ConnectionType) -> Vec<NetworkInfo> {
        let net = |name: &str, signal: u8, secured: bool| NetworkInfo {
            name: name.to_string(),
            kind,
            connected: false,
            signal,
            secured,
            ip: None,
        };

        match kind {
            ConnectionType::Ethernet => vec![
                NetworkInfo {
                    connected: true,
                    ip: Some("192.168.1.100".to_string()),
                    ..net("Ethernet Connection", 100, false)
                },
                net("Ethernet Connection 2", 100, false),
            ],
            ConnectionType::Wifi => vec![
                net("Home_WiFi_5G", 85, true),
                net("Home_WiFi_2.4G", 70, true),
                net("Neighbor_WiFi", 45, true),
                net("Public_WiFi", 30, false),
            ],
        }
    }
}

/// A selectable language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "en_US", name: "English", native: "English" },
    Language { code: "es_ES", name: "Spanish", native: "Español" },
    Language { code: "fr_FR", name: "French", native: "Français" },
    Language { code: "de_DE", name: "German", native: "Deutsch" },
    Language { code: "it_IT", name: "Italian", native: "Italiano" },
    Language { code: "pt_PT", name: "Portuguese", native: "Português" },
    Language { code: "ru_RU", name: "Russian", native: "Русский" },
    Language { code: "zh_CN", name: "Chinese (Simplified)", native: "简体中文" },
    Language { code: "ja_JP", name: "Japanese", native: "日本語" },
    Language { code: "ko_KR", name: "Korean", native: "한국어" },
    Language { code: "ar_SA", name: "Arabic", native: "العربية" },
    Language { code: "hi_IN", name: "Hindi", native: "हिन्दी" },
];

/// A selectable timezone, grouped by region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone {
    pub zone: &'static str,
    pub display: &'static str,
    pub region: &'static str,
}

const fn tz(zone: &'static str, display: &'static str, region: &'static str) -> Timezone {
    Timezone { zone, display, region }
}

pub const TIMEZONES: &[Timezone] = &[
    tz("UTC", "UTC (Coordinated Universal Time)", "UTC"),
    tz("America/New_York", "New York (Eastern Time)", "Americas"),
    tz("America/Chicago", "Chicago (Central Time)", "Americas"),
    tz("America/Denver", "Denver (Mountain Time)", "Americas"),
    tz("America/Los_Angeles", "Los Angeles (Pacific Time)", "Americas"),
    tz("America/Toronto", "Toronto (Eastern Time)", "Americas"),
    tz("America/Mexico_City", "Mexico City", "Americas"),
    tz("America/Sao_Paulo", "São Paulo", "Americas"),
    tz("Europe/London", "London (GMT/BST)", "Europe"),
    tz("Europe/Paris", "Paris (CET/CEST)", "Europe"),
    tz("Europe/Berlin", "Berlin (CET/CEST)", "Europe"),
    tz("Europe/Rome", "Rome (CET/CEST)", "Europe"),
    tz("Europe/Madrid", "Madrid (CET/CEST)", "Europe"),
    tz("Europe/Amsterdam", "Amsterdam (CET/CEST)", "Europe"),
    tz("Europe/Moscow", "Moscow (MSK)", "Europe"),
    tz("Asia/Tokyo", "Tokyo (JST)", "Asia"),
    tz("Asia/Shanghai", "Shanghai (CST)", "Asia"),
    tz("Asia/Hong_Kong", "Hong Kong (HKT)", "Asia"),
    tz("Asia/Singapore", "Singapore (SGT)", "Asia"),
    tz("Asia/Seoul", "Seoul (KST)", "Asia"),
    tz("Asia/Dubai", "Dubai (GST)", "Asia"),
    tz("Asia/Kolkata", "Mumbai/Kolkata (IST)", "Asia"),
    tz("Australia/Sydney", "Sydney (AEST/AEDT)", "Australia"),
    tz("Australia/Melbourne", "Melbourne (AEST/AEDT)", "Australia"),
    tz("Australia/Perth", "Perth (AWST)", "Australia"),
    tz("Pacific/Auckland", "Auckland (NZST/NZDT)", "Pacific"),
    tz("Africa/Cairo", "Cairo (EET)", "Africa"),
    tz("Africa/Johannesburg", "Johannesburg (SAST)", "Africa"),
];

/// A keyboard layout or one of its variants. An empty code is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    pub code: &'static str,
    pub name: &'static str,
}

const fn km(code: &'static str, name: &'static str) -> Keymap {
    Keymap { code, name }
}

pub const KEYBOARD_LAYOUTS: &[Keymap] = &[
    km("us", "English (US)"),
    km("gb", "English (UK)"),
    km("de", "German"),
    km("fr", "French"),
    km("es", "Spanish"),
    km("it", "Italian"),
    km("pt", "Portuguese"),
    km("ru", "Russian"),
    km("jp", "Japanese"),
    km("kr", "Korean"),
    km("cn", "Chinese"),
    km("ar", "Arabic"),
    km("dvorak", "Dvorak"),
    km("colemak", "Colemak"),
];

const DEFAULT_VARIANT: &[Keymap] = &[km("", "Default")];

const US_VARIANTS: &[Keymap] = &[
    km("", "Default"),
    km("intl", "International"),
    km("altgr-intl", "International (AltGr)"),
    km("dvorak", "Dvorak"),
    km("colemak", "Colemak"),
];
const GB_VARIANTS: &[Keymap] = &[km("", "Default"), km("extd", "Extended"), km("intl", "International")];
const DE_VARIANTS: &[Keymap] = &[km("", "Default"), km("nodeadkeys", "No dead keys"), km("neo", "Neo")];
const FR_VARIANTS: &[Keymap] = &[km("", "Default"), km("nodeadkeys", "No dead keys"), km("bepo", "BÉPO")];

/// Variants offered for `layout`. Layouts without variants get only the default.
pub fn keyboard_variants(layout: &str) -> &'static [Keymap] {
    match layout {
        "us" => US_VARIANTS,
        "gb" => GB_VARIANTS,
        "de" => DE_VARIANTS,
        "fr" => FR_VARIANTS,
        _ => DEFAULT_VARIANT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_disks() {
        let disks = MockInventory.disks();
        assert_eq!(disks.len(), 3);
        assert_eq!(disks[0].device, PathBuf::from("/dev/sda"));
        assert_eq!(disks[1].partitions.len(), 2);
        assert!(disks[2].removable);
        assert!(disks[2].display_line().ends_with("[REMOVABLE]"));
        assert_eq!(
            disks[1].display_line(),
            "/dev/sdb - Western Digital Blue (2TB SATA, 2 partitions)"
        );
    }

    #[test]
    fn test_mock_networks_by_kind() {
        let wired = MockInventory.networks(ConnectionType::Ethernet);
        assert_eq!(wired.len(), 2);
        assert!(wired[0].connected);
        assert_eq!(
            wired[0].to_string(),
            "Ethernet Connection - connected, 192.168.1.100"
        );

        let wifi = MockInventory.networks(ConnectionType::Wifi);
        assert_eq!(wifi.len(), 4);
        assert!(wifi.iter().all(|n| n.kind == ConnectionType::Wifi));
        assert_eq!(wifi[0].to_string(), "Home_WiFi_5G (85% Excellent) [secured]");
        assert_eq!(wifi[3].signal_label(), "Weak");
        assert!(wifi[0].needs_password());
        assert!(!wifi[3].needs_password());
        assert!(MockInventory.networks(ConnectionType::Ethernet).iter().all(|n| !n.needs_password()));
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(LANGUAGES.len(), 12);
        assert_eq!(TIMEZONES.len(), 28);
        assert_eq!(KEYBOARD_LAYOUTS.len(), 14);
        assert_eq!(TIMEZONES[0].zone, "UTC");
    }

    #[test]
    fn test_keyboard_variants() {
        assert_eq!(keyboard_variants("us").len(), 5);
        assert_eq!(keyboard_variants("fr")[2].code, "bepo");
        assert_eq!(keyboard_variants("jp"), DEFAULT_VARIANT);
        assert!(keyboard_variants("de").iter().all(|v| v.code.is_empty() || v.code.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_every_layout_offers_default_variant() {
        for layout in KEYBOARD_LAYOUTS {
            let variants = keyboard_variants(layout.code);
            assert_eq!(variants[0], km("", "Default"), "{}", layout.code);
        }
        assert_eq!(keyboard_variants("gb"), GB_VARIANTS);
        assert_eq!(keyboard_variants("de")[1].code, "nodeadkeys");
    }
}
