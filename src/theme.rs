//! Colors and styles for the installer TUI
//!
//! Every color the screens use is named here; render code never hardcodes
//! a `Color`.

use ratatui::style::{Color, Modifier, Style};

use crate::validation::PasswordStrength;

// =============================================================================
// WAVE PALETTE
// =============================================================================

/// Named colors of the Wave OS palette.
pub struct Colors;

impl Colors {
    pub const FOAM: Color = Color::Rgb(230, 240, 245);
    pub const MIST: Color = Color::Rgb(150, 170, 185);
    pub const SLATE: Color = Color::Rgb(85, 100, 115);
    pub const ABYSS: Color = Color::Rgb(12, 24, 36);
    pub const TROUGH: Color = Color::Rgb(28, 44, 60);

    /// Titles, focused borders and the cursor row
    pub const TIDE: Color = Color::Rgb(0, 175, 215);
    /// Chosen values and section headings
    pub const SAND: Color = Color::Rgb(240, 200, 120);

    pub const KELP: Color = Color::Rgb(90, 200, 120);
    pub const CORAL: Color = Color::Rgb(255, 140, 90);
    pub const REEF: Color = Color::Rgb(230, 70, 80);
    pub const LAGOON: Color = Color::Rgb(80, 140, 230);
}

// =============================================================================
// STYLES
// =============================================================================

fn fg(color: Color) -> Style {
    Style::new().fg(color)
}

fn bold(color: Color) -> Style {
    fg(color).add_modifier(Modifier::BOLD)
}

pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        fg(Colors::FOAM)
    }

    pub fn text_secondary() -> Style {
        fg(Colors::MIST)
    }

    pub fn text_muted() -> Style {
        fg(Colors::SLATE)
    }

    pub fn title() -> Style {
        bold(Colors::TIDE)
    }

    pub fn section() -> Style {
        bold(Colors::SAND)
    }

    pub fn border(active: bool) -> Style {
        fg(if active { Colors::TIDE } else { Colors::SLATE })
    }

    /// List row under the cursor
    pub fn cursor() -> Style {
        bold(Colors::ABYSS).bg(Colors::TIDE)
    }

    /// Row holding the value currently stored in the record
    pub fn chosen() -> Style {
        bold(Colors::KELP)
    }

    pub fn success() -> Style {
        fg(Colors::KELP)
    }

    pub fn warning() -> Style {
        fg(Colors::CORAL)
    }

    pub fn error() -> Style {
        fg(Colors::REEF)
    }

    pub fn progress() -> Style {
        fg(Colors::TIDE).bg(Colors::TROUGH)
    }

    pub fn key_hint() -> Style {
        bold(Colors::SAND)
    }

    /// Wizard step marker in the header
    pub fn step(completed: bool, active: bool) -> Style {
        match (active, completed) {
            (true, _) => bold(Colors::SAND),
            (false, true) => fg(Colors::KELP),
            (false, false) => fg(Colors::SLATE),
        }
    }

    pub fn strength(strength: PasswordStrength) -> Style {
        fg(match strength {
            PasswordStrength::None => Colors::SLATE,
            PasswordStrength::Weak => Colors::REEF,
            PasswordStrength::Fair => Colors::CORAL,
            PasswordStrength::Good => Colors::LAGOON,
            PasswordStrength::Strong => Colors::KELP,
        })
    }
}
