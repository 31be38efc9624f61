//! Wizard screen renderers.
//!
//! Each renderer reads the current screen's record for chosen values and
//! the [`AppState`] for cursors and focus. Nothing here mutates state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

use crate::app::{AppState, DiskFocus, KeyboardFocus, NetworkFocus, UserField};
use crate::inventory::{KEYBOARD_LAYOUTS, LANGUAGES, TIMEZONES, keyboard_variants};
use crate::record::ScreenRecord;
use crate::theme::Styles;
use crate::types::{ConnectionType, PartitionScheme};
use crate::validation::{PasswordStrength, password_strength};
use crate::wizard::WizardController;

fn value<'a>(record: Option<&'a ScreenRecord>, field: &str) -> &'a str {
    record.map(|r| r.trimmed(field)).unwrap_or("")
}

/// A bordered list with a cursor row. Rows whose `chosen` flag is set are
/// marked with a check.
fn render_picker(
    f: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<(String, bool)>,
    cursor: usize,
    focused: bool,
) {
    let items: Vec<ListItem> = rows
        .into_iter()
        .map(|(text, chosen)| {
            let (marker, style) = if chosen {
                ("✓ ", Styles::chosen())
            } else {
                ("  ", Styles::text())
            };
            ListItem::new(format!("{}{}", marker, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border(focused))
                .title(format!(" {} ", title))
                .title_style(Styles::section()),
        )
        .highlight_style(if focused { Styles::cursor() } else { Style::default() });

    let mut list_state = ListState::default();
    list_state.select(Some(cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

// ============================================================================
// Welcome
// ============================================================================

pub fn render_welcome(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Let's get your system set up quickly and easily",
            Styles::text(),
        )),
        Line::from(""),
        Line::from(Span::styled("You will choose:", Styles::section())),
        Line::from("  Language, timezone and keyboard layout"),
        Line::from("  The disk to install to"),
        Line::from("  A network connection (optional)"),
        Line::from("  Your user account"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Note: ", Styles::warning()),
            Span::styled(
                "the selected disk will be erased during installation.",
                Styles::text_secondary(),
            ),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ============================================================================
// Language / Timezone
// ============================================================================

pub fn render_language(f: &mut Frame, area: Rect, record: Option<&ScreenRecord>, state: &AppState) {
    let chosen = value(record, "language");
    let rows = LANGUAGES
        .iter()
        .map(|l| (format!("{:<22} {:<12} {}", l.name, l.native, l.code), l.code == chosen))
        .collect();
    render_picker(f, area, "Languages", rows, state.language_cursor, true);
}

pub fn render_timezone(f: &mut Frame, area: Rect, record: Option<&ScreenRecord>, state: &AppState) {
    let chosen = value(record, "timezone");
    let rows = TIMEZONES
        .iter()
        .map(|t| (format!("{:<10} {:<32} {}", t.region, t.display, t.zone), t.zone == chosen))
        .collect();
    render_picker(f, area, "Timezones", rows, state.timezone_cursor, true);
}

// ============================================================================
// Keyboard
// ============================================================================

pub fn render_keyboard(f: &mut Frame, area: Rect, record: Option<&ScreenRecord>, state: &AppState) {
    let [layouts_area, variants_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let layout = value(record, "layout");
    let variant = value(record, "variant");

    let rows = KEYBOARD_LAYOUTS
        .iter()
        .map(|k| (format!("{} ({})", k.name, k.code), k.code == layout))
        .collect();
    render_picker(
        f,
        layouts_area,
        "Layouts",
        rows,
        state.layout_cursor,
        state.keyboard_focus == KeyboardFocus::Layout,
    );

    let rows = keyboard_variants(layout)
        .iter()
        .map(|k| (k.name.to_string(), k.code == variant))
        .collect();
    render_picker(
        f,
        variants_area,
        "Variants",
        rows,
        state.variant_cursor,
        state.keyboard_focus == KeyboardFocus::Variant,
    );
}

// ============================================================================
// Disk
// ============================================================================

/// Disk list with the erase warning, plus the partitioning choice.
pub fn render_disk(f: &mut Frame, area: Rect, record: Option<&ScreenRecord>, state: &AppState) {
    let [warning_area, disks_area, scheme_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(4),
    ])
    .areas(area);

    let warning = Paragraph::new(Line::from(vec![
        Span::styled("  WARNING: ", Styles::error()),
        Span::styled(
            "The selected disk will be COMPLETELY ERASED! Verify model and size.",
            Styles::warning(),
        ),
    ]));
    f.render_widget(warning, warning_area);

    let device = value(record, "device");
    if state.disks.is_empty() {
        f.render_widget(
            Paragraph::new("  No disks detected. Check your hardware.").style(Styles::warning()),
            disks_area,
        );
    } else {
        let rows = state
            .disks
            .iter()
            .map(|d| (d.display_line(), d.device.to_string_lossy() == device))
            .collect();
        render_picker(
            f,
            disks_area,
            "Available Disks",
            rows,
            state.disk_cursor,
            state.disk_focus == DiskFocus::Disks,
        );
    }

    let scheme = value(record, "partition_scheme");
    let rows = PartitionScheme::iter()
        .map(|s| (s.label().to_string(), s.to_string() == scheme))
        .collect();
    render_picker(
        f,
        scheme_area,
        "Partitioning",
        rows,
        state.scheme_cursor,
        state.disk_focus == DiskFocus::Scheme,
    );
}

// ============================================================================
// Network
// ============================================================================

pub fn render_network(f: &mut Frame, area: Rect, record: Option<&ScreenRecord>, state: &AppState) {
    let connection = value(record, "connection");
    let asks_password = !connection.is_empty() && value(record, "secured") == "true";

    let [tabs_area, list_area, password_area, note_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(if asks_password { 3 } else { 0 }),
        Constraint::Length(1),
    ])
    .areas(area);

    let tab = |kind: ConnectionType, label: &'static str| {
        if state.network_kind == kind {
            Span::styled(format!(" [{}] ", label), Styles::title())
        } else {
            Span::styled(format!("  {}  ", label), Styles::text_muted())
        }
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            tab(ConnectionType::Ethernet, "Ethernet"),
            tab(ConnectionType::Wifi, "Wi-Fi"),
        ]))
        .alignment(Alignment::Center),
        tabs_area,
    );

    let chosen_kind = value(record, "connection_type");
    let rows = state
        .networks
        .iter()
        .map(|n| {
            let chosen = n.name == connection && n.kind.to_string() == chosen_kind;
            (n.to_string(), chosen)
        })
        .collect();
    let title = match state.network_kind {
        ConnectionType::Ethernet => "Wired Connections",
        ConnectionType::Wifi => "Wireless Networks",
    };
    let list_focused = state.network_focus == NetworkFocus::List;
    render_picker(f, list_area, title, rows, state.network_cursor, list_focused);

    if asks_password {
        let passphrase = record.and_then(|r| r.get("wifi_password")).unwrap_or("");
        let cursor = if list_focused { "" } else { "_" };
        f.render_widget(
            Paragraph::new(format!(" {}{}", "*".repeat(passphrase.chars().count()), cursor))
                .style(Styles::text())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Styles::border(!list_focused))
                        .title(" Wi-Fi Password "),
                ),
            password_area,
        );
    }

    let note = if connection.is_empty() {
        Span::styled(
            "  No network selected. You can skip this step and configure it later.",
            Styles::text_muted(),
        )
    } else {
        Span::styled(format!("  Selected: {}", connection), Styles::success())
    };
    f.render_widget(Paragraph::new(Line::from(note)), note_area);
}

// ============================================================================
// User Account
// ============================================================================

/// Account form. Passwords are masked; a strength label follows the password.
pub fn render_user(f: &mut Frame, area: Rect, record: Option<&ScreenRecord>, state: &AppState) {
    let fields = UserField::all();
    let mut constraints: Vec<Constraint> = fields
        .iter()
        .map(|field| {
            if field.is_toggle() {
                Constraint::Length(1)
            } else {
                Constraint::Length(3)
            }
        })
        .collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(area);

    for (i, field) in fields.iter().enumerate() {
        let focused = *field == state.user_field;
        let raw = record.and_then(|r| r.get(field.key())).unwrap_or("");

        if field.is_toggle() {
            let mark = if raw == "true" { "[x]" } else { "[ ]" };
            let style = if focused { Styles::title() } else { Styles::text() };
            f.render_widget(
                Paragraph::new(format!("  {} {}", mark, field.label())).style(style),
                rows[i],
            );
            continue;
        }

        let shown = if field.is_password() {
            "*".repeat(raw.chars().count())
        } else {
            raw.to_string()
        };
        let cursor = if focused { "_" } else { "" };
        let mut spans = vec![Span::styled(format!(" {}{}", shown, cursor), Styles::text())];

        if *field == UserField::Password && !raw.is_empty() {
            let strength = PasswordStrength::from_score(password_strength(raw));
            spans.push(Span::styled(format!("   {}", strength.label()), Styles::strength(strength)));
        }
        if *field == UserField::ConfirmPassword && !raw.is_empty() {
            let password = record.and_then(|r| r.get("password")).unwrap_or("");
            spans.push(if raw == password {
                Span::styled("   Passwords match", Styles::success())
            } else {
                Span::styled("   Passwords do not match", Styles::error())
            });
        }

        let widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border(focused))
                .title(format!(" {} ", field.label())),
        );
        f.render_widget(widget, rows[i]);
    }
}

// ============================================================================
// Review (install trigger, before hand-off)
// ============================================================================

/// Summary of every choice, or the first problem blocking installation.
pub fn render_review(f: &mut Frame, area: Rect, wizard: &WizardController) {
    let mut lines = vec![Line::from("")];
    match wizard.preview_plan() {
        Ok(plan) => {
            for (label, value) in plan.summary() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<10}", label), Styles::section()),
                    Span::styled(value, Styles::text()),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Press Enter to begin the installation.",
                Styles::title(),
            )));
        }
        Err(e) => {
            lines.push(Line::from(Span::styled(
                format!("  The {} screen needs attention:", e.screen),
                Styles::error(),
            )));
            for reason in &e.reasons {
                lines.push(Line::from(format!("    - {}", reason)));
            }
        }
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border(true))
                .title(" Ready to Install ")
                .title_style(Styles::section()),
        ),
        area,
    );
}
