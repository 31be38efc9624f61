//! User interface rendering
//!
//! Stateless: every frame is drawn from the [`App`]'s wizard and
//! presentation state.
//! - `screens` - one renderer per wizard screen
//! - `install` - progress view for the running installation

mod install;
mod screens;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, AppMode, AppState, DiskFocus, KeyboardFocus, NetworkFocus};
use crate::theme::Styles;
use crate::types::ScreenId;
use crate::wizard::WizardController;

/// Draw one frame.
pub fn render(f: &mut Frame, app: &App) {
    let [header, body, status, hints] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(8),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let wizard = app.wizard();
    let state = app.state();
    render_header(f, header, wizard);

    let record = wizard.current_record();
    match wizard.current_screen().id {
        ScreenId::Welcome => screens::render_welcome(f, body),
        ScreenId::Language => screens::render_language(f, body, record, state),
        ScreenId::Timezone => screens::render_timezone(f, body, record, state),
        ScreenId::Keyboard => screens::render_keyboard(f, body, record, state),
        ScreenId::Disk => screens::render_disk(f, body, record, state),
        ScreenId::Network => screens::render_network(f, body, record, state),
        ScreenId::User => screens::render_user(f, body, record, state),
        ScreenId::Install => match &state.progress {
            Some(progress) => install::render_progress(f, body, progress),
            None => screens::render_review(f, body, wizard),
        },
    }

    render_status(f, status, state);
    render_hints(f, hints, wizard, state);
}

/// Title, subtitle and the step markers.
fn render_header(f: &mut Frame, area: Rect, wizard: &WizardController) {
    let screen = wizard.current_screen();
    let nav = wizard.navigation();

    let mut steps: Vec<Span> = wizard
        .screens()
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let done = i < nav.current_index();
            let active = i == nav.current_index();
            let marker = match (done, active) {
                (_, true) => "◉ ",
                (true, false) => "● ",
                (false, false) => "○ ",
            };
            Span::styled(marker, Styles::step(done, active))
        })
        .collect();
    steps.push(Span::styled(
        format!(" Step {} of {}", nav.step_number(), nav.screen_count()),
        Styles::text_muted(),
    ));

    let header = Paragraph::new(vec![
        Line::from(Span::styled(screen.title, Styles::title())),
        Line::from(Span::styled(screen.subtitle, Styles::text_secondary())),
        Line::from(steps),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM).border_style(Styles::border(false)));
    f.render_widget(header, area);
}

fn render_status(f: &mut Frame, area: Rect, state: &AppState) {
    let style = if state.status_is_error {
        Styles::error()
    } else {
        Styles::success()
    };
    f.render_widget(
        Paragraph::new(format!(" {}", state.status_message)).style(style),
        area,
    );
}

/// Key hints for what the current screen accepts.
fn render_hints(f: &mut Frame, area: Rect, wizard: &WizardController, state: &AppState) {
    let hints: &[(&str, &str)] = match state.mode {
        AppMode::Installing => &[("Ctrl+Q", "Disabled during installation")],
        AppMode::Finished => &[("Enter", "Exit")],
        AppMode::Wizard => match wizard.current_screen().id {
            ScreenId::Welcome => &[("Enter", "Get Started"), ("Ctrl+Q", "Quit")],
            ScreenId::Language | ScreenId::Timezone => {
                &[("↑/↓", "Choose"), ("Enter", "Continue"), ("Esc", "Back")]
            }
            ScreenId::Keyboard => match state.keyboard_focus {
                KeyboardFocus::Layout => &[
                    ("↑/↓", "Layout"),
                    ("Tab", "Variants"),
                    ("Enter", "Continue"),
                    ("Esc", "Back"),
                ],
                KeyboardFocus::Variant => &[
                    ("↑/↓", "Variant"),
                    ("Tab", "Layouts"),
                    ("Enter", "Continue"),
                    ("Esc", "Back"),
                ],
            },
            ScreenId::Disk => match state.disk_focus {
                DiskFocus::Disks => &[
                    ("↑/↓", "Move"),
                    ("Space", "Select disk"),
                    ("Tab", "Partitioning"),
                    ("Enter", "Continue"),
                    ("Esc", "Back"),
                ],
                DiskFocus::Scheme => &[
                    ("↑/↓", "Scheme"),
                    ("Tab", "Disks"),
                    ("Enter", "Continue"),
                    ("Esc", "Back"),
                ],
            },
            ScreenId::Network => match state.network_focus {
                NetworkFocus::List => &[
                    ("↑/↓", "Move"),
                    ("Space", "Select"),
                    ("←/→", "Ethernet/Wi-Fi"),
                    ("Tab", "Password"),
                    ("Enter", "Continue"),
                    ("Esc", "Back"),
                ],
                NetworkFocus::Password => &[
                    ("Type", "Wi-Fi password"),
                    ("Tab", "Networks"),
                    ("Enter", "Continue"),
                    ("Esc", "Back"),
                ],
            },
            ScreenId::User => &[
                ("Tab", "Next field"),
                ("Space", "Toggle"),
                ("Enter", "Continue"),
                ("Esc", "Back"),
            ],
            ScreenId::Install => &[("Enter", "Install"), ("Esc", "Back"), ("Ctrl+Q", "Quit")],
        },
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!(" [{}] ", key), Styles::key_hint()),
                Span::styled(format!("{}  ", action), Styles::text_muted()),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::InstallerConfig;
    use crate::inventory::MockInventory;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    pub(crate) fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).expect("test terminal");
        terminal.draw(|f| render(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App::new(InstallerConfig::default(), Box::new(MockInventory), None, None)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .expect("key handled");
    }

    #[test]
    fn test_welcome_frame() {
        let screen = draw(&app());
        assert!(screen.contains("Welcome to Wave OS"));
        assert!(screen.contains("Step 1 of 8"));
        assert!(screen.contains("Get Started"));
    }

    #[test]
    fn test_validation_error_on_status_line() {
        let mut app = app();
        for _ in 0..4 {
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Enter);
        let screen = draw(&app);
        assert!(screen.contains("Select Installation Disk"));
        assert!(screen.contains("Disk is required"));
        assert!(screen.contains("Samsung SSD 970 EVO Plus"));
    }
}
