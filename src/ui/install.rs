//! Installation progress view.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use crate::pipeline::PipelineOutcome;
use crate::progress::ProgressView;
use crate::theme::Styles;

/// Gauge, time remaining, stage count and the newest log lines.
pub fn render_progress(f: &mut Frame, area: Rect, view: &ProgressView) {
    let [gauge_area, info_area, log_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    let title_style = match view.outcome() {
        Some(PipelineOutcome::Completed) => Styles::success(),
        Some(PipelineOutcome::Failed { .. }) => Styles::error(),
        None => Styles::title(),
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(format!(" {} ", view.status_text()), title_style)),
        )
        .gauge_style(Styles::progress())
        .percent(u16::from(view.percent()));
    f.render_widget(gauge, gauge_area);

    let remaining = match view.outcome() {
        Some(PipelineOutcome::Completed) => "Complete".to_string(),
        Some(PipelineOutcome::Failed { .. }) => "Stopped".to_string(),
        None => view.remaining_text(),
    };
    let info = Line::from(vec![
        Span::styled(format!("  {}", remaining), Styles::text()),
        Span::styled(
            format!(
                "    Stage {}/{}",
                view.stages_completed(),
                view.stage_count()
            ),
            Styles::text_secondary(),
        ),
    ]);
    f.render_widget(Paragraph::new(info), info_area);

    // Newest lines at the bottom; only as many as fit
    let visible = usize::from(log_area.height.saturating_sub(2));
    let skip = view.log_lines().len().saturating_sub(visible);
    let items: Vec<ListItem> = view
        .log_lines()
        .skip(skip)
        .map(|line| {
            let style = if line.contains("Failed:") {
                Styles::error()
            } else {
                Styles::text_secondary()
            };
            ListItem::new(line.to_string()).style(style)
        })
        .collect();
    let log = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border(false))
            .title(" Installation Log "),
    );
    f.render_widget(log, log_area);
}
