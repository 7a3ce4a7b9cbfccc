use crate::app::DashboardApp;
use crate::domain::format_duration;
use crate::persistence::TaskStore;
use crate::report::target_percentage;
use crate::ui::styles::{border_style, gauge_style, title_style};
use chrono::TimeZone;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Render today's progress against the daily target
///
/// The gauge includes the active task when it started today, so the bar moves
/// while the timer runs; the figures below it only count finished tasks, like
/// the calendar does.
pub fn render_today_pane<S: TaskStore, Tz: TimeZone>(
    f: &mut Frame,
    app: &DashboardApp<S, Tz>,
    area: Rect,
) {
    let stats = app.statistics();
    let live_total = app.live_today_total(&stats);
    let live_pct = target_percentage(live_total, stats.target_hours);

    let gauge = Gauge::default()
        .gauge_style(gauge_style())
        .percent(live_pct.clamp(0.0, 100.0) as u16)
        .label(format!("{:.0}%", live_pct));

    let lines = vec![
        Line::from(vec![
            Span::styled("Today: ", title_style()),
            Span::raw(format!(
                "{}h {}m / {}h ({:.0}%)",
                stats.today_hours, stats.today_minutes, stats.target_hours, stats.today_percentage
            )),
        ]),
        Line::from(vec![
            Span::styled("This month: ", title_style()),
            Span::raw(format!("{} tasks", stats.month_count)),
        ]),
        Line::from(vec![
            Span::styled("Daily average: ", title_style()),
            Span::raw(format_duration(stats.daily_average)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Today ", title_style()));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacing
            Constraint::Min(3),    // Figures
        ])
        .split(block.inner(area));

    f.render_widget(block, area);
    f.render_widget(gauge, chunks[0]);
    f.render_widget(Paragraph::new(lines), chunks[2]);
}
