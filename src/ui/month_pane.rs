use crate::app::DashboardApp;
use crate::domain::{format_duration, hue_for};
use crate::persistence::TaskStore;
use crate::report::{day_total, group_by_date, target_percentage, CalendarEntry};
use crate::ui::styles::{border_style, default_style, done_style, task_style, title_style};
use chrono::{Datelike, TimeZone};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// One calendar row: date, total, target percentage and a dot per task
fn create_day_line<'a>(date: &str, entries: &'a [CalendarEntry], target_hours: f64) -> Line<'a> {
    let total = day_total(entries);
    let pct = target_percentage(total, target_hours);
    let total_style = if pct >= 100.0 { done_style() } else { default_style() };

    let mut spans = vec![
        Span::styled(format!("{}  ", date), title_style()),
        Span::styled(format!("{:>8}  ", format_duration(total)), total_style),
        Span::styled(format!("{:>4.0}%  ", pct), total_style),
    ];
    for entry in entries {
        spans.push(Span::styled("● ", task_style(hue_for(&entry.task.name))));
        spans.push(Span::raw(format!("{}  ", entry.task.name)));
    }

    Line::from(spans)
}

/// Render the current month's days, most recent first
pub fn render_month_pane<S: TaskStore, Tz: TimeZone>(
    f: &mut Frame,
    app: &DashboardApp<S, Tz>,
    area: Rect,
) {
    let today = app.today();
    let days = group_by_date(&app.history, today.year(), today.month(), app.tz());

    let items: Vec<ListItem> = days
        .iter()
        .rev()
        .map(|(date, entries)| ListItem::new(create_day_line(date, entries, app.target_hours)))
        .collect();

    let title = format!(" {} ({} days) ", today.format("%B %Y"), days.len());

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}
