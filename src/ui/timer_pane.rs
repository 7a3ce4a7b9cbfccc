use crate::app::DashboardApp;
use crate::domain::{format_clock, format_duration, hue_for, TimerState};
use crate::persistence::TaskStore;
use crate::ui::styles::{
    border_style, default_style, idle_style, paused_style, running_style, task_style, title_style,
};
use chrono::TimeZone;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn state_style(state: TimerState) -> Style {
    match state {
        TimerState::Running => running_style(),
        TimerState::Paused => paused_style(),
        TimerState::Idle => idle_style(),
    }
}

/// Render the active task with its live clock
pub fn render_timer_pane<S: TaskStore, Tz: TimeZone>(
    f: &mut Frame,
    app: &DashboardApp<S, Tz>,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Timer ", title_style()));

    let state = app.state();
    let task = match &app.current {
        Some(task) => task,
        None => {
            let idle = Paragraph::new(vec![
                Line::from(Span::styled(state.to_tag(), state_style(state))),
                Line::raw(""),
                Line::raw("No task in progress. Start one with `timecard start <name>`."),
            ])
            .block(block);
            f.render_widget(idle, area);
            return;
        }
    };

    let started = task
        .start_time
        .with_timezone(app.tz())
        .naive_local()
        .format("%H:%M");

    let mut paused = task.paused_duration;
    if let Some(pause_start) = task.pause_start_time {
        paused += (app.now - pause_start).num_milliseconds().max(0);
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", state.to_tag()), state_style(state)),
            Span::styled("● ", task_style(hue_for(&task.name))),
            Span::styled(task.name.clone(), default_style()),
        ]),
        Line::raw(""),
        Line::from(Span::styled(format_clock(app.elapsed()), state_style(state))),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Started: ", title_style()),
            Span::raw(format!("{}   ", started)),
            Span::styled("Paused: ", title_style()),
            Span::raw(format_duration(paused)),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}
