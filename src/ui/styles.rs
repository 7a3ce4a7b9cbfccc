use crate::domain::hue_to_rgb;
use ratatui::style::{Color, Modifier, Style};

/// Default text style
pub fn default_style() -> Style {
    Style::default().fg(Color::White)
}

/// Running status badge style
pub fn running_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

/// Paused status badge style
pub fn paused_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Idle status badge style
pub fn idle_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Title style for panes
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Target gauge style
pub fn gauge_style() -> Style {
    Style::default().fg(Color::Green).bg(Color::DarkGray)
}

/// Error message style
pub fn error_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Day that reached the daily target
pub fn done_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Foreground in the task's own hue
pub fn task_style(hue: u16) -> Style {
    let (r, g, b) = hue_to_rgb(hue);
    Style::default()
        .fg(Color::Rgb(r, g, b))
        .add_modifier(Modifier::BOLD)
}
