use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Dashboard layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub timer_area: Rect,
    pub today_area: Rect,
    pub month_area: Rect,
    pub status_area: Rect,
}

/// Create the dashboard layout
/// - Top bar: keybindings (1 row)
/// - Upper area: Timer (60%) | Today (40%)
/// - Lower area: month calendar
/// - Bottom bar: status line (1 row)
pub fn create_layout(area: Rect) -> MainLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Length(8), // Timer + today
            Constraint::Min(0),    // Month calendar
            Constraint::Length(1), // Status line
        ])
        .split(area);

    let upper = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // Timer pane
            Constraint::Percentage(40), // Today pane
        ])
        .split(main_chunks[1]);

    MainLayout {
        keybindings_area: main_chunks[0],
        timer_area: upper[0],
        today_area: upper[1],
        month_area: main_chunks[2],
        status_area: main_chunks[3],
    }
}
