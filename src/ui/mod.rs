pub mod keybindings;
pub mod layout;
pub mod month_pane;
pub mod styles;
pub mod timer_pane;
pub mod today_pane;

use crate::app::DashboardApp;
use crate::persistence::TaskStore;
use chrono::TimeZone;
use keybindings::render_keybindings;
use layout::create_layout;
use month_pane::render_month_pane;
use ratatui::{text::Span, widgets::Paragraph, Frame};
use styles::error_style;
use timer_pane::render_timer_pane;
use today_pane::render_today_pane;

/// Main render function - draws the entire dashboard
pub fn render<S: TaskStore, Tz: TimeZone>(f: &mut Frame, app: &DashboardApp<S, Tz>) {
    let layout = create_layout(f.size());

    render_keybindings(f, layout.keybindings_area);
    render_timer_pane(f, app, layout.timer_area);
    render_today_pane(f, app, layout.today_area);
    render_month_pane(f, app, layout.month_area);

    if let Some(status) = &app.status {
        let line = Paragraph::new(Span::styled(format!(" {}", status), error_style()));
        f.render_widget(line, layout.status_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use crate::persistence::MemoryStore;
    use crate::tracker::Tracker;
    use chrono::{Duration, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_render_running_dashboard() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let mut finished = Task::new("Review", start - Duration::hours(2));
        finished.finalize(start - Duration::minutes(30));
        let store = MemoryStore {
            active: Some(Task::new("Writing", start)),
            tasks: vec![finished],
        };
        let mut app = DashboardApp::new(Tracker::new(store), Utc, 8.0, start);
        app.tick(start + Duration::seconds(3725));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("RUNNING"));
        assert!(text.contains("Writing"));
        assert!(text.contains("01:02:05"));
        assert!(text.contains("2024-03-15"));
        assert!(text.contains("1h 30m"));
        assert!(text.contains("March 2024"));
    }

    #[test]
    fn test_render_idle_with_status() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let mut app = DashboardApp::new(Tracker::new(MemoryStore::default()), Utc, 8.0, now);
        app.stop(now);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("IDLE"));
        assert!(text.contains("No task in progress"));
    }
}
