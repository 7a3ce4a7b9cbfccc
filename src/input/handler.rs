use crate::app::DashboardApp;
use crate::persistence::TaskStore;
use chrono::{DateTime, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle a key press at `now`; returns true when the dashboard should exit
pub fn handle_key<S: TaskStore, Tz: TimeZone>(
    app: &mut DashboardApp<S, Tz>,
    key: KeyEvent,
    now: DateTime<Utc>,
) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.toggle_pause(now);
            false
        }
        KeyCode::Char('s') => {
            app.stop(now);
            false
        }
        KeyCode::Char('r') => {
            app.status = None;
            app.reload();
            false
        }
        _ => false,
    }
}
