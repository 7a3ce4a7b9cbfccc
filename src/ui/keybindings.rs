use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::raw(" p pause/resume   "),
        Span::raw("s stop   "),
        Span::raw("r reload   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
