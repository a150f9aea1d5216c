//! Toast notification rendering (bottom-right stack)

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use admiral_app::toast::{Toast, ToastSeverity};

use crate::theme;

const TOAST_WIDTH: u16 = 44;

fn toast_style(toast: &Toast) -> Style {
    match toast.severity {
        ToastSeverity::Info => theme::dim(),
        ToastSeverity::Success => Style::default().fg(theme::SUCCESS),
        ToastSeverity::Error => Style::default().fg(theme::ERROR),
    }
}

pub fn render(frame: &mut Frame, area: Rect, toasts: &[Toast]) {
    let width = TOAST_WIDTH.min(area.width);
    let mut bottom = area.y + area.height.saturating_sub(1);

    // Newest toast closest to the bottom edge
    for toast in toasts.iter().rev() {
        let height = if toast.detail.is_some() { 4 } else { 3 };
        if bottom < area.y + height {
            break;
        }
        let rect = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            bottom.saturating_sub(height),
            width,
            height,
        );

        let mut lines = vec![Line::styled(toast.text.clone(), toast_style(toast))];
        if let Some(detail) = &toast.detail {
            lines.push(Line::styled(detail.clone(), theme::dim()));
        }

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
            rect,
        );
        bottom = rect.y;
    }
}
