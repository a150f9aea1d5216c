//! Confirmation dialog rendering

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use admiral_app::confirm_dialog::ConfirmDialogState;

use crate::layout::centered;
use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, dialog: &ConfirmDialogState) {
    let width = (dialog.message.len() as u16 + 6).clamp(36, area.width);
    let rect = centered(area, width, 7);

    let mut option_spans = vec![Span::raw(" ")];
    for (i, (label, _)) in dialog.options.iter().enumerate() {
        let style = if i == dialog.selected {
            theme::selected_row()
        } else {
            theme::dim()
        };
        option_spans.push(Span::styled(format!("[ {label} ]"), style));
        option_spans.push(Span::raw("  "));
    }

    let status = if dialog.submitting {
        Line::styled("working…", theme::dim())
    } else {
        Line::raw("")
    };

    let lines = vec![
        Line::raw(dialog.message.clone()),
        Line::raw(""),
        Line::from(option_spans),
        status,
    ];

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(format!(" {} ", dialog.title), theme::title())),
        ),
        rect,
    );
}
