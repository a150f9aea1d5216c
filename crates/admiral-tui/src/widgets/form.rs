//! Generic form dialog rendering
//!
//! Dialog state lives in admiral-app; this module only turns a list of
//! display fields into a centered overlay. Secret fields render as `*`
//! runs of the same length.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use admiral_app::dialogs::DialogPhase;

use crate::layout::centered;
use crate::theme;

/// One row of a rendered form.
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub error: Option<String>,
    pub focused: bool,
    pub secret: bool,
}

impl FormField {
    pub fn text(label: &'static str, value: &str, error: Option<&str>, focused: bool) -> Self {
        Self {
            label,
            value: value.to_string(),
            error: error.map(str::to_string),
            focused,
            secret: false,
        }
    }

    pub fn secret(label: &'static str, value: &str, error: Option<&str>, focused: bool) -> Self {
        Self {
            secret: true,
            ..Self::text(label, value, error, focused)
        }
    }

    pub fn choice(label: &'static str, value: &str, focused: bool) -> Self {
        Self {
            label,
            value: format!("◂ {value} ▸"),
            error: None,
            focused,
            secret: false,
        }
    }

    pub fn flag(label: &'static str, on: bool, focused: bool) -> Self {
        Self {
            label,
            value: if on { "[x]" } else { "[ ]" }.to_string(),
            error: None,
            focused,
            secret: false,
        }
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    fields: &[FormField],
    phase: DialogPhase,
) {
    let height = (fields.len() as u16) * 2 + 4;
    let rect = centered(area, 52, height);

    let mut lines = Vec::new();
    for field in fields {
        let shown = if field.secret {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let cursor = if field.focused { "▌" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<14}", field.label),
                theme::field_label(field.focused),
            ),
            Span::raw(shown),
            Span::styled(cursor, theme::field_label(true)),
        ]));
        match &field.error {
            Some(error) => lines.push(Line::styled(format!("  {error}"), theme::error_text())),
            None => lines.push(Line::raw("")),
        }
    }

    let footer = match phase {
        DialogPhase::Submitting => Line::styled("submitting…", theme::dim()),
        DialogPhase::Open => Line::styled("enter submit  esc cancel  tab next field", theme::dim()),
    };
    lines.push(footer);

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(format!(" {title} "), theme::title())),
        ),
        rect,
    );
}
