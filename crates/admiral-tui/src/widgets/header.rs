//! View tab bar

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

use admiral_app::state::{AppState, View};

use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            Line::from(vec![
                Span::styled(format!("{} ", i + 1), theme::dim()),
                Span::raw(view.title()),
            ])
        })
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == state.view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(theme::title())
        .style(Style::default())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" admiral ", theme::title())),
        );

    frame.render_widget(tabs, area);
}
