//! Bottom status line: connection state, key hints, rescan progress

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use admiral_app::state::{AppState, Phase, View};

use crate::theme;

fn hints_for(view: View) -> &'static str {
    match view {
        View::Summary => "1-7 views  r refresh  q quit",
        View::Credentials => "tab active/inactive  n new  e edit  d delete  g regen  r refresh",
        View::Users => "tab active/inactive  n new  e edit  d delete  r refresh",
        View::Environments => "e limits  s rescan  r refresh",
        View::Presets => "n new  e edit  d delete  r refresh",
        View::Registries => "n new  e edit  d delete  t toggle  r refresh",
        View::UserSettings => "tab next field  enter apply  esc back",
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![];

    match state.phase {
        Phase::Connecting => spans.push(Span::styled("connecting…", theme::dim())),
        Phase::Ready => spans.push(Span::styled(
            format!("cluster {}", state.server_version),
            theme::title(),
        )),
        Phase::Quitting => spans.push(Span::styled("quitting…", theme::dim())),
    }

    if state.masking_enabled() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("[masked]", theme::dim()));
    }

    if let Some(rescan) = &state.environments.rescan {
        spans.push(Span::raw("  "));
        let progress = if rescan.total > 0 {
            format!("rescan {}/{}", rescan.current, rescan.total)
        } else {
            "rescan running…".to_string()
        };
        spans.push(Span::styled(progress, theme::field_label(true)));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(hints_for(state.view), theme::dim()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
