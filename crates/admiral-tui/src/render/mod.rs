//! Main render/view function (View in TEA pattern)

pub mod rows;

use chrono::Utc;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use admiral_app::dialogs::{CredentialDialog, DialogPhase, UserDialog};
use admiral_app::state::{AppState, CredentialTab, GridState, SettingsFocus, View};
use admiral_core::ListCondition;

use crate::widgets::form::{self, FormField};
use crate::widgets::{confirm_dialog, header, status_bar, toasts};
use crate::{layout, theme};

/// Render the complete UI (View function in TEA)
///
/// Pure rendering: reads state, never mutates it.
pub fn view(frame: &mut Frame, state: &AppState) {
    let areas = layout::create(frame.area());

    header::render(frame, areas.header, state);

    match state.view {
        View::Summary => render_summary(frame, areas.content, state),
        View::Credentials => render_credentials(frame, areas.content, state),
        View::Users => render_users(frame, areas.content, state),
        View::Environments => render_environments(frame, areas.content, state),
        View::Presets => render_presets(frame, areas.content, state),
        View::Registries => render_registries(frame, areas.content, state),
        View::UserSettings => render_user_settings(frame, areas.content, state),
    }

    status_bar::render(frame, areas.status, state);

    render_dialog_overlay(frame, areas.content, state);

    if let Some(confirm) = &state.confirm {
        confirm_dialog::render(frame, frame.area(), confirm);
    }

    toasts::render(frame, frame.area(), state.toasts.visible());
}

// ─────────────────────────────────────────────────────────────────
// Grids
// ─────────────────────────────────────────────────────────────────

fn render_grid<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    focused: bool,
    header: &[&str],
    grid: &GridState<T>,
    cells: impl Fn(&T) -> Vec<String>,
) {
    let border_style = if focused { theme::title() } else { theme::dim() };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!(" {title} "), border_style));

    match grid.condition {
        ListCondition::Loading if grid.rows.is_empty() => {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading…", theme::dim())).block(block),
                area,
            );
        }
        ListCondition::NoData => {
            frame.render_widget(
                Paragraph::new(Line::styled("No data", theme::dim())).block(block),
                area,
            );
        }
        _ => {
            let header_row = Row::new(header.iter().map(|h| h.to_string())).style(theme::dim());
            let body = grid.rows.iter().map(|row| Row::new(cells(row)));
            let widths = vec![Constraint::Fill(1); header.len()];
            let table = Table::new(body, widths)
                .header(header_row)
                .row_highlight_style(theme::selected_row())
                .block(block);
            let mut table_state = TableState::default().with_selected(Some(grid.selected));
            frame.render_stateful_widget(table, area, &mut table_state);
        }
    }
}

fn render_credentials(frame: &mut Frame, area: Rect, state: &AppState) {
    let halves = Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).split(area);
    let masked = state.masking_enabled();
    let now = Utc::now();
    let focused_active = state.credentials.tab == CredentialTab::Active;

    render_grid(
        frame,
        halves[0],
        "Active keypairs",
        focused_active,
        &rows::KEYPAIR_HEADER,
        &state.credentials.active,
        |row| rows::keypair_cells(row, masked, now),
    );
    render_grid(
        frame,
        halves[1],
        "Inactive keypairs",
        !focused_active,
        &rows::KEYPAIR_HEADER,
        &state.credentials.inactive,
        |row| rows::keypair_cells(row, masked, now),
    );
}

fn render_users(frame: &mut Frame, area: Rect, state: &AppState) {
    let masked = state.masking_enabled();
    let title = match state.users.tab {
        admiral_app::state::UserTab::Active => "Users (active)",
        admiral_app::state::UserTab::Inactive => "Users (inactive)",
    };
    render_grid(
        frame,
        area,
        title,
        true,
        &rows::USER_HEADER,
        &state.users.grid,
        |row| rows::user_cells(row, masked),
    );
}

fn render_environments(frame: &mut Frame, area: Rect, state: &AppState) {
    render_grid(
        frame,
        area,
        "Environment images",
        true,
        &rows::IMAGE_HEADER,
        &state.environments.grid,
        rows::image_cells,
    );
}

fn render_presets(frame: &mut Frame, area: Rect, state: &AppState) {
    render_grid(
        frame,
        area,
        "Resource presets",
        true,
        &rows::PRESET_HEADER,
        &state.presets.grid,
        rows::preset_cells,
    );
}

fn render_registries(frame: &mut Frame, area: Rect, state: &AppState) {
    render_grid(
        frame,
        area,
        "Container registries",
        true,
        &rows::REGISTRY_HEADER,
        &state.registries.grid,
        rows::registry_cells,
    );
}

// ─────────────────────────────────────────────────────────────────
// Summary
// ─────────────────────────────────────────────────────────────────

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Cluster summary ", theme::title()));

    if state.summary.counts.is_none() {
        let text = match state.summary.condition {
            ListCondition::Loading => "Loading…",
            _ => "No data",
        };
        frame.render_widget(
            Paragraph::new(Line::styled(text, theme::dim())).block(block),
            area,
        );
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let counts = state.summary.counts.unwrap_or_default();
    let mut constraints = vec![Constraint::Length(2), Constraint::Length(1), Constraint::Length(1)];
    let accel_count = state
        .summary
        .usage
        .as_ref()
        .map(|u| u.accelerators.len())
        .unwrap_or(0);
    constraints.extend(std::iter::repeat(Constraint::Length(1)).take(accel_count));
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Fill(1));
    let sections = Layout::vertical(constraints).split(inner);

    frame.render_widget(
        Paragraph::new(vec![Line::from(vec![
            Span::styled("Sessions  ", theme::dim()),
            Span::raw(format!(
                "{} running, {} enqueued",
                counts.running, counts.enqueued
            )),
        ])]),
        sections[0],
    );

    if let Some(usage) = &state.summary.usage {
        render_usage_gauge(frame, sections[1], "CPU", usage.cpu);
        render_usage_gauge(frame, sections[2], "Memory", usage.mem);
        for (i, (name, slot)) in usage.accelerators.iter().enumerate() {
            render_usage_gauge(frame, sections[3 + i], name, *slot);
        }
    }

    if let Some(refreshed) = state.summary.last_refreshed {
        let idx = sections.len() - 2;
        frame.render_widget(
            Paragraph::new(Line::styled(
                format!(
                    "updated {}",
                    admiral_core::format::timestamp_display(refreshed)
                ),
                theme::dim(),
            )),
            sections[idx],
        );
    }
}

fn render_usage_gauge(frame: &mut Frame, area: Rect, label: &str, usage: admiral_core::SlotUsage) {
    let ratio = (usage.percent() / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(format!(
            "{label}: {:.1}/{:.1} ({:.0}%)",
            usage.used,
            usage.capacity,
            usage.percent()
        ))
        .gauge_style(theme::field_label(true));
    frame.render_widget(gauge, area);
}

// ─────────────────────────────────────────────────────────────────
// User settings
// ─────────────────────────────────────────────────────────────────

fn render_user_settings(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" User settings ", theme::title()));
    let form = &state.user_settings;

    let secret = |value: &str| "*".repeat(value.chars().count());
    let field_line = |label: &str, value: String, focus: SettingsFocus| {
        Line::from(vec![
            Span::styled(
                format!("{:<20}", label),
                theme::field_label(form.focus == focus),
            ),
            Span::raw(value),
        ])
    };
    let error_line = |error: &Option<String>| match error {
        Some(error) => Line::styled(format!("  {error}"), theme::error_text()),
        None => Line::raw(""),
    };

    let masking = if state.masking_enabled() { "[x]" } else { "[ ]" };
    let lines = vec![
        field_line(
            "Current password",
            secret(&form.current_password.value),
            SettingsFocus::CurrentPassword,
        ),
        error_line(&form.current_password.error),
        field_line(
            "New password",
            secret(&form.new_password.value),
            SettingsFocus::NewPassword,
        ),
        error_line(&form.new_password.error),
        field_line(
            "Confirm password",
            secret(&form.confirm_password.value),
            SettingsFocus::ConfirmPassword,
        ),
        error_line(&form.confirm_password.error),
        field_line(
            "",
            if form.changing_password {
                "[ Change password… ]".to_string()
            } else {
                "[ Change password ]".to_string()
            },
            SettingsFocus::ChangePasswordButton,
        ),
        Line::raw(""),
        field_line(
            "Preferred port",
            form.preferred_port.value.clone(),
            SettingsFocus::PreferredPort,
        ),
        error_line(&form.preferred_port.error),
        field_line("", "[ Save port ]".to_string(), SettingsFocus::SavePortButton),
        Line::raw(""),
        field_line(
            "Mask sensitive",
            masking.to_string(),
            SettingsFocus::MaskingToggle,
        ),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ─────────────────────────────────────────────────────────────────
// Dialog overlays
// ─────────────────────────────────────────────────────────────────

fn render_dialog_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.view {
        View::Credentials => {
            if let Some(dialog) = &state.credentials.dialog {
                let (title, fields, phase) = credential_fields(dialog);
                form::render(frame, area, &title, &fields, phase);
            }
        }
        View::Users => {
            if let Some(dialog) = &state.users.dialog {
                let (title, fields, phase) = user_fields(dialog);
                form::render(frame, area, &title, &fields, phase);
            }
        }
        View::Environments => {
            if let Some(dialog) = &state.environments.dialog {
                let title = format!("Limits for {}", dialog.reference);
                let fields = vec![
                    FormField::text(
                        "Min CPU",
                        &dialog.cpu_min.value,
                        dialog.cpu_min.error.as_deref(),
                        dialog.focus == 0,
                    ),
                    FormField::text(
                        "Min memory",
                        &dialog.mem_min.value,
                        dialog.mem_min.error.as_deref(),
                        dialog.focus == 1,
                    ),
                ];
                form::render(frame, area, &title, &fields, dialog.phase);
            }
        }
        View::Presets => {
            if let Some(dialog) = &state.presets.dialog {
                let title = if dialog.is_edit() {
                    format!("Edit preset {}", dialog.name.value)
                } else {
                    "New resource preset".to_string()
                };
                let fields = vec![
                    FormField::text(
                        "Name",
                        &dialog.name.value,
                        dialog.name.error.as_deref(),
                        dialog.focus == 0 && !dialog.is_edit(),
                    ),
                    FormField::text(
                        "CPU",
                        &dialog.cpu.value,
                        dialog.cpu.error.as_deref(),
                        dialog.focus == 1,
                    ),
                    FormField::text(
                        "Memory",
                        &dialog.mem.value,
                        dialog.mem.error.as_deref(),
                        dialog.focus == 2,
                    ),
                    FormField::text(
                        "Shared memory",
                        &dialog.shared_memory.value,
                        dialog.shared_memory.error.as_deref(),
                        dialog.focus == 3,
                    ),
                ];
                form::render(frame, area, &title, &fields, dialog.phase);
            }
        }
        View::Registries => {
            if let Some(dialog) = &state.registries.dialog {
                let title = if dialog.is_edit() {
                    format!("Edit registry {}", dialog.hostname.value)
                } else {
                    "New registry".to_string()
                };
                let fields = vec![
                    FormField::text(
                        "Hostname",
                        &dialog.hostname.value,
                        dialog.hostname.error.as_deref(),
                        dialog.focus == 0 && !dialog.is_edit(),
                    ),
                    FormField::text(
                        "URL",
                        &dialog.url.value,
                        dialog.url.error.as_deref(),
                        dialog.focus == 1,
                    ),
                    FormField::text(
                        "Username",
                        &dialog.username.value,
                        dialog.username.error.as_deref(),
                        dialog.focus == 2,
                    ),
                    FormField::secret(
                        "Password",
                        &dialog.password.value,
                        dialog.password.error.as_deref(),
                        dialog.focus == 3,
                    ),
                    FormField::choice("Type", dialog.kind.as_str(), dialog.focus == 4),
                    FormField::text(
                        "Project",
                        &dialog.project.value,
                        dialog.project.error.as_deref(),
                        dialog.focus == 5,
                    ),
                ];
                form::render(frame, area, &title, &fields, dialog.phase);
            }
        }
        View::Summary | View::UserSettings => {}
    }
}

fn credential_fields(dialog: &CredentialDialog) -> (String, Vec<FormField>, DialogPhase) {
    match dialog {
        CredentialDialog::Create(form) => (
            "New keypair".to_string(),
            vec![
                FormField::text(
                    "User email",
                    &form.user_id.value,
                    form.user_id.error.as_deref(),
                    form.focus == 0,
                ),
                FormField::text(
                    "Rate limit",
                    &form.rate_limit.value,
                    form.rate_limit.error.as_deref(),
                    form.focus == 1,
                ),
                FormField::text(
                    "Policy",
                    &form.resource_policy.value,
                    form.resource_policy.error.as_deref(),
                    form.focus == 2,
                ),
                FormField::flag("Admin", form.is_admin, form.focus == 3),
                FormField::flag("Active", form.is_active, form.focus == 4),
            ],
            form.phase,
        ),
        CredentialDialog::Edit(form) => (
            format!("Edit {}", form.original.access_key),
            vec![
                FormField::text(
                    "Rate limit",
                    &form.rate_limit.value,
                    form.rate_limit.error.as_deref(),
                    form.focus == 0,
                ),
                FormField::text(
                    "Policy",
                    &form.resource_policy.value,
                    form.resource_policy.error.as_deref(),
                    form.focus == 1,
                ),
                FormField::flag("Admin", form.is_admin, form.focus == 2),
                FormField::flag("Active", form.is_active, form.focus == 3),
            ],
            form.phase,
        ),
    }
}

fn user_fields(dialog: &UserDialog) -> (String, Vec<FormField>, DialogPhase) {
    match dialog {
        UserDialog::Create(form) => (
            "New user".to_string(),
            vec![
                FormField::text(
                    "Email",
                    &form.email.value,
                    form.email.error.as_deref(),
                    form.focus == 0,
                ),
                FormField::text(
                    "Username",
                    &form.username.value,
                    form.username.error.as_deref(),
                    form.focus == 1,
                ),
                FormField::secret(
                    "Password",
                    &form.password.value,
                    form.password.error.as_deref(),
                    form.focus == 2,
                ),
                FormField::choice("Role", form.role.as_str(), form.focus == 3),
            ],
            form.phase,
        ),
        UserDialog::Edit(form) => (
            format!("Edit {}", form.original.email),
            vec![
                FormField::text(
                    "Username",
                    &form.username.value,
                    form.username.error.as_deref(),
                    form.focus == 0,
                ),
                FormField::choice("Role", form.role.as_str(), form.focus == 1),
                FormField::choice("Status", form.status.as_str(), form.focus == 2),
            ],
            form.phase,
        ),
    }
}
