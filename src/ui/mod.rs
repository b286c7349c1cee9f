//! Terminal UI components
//!
//! Built with ratatui. Keyboard drives the form and the settings panel; the
//! mouse drags overlays on the stage.

pub mod settings;
pub mod stage;
pub mod theme;

pub use stage::{StageGeometry, CELL_HEIGHT_PX, CELL_WIDTH_PX};
pub use theme::Theme;

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::{App, Focus, InputMode};
use crate::editor::Persist;

/// Screen regions, recomputed on every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panes {
    pub form: Rect,
    pub settings: Rect,
    pub stage: Rect,
    /// Stage area inside its border; overlay coordinates start here
    pub stage_inner: Rect,
    pub endpoint: Rect,
    pub status: Rect,
}

impl Panes {
    pub fn split(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                         // URL form
                Constraint::Length(settings::SETTINGS_HEIGHT), // Overlay settings
                Constraint::Min(3),                            // Stage
                Constraint::Length(1),                         // Endpoint
                Constraint::Length(1),                         // Status bar
            ])
            .split(area);

        let stage = chunks[2];
        Self {
            form: chunks[0],
            settings: chunks[1],
            stage,
            stage_inner: Block::default().borders(Borders::ALL).inner(stage),
            endpoint: chunks[3],
            status: chunks[4],
        }
    }
}

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Theme::text()), area);

    let panes = Panes::split(area);
    render_form(frame, panes.form, app);
    settings::render_settings(frame, panes.settings, app);
    stage::render_stage(frame, panes.stage, app);
    render_endpoint(frame, panes.endpoint, app);
    render_status_bar(frame, panes.status, app);

    if let InputMode::Prompt(op) = app.input_mode {
        render_prompt(frame, area, op, app);
    }
    if let Some(ref warning) = app.error {
        render_warning_popup(frame, area, warning);
    }
}

/// Brand, URL box and start button
fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Brand
            Constraint::Min(10),    // URL input
            Constraint::Length(20), // Button
        ])
        .split(area);

    let brand = Paragraph::new(Line::from(vec![
        Span::styled("LIVE", Theme::title()),
        Span::styled("SITTER", Theme::title().fg(Theme::SECONDARY)),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(brand, chunks[0]);

    let editing = app.input_mode == InputMode::EditingUrl;
    let input = &app.form.input;
    let text = if editing {
        let (before, after) = input.split();
        format!("{}│{}", before, after)
    } else if input.value().is_empty() {
        "rtsp://... (press i to type)".to_string()
    } else {
        input.value().to_string()
    };
    let border = if editing || app.focus == Focus::Form {
        Theme::border_focused()
    } else {
        Theme::border()
    };
    let url_box = Paragraph::new(text)
        .style(if editing {
            Theme::input().fg(Theme::PRIMARY)
        } else {
            Theme::input()
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border)
                .title(Span::styled(" RTSP URL ", Theme::title())),
        );
    frame.render_widget(url_box, chunks[1]);

    let button = if app.form.loading {
        Span::styled("⟳ Loading...", Theme::loading())
    } else {
        Span::styled("▶ Start Stream", Theme::keybind())
    };
    let button = Paragraph::new(Line::from(button))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Theme::border()),
        );
    frame.render_widget(button, chunks[2]);
}

/// Resolved HLS endpoint of the current stream
fn render_endpoint(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.form.endpoint {
        Some(ref endpoint) => Line::from(vec![
            Span::styled(" HLS ▸ ", Theme::keybind()),
            Span::styled(endpoint.as_str(), Theme::text()),
        ]),
        None => Line::from(Span::styled(" HLS ▸ no stream", Theme::dimmed())),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render status bar at bottom
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let (mode, bg) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Theme::PRIMARY),
        InputMode::EditingUrl => (" INSERT ", Theme::ACCENT),
        InputMode::EditingField(_) => (" EDIT ", Theme::ACCENT),
        InputMode::Prompt(_) => (" PROMPT ", Theme::SECONDARY),
    };
    let mode_indicator = Span::styled(mode, Style::default().fg(Theme::BACKGROUND).bg(bg));

    let focus = match app.focus {
        Focus::Form => " FORM ",
        Focus::Settings => " SETTINGS ",
    };

    let drag = match app.drag.target() {
        Some(target) => Span::styled(format!(" ✥ {:?} ", target).to_uppercase(), Theme::warning()),
        None => Span::raw(""),
    };

    let help = match (app.input_mode, app.focus) {
        (InputMode::Normal, Focus::Form) => " q:quit  i:url  tab:settings  s:save  r:restore ",
        (InputMode::Normal, Focus::Settings) => {
            " q:quit  ↑↓:field  enter:edit  tab:form  s:save  r:restore "
        }
        _ => " enter:confirm  esc:cancel ",
    };

    let status_line = Line::from(vec![
        mode_indicator,
        Span::styled(focus, Theme::dimmed()),
        drag,
        Span::raw(" │ "),
        Span::styled(help, Theme::dimmed()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(Theme::status_bar()), area);
}

/// Centered box of `width` x `height` inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// User identifier prompt
fn render_prompt(frame: &mut Frame, area: Rect, op: Persist, app: &App) {
    let popup_area = centered(area, 50, 5);
    frame.render_widget(Clear, popup_area);

    let question = match op {
        Persist::Save => "Enter username to save overlay:",
        Persist::Restore => "Enter username to restore overlay:",
    };
    let (before, after) = app.field_input.split();
    let popup = Paragraph::new(vec![
        Line::from(Span::styled(question, Theme::text())),
        Line::from(""),
        Line::from(Span::styled(format!("{}│{}", before, after), Theme::input())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::border_focused())
            .title(Span::styled(" USER ", Theme::title()))
            .style(Style::default().bg(Theme::BACKGROUND)),
    );
    frame.render_widget(popup, popup_area);
}

/// Warning popup; dismissed by any key
fn render_warning_popup(frame: &mut Frame, area: Rect, warning: &str) {
    let popup_area = centered(area, 60, 5);
    frame.render_widget(Clear, popup_area);

    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(warning, Theme::warning())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::warning())
            .title(Span::styled(" ! WARNING ", Theme::warning()))
            .style(Style::default().bg(Theme::BACKGROUND)),
    );
    frame.render_widget(popup, popup_area);
}
