//! Overlay settings panel
//!
//! One row per overlay element listing its editable fields, then a row with
//! the session user and the persistence buttons.

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use super::Theme;
use crate::app::{App, Focus, InputMode};
use crate::models::OverlayField;

/// Rows the panel needs, borders included
pub const SETTINGS_HEIGHT: u16 = 5;

/// Render the settings panel
pub fn render_settings(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Settings;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .title(Span::styled(" OVERLAY SETTINGS ", Theme::title()));

    let caption = OverlayField::ALL.iter().filter(|f| f.is_caption());
    let logo = OverlayField::ALL.iter().filter(|f| !f.is_caption());

    let lines = vec![
        field_line("Caption", caption, app),
        field_line("Logo   ", logo, app),
        persistence_line(app),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line<'a>(
    heading: &'static str,
    fields: impl Iterator<Item = &'a OverlayField>,
    app: &App,
) -> Line<'static> {
    let focused = app.focus == Focus::Settings;
    let mut spans = vec![Span::styled(format!("{} ", heading), Theme::keybind())];

    for &field in fields {
        spans.push(Span::styled(format!(" {}: ", field.label()), Theme::dimmed()));

        if app.input_mode == InputMode::EditingField(field) {
            let (before, after) = app.field_input.split();
            spans.push(Span::styled(format!("{}│{}", before, after), Theme::input_cursor()));
            continue;
        }

        let mut value = app.editor.overlays.field_value(field);
        if value.is_empty() {
            value = "—".to_string();
        }
        let style = if focused && app.selected_field() == field {
            Theme::selected()
        } else {
            Theme::text()
        };
        spans.push(Span::styled(value, style));
    }

    Line::from(spans)
}

fn persistence_line(app: &App) -> Line<'static> {
    let user = app.editor.user().unwrap_or("None").to_string();
    let save = if app.editor.is_saving() {
        Span::styled("⟳ Saving...", Theme::loading())
    } else {
        Span::styled(app.editor.save_mode().to_string(), Theme::text())
    };
    let restore_style = if app.editor.is_saving() {
        Theme::dimmed()
    } else {
        Theme::text()
    };

    Line::from(vec![
        Span::styled("User    ", Theme::keybind()),
        Span::styled(format!(" {}", user), Theme::title()),
        Span::raw("   "),
        Span::styled("[s] ", Theme::keybind()),
        save,
        Span::raw("   "),
        Span::styled("[r] ", Theme::keybind()),
        Span::styled("Restore", restore_style),
    ])
}
