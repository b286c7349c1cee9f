//! UI Rendering Tests
//!
//! Full-screen renders into ratatui's TestBackend.

use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, style::Modifier, Terminal};

use livesitter::app::{App, AppEvent, InputMode};
use livesitter::editor::Persist;
use livesitter::ui::{render_ui, Panes};

fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).unwrap()
}

fn render(app: &App) -> Buffer {
    let mut terminal = test_terminal(100, 40);
    terminal.draw(|frame| render_ui(frame, app)).unwrap();
    terminal.backend().buffer().clone()
}

fn content(buffer: &Buffer) -> String {
    buffer.content.iter().map(|c| c.symbol()).collect()
}

/// Text of one screen row
fn row(buffer: &Buffer, y: u16) -> String {
    let width = buffer.area.width as usize;
    buffer.content[y as usize * width..(y as usize + 1) * width]
        .iter()
        .map(|c| c.symbol())
        .collect()
}

fn streaming_app() -> App {
    let mut app = App::new();
    app.resize(Rect::new(0, 0, 100, 40));
    app.apply(AppEvent::StreamStarted {
        rtsp_url: "rtsp://example.com/cam1".into(),
        result: Ok("http://localhost:5001/hls/cam1.m3u8".into()),
    });
    app
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_panes_fill_screen() {
    let panes = Panes::split(Rect::new(0, 0, 100, 40));
    assert_eq!(panes.form.height, 3);
    assert_eq!(panes.stage.y, panes.settings.bottom());
    assert_eq!(panes.status.bottom(), 40);
    assert_eq!(panes.stage_inner, Rect::new(1, panes.stage.y + 1, 98, panes.stage.height - 2));
}

// =============================================================================
// Landing
// =============================================================================

#[test]
fn test_landing_screen() {
    let mut app = App::new();
    app.resize(Rect::new(0, 0, 100, 40));
    let buffer = render(&app);
    let text = content(&buffer);

    assert!(text.contains("RTSP URL"));
    assert!(text.contains("Start Stream"));
    assert!(text.contains("No stream"));
    assert!(text.contains("User"));
    assert!(text.contains("None"));
    // No overlays before a stream exists
    let cells = app
        .stage()
        .unwrap()
        .caption_cells(&app.editor.overlays)
        .unwrap();
    assert!(!row(&buffer, cells.y).contains("Live"));
}

#[test]
fn test_loading_label() {
    let mut app = App::new();
    app.form.loading = true;
    let text = content(&render(&app));

    assert!(text.contains("Loading..."));
    assert!(!text.contains("Start Stream"));
}

#[test]
fn test_warning_popup() {
    let mut app = App::new();
    app.set_error("Please enter an RTSP URL");
    let text = content(&render(&app));

    assert!(text.contains("WARNING"));
    assert!(text.contains("Please enter an RTSP URL"));
}

// =============================================================================
// Stage
// =============================================================================

#[test]
fn test_endpoint_and_caption_rendered() {
    let app = streaming_app();
    let buffer = render(&app);

    assert!(content(&buffer).contains("http://localhost:5001/hls/cam1.m3u8"));

    let cells = app
        .stage()
        .unwrap()
        .caption_cells(&app.editor.overlays)
        .unwrap();
    assert!(row(&buffer, cells.y).contains("Live"));
}

#[test]
fn test_logo_hidden_until_url_set() {
    let mut app = streaming_app();
    assert!(!content(&render(&app)).contains("logo"));

    app.editor.overlays.logo.image_url = "https://x/logo.png".into();
    let text = content(&render(&app));
    assert!(text.contains("logo"));
}

#[test]
fn test_faint_caption_is_dimmed() {
    let mut app = streaming_app();
    app.editor.overlays.caption.opacity = 0.2;
    let buffer = render(&app);

    let cells = app
        .stage()
        .unwrap()
        .caption_cells(&app.editor.overlays)
        .unwrap();
    let cell = &buffer.content[cells.y as usize * 100 + cells.x as usize];
    assert_eq!(cell.symbol(), "L");
    assert!(cell.modifier.contains(Modifier::DIM));
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_settings_lists_fields_and_save_label() {
    let app = streaming_app();
    let text = content(&render(&app));

    for label in ["Text", "Font Size", "Opacity", "Logo Url", "Width", "Height"] {
        assert!(text.contains(label), "missing field {}", label);
    }
    assert!(text.contains("Save"));
    assert!(text.contains("Restore"));
}

#[test]
fn test_user_prompt_rendered() {
    let mut app = streaming_app();
    app.input_mode = InputMode::Prompt(Persist::Save);
    let text = content(&render(&app));

    assert!(text.contains("Enter username to save overlay:"));
}
