//! App state and core application logic
//!
//! Composes the URL form, the overlay editor and the drag controller, and
//! routes keyboard and mouse input between them. Network work is never done
//! here: handlers return a [`Task`], the event loop runs it, and the result
//! comes back as an [`AppEvent`] for [`App::apply`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::api::{ApiError, Backend};
use crate::drag::DragController;
use crate::editor::{
    EditorStep, OverlayEditor, Persist, RestoreRequest, SaveMode, SaveRequest, StreamSource,
};
use crate::models::{OverlayField, OverlaySet};
use crate::ui::{Panes, StageGeometry};

pub const EMPTY_URL_WARNING: &str = "Please enter an RTSP URL";
pub const STREAM_FAILED: &str = "Failed to start stream. Check backend logs.";

// =============================================================================
// Modes
// =============================================================================

/// Which panel receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// RTSP URL form
    #[default]
    Form,
    /// Overlay settings panel
    Settings,
}

/// Current input mode for keyboard handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Typing into the RTSP URL box
    EditingUrl,
    /// Typing a new value for an overlay field
    EditingField(OverlayField),
    /// Asking for the user identifier before a save or restore
    Prompt(Persist),
}

// =============================================================================
// Text Input
// =============================================================================

/// Single-line text buffer with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Text before and after the cursor
    pub fn split(&self) -> (&str, &str) {
        self.value.split_at(self.byte_index())
    }

    /// Insert character at cursor
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing key; returns false for keys it does not handle
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor_left(),
            KeyCode::Right => self.cursor_right(),
            KeyCode::Home => self.cursor_home(),
            KeyCode::End => self.cursor_end(),
            _ => return false,
        }
        true
    }
}

// =============================================================================
// Stream Form
// =============================================================================

/// Landing form: RTSP URL in, HLS endpoint out
#[derive(Debug, Clone, Default)]
pub struct StreamForm {
    pub input: TextInput,
    /// A start-stream call is in flight; re-submission is refused
    pub loading: bool,
    /// Playable HLS endpoint of the current stream
    pub endpoint: Option<String>,
    /// Source URL the current endpoint was started from
    pub rtsp_url: Option<String>,
}

// =============================================================================
// Tasks and Events
// =============================================================================

/// Background work requested by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    StartStream { rtsp_url: String },
    SaveOverlay(SaveRequest),
    RestoreOverlay(RestoreRequest),
}

impl Task {
    /// Perform the request; every outcome becomes an event
    pub async fn run(self, backend: &Backend) -> AppEvent {
        match self {
            Task::StartStream { rtsp_url } => {
                let result = backend.streams.start_stream(&rtsp_url).await;
                AppEvent::StreamStarted { rtsp_url, result }
            }
            Task::SaveOverlay(req) => {
                let result = match req.mode {
                    SaveMode::Create => backend.overlays.create(&req.user, &req.record).await,
                    SaveMode::Update => {
                        backend
                            .overlays
                            .update(&req.user, &req.record.overlays)
                            .await
                    }
                };
                AppEvent::OverlaySaved {
                    user: req.user,
                    result,
                }
            }
            Task::RestoreOverlay(req) => {
                let result = backend.overlays.restore(&req.user).await;
                AppEvent::OverlayRestored {
                    user: req.user,
                    result,
                }
            }
        }
    }
}

/// Completed background work
#[derive(Debug)]
pub enum AppEvent {
    StreamStarted {
        rtsp_url: String,
        result: Result<String, ApiError>,
    },
    OverlaySaved {
        user: String,
        result: Result<(), ApiError>,
    },
    OverlayRestored {
        user: String,
        result: Result<OverlaySet, ApiError>,
    },
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Whether the app is running
    pub running: bool,
    pub focus: Focus,
    pub input_mode: InputMode,
    /// Warning popup; cleared by the next key press
    pub error: Option<String>,

    pub form: StreamForm,
    pub editor: OverlayEditor,
    pub drag: DragController,

    /// Index into [`OverlayField::ALL`]
    pub selected_field: usize,
    /// Buffer for field edits and the user prompt
    pub field_input: TextInput,

    panes: Option<Panes>,
}

impl Default for App {
    fn default() -> Self {
        Self::with_overlays(OverlaySet::default())
    }
}

impl App {
    /// Create a new App instance
    pub fn new() -> Self {
        Self::default()
    }

    /// App whose overlays start from values handed in by the caller
    pub fn with_overlays(overlays: OverlaySet) -> Self {
        Self {
            running: true,
            focus: Focus::Form,
            input_mode: InputMode::Normal,
            error: None,
            form: StreamForm::default(),
            editor: OverlayEditor::with_overlays(overlays),
            drag: DragController::new(),
            selected_field: 0,
            field_input: TextInput::default(),
            panes: None,
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Set warning message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Recompute the layout for a new terminal size
    pub fn resize(&mut self, area: Rect) {
        self.panes = Some(Panes::split(area));
    }

    pub fn panes(&self) -> Option<&Panes> {
        self.panes.as_ref()
    }

    /// Video surface geometry, once a layout exists
    pub fn stage(&self) -> Option<StageGeometry> {
        self.panes.as_ref().map(|p| StageGeometry::new(p.stage_inner))
    }

    pub fn selected_field(&self) -> OverlayField {
        OverlayField::ALL[self.selected_field.min(OverlayField::ALL.len() - 1)]
    }

    /// URLs recorded with a newly created overlay
    pub fn stream_source(&self) -> StreamSource {
        StreamSource {
            rtsp_url: self.form.rtsp_url.clone().unwrap_or_default(),
            hls_url: self.form.endpoint.clone().unwrap_or_default(),
        }
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Submit the URL form.
    ///
    /// An empty URL only raises a warning: no task, loading stays false.
    pub fn submit_url(&mut self) -> Option<Task> {
        if self.form.loading {
            return None;
        }
        let rtsp_url = self.form.input.value().trim().to_string();
        if rtsp_url.is_empty() {
            self.set_error(EMPTY_URL_WARNING);
            return None;
        }

        self.form.loading = true;
        self.form.endpoint = None;
        // Stage is gone; a drag on it cannot continue
        self.drag.cancel();
        info!(rtsp_url = %rtsp_url, "starting stream");
        Some(Task::StartStream { rtsp_url })
    }

    /// Save / Update button; only offered while a stream is up
    pub fn request_save(&mut self) -> Option<Task> {
        if self.form.endpoint.is_none() {
            return None;
        }
        let source = self.stream_source();
        let step = self.editor.save(&source);
        self.follow(step)
    }

    /// Restore button
    pub fn request_restore(&mut self) -> Option<Task> {
        if self.form.endpoint.is_none() {
            return None;
        }
        let step = self.editor.restore();
        self.follow(step)
    }

    fn follow(&mut self, step: EditorStep) -> Option<Task> {
        match step {
            EditorStep::NeedsUser(op) => {
                self.field_input.clear();
                self.input_mode = InputMode::Prompt(op);
                None
            }
            EditorStep::Busy | EditorStep::Cancelled => None,
            EditorStep::Save(req) => Some(Task::SaveOverlay(req)),
            EditorStep::Restore(req) => Some(Task::RestoreOverlay(req)),
        }
    }

    /// Fold a finished background task into the state
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::StreamStarted { rtsp_url, result } => {
                self.form.loading = false;
                self.drag.cancel();
                match result {
                    Ok(endpoint) => {
                        self.form.endpoint = Some(endpoint);
                        self.form.rtsp_url = Some(rtsp_url);
                    }
                    Err(e) => {
                        info!(rtsp_url = %rtsp_url, error = %e, "start stream failed");
                        self.set_error(STREAM_FAILED);
                    }
                }
            }
            AppEvent::OverlaySaved { user, result } => {
                if let Some(warning) = self.editor.finish_save(&user, result) {
                    self.set_error(warning);
                }
            }
            AppEvent::OverlayRestored { user, result } => {
                if result.is_ok() {
                    self.drag.cancel();
                }
                if let Some(warning) = self.editor.finish_restore(&user, result) {
                    self.set_error(warning);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returning background work to start
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Task> {
        // Clear warning on any keypress
        self.error = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::EditingUrl => self.handle_url_key(key),
            InputMode::EditingField(field) => {
                self.handle_field_key(field, key);
                None
            }
            InputMode::Prompt(op) => self.handle_prompt_key(op, key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Task> {
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return None;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Form => Focus::Settings,
                    Focus::Settings => Focus::Form,
                };
                return None;
            }
            KeyCode::Char('s') => return self.request_save(),
            KeyCode::Char('r') => return self.request_restore(),
            _ => {}
        }

        match self.focus {
            Focus::Form => {
                if matches!(key.code, KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter) {
                    self.input_mode = InputMode::EditingUrl;
                }
            }
            Focus::Settings => match key.code {
                KeyCode::Up | KeyCode::Char('k') | KeyCode::Left | KeyCode::Char('h') => {
                    self.selected_field = self.selected_field.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Right | KeyCode::Char('l') => {
                    if self.selected_field + 1 < OverlayField::ALL.len() {
                        self.selected_field += 1;
                    }
                }
                KeyCode::Enter => {
                    let field = self.selected_field();
                    self.field_input = TextInput::new(self.editor.overlays.field_value(field));
                    self.input_mode = InputMode::EditingField(field);
                }
                _ => {}
            },
        }
        None
    }

    fn handle_url_key(&mut self, key: KeyEvent) -> Option<Task> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.submit_url()
            }
            _ => {
                self.form.input.handle_key(key);
                None
            }
        }
    }

    fn handle_field_key(&mut self, field: OverlayField, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let container = self.stage().map(|s| s.container());
                let raw = self.field_input.value().to_string();
                match self.editor.overlays.apply_field(field, &raw, container) {
                    Ok(()) => debug!(?field, value = %raw, "overlay field edited"),
                    Err(e) => self.set_error(e.to_string()),
                }
            }
            _ => {
                self.field_input.handle_key(key);
            }
        }
    }

    fn handle_prompt_key(&mut self, op: Persist, key: KeyEvent) -> Option<Task> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let answer = self.field_input.value().to_string();
                self.field_input.clear();
                let source = self.stream_source();
                let step = self.editor.provide_user(&answer, op, &source);
                self.follow(step)
            }
            _ => {
                self.field_input.handle_key(key);
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Mouse Event Handling
    // -------------------------------------------------------------------------

    /// Handle mouse event: press on an overlay starts a drag, motion and
    /// release are routed only while the drag's listeners are registered.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        // Release ends a drag even without a stage
        if let MouseEventKind::Up(_) = event.kind {
            if self.drag.listeners().is_listening() {
                self.drag.pointer_up();
            }
            return;
        }

        let Some(stage) = self.stage() else {
            return;
        };
        if self.form.endpoint.is_none() {
            return;
        }
        let pointer = stage.to_point(event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = stage.hit_test(&self.editor.overlays, event.column, event.row)
                {
                    self.drag
                        .pointer_down(target, pointer, &self.editor.overlays);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if self.drag.listeners().is_listening() {
                    self.drag
                        .pointer_move(pointer, &mut self.editor.overlays, stage.container());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_input_unicode_cursor() {
        let mut input = TextInput::new("café");
        assert_eq!(input.cursor(), 4);
        input.backspace();
        assert_eq!(input.value(), "caf");
        input.cursor_home();
        input.insert('ñ');
        assert_eq!(input.value(), "ñcaf");
        assert_eq!(input.split(), ("ñ", "caf"));
        input.delete();
        assert_eq!(input.value(), "ñaf");
    }

    #[test]
    fn test_typing_into_url_box() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::EditingUrl);
        for c in "rtsp://x".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.form.input.value(), "rtsp://x");
        let task = app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            task,
            Some(Task::StartStream {
                rtsp_url: "rtsp://x".into()
            })
        );
        assert!(app.form.loading);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Settings);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Form);
    }

    #[test]
    fn test_field_navigation_bounds() {
        let mut app = App::new();
        app.focus = Focus::Settings;
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_field(), OverlayField::CaptionText);
        for _ in 0..20 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.selected_field(), OverlayField::LogoOpacity);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = App::new();
        app.input_mode = InputMode::EditingUrl;
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn test_any_key_clears_warning() {
        let mut app = App::new();
        app.set_error("boom");
        app.handle_key(key(KeyCode::Char('x')));
        assert!(app.error.is_none());
    }
}
