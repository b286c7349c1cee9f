//! Overlay persistence coordination
//!
//! Owns the overlay model and everything the save / restore buttons need:
//! the user identifier (asked once, kept for the session only), which users
//! already have a stored record, and the in-flight save flag.
//!
//! Network calls happen elsewhere; this module hands out requests carrying a
//! snapshot of the model and folds the results back in.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info};

use crate::api::ApiError;
use crate::models::{OverlayRecord, OverlaySet};

pub const SAVE_FAILED: &str = "Failed to save/update overlay.";
pub const RESTORE_FAILED: &str = "Failed to restore overlay.";
pub const RESTORE_MALFORMED: &str = "Stored overlay is malformed; nothing restored.";

/// Which HTTP path a save takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// No record known for this user yet (POST)
    Create,
    /// A record exists (PUT)
    Update,
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveMode::Create => write!(f, "Save"),
            SaveMode::Update => write!(f, "Update"),
        }
    }
}

/// Persistence operation waiting on a user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    Save,
    Restore,
}

/// Save request with the model frozen at request time
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub user: String,
    pub mode: SaveMode,
    pub record: OverlayRecord,
}

/// Restore request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    pub user: String,
}

/// What the caller should do next
#[derive(Debug, Clone, PartialEq)]
pub enum EditorStep {
    /// Ask for a user identifier, then call [`OverlayEditor::provide_user`]
    NeedsUser(Persist),
    /// A save is in flight; the buttons are disabled
    Busy,
    /// Prompt was answered with nothing
    Cancelled,
    Save(SaveRequest),
    Restore(RestoreRequest),
}

/// Stream URLs stored alongside a created record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSource {
    pub rtsp_url: String,
    pub hls_url: String,
}

#[derive(Debug, Default)]
pub struct OverlayEditor {
    pub overlays: OverlaySet,
    user: Option<String>,
    stored_users: HashSet<String>,
    saving: bool,
}

impl OverlayEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor seeded with overlays from a parent
    pub fn with_overlays(overlays: OverlaySet) -> Self {
        Self {
            overlays,
            ..Self::default()
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Save path for `user`, derived from what this session has seen
    pub fn save_mode_for(&self, user: &str) -> SaveMode {
        if self.stored_users.contains(user) {
            SaveMode::Update
        } else {
            SaveMode::Create
        }
    }

    /// Save path for the cached user (Create when none is known)
    pub fn save_mode(&self) -> SaveMode {
        self.user
            .as_deref()
            .map_or(SaveMode::Create, |u| self.save_mode_for(u))
    }

    /// Save button
    pub fn save(&mut self, source: &StreamSource) -> EditorStep {
        if self.saving {
            return EditorStep::Busy;
        }
        let Some(user) = self.user.clone() else {
            return EditorStep::NeedsUser(Persist::Save);
        };

        let mode = self.save_mode_for(&user);
        self.saving = true;
        debug!(user = %user, ?mode, "save requested");
        EditorStep::Save(SaveRequest {
            user,
            mode,
            record: OverlayRecord {
                rtsp_url: source.rtsp_url.clone(),
                hls_url: source.hls_url.clone(),
                overlays: self.overlays.clone(),
            },
        })
    }

    /// Restore button; disabled while a save is in flight
    pub fn restore(&mut self) -> EditorStep {
        if self.saving {
            return EditorStep::Busy;
        }
        match self.user.clone() {
            Some(user) => EditorStep::Restore(RestoreRequest { user }),
            None => EditorStep::NeedsUser(Persist::Restore),
        }
    }

    /// Answer to the user prompt; resumes `then`
    pub fn provide_user(
        &mut self,
        answer: &str,
        then: Persist,
        source: &StreamSource,
    ) -> EditorStep {
        let answer = answer.trim();
        if answer.is_empty() {
            return EditorStep::Cancelled;
        }
        self.user = Some(answer.to_string());
        match then {
            Persist::Save => self.save(source),
            Persist::Restore => self.restore(),
        }
    }

    /// Fold a save result back in; the saving flag is cleared either way.
    ///
    /// Returns the warning to show, if any.
    pub fn finish_save(
        &mut self,
        user: &str,
        result: Result<(), ApiError>,
    ) -> Option<&'static str> {
        self.saving = false;
        match result {
            Ok(()) => {
                self.stored_users.insert(user.to_string());
                None
            }
            Err(e) => {
                info!(user, error = %e, "save failed");
                Some(SAVE_FAILED)
            }
        }
    }

    /// Fold a restore result back in.
    ///
    /// On success the whole model is replaced; on failure it is untouched.
    pub fn finish_restore(
        &mut self,
        user: &str,
        result: Result<OverlaySet, ApiError>,
    ) -> Option<&'static str> {
        match result {
            Ok(overlays) => {
                self.overlays = overlays;
                self.stored_users.insert(user.to_string());
                None
            }
            Err(ApiError::Malformed(e)) => {
                info!(user, error = %e, "restore ignored malformed record");
                Some(RESTORE_MALFORMED)
            }
            Err(e) => {
                info!(user, error = %e, "restore failed");
                Some(RESTORE_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MalformedRecord, Point};
    use reqwest::StatusCode;

    fn source() -> StreamSource {
        StreamSource {
            rtsp_url: "rtsp://example.com/cam1".into(),
            hls_url: "http://localhost:5001/hls/cam1.m3u8".into(),
        }
    }

    fn save_request(step: EditorStep) -> SaveRequest {
        match step {
            EditorStep::Save(req) => req,
            other => panic!("expected save request, got {:?}", other),
        }
    }

    #[test]
    fn test_first_save_prompts_for_user() {
        let mut editor = OverlayEditor::new();
        assert_eq!(editor.save(&source()), EditorStep::NeedsUser(Persist::Save));
        assert!(!editor.is_saving());
    }

    #[test]
    fn test_empty_answer_cancels() {
        let mut editor = OverlayEditor::new();
        assert_eq!(
            editor.provide_user("  ", Persist::Save, &source()),
            EditorStep::Cancelled
        );
        assert!(editor.user().is_none());
        assert!(!editor.is_saving());
    }

    #[test]
    fn test_create_then_update() {
        let mut editor = OverlayEditor::new();
        let req = save_request(editor.provide_user("alice", Persist::Save, &source()));
        assert_eq!(req.mode, SaveMode::Create);
        assert_eq!(req.record.rtsp_url, "rtsp://example.com/cam1");
        assert!(editor.is_saving());
        assert_eq!(editor.save(&source()), EditorStep::Busy);

        assert_eq!(editor.finish_save("alice", Ok(())), None);
        assert!(!editor.is_saving());
        assert_eq!(editor.save_mode(), SaveMode::Update);

        let req = save_request(editor.save(&source()));
        assert_eq!(req.user, "alice");
        assert_eq!(req.mode, SaveMode::Update);
    }

    #[test]
    fn test_failed_create_stays_in_create_mode() {
        let mut editor = OverlayEditor::new();
        save_request(editor.provide_user("alice", Persist::Save, &source()));
        let warning = editor.finish_save("alice", Err(ApiError::Status(StatusCode::BAD_GATEWAY)));
        assert_eq!(warning, Some(SAVE_FAILED));
        assert!(!editor.is_saving());
        assert_eq!(editor.save_mode(), SaveMode::Create);
    }

    #[test]
    fn test_save_snapshot_ignores_later_edits() {
        let mut editor = OverlayEditor::new();
        let req = save_request(editor.provide_user("alice", Persist::Save, &source()));
        editor.overlays.caption.set_position(Point::new(300.0, 200.0));
        assert_eq!(req.record.overlays.caption.position(), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_restore_replaces_model_and_switches_mode() {
        let mut editor = OverlayEditor::new();
        let step = editor.provide_user("bob", Persist::Restore, &source());
        assert_eq!(
            step,
            EditorStep::Restore(RestoreRequest { user: "bob".into() })
        );

        let mut stored = OverlaySet::default();
        stored.caption.text = "Recorded".into();
        assert_eq!(editor.finish_restore("bob", Ok(stored.clone())), None);
        assert_eq!(editor.overlays, stored);
        assert_eq!(editor.save_mode(), SaveMode::Update);
    }

    #[test]
    fn test_malformed_restore_keeps_model() {
        let mut editor = OverlayEditor::new();
        editor.overlays.logo.image_url = "keep.png".into();
        let before = editor.overlays.clone();
        let warning = editor.finish_restore(
            "bob",
            Err(ApiError::Malformed(MalformedRecord { found: 3 })),
        );
        assert_eq!(warning, Some(RESTORE_MALFORMED));
        assert_eq!(editor.overlays, before);
        assert_eq!(editor.save_mode_for("bob"), SaveMode::Create);
    }

    #[test]
    fn test_restore_disabled_while_saving() {
        let mut editor = OverlayEditor::new();
        save_request(editor.provide_user("alice", Persist::Save, &source()));
        assert_eq!(editor.restore(), EditorStep::Busy);
    }

    #[test]
    fn test_save_mode_labels() {
        assert_eq!(SaveMode::Create.to_string(), "Save");
        assert_eq!(SaveMode::Update.to_string(), "Update");
    }
}
