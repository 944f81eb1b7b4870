use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::NoteError;
use crate::models::CheckInNote;

pub const NOTE_TEMPLATES: [&str; 7] = [
    "Left voicemail requesting callback.",
    "Discussed missed sessions. Student will attend next class.",
    "Technical issues prevented attendance. Support provided.",
    "Student needs assistance with course materials.",
    "Follow-up scheduled for next week.",
    "No response to follow-up attempts.",
    "Student is now back on track with attendance.",
];

/// Check-in notes keyed by mentee. Each call holds the lock for its whole
/// duration, so adds and updates never interleave.
#[derive(Debug, Default)]
pub struct NoteRepository {
    notes: Mutex<Vec<CheckInNote>>,
}

impl NoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<CheckInNote>) -> Self {
        debug!(count = notes.len(), "loaded check-in notes");
        Self {
            notes: Mutex::new(notes),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CheckInNote>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Notes for one mentee, most recent first. Equal timestamps list the
    /// later insertion first.
    pub fn list_notes(&self, mentee_id: &str) -> Vec<CheckInNote> {
        let notes = self.lock();
        let mut listed: Vec<CheckInNote> = notes
            .iter()
            .rev()
            .filter(|n| n.mentee_id == mentee_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        listed
    }

    pub fn add_note(
        &self,
        mentee_id: &str,
        text: &str,
        executive_name: &str,
    ) -> Result<CheckInNote, NoteError> {
        let text = non_blank(text, "note text must not be empty")?;
        let executive_name = non_blank(executive_name, "executive name must not be empty")?;

        let note = CheckInNote {
            id: Uuid::now_v7().to_string(),
            mentee_id: mentee_id.to_string(),
            timestamp: Utc::now(),
            edited_at: None,
            note: text.to_string(),
            executive_name: executive_name.to_string(),
        };

        self.lock().push(note.clone());
        info!(note_id = %note.id, mentee_id, "added check-in note");
        Ok(note)
    }

    /// Replaces the text of an existing note. The creation timestamp is kept;
    /// the edit time is recorded in `edited_at`.
    pub fn update_note(&self, note_id: &str, new_text: &str) -> Result<CheckInNote, NoteError> {
        let mut notes = self.lock();
        let note = notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| NoteError::NotFound(note_id.to_string()))?;
        let text = non_blank(new_text, "note text must not be empty")?;

        note.note = text.to_string();
        note.edited_at = Some(Utc::now());
        info!(note_id, mentee_id = %note.mentee_id, "updated check-in note");
        Ok(note.clone())
    }

    pub fn all_notes(&self) -> Vec<CheckInNote> {
        self.lock().clone()
    }

    /// Notes created at or after `cutoff`, most recent first.
    pub fn notes_since(&self, cutoff: DateTime<Utc>) -> Vec<CheckInNote> {
        let mut recent: Vec<CheckInNote> = self
            .lock()
            .iter()
            .rev()
            .filter(|n| n.timestamp >= cutoff)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent
    }
}

fn non_blank<'a>(value: &'a str, message: &str) -> Result<&'a str, NoteError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NoteError::Validation(message.to_string()));
    }
    Ok(trimmed)
}
