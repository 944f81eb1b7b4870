use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::import;
use crate::models::{AttendanceRecord, CheckInNote};
use crate::notes::NoteRepository;
use crate::store::MenteeStore;

/// Runtime settings resolved from command-line flags and the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Roster CSV. The built-in seed roster is used when absent.
    pub data: Option<PathBuf>,
    /// Notes JSON file. Seed notes are used when absent.
    pub notes: Option<PathBuf>,
    pub log_level: String,
}

impl AppConfig {
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("mentee_tracker={}", self.log_level)));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn load_store(&self) -> anyhow::Result<MenteeStore> {
        let records = match &self.data {
            Some(path) => import::read_records(path)?,
            None => import::seed_records(),
        };
        Ok(MenteeStore::new(records))
    }

    pub fn load_notes(&self) -> anyhow::Result<NoteRepository> {
        let notes = match &self.notes {
            Some(path) if !path.exists() => return Ok(NoteRepository::new()),
            Some(path) => import::read_notes(path)?,
            None => import::seed_notes(),
        };
        Ok(NoteRepository::from_notes(notes))
    }

    pub fn save_store(&self, records: &[AttendanceRecord]) -> anyhow::Result<()> {
        match &self.data {
            Some(path) => import::write_records(path, records)
                .with_context(|| format!("failed to save roster to {}", path.display())),
            None => {
                warn!("no --data file configured; roster changes were not saved");
                Ok(())
            }
        }
    }

    pub fn save_notes(&self, notes: &[CheckInNote]) -> anyhow::Result<()> {
        match &self.notes {
            Some(path) => import::write_notes(path, notes),
            None => {
                warn!("no --notes file configured; note changes were not saved");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(data: Option<PathBuf>, notes: Option<PathBuf>) -> AppConfig {
        AppConfig {
            data,
            notes,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn falls_back_to_seed_data() {
        let config = config(None, None);
        assert_eq!(config.load_store().unwrap().len(), 5);
        assert_eq!(config.load_notes().unwrap().list_notes("1").len(), 2);
    }

    #[test]
    fn missing_notes_file_starts_empty_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let config = config(None, Some(path.clone()));

        let repo = config.load_notes().unwrap();
        assert!(repo.all_notes().is_empty());
        repo.add_note("3", "Checked in", "Sarah").unwrap();
        config.save_notes(&repo.all_notes()).unwrap();

        let reloaded = config.load_notes().unwrap();
        assert_eq!(reloaded.list_notes("3")[0].note, "Checked in");
    }

    #[test]
    fn missing_roster_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(Some(dir.path().join("absent.csv")), None);
        assert!(config.load_store().is_err());
    }
}
