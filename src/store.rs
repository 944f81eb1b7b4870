use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::{AttendanceRecord, MenteeStatus, TRACKING_WINDOW};

/// The roster of mentees the process works on. Built once at startup and
/// handed to callers by reference.
#[derive(Debug, Clone, Default)]
pub struct MenteeStore {
    records: Vec<AttendanceRecord>,
}

impl MenteeStore {
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        let mut store = Self::default();
        store.replace_all(records);
        store
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AttendanceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Swaps in a freshly loaded roster, re-deriving every classification.
    pub fn replace_all(&mut self, records: Vec<AttendanceRecord>) {
        self.records = crate::classify::classify_all(&records);
        info!(count = self.records.len(), "mentee roster loaded");
    }

    pub fn set_status(
        &mut self,
        id: &str,
        status: MenteeStatus,
    ) -> Result<&AttendanceRecord, StoreError> {
        let record = self.get_mut(id)?;
        let previous = record.status;
        record.status = status;
        info!(mentee_id = id, from = %previous, to = %status, "status changed");
        Ok(&*record)
    }

    /// Records attendance for one week. Presence also moves `last_attendance`
    /// forward to `on` when given.
    pub fn mark_week(
        &mut self,
        id: &str,
        week_index: usize,
        present: bool,
        on: Option<NaiveDate>,
    ) -> Result<&AttendanceRecord, StoreError> {
        if week_index >= TRACKING_WINDOW {
            warn!(mentee_id = id, week_index, "attendance update outside tracking window");
            return Err(StoreError::WeekOutOfRange {
                week: week_index,
                window: TRACKING_WINDOW,
            });
        }

        let record = self.get_mut(id)?;
        record.mark_week(week_index, present);
        if present {
            if let Some(date) = on {
                record.last_attendance = Some(record.last_attendance.map_or(date, |d| d.max(date)));
            }
        }
        info!(
            mentee_id = id,
            week_index,
            present,
            priority = %record.priority(),
            "attendance updated"
        );
        Ok(&*record)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut AttendanceRecord, StoreError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::MenteeNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::seed_records;
    use crate::models::Priority;

    #[test]
    fn status_change_leaves_classification_alone() {
        let mut store = MenteeStore::new(seed_records());
        let record = store.set_status("1", MenteeStatus::Dnr).unwrap();
        assert_eq!(record.status, MenteeStatus::Dnr);
        assert_eq!(record.priority(), Priority::P0);
    }

    #[test]
    fn unknown_mentee_is_an_error() {
        let mut store = MenteeStore::new(seed_records());
        assert_eq!(
            store.set_status("99", MenteeStatus::Completed).unwrap_err(),
            StoreError::MenteeNotFound("99".to_string())
        );
        assert!(store.mark_week("99", 0, true, None).is_err());
    }

    #[test]
    fn marking_presence_rederives_priority() {
        let mut store = MenteeStore::new(seed_records());
        let date = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
        let record = store.mark_week("2", 0, true, Some(date)).unwrap();
        assert_eq!(record.missed_classes(), 2);
        assert_eq!(record.priority(), Priority::P2);
        assert_eq!(record.last_attendance, Some(date));
    }

    #[test]
    fn older_presence_date_does_not_rewind_last_attendance() {
        let mut store = MenteeStore::new(seed_records());
        let early = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let record = store.mark_week("5", 0, true, Some(early)).unwrap();
        assert_eq!(record.last_attendance, NaiveDate::from_ymd_opt(2025, 5, 14));
    }

    #[test]
    fn week_outside_window_is_rejected() {
        let mut store = MenteeStore::new(seed_records());
        assert_eq!(
            store.mark_week("1", TRACKING_WINDOW, true, None).unwrap_err(),
            StoreError::WeekOutOfRange {
                week: TRACKING_WINDOW,
                window: TRACKING_WINDOW
            }
        );
    }

    #[test]
    fn replace_all_swaps_roster() {
        let mut store = MenteeStore::new(seed_records());
        store.replace_all(Vec::new());
        assert!(store.is_empty());
        assert!(store.get("1").is_none());
    }
}
