use crate::models::{AttendanceRecord, FilterCriteria};

/// Records matching every present criterion, in their original order.
pub fn filter<'a>(
    records: &'a [AttendanceRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a AttendanceRecord> {
    let needle = criteria
        .search_term
        .as_deref()
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|record| {
            criteria.priority.map_or(true, |tier| record.priority() == tier)
                && criteria.status.map_or(true, |status| record.status == status)
                && needle.as_deref().map_or(true, |term| matches_search(record, term))
        })
        .collect()
}

fn matches_search(record: &AttendanceRecord, lowered_term: &str) -> bool {
    record.name.to_lowercase().contains(lowered_term)
        || record.email.to_lowercase().contains(lowered_term)
}
