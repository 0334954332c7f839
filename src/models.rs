use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::summary;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbsenceRecord {
    pub student_id: i64,
    #[serde(deserialize_with = "iso_or_display_date")]
    pub missed_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentDirectoryEntry {
    pub student_id: i64,
    pub name: Option<String>,
    pub parent_email: Option<String>,
}

pub type StudentDirectory = BTreeMap<i64, StudentDirectoryEntry>;

/// First and last recorded absence for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceSpan {
    pub student_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_count: i64,
    /// Distinct dates actually on record. Can be lower than `days_count`
    /// when the student attended days inside the span.
    pub recorded_days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsenceSummary {
    pub student_id: i64,
    #[serde(serialize_with = "display_date")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "display_date")]
    pub end_date: NaiveDate,
    pub days_count: i64,
    pub recorded_days: usize,
    pub email: Option<String>,
    pub message: String,
}

fn display_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&summary::format_date(*date))
}

/// Accepts `YYYY-MM-DD` or the `DD-MM-YYYY` form the reports print.
fn iso_or_display_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .or_else(|_| summary::parse_date(&raw))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_display_dates_and_null_email() {
        let summary = AbsenceSummary {
            student_id: 103,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            days_count: 9,
            recorded_days: 5,
            email: None,
            message: "No email available".to_string(),
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["student_id"], 103);
        assert_eq!(value["start_date"], "01-03-2024");
        assert_eq!(value["end_date"], "09-03-2024");
        assert_eq!(value["days_count"], 9);
        assert_eq!(value["recorded_days"], 5);
        assert!(value["email"].is_null());
        assert_eq!(value["message"], "No email available");
    }
}
