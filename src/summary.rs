use std::collections::{BTreeMap, BTreeSet};

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{AbsenceRecord, AbsenceSpan, AbsenceSummary, StudentDirectory};

pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const NO_EMAIL_MESSAGE: &str = "No email available";

pub fn group_absences(records: &[AbsenceRecord]) -> Vec<AbsenceSpan> {
    let mut groups: BTreeMap<i64, (NaiveDate, NaiveDate, BTreeSet<NaiveDate>)> = BTreeMap::new();

    for record in records {
        let entry = groups
            .entry(record.student_id)
            .or_insert_with(|| (record.missed_on, record.missed_on, BTreeSet::new()));
        entry.0 = entry.0.min(record.missed_on);
        entry.1 = entry.1.max(record.missed_on);
        entry.2.insert(record.missed_on);
    }

    groups
        .into_iter()
        .map(|(student_id, (start_date, end_date, dates))| AbsenceSpan {
            student_id,
            start_date,
            end_date,
            days_count: compute_span(start_date, end_date),
            recorded_days: dates.len(),
        })
        .collect()
}

/// Inclusive day span. Not clamped: `end < start` yields zero or less.
pub fn compute_span(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid DD-MM-YYYY date: {value}"))
}

pub fn build_message(
    name: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
    days_count: i64,
    parent_email: Option<&str>,
) -> String {
    if parent_email.is_none() {
        return NO_EMAIL_MESSAGE.to_string();
    }

    format!(
        "Dear Parent, your child {} was absent from {} to {} for {} days. Please ensure their attendance improves.",
        name.unwrap_or("None"),
        format_date(start),
        format_date(end),
        days_count
    )
}

pub fn summarize(
    records: &[AbsenceRecord],
    directory: &StudentDirectory,
) -> anyhow::Result<Vec<AbsenceSummary>> {
    let mut summaries = Vec::new();

    for span in group_absences(records) {
        let entry = directory.get(&span.student_id).with_context(|| {
            format!(
                "student {} has absence records but no directory entry",
                span.student_id
            )
        })?;
        let email = entry
            .parent_email
            .as_deref()
            .filter(|email| !email.is_empty());
        let message = build_message(
            entry.name.as_deref(),
            span.start_date,
            span.end_date,
            span.days_count,
            email,
        );

        summaries.push(AbsenceSummary {
            student_id: span.student_id,
            start_date: span.start_date,
            end_date: span.end_date,
            days_count: span.days_count,
            recorded_days: span.recorded_days,
            email: email.map(str::to_string),
            message,
        });
    }

    tracing::debug!(students = summaries.len(), "joined absence spans with directory");
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentDirectoryEntry;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn absence(student_id: i64, missed_on: NaiveDate) -> AbsenceRecord {
        AbsenceRecord {
            student_id,
            missed_on,
        }
    }

    fn directory(entries: &[(i64, Option<&str>, Option<&str>)]) -> StudentDirectory {
        entries
            .iter()
            .map(|(student_id, name, email)| {
                (
                    *student_id,
                    StudentDirectoryEntry {
                        student_id: *student_id,
                        name: name.map(str::to_string),
                        parent_email: email.map(str::to_string),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn groups_use_min_and_max_regardless_of_order() {
        let records = vec![
            absence(102, d(2024, 3, 5)),
            absence(101, d(2024, 3, 3)),
            absence(101, d(2024, 3, 1)),
            absence(102, d(2024, 3, 2)),
            absence(101, d(2024, 3, 4)),
        ];

        let spans = group_absences(&records);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].student_id, 101);
        assert_eq!(spans[0].start_date, d(2024, 3, 1));
        assert_eq!(spans[0].end_date, d(2024, 3, 4));
        assert_eq!(spans[0].days_count, 4);
        assert_eq!(spans[1].student_id, 102);
        assert_eq!(spans[1].days_count, 4);
        assert!(spans.iter().all(|s| s.start_date <= s.end_date && s.days_count >= 1));
    }

    #[test]
    fn single_day_absence_spans_one_day() {
        let spans = group_absences(&[absence(7, d(2024, 2, 29))]);
        assert_eq!(spans[0].days_count, 1);
        assert_eq!(spans[0].recorded_days, 1);
    }

    #[test]
    fn span_counts_attended_gaps() {
        let records = vec![absence(5, d(2024, 3, 1)), absence(5, d(2024, 3, 10))];
        let spans = group_absences(&records);
        assert_eq!(spans[0].days_count, 10);
        assert_eq!(spans[0].recorded_days, 2);
    }

    #[test]
    fn empty_records_produce_no_spans() {
        assert!(group_absences(&[]).is_empty());
    }

    #[test]
    fn compute_span_is_not_clamped() {
        assert_eq!(compute_span(d(2024, 3, 4), d(2024, 3, 1)), -2);
        assert_eq!(compute_span(d(2024, 12, 31), d(2025, 1, 1)), 2);
    }

    #[test]
    fn dates_format_and_parse_day_first() {
        let date = d(2024, 3, 1);
        assert_eq!(format_date(date), "01-03-2024");
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
        assert!(parse_date("2024-03-01").is_err());
    }

    #[test]
    fn message_embeds_name_dates_and_count() {
        let message = build_message(
            Some("Alice Johnson"),
            d(2024, 3, 1),
            d(2024, 3, 4),
            4,
            Some("alice_parent@example.com"),
        );
        assert_eq!(
            message,
            "Dear Parent, your child Alice Johnson was absent from 01-03-2024 to 04-03-2024 for 4 days. Please ensure their attendance improves."
        );
    }

    #[test]
    fn message_without_email_is_placeholder() {
        let message = build_message(Some("Bob"), d(2024, 3, 1), d(2024, 3, 2), 2, None);
        assert_eq!(message, NO_EMAIL_MESSAGE);
    }

    #[test]
    fn summarize_joins_directory() {
        let records = vec![
            absence(101, d(2024, 3, 1)),
            absence(101, d(2024, 3, 4)),
            absence(103, d(2024, 3, 5)),
            absence(103, d(2024, 3, 9)),
        ];
        let dir = directory(&[
            (101, Some("Alice Johnson"), Some("alice_parent@example.com")),
            (103, None, None),
        ]);

        let summaries = summarize(&records, &dir).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].email.as_deref(), Some("alice_parent@example.com"));
        assert!(summaries[0].message.contains("Alice Johnson"));
        assert!(summaries[0].message.contains("for 4 days"));
        assert_eq!(summaries[1].email, None);
        assert_eq!(summaries[1].message, NO_EMAIL_MESSAGE);
        assert_eq!(summaries[1].days_count, 5);
    }

    #[test]
    fn empty_email_counts_as_missing() {
        let records = vec![absence(9, d(2024, 3, 1)), absence(10, d(2024, 3, 1))];
        let dir = directory(&[(9, Some("Kai"), Some("")), (10, Some("Noor"), Some(" "))]);
        let summaries = summarize(&records, &dir).unwrap();
        assert_eq!(summaries[0].email, None);
        assert_eq!(summaries[0].message, NO_EMAIL_MESSAGE);
        assert_eq!(summaries[1].email.as_deref(), Some(" "));
        assert!(summaries[1].message.contains("Noor"));
    }

    #[test]
    fn missing_directory_entry_is_fatal() {
        let records = vec![absence(404, d(2024, 3, 1))];
        let err = summarize(&records, &directory(&[])).unwrap_err();
        assert!(err.to_string().contains("student 404"));
    }
}
