use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{AbsenceRecord, StudentDirectory, StudentDirectoryEntry};

pub fn sample_absences() -> anyhow::Result<Vec<AbsenceRecord>> {
    let rows = [
        (101, "2024-03-01"),
        (101, "2024-03-02"),
        (101, "2024-03-03"),
        (101, "2024-03-04"),
        (102, "2024-03-02"),
        (102, "2024-03-03"),
        (102, "2024-03-04"),
        (102, "2024-03-05"),
        (103, "2024-03-05"),
        (103, "2024-03-06"),
        (103, "2024-03-07"),
        (103, "2024-03-08"),
        (103, "2024-03-09"),
    ];

    rows.into_iter()
        .map(|(student_id, missed_on)| {
            let missed_on = NaiveDate::parse_from_str(missed_on, "%Y-%m-%d")
                .with_context(|| format!("invalid sample date {missed_on}"))?;
            Ok::<_, anyhow::Error>(AbsenceRecord {
                student_id,
                missed_on,
            })
        })
        .collect()
}

pub fn sample_directory() -> StudentDirectory {
    let students = [
        (101, Some("Alice Johnson"), Some("alice_parent@example.com")),
        (102, Some("Bob Smith"), Some("bob_parent@example.com")),
        (103, None, None),
    ];

    students
        .into_iter()
        .map(|(student_id, name, email)| {
            (
                student_id,
                StudentDirectoryEntry {
                    student_id,
                    name: name.map(str::to_string),
                    parent_email: email.map(str::to_string),
                },
            )
        })
        .collect()
}

pub fn load_absences(csv_path: &Path) -> anyhow::Result<Vec<AbsenceRecord>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut records = Vec::new();

    for result in reader.deserialize::<AbsenceRecord>() {
        let record =
            result.with_context(|| format!("malformed absence row in {}", csv_path.display()))?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_directory(csv_path: &Path) -> anyhow::Result<StudentDirectory> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut directory = StudentDirectory::new();

    for result in reader.deserialize::<StudentDirectoryEntry>() {
        let entry =
            result.with_context(|| format!("malformed directory row in {}", csv_path.display()))?;
        if directory.contains_key(&entry.student_id) {
            tracing::warn!(
                student_id = entry.student_id,
                "duplicate directory entry, keeping the last one"
            );
        }
        directory.insert(entry.student_id, entry);
    }

    Ok(directory)
}
