use std::fmt::Write;

use crate::models::AbsenceSummary;
use crate::summary;

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    header: &'static str,
    min_width: usize,
    align: Align,
}

const STUDENT_ID: Column = Column {
    header: "student_id",
    min_width: 10,
    align: Align::Right,
};
const START_DATE: Column = Column {
    header: "start_date",
    min_width: 16,
    align: Align::Left,
};
const END_DATE: Column = Column {
    header: "end_date",
    min_width: 14,
    align: Align::Left,
};
const DAYS: Column = Column {
    header: "total_days_absent",
    min_width: 17,
    align: Align::Right,
};
const EMAIL: Column = Column {
    header: "email",
    min_width: 23,
    align: Align::Left,
};
const MESSAGE: Column = Column {
    header: "message",
    min_width: 114,
    align: Align::Left,
};

const ABSENCE_COLUMNS: [Column; 4] = [STUDENT_ID, START_DATE, END_DATE, DAYS];
const NOTIFICATION_COLUMNS: [Column; 6] = [STUDENT_ID, START_DATE, END_DATE, DAYS, EMAIL, MESSAGE];

/// Column widths wide enough for the header and every cell.
fn fit_widths(columns: &[Column], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .filter_map(|cells| cells.get(index))
                .map(|cell| cell.chars().count())
                .chain([column.min_width, column.header.chars().count()])
                .max()
                .unwrap_or(column.min_width)
        })
        .collect()
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn row<S: AsRef<str>>(columns: &[Column], widths: &[usize], cells: &[S]) -> String {
    let mut line = String::from("|");
    for ((column, &width), cell) in columns.iter().zip(widths).zip(cells) {
        let cell = cell.as_ref();
        let _ = match column.align {
            Align::Left => write!(line, " {cell:<width$} |"),
            Align::Right => write!(line, " {cell:>width$} |"),
        };
    }
    line
}

fn header(output: &mut String, columns: &[Column], widths: &[usize]) {
    let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
    let _ = writeln!(output, "{}", border(widths));
    let _ = writeln!(output, "{}", row(columns, widths, &headers));
    let _ = writeln!(output, "{}", border(widths));
}

/// Splits a message at its first period. The first part keeps (or gains) the
/// terminating period; the second is the following sentence, if any.
pub fn split_message(message: &str) -> (String, Option<String>) {
    let mut sentences = message.split('.');
    let first = format!("{}.", sentences.next().unwrap_or_default());
    let second = sentences
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (first, second)
}

fn span_cells(summary: &AbsenceSummary) -> Vec<String> {
    vec![
        summary.student_id.to_string(),
        summary::format_date(summary.start_date),
        summary::format_date(summary.end_date),
        summary.days_count.to_string(),
    ]
}

pub fn build_absence_table(summaries: &[AbsenceSummary]) -> String {
    let rows: Vec<Vec<String>> = summaries.iter().map(span_cells).collect();
    let widths = fit_widths(&ABSENCE_COLUMNS, &rows);

    let mut output = String::new();
    let _ = writeln!(output, "Step 1: Absence Summary");
    header(&mut output, &ABSENCE_COLUMNS, &widths);

    for cells in &rows {
        let _ = writeln!(output, "{}", row(&ABSENCE_COLUMNS, &widths, cells));
    }

    let _ = writeln!(output, "{}", border(&widths));
    output
}

pub fn build_notification_table(summaries: &[AbsenceSummary]) -> String {
    // Each summary prints as a first line plus an optional continuation line.
    let mut blocks: Vec<(Vec<String>, Option<Vec<String>>)> = Vec::new();
    for summary in summaries {
        let (first, second) = split_message(&summary.message);
        let mut cells = span_cells(summary);
        cells.push(summary.email.clone().unwrap_or_else(|| "None".to_string()));
        cells.push(first);
        let continuation = second.map(|second| {
            let mut blank = vec![String::new(); NOTIFICATION_COLUMNS.len() - 1];
            blank.push(second);
            blank
        });
        blocks.push((cells, continuation));
    }

    let all_rows: Vec<Vec<String>> = blocks
        .iter()
        .flat_map(|(cells, continuation)| std::iter::once(cells).chain(continuation))
        .cloned()
        .collect();
    let widths = fit_widths(&NOTIFICATION_COLUMNS, &all_rows);

    let mut output = String::new();
    let _ = writeln!(output, "Step 2: Parent Notification Table");
    header(&mut output, &NOTIFICATION_COLUMNS, &widths);

    for (cells, continuation) in &blocks {
        let _ = writeln!(output, "{}", row(&NOTIFICATION_COLUMNS, &widths, cells));
        if let Some(continuation) = continuation {
            let _ = writeln!(
                output,
                "{}",
                row(&NOTIFICATION_COLUMNS, &widths, continuation)
            );
        }
        let _ = writeln!(output, "{}", border(&widths));
    }

    if summaries.is_empty() {
        let _ = writeln!(output, "{}", border(&widths));
    }

    output
}

pub fn build_report(summaries: &[AbsenceSummary]) -> String {
    let mut output = String::new();
    let _ = writeln!(output);
    output.push_str(&build_absence_table(summaries));
    let _ = writeln!(output);
    output.push_str(&build_notification_table(summaries));
    output
}
