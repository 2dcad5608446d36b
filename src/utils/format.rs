//! Format - Cell Formatting Utilities

use chrono::{DateTime, Local, NaiveDate};

use crate::constants::{CALENDAR_DATE_FORMAT, DISPLAY_DATE_FORMAT};
use crate::domain::{Patient, Timestamp};

/// Placeholder for missing values
pub const EMPTY_CELL: &str = "-";

/// How a column renders its values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellPipe {
    #[default]
    Plain,
    Date,
    TitleCase,
    UpperCase,
    LowerCase,
    Number,
}

/// A table column
#[derive(Clone, Debug)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
    pub pipe: CellPipe,
}

/// Columns of the patients table
pub const PATIENT_COLUMNS: [Column; 5] = [
    Column {
        field: "name",
        header: "Name",
        pipe: CellPipe::TitleCase,
    },
    Column {
        field: "gender",
        header: "Gender",
        pipe: CellPipe::TitleCase,
    },
    Column {
        field: "insurance",
        header: "Insurance",
        pipe: CellPipe::Plain,
    },
    Column {
        field: "dob",
        header: "Date of Birth",
        pipe: CellPipe::Date,
    },
    Column {
        field: "timestamp",
        header: "Submitted Date",
        pipe: CellPipe::Date,
    },
];

/// Raw text of a patient field, `None` if absent
pub fn field_value(patient: &Patient, field: &str) -> Option<String> {
    match field {
        "PK" => Some(patient.pk.clone()),
        "name" => Some(patient.name.clone()),
        "gender" => patient.gender.clone(),
        "insurance" => patient.insurance.clone(),
        "dob" => patient.dob.clone(),
        "timestamp" => patient.timestamp.as_ref().map(|ts| match ts {
            Timestamp::EpochMillis(ms) => ms.to_string(),
            Timestamp::Text(s) => s.clone(),
        }),
        _ => None,
    }
}

/// Render one cell of `column` for `patient`
pub fn format_cell(patient: &Patient, column: &Column) -> String {
    if column.field == "timestamp" && column.pipe == CellPipe::Date {
        return patient
            .timestamp
            .as_ref()
            .and_then(Timestamp::to_local)
            .map(|dt| format_date(&dt))
            .unwrap_or_else(|| EMPTY_CELL.to_string());
    }

    match field_value(patient, column.field) {
        Some(value) => format_value(&value, column.pipe),
        None => EMPTY_CELL.to_string(),
    }
}

/// Apply a pipe to a raw value
pub fn format_value(value: &str, pipe: CellPipe) -> String {
    match pipe {
        CellPipe::Plain => value.to_string(),
        CellPipe::TitleCase => title_case(value),
        CellPipe::UpperCase => value.to_uppercase(),
        CellPipe::LowerCase => value.to_lowercase(),
        CellPipe::Date => parse_date(value)
            .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_else(|| EMPTY_CELL.to_string()),
        CellPipe::Number => match value.trim().parse::<i64>() {
            Ok(n) => format_number(n),
            Err(_) => value.to_string(),
        },
    }
}

/// Format a local datetime as a display date
pub fn format_date(dt: &DateTime<Local>) -> String {
    dt.format(DISPLAY_DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, CALENDAR_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Local).date_naive())
        })
}

/// Upper-case the first letter of each word, lower-case the rest
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string to max characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        format!("{}...", s.chars().take(max_len - 3).collect::<String>())
    }
}

/// Format a number with thousand separators
pub fn format_number(n: i64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 && chars[i - 1] != '-' {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("jANE doe"), "Jane Doe");
        assert_eq!(title_case("female"), "Female");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn missing_values_render_placeholder() {
        let patient = Patient::new("p1", "ada lovelace");
        assert_eq!(format_cell(&patient, &PATIENT_COLUMNS[0]), "Ada Lovelace");
        assert_eq!(format_cell(&patient, &PATIENT_COLUMNS[1]), EMPTY_CELL);
        assert_eq!(format_cell(&patient, &PATIENT_COLUMNS[4]), EMPTY_CELL);
    }

    #[test]
    fn dates_render_month_first() {
        let mut patient = Patient::new("p1", "a");
        patient.dob = Some("1990-04-02".into());
        assert_eq!(format_cell(&patient, &PATIENT_COLUMNS[3]), "04/02/1990");
        assert_eq!(format_value("not a date", CellPipe::Date), EMPTY_CELL);
    }

    #[test]
    fn numbers_and_truncation() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1234), "-1,234");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_value("1000", CellPipe::Number), "1,000");
        assert_eq!(truncate("abcdefgh", 6), "abc...");
        assert_eq!(truncate("abc", 6), "abc");
    }
}
