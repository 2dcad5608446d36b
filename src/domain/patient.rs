//! Patient - Records and Page Envelopes

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::request::Cursor;
use crate::constants::CALENDAR_DATE_FORMAT;

/// A patient record as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique record id
    #[serde(rename = "PK")]
    pub pk: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Submission time, ISO string or epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl Patient {
    pub fn new(pk: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            name: name.into(),
            gender: None,
            insurance: None,
            dob: None,
            timestamp: None,
        }
    }

    /// Parsed date of birth, if present and well-formed
    pub fn dob_date(&self) -> Option<NaiveDate> {
        self.dob
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), CALENDAR_DATE_FORMAT).ok())
    }
}

/// Either representation the backend uses for `timestamp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    Text(String),
}

impl Timestamp {
    /// Interpret the timestamp in local time
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            Timestamp::EpochMillis(ms) => Local.timestamp_millis_opt(*ms).single(),
            Timestamp::Text(s) => {
                let s = s.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.with_timezone(&Local));
                }
                NaiveDate::parse_from_str(s, CALENDAR_DATE_FORMAT)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            }
        }
    }
}

/// Body of `GET /patients`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientsPage {
    #[serde(default)]
    pub data: Vec<Patient>,
    #[serde(rename = "lastKey", default)]
    pub last_key: Option<Cursor>,
    /// Advisory only
    #[serde(rename = "totalCount", alias = "count", alias = "total", default)]
    pub total_count: Option<u64>,
}

impl PatientsPage {
    /// Cursor for the following page; an empty key means no further pages
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.last_key.clone().filter(|c| !c.is_empty())
    }
}

/// Body of `GET /patients/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientEnvelope {
    pub data: Patient,
}

/// Body of `GET /patients/{id}/payments`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentsPage {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    #[serde(rename = "lastKey", default)]
    pub last_key: Option<Cursor>,
}

impl PaymentsPage {
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.last_key.clone().filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parses_minimal_body() {
        let page: PatientsPage =
            serde_json::from_str(r#"{"data":[{"PK":"p1","name":"ada"}]}"#).expect("parse");
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].pk, "p1");
        assert!(page.next_cursor().is_none());
        assert!(page.total_count.is_none());
    }

    #[test]
    fn page_accepts_count_alias_and_null_key() {
        let page: PatientsPage =
            serde_json::from_str(r#"{"data":[],"lastKey":null,"count":7}"#).expect("parse");
        assert_eq!(page.total_count, Some(7));
        assert!(page.next_cursor().is_none());
    }

    #[test]
    fn empty_last_key_is_terminal() {
        let page: PatientsPage = serde_json::from_str(r#"{"data":[],"lastKey":""}"#).expect("parse");
        assert!(page.next_cursor().is_none());
    }

    #[test]
    fn timestamp_accepts_both_forms() {
        let p: Patient = serde_json::from_str(
            r#"{"PK":"p1","name":"a","timestamp":1700000000000,"dob":"1990-04-02"}"#,
        )
        .expect("parse");
        assert_eq!(p.timestamp, Some(Timestamp::EpochMillis(1_700_000_000_000)));
        assert!(p.timestamp.as_ref().and_then(Timestamp::to_local).is_some());
        assert_eq!(p.dob_date(), NaiveDate::from_ymd_opt(1990, 4, 2));

        let p: Patient =
            serde_json::from_str(r#"{"PK":"p2","name":"b","timestamp":"2024-01-05T10:00:00Z"}"#)
                .expect("parse");
        assert!(matches!(p.timestamp, Some(Timestamp::Text(_))));
        assert!(p.timestamp.as_ref().and_then(Timestamp::to_local).is_some());
    }
}
