//! Filter - Column Constraints
//!
//! Raw filter values as a grid emits them, and the normalized predicates
//! that go out on the wire.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How a predicate value is compared against the field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    Equals,
    NotEquals,
    #[default]
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Lt,
    Lte,
    Gt,
    Gte,
    DateIs,
    DateIsNot,
    DateBefore,
    DateAfter,
    In,
    Between,
}

impl MatchMode {
    pub const ALL: [MatchMode; 16] = [
        MatchMode::Equals,
        MatchMode::NotEquals,
        MatchMode::Contains,
        MatchMode::NotContains,
        MatchMode::StartsWith,
        MatchMode::EndsWith,
        MatchMode::Lt,
        MatchMode::Lte,
        MatchMode::Gt,
        MatchMode::Gte,
        MatchMode::DateIs,
        MatchMode::DateIsNot,
        MatchMode::DateBefore,
        MatchMode::DateAfter,
        MatchMode::In,
        MatchMode::Between,
    ];

    /// Wire name, as used in `<field>.<matchMode>` query keys
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Equals => "equals",
            MatchMode::NotEquals => "notEquals",
            MatchMode::Contains => "contains",
            MatchMode::NotContains => "notContains",
            MatchMode::StartsWith => "startsWith",
            MatchMode::EndsWith => "endsWith",
            MatchMode::Lt => "lt",
            MatchMode::Lte => "lte",
            MatchMode::Gt => "gt",
            MatchMode::Gte => "gte",
            MatchMode::DateIs => "dateIs",
            MatchMode::DateIsNot => "dateIsNot",
            MatchMode::DateBefore => "dateBefore",
            MatchMode::DateAfter => "dateAfter",
            MatchMode::In => "in",
            MatchMode::Between => "between",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Invalid {
                message: format!("Unknown match mode: {s}"),
            })
    }
}

/// Logical operator joining constraints on the same field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

/// A scalar filter value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FilterValue {
    /// Query-string rendering of the value
    pub fn to_param(&self) -> String {
        match self {
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

/// The value slot of a pre-shaped predicate
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Scalar(FilterValue),
    Date(DateTime<Local>),
}

impl From<FilterValue> for RawValue {
    fn from(value: FilterValue) -> Self {
        RawValue::Scalar(value)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Scalar(s.into())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Scalar(s.into())
    }
}

impl From<DateTime<Local>> for RawValue {
    fn from(dt: DateTime<Local>) -> Self {
        RawValue::Date(dt)
    }
}

/// One field's filter state as the grid holds it, before normalization
#[derive(Clone, Debug, PartialEq)]
pub enum RawFilter {
    /// Bare scalar; `None` is an unset input
    Scalar(Option<FilterValue>),
    /// Value picked from a date input
    Date(DateTime<Local>),
    /// `{ value, matchMode, operator }` as emitted by a column filter menu
    Predicate {
        value: Option<RawValue>,
        match_mode: Option<MatchMode>,
        operator: Option<Operator>,
    },
}

impl RawFilter {
    pub fn text(value: impl Into<String>) -> Self {
        RawFilter::Scalar(Some(FilterValue::Text(value.into())))
    }

    pub fn predicate(value: impl Into<RawValue>, match_mode: MatchMode) -> Self {
        RawFilter::Predicate {
            value: Some(value.into()),
            match_mode: Some(match_mode),
            operator: None,
        }
    }

    pub fn date_predicate(value: DateTime<Local>, match_mode: MatchMode) -> Self {
        RawFilter::Predicate {
            value: Some(RawValue::Date(value)),
            match_mode: Some(match_mode),
            operator: None,
        }
    }
}

/// A normalized column constraint; its value is never blank
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicate {
    pub value: FilterValue,
    pub match_mode: MatchMode,
    pub operator: Operator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_mode_parses_wire_names() {
        assert_eq!("startsWith".parse::<MatchMode>().ok(), Some(MatchMode::StartsWith));
        assert_eq!("EQUALS".parse::<MatchMode>().ok(), Some(MatchMode::Equals));
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }

    #[test]
    fn match_mode_serde_matches_as_str() {
        for mode in MatchMode::ALL {
            let json = serde_json::to_string(&mode).expect("serialize");
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn predicate_serializes_camel_case() {
        let predicate = FilterPredicate {
            value: "Female".into(),
            match_mode: MatchMode::Equals,
            operator: Operator::And,
        };
        let json = serde_json::to_value(&predicate).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"value": "Female", "matchMode": "equals", "operator": "and"})
        );
    }
}
