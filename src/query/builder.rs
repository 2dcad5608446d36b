//! Query Builder
//!
//! Turns one grid state snapshot into a [`PageRequest`]. Pure: no I/O, no
//! hidden state, same inputs give the same request.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use chrono::{DateTime, Local};

use crate::constants::{CALENDAR_DATE_FORMAT, GLOBAL_FILTER_FIELD};
use crate::domain::{
    Cursor, FilterPredicate, FilterValue, MatchMode, Operator, PageRequest, RawFilter, RawValue,
    SortOrder,
};

/// Filter, search and sort state of one grid at the moment a load is issued
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridSnapshot {
    pub filters: BTreeMap<String, RawFilter>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl GridSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, filter: RawFilter) -> Self {
        self.filters.insert(field.into(), filter);
        self
    }

    pub fn search(self, term: impl Into<String>) -> Self {
        self.filter(GLOBAL_FILTER_FIELD, RawFilter::text(term))
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order);
        self
    }
}

/// Builds page requests for one kind of grid
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    global_field: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            global_field: GLOBAL_FILTER_FIELD.to_string(),
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different field name as the global search channel
    pub fn with_global_field(mut self, field: impl Into<String>) -> Self {
        self.global_field = field.into();
        self
    }

    pub fn global_field(&self) -> &str {
        &self.global_field
    }

    /// Build the request for the page reached through `cursor`
    pub fn build(
        &self,
        snapshot: &GridSnapshot,
        cursor: Option<Cursor>,
        page_size: NonZeroUsize,
    ) -> PageRequest {
        let mut request = PageRequest::first(page_size);
        request.cursor = cursor;

        for (field, raw) in &snapshot.filters {
            let Some((value, match_mode, operator)) = normalize(raw) else {
                continue;
            };

            if *field == self.global_field {
                request.search = Some(value.to_param());
                continue;
            }

            request.filters.insert(
                field.clone(),
                FilterPredicate {
                    value,
                    match_mode: match_mode.unwrap_or_default(),
                    operator: operator.unwrap_or_default(),
                },
            );
        }

        if let Some(field) = snapshot.sort_field.as_deref().map(str::trim)
            && !field.is_empty()
        {
            request.sort_field = Some(field.to_string());
            request.sort_order = snapshot.sort_order;
        }

        request
    }
}

/// Local calendar date of `dt`
pub fn to_calendar_date(dt: &DateTime<Local>) -> String {
    dt.date_naive().format(CALENDAR_DATE_FORMAT).to_string()
}

type Normalized = (FilterValue, Option<MatchMode>, Option<Operator>);

fn normalize(raw: &RawFilter) -> Option<Normalized> {
    match raw {
        RawFilter::Scalar(value) => non_blank(value.clone()?).map(|v| (v, None, None)),
        RawFilter::Date(dt) => Some((FilterValue::Text(to_calendar_date(dt)), None, None)),
        RawFilter::Predicate {
            value,
            match_mode,
            operator,
        } => {
            let value = match value.as_ref()? {
                RawValue::Scalar(v) => non_blank(v.clone())?,
                RawValue::Date(dt) => FilterValue::Text(to_calendar_date(dt)),
            };
            Some((value, *match_mode, *operator))
        }
    }
}

/// Trim text values; blank text is absent
fn non_blank(value: FilterValue) -> Option<FilterValue> {
    match value {
        FilterValue::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| FilterValue::Text(trimmed.to_string()))
        }
        other => Some(other),
    }
}
