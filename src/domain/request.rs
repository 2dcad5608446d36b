//! Request - Page Request Descriptor

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::FilterPredicate;
use crate::error::Error;

/// Opaque scan position returned by the list endpoint as `lastKey`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Grid widgets encode order as `1` / `-1`; anything else is unsorted
    pub fn from_grid(order: i8) -> Option<Self> {
        match order {
            1 => Some(SortOrder::Asc),
            -1 => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::Invalid {
                message: format!("Unknown sort order: {other}"),
            }),
        }
    }
}

/// One page request, rebuilt from UI state for every load
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_size: NonZeroUsize,
    /// `None` requests the first page
    pub cursor: Option<Cursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, FilterPredicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl PageRequest {
    /// Request for the first page with no constraints
    pub fn first(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            cursor: None,
            search: None,
            filters: BTreeMap::new(),
            sort_field: None,
            sort_order: None,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }

    /// The part of the request that cursors are bound to
    pub fn filter_key(&self) -> FilterKey {
        FilterKey {
            search: self.search.clone(),
            filters: self.filters.clone(),
            sort_field: self.sort_field.clone(),
            sort_order: self.sort_order,
        }
    }
}

/// Search, filters and sort of a request; cursors never cross keys
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterKey {
    pub search: Option<String>,
    pub filters: BTreeMap<String, FilterPredicate>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}
