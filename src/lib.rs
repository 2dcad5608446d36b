//! patients-grid Client Library
//!
//! Browses a patient-records list endpoint that pages with opaque
//! forward-only cursors. Grid state is turned into page requests by the
//! query builder; the cursor tracker remembers how to reach each page.

pub mod connection;
pub mod constants;
pub mod domain;
pub mod error;
pub mod features;
pub mod pagination;
pub mod query;
pub mod services;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
