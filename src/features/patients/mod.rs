//! Patients feature: the lazily loaded patient records table.

pub mod controller;

pub use controller::*;
