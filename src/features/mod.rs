//! Features - Vertical Feature Slices
//!
//! Each feature contains its controller and the state it drives.

pub mod patients;
