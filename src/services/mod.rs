//! Service Layer
//!
//! Access to the patients REST endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            PatientTableController            │
//! └──────────────────────────────────────────────┘
//!                        │ PageRequest
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │   PatientsApi  ◄──  PatientService (reqwest) │
//! │                       + TokenSource (bearer) │
//! └──────────────────────────────────────────────┘
//!                        │ GET <base>/patients
//!                        ▼
//!                   list endpoint
//! ```

mod api;
mod patient_service;
pub mod runtime;

pub use api::*;
pub use patient_service::*;
