//! Domain - Pure Data Structures and Wire Types
//!
//! These types carry no I/O and describe records, filters and page requests.

pub mod filter;
pub mod patient;
pub mod request;

pub use filter::{FilterPredicate, FilterValue, MatchMode, Operator, RawFilter, RawValue};
pub use patient::{Patient, PatientEnvelope, PatientsPage, PaymentsPage, Timestamp};
pub use request::{Cursor, FilterKey, PageRequest, SortOrder};
