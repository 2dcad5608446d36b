//! Patients API seam
//!
//! Table state and controllers talk to this trait so the HTTP service can be
//! swapped for an in-memory source.

use std::future::Future;
use std::num::NonZeroUsize;

use crate::domain::{Cursor, PageRequest, Patient, PatientsPage, PaymentsPage};
use crate::error::Result;

/// Read access to the patients endpoint
pub trait PatientsApi: Send + Sync + 'static {
    /// Fetch one page of the filtered list
    fn patients_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<PatientsPage>> + Send;

    /// Fetch a single record by id
    fn patient(&self, id: &str) -> impl Future<Output = Result<Patient>> + Send;

    /// Fetch one page of a patient's payments
    fn patient_payments(
        &self,
        id: &str,
        page_size: NonZeroUsize,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<PaymentsPage>> + Send;
}
