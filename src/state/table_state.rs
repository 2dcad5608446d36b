//! PatientTableState - Lazy Table Load Sequencing
//!
//! Turns grid lazy-load events into page requests and folds responses back
//! in. Only the newest request may change the table; older responses are
//! recognised by their sequence number and dropped.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::domain::{FilterKey, PageRequest, Patient, PatientsPage, RawFilter, SortOrder};
use crate::error::{Error, Result};
use crate::pagination::CursorTracker;
use crate::query::{GridSnapshot, QueryBuilder};

/// Lazy-load payload as a paginated grid emits it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LazyLoadEvent {
    /// Index of the first row of the requested page
    pub first: usize,
    /// Rows per page; `None` keeps the current size
    pub rows: Option<usize>,
    /// Constraints per field; only the first one of each is used
    pub filters: BTreeMap<String, Vec<RawFilter>>,
    pub sort_field: Option<String>,
    /// `1` ascending, `-1` descending, `0` unsorted
    pub sort_order: i8,
}

impl LazyLoadEvent {
    pub fn page(first: usize, rows: usize) -> Self {
        Self {
            first,
            rows: Some(rows),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, filter: RawFilter) -> Self {
        self.filters.insert(field.into(), vec![filter]);
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = match order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        self
    }

    /// Filter and sort state carried by this event
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            filters: self
                .filters
                .iter()
                .filter_map(|(field, constraints)| {
                    constraints.first().map(|c| (field.clone(), c.clone()))
                })
                .collect(),
            sort_field: self.sort_field.clone(),
            sort_order: SortOrder::from_grid(self.sort_order),
        }
    }
}

/// Handle for one issued request
#[derive(Clone, Debug, PartialEq)]
pub struct LoadTicket {
    seq: u64,
    page: usize,
    request: PageRequest,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    /// Row index of the page start, for syncing the paginator
    pub fn first_row(&self) -> usize {
        self.page * self.request.page_size.get()
    }
}

/// What a finished request did to the table
#[derive(Clone, Debug)]
pub enum LoadOutcome {
    Loaded {
        page: usize,
        rows: usize,
        has_next: bool,
    },
    Failed {
        page: usize,
        error: Arc<Error>,
    },
    /// A newer request was issued; the response was ignored
    Stale { seq: u64 },
}

/// Point-in-time copy of what the table shows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSnapshot {
    pub rows: Vec<Patient>,
    pub total_records: u64,
    pub loading: bool,
    pub page: usize,
    pub page_size: usize,
    pub has_next: bool,
}

impl TableSnapshot {
    pub fn summary(&self) -> String {
        format!("Showing {} of {} records", self.rows.len(), self.total_records)
    }
}

/// Table state for one patients grid
#[derive(Debug)]
pub struct PatientTableState {
    builder: QueryBuilder,
    tracker: CursorTracker,
    page_size: NonZeroUsize,
    /// Filters the current cursors belong to; `None` before the first load
    filter_key: Option<FilterKey>,
    rows: Vec<Patient>,
    total_records: u64,
    loading: bool,
    seq: u64,
}

impl PatientTableState {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self::with_builder(QueryBuilder::new(), page_size)
    }

    pub fn with_builder(builder: QueryBuilder, page_size: NonZeroUsize) -> Self {
        Self {
            builder,
            tracker: CursorTracker::new(),
            page_size,
            filter_key: None,
            rows: Vec::new(),
            total_records: 0,
            loading: false,
            seq: 0,
        }
    }

    // ==================== Getters ====================

    pub fn rows(&self) -> &[Patient] {
        &self.rows
    }

    /// Advisory record count for the paginator
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.tracker.current_page()
    }

    pub fn has_next(&self) -> bool {
        self.tracker.has_next()
    }

    pub fn tracker(&self) -> &CursorTracker {
        &self.tracker
    }

    /// Sequence number of the newest issued request
    pub fn sequence(&self) -> u64 {
        self.seq
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            rows: self.rows.clone(),
            total_records: self.total_records,
            loading: self.loading,
            page: self.tracker.current_page(),
            page_size: self.page_size.get(),
            has_next: self.tracker.has_next(),
        }
    }

    // ==================== Transitions ====================

    /// Prepare the request for a lazy-load event
    ///
    /// A page size or filter change forgets every cursor and targets the
    /// first page. An unreachable page fails without touching the state.
    pub fn begin_load(&mut self, event: &LazyLoadEvent) -> Result<LoadTicket> {
        let page_size = match event.rows {
            Some(rows) => NonZeroUsize::new(rows).ok_or_else(|| Error::Invalid {
                message: "Page size must be positive".to_string(),
            })?,
            None => self.page_size,
        };

        let snapshot = event.snapshot();
        let key = self.builder.build(&snapshot, None, page_size).filter_key();

        let size_changed = page_size != self.page_size;
        let filters_changed = self.filter_key.as_ref().is_some_and(|k| *k != key);
        let reset = size_changed || filters_changed;

        let page = if reset { 0 } else { event.first / page_size };
        if !reset {
            self.tracker.cursor_for(page)?;
        }

        if size_changed {
            tracing::info!(
                from = self.page_size.get(),
                to = page_size.get(),
                "Page size changed"
            );
        }
        if filters_changed {
            tracing::info!("Filters changed, restarting from first page");
        }
        if reset {
            self.tracker.reset();
        }

        let cursor = self.tracker.request(page)?;
        self.page_size = page_size;
        self.filter_key = Some(key);
        self.seq += 1;
        self.loading = true;

        let request = self.builder.build(&snapshot, cursor, page_size);
        tracing::debug!(seq = self.seq, page, ?request, "Issuing page request");

        Ok(LoadTicket {
            seq: self.seq,
            page,
            request,
        })
    }

    /// Apply the response for `ticket`
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<PatientsPage>) -> LoadOutcome {
        if ticket.seq != self.seq {
            tracing::warn!(
                seq = ticket.seq,
                latest = self.seq,
                "Discarding stale page response"
            );
            return LoadOutcome::Stale { seq: ticket.seq };
        }

        self.loading = false;

        match result {
            Ok(page) => {
                let next = page.next_cursor();
                let has_next = next.is_some();
                if let Err(e) = self.tracker.on_page_loaded(ticket.page, next) {
                    tracing::error!(error = %e, "Cursor table out of sync");
                }
                self.total_records =
                    self.estimate_total(ticket.page, page.data.len(), page.total_count, has_next);
                self.rows = page.data;

                tracing::info!(
                    page = ticket.page,
                    rows = self.rows.len(),
                    has_next,
                    "Page loaded"
                );
                LoadOutcome::Loaded {
                    page: ticket.page,
                    rows: self.rows.len(),
                    has_next,
                }
            }
            Err(error) => {
                tracing::error!(page = ticket.page, error = %error, "Error loading patients");
                self.rows.clear();
                self.total_records = 0;
                LoadOutcome::Failed {
                    page: ticket.page,
                    error: Arc::new(error),
                }
            }
        }
    }

    /// Ignore whatever request is in flight
    pub fn cancel(&mut self) {
        if self.loading {
            tracing::debug!(seq = self.seq, "Cancelling in-flight request");
        }
        self.seq += 1;
        self.loading = false;
    }

    /// Forget all cursors and drop any in-flight request
    pub fn reset(&mut self) {
        self.cancel();
        self.tracker.reset();
    }

    /// Server count when given, otherwise what the known cursors imply
    fn estimate_total(&self, page: usize, rows: usize, server: Option<u64>, has_next: bool) -> u64 {
        if let Some(total) = server {
            return total;
        }
        let size = self.page_size.get() as u64;
        if has_next {
            self.tracker.known_pages() as u64 * size
        } else {
            page as u64 * size + rows as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cursor, FilterValue, MatchMode};

    fn state(size: usize) -> PatientTableState {
        PatientTableState::new(NonZeroUsize::new(size).expect("non-zero"))
    }

    fn patients(n: usize) -> Vec<Patient> {
        (0..n)
            .map(|i| Patient::new(format!("p{i}"), format!("name {i}")))
            .collect()
    }

    fn page(n: usize, key: Option<&str>) -> PatientsPage {
        PatientsPage {
            data: patients(n),
            last_key: key.map(Cursor::new),
            total_count: None,
        }
    }

    #[test]
    fn first_load_with_filter_then_cursor_stored() {
        let mut table = state(25);
        let event = LazyLoadEvent::page(0, 25)
            .with_filter("gender", RawFilter::predicate("Female", MatchMode::Equals));

        let ticket = table.begin_load(&event).expect("ticket");
        assert!(table.is_loading());
        assert_eq!(ticket.page(), 0);
        let request = ticket.request();
        assert_eq!(request.page_size.get(), 25);
        assert!(request.cursor.is_none());
        assert_eq!(request.filters["gender"].value, FilterValue::Text("Female".into()));

        let outcome = table.finish_load(&ticket, Ok(page(25, Some("abc123"))));
        assert!(matches!(outcome, LoadOutcome::Loaded { page: 0, rows: 25, has_next: true }));
        assert_eq!(table.tracker().cursors(), &[None, Some(Cursor::new("abc123"))]);
        assert!(!table.is_loading());
        assert_eq!(table.total_records(), 50);
    }

    #[test]
    fn empty_intermediate_page_is_terminal_not_error() {
        let mut table = state(25);
        let first = LazyLoadEvent::page(0, 25);
        let ticket = table.begin_load(&first).expect("ticket");
        table.finish_load(&ticket, Ok(page(25, Some("abc123"))));

        let ticket = table.begin_load(&LazyLoadEvent::page(25, 25)).expect("ticket");
        assert_eq!(ticket.request().cursor, Some(Cursor::new("abc123")));

        let outcome = table.finish_load(&ticket, Ok(page(0, None)));
        assert!(matches!(outcome, LoadOutcome::Loaded { page: 1, rows: 0, has_next: false }));
        assert!(table.rows().is_empty());
        assert_eq!(table.tracker().cursors(), &[None, Some(Cursor::new("abc123"))]);
        assert_eq!(table.total_records(), 25);
    }

    #[test]
    fn page_size_change_resets_cursors() {
        let mut table = state(25);
        for i in 0..3 {
            let ticket = table.begin_load(&LazyLoadEvent::page(i * 25, 25)).expect("ticket");
            table.finish_load(&ticket, Ok(page(25, Some(&format!("k{i}")))));
        }
        assert_eq!(table.tracker().known_pages(), 4);

        let ticket = table.begin_load(&LazyLoadEvent::page(75, 50)).expect("ticket");
        assert_eq!(ticket.page(), 0);
        assert!(ticket.request().cursor.is_none());
        assert_eq!(table.tracker().cursors(), &[None]);
        assert_eq!(table.page_size().get(), 50);
    }

    #[test]
    fn filter_change_resets_cursors() {
        let mut table = state(10);
        let ticket = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        table.finish_load(&ticket, Ok(page(10, Some("a"))));

        let event = LazyLoadEvent::page(10, 10).with_filter("name", RawFilter::text("ada"));
        let ticket = table.begin_load(&event).expect("ticket");
        assert_eq!(ticket.page(), 0);
        assert!(ticket.request().cursor.is_none());

        // blank filter equals no filter, so it counts as a change back
        let event = LazyLoadEvent::page(0, 10).with_filter("name", RawFilter::text(" "));
        let ticket = table.begin_load(&event).expect("ticket");
        assert!(ticket.request().filters.is_empty());
        assert_eq!(table.tracker().cursors(), &[None]);
    }

    #[test]
    fn sort_change_resets_cursors() {
        let mut table = state(10);
        let ticket = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        table.finish_load(&ticket, Ok(page(10, Some("a"))));

        let event = LazyLoadEvent::page(10, 10).with_sort("name", SortOrder::Asc);
        let ticket = table.begin_load(&event).expect("ticket");
        assert_eq!(ticket.page(), 0);
        assert_eq!(ticket.request().sort_order, Some(SortOrder::Asc));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut table = state(10);
        let old = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        let new = table
            .begin_load(&LazyLoadEvent::page(0, 10).with_filter("name", RawFilter::text("x")))
            .expect("ticket");

        let outcome = table.finish_load(&old, Ok(page(10, Some("old"))));
        assert!(matches!(outcome, LoadOutcome::Stale { .. }));
        assert_eq!(table.tracker().cursors(), &[None]);
        assert!(table.is_loading());

        table.finish_load(&new, Ok(page(2, None)));
        assert_eq!(table.rows().len(), 2);
        assert!(!table.is_loading());
    }

    #[test]
    fn failure_clears_rows_but_keeps_cursors() {
        let mut table = state(10);
        let ticket = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        table.finish_load(&ticket, Ok(page(10, Some("a"))));

        let ticket = table.begin_load(&LazyLoadEvent::page(10, 10)).expect("ticket");
        let outcome = table.finish_load(
            &ticket,
            Err(Error::Invalid {
                message: "boom".into(),
            }),
        );
        assert!(matches!(outcome, LoadOutcome::Failed { page: 1, .. }));
        assert!(table.rows().is_empty());
        assert_eq!(table.total_records(), 0);
        assert!(!table.is_loading());
        assert_eq!(table.tracker().known_pages(), 2);

        // retry reaches the same page again
        let retry = table.begin_load(&LazyLoadEvent::page(10, 10)).expect("ticket");
        assert_eq!(retry.request().cursor, Some(Cursor::new("a")));
    }

    #[test]
    fn unreachable_page_leaves_state_untouched() {
        let mut table = state(10);
        let ticket = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        table.finish_load(&ticket, Ok(page(10, Some("a"))));
        let seq = table.sequence();

        let err = table.begin_load(&LazyLoadEvent::page(30, 10)).expect_err("unreachable");
        assert!(matches!(err, Error::OutOfSequencePage { page: 3, known: 2 }));
        assert_eq!(table.sequence(), seq);
        assert!(!table.is_loading());
    }

    #[test]
    fn zero_rows_is_invalid() {
        let mut table = state(10);
        assert!(table.begin_load(&LazyLoadEvent::page(0, 0)).is_err());
    }

    #[test]
    fn cancel_makes_in_flight_stale() {
        let mut table = state(10);
        let ticket = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        table.cancel();
        assert!(!table.is_loading());
        let outcome = table.finish_load(&ticket, Ok(page(10, Some("a"))));
        assert!(matches!(outcome, LoadOutcome::Stale { .. }));
        assert!(table.rows().is_empty());
    }

    #[test]
    fn server_count_wins() {
        let mut table = state(10);
        let ticket = table.begin_load(&LazyLoadEvent::page(0, 10)).expect("ticket");
        let mut response = page(10, Some("a"));
        response.total_count = Some(123);
        table.finish_load(&ticket, Ok(response));
        assert_eq!(table.total_records(), 123);
        assert_eq!(table.snapshot().summary(), "Showing 10 of 123 records");
    }

    #[test]
    fn only_first_constraint_per_field_is_used() {
        let mut event = LazyLoadEvent::page(0, 5);
        event.filters.insert(
            "name".into(),
            vec![RawFilter::text("first"), RawFilter::text("second")],
        );
        event.filters.insert("gender".into(), Vec::new());
        let snapshot = event.snapshot();
        assert_eq!(snapshot.filters.len(), 1);
        assert_eq!(snapshot.filters["name"], RawFilter::text("first"));
    }
}
