//! Patients Table Controller
//!
//! Owns the table state for one grid and the request in flight for it.
//! A new lazy-load event aborts the previous request; dropping the
//! controller aborts whatever is pending.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::services::PatientsApi;
use crate::services::runtime::spawn_in_tokio;
use crate::state::{LazyLoadEvent, LoadOutcome, LoadTicket, PatientTableState, TableSnapshot};

/// Notifications for whoever renders the table
#[derive(Clone, Debug)]
pub enum TableEvent {
    /// A request went out
    Loading { seq: u64, page: usize, first_row: usize },
    /// The table content changed
    Loaded(TableSnapshot),
    /// The request failed; the table is now empty
    Failed { page: usize, error: Arc<Error> },
    /// A superseded response arrived and was dropped
    Stale { seq: u64 },
}

/// Controller for one patients grid
pub struct PatientTableController<A: PatientsApi> {
    api: Arc<A>,
    state: Arc<Mutex<PatientTableState>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    /// Filters and sort of the last accepted event, reused by `load_next`
    last_event: Mutex<LazyLoadEvent>,
    tx: Sender<TableEvent>,
    rx: Receiver<TableEvent>,
}

impl<A: PatientsApi> PatientTableController<A> {
    pub fn new(api: Arc<A>, state: PatientTableState) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            api,
            state: Arc::new(Mutex::new(state)),
            in_flight: Mutex::new(None),
            last_event: Mutex::new(LazyLoadEvent::default()),
            tx,
            rx,
        }
    }

    /// Receiver for table events
    pub fn events(&self) -> Receiver<TableEvent> {
        self.rx.clone()
    }

    /// Current table content
    pub fn snapshot(&self) -> TableSnapshot {
        self.state.lock().snapshot()
    }

    /// Handle a lazy-load event from the grid without waiting for the result
    ///
    /// Returns the ticket of the request that was issued.
    pub fn on_lazy_load(&self, event: &LazyLoadEvent) -> Result<LoadTicket> {
        // Held from `begin` to the swap so the newest ticket owns the slot
        let mut in_flight = self.in_flight.lock();
        let ticket = self.begin(event)?;

        let api = self.api.clone();
        let state = self.state.clone();
        let tx = self.tx.clone();
        let task_ticket = ticket.clone();
        let handle = spawn_in_tokio(async move {
            let outcome = fetch_and_apply(&*api, &state, &task_ticket).await;
            publish(&tx, &state, outcome);
        });

        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }
        Ok(ticket)
    }

    /// Handle a lazy-load event and wait for it to settle
    pub async fn load(&self, event: &LazyLoadEvent) -> Result<LoadOutcome> {
        let ticket = {
            let mut in_flight = self.in_flight.lock();
            let ticket = self.begin(event)?;
            if let Some(previous) = in_flight.take() {
                previous.abort();
            }
            ticket
        };

        let outcome = fetch_and_apply(&*self.api, &self.state, &ticket).await;
        publish(&self.tx, &self.state, outcome.clone());
        Ok(outcome)
    }

    /// Load the page after the current one, if the table knows its cursor
    pub async fn load_next(&self) -> Result<Option<LoadOutcome>> {
        let event = {
            let state = self.state.lock();
            if !state.has_next() {
                return Ok(None);
            }
            let size = state.page_size().get();
            let mut event = self.last_event.lock().clone();
            event.first = (state.current_page() + 1) * size;
            event.rows = Some(size);
            event
        };
        self.load(&event).await.map(Some)
    }

    /// The grid's "Clear" action: drop every filter and reload page one
    pub async fn clear(&self) -> Result<LoadOutcome> {
        let size = self.state.lock().page_size().get();
        self.load(&LazyLoadEvent::page(0, size)).await
    }

    /// Abort the pending request and ignore its response
    pub fn shutdown(&self) {
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
        self.state.lock().cancel();
    }

    fn begin(&self, event: &LazyLoadEvent) -> Result<LoadTicket> {
        let ticket = match self.state.lock().begin_load(event) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::error!(error = %e, "Lazy load rejected");
                return Err(e);
            }
        };
        *self.last_event.lock() = event.clone();

        let _ = self.tx.send(TableEvent::Loading {
            seq: ticket.seq(),
            page: ticket.page(),
            first_row: ticket.first_row(),
        });
        Ok(ticket)
    }
}

impl<A: PatientsApi> Drop for PatientTableController<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<A: PatientsApi> std::fmt::Debug for PatientTableController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientTableController")
            .field("state", &*self.state.lock())
            .finish()
    }
}

async fn fetch_and_apply<A: PatientsApi>(
    api: &A,
    state: &Mutex<PatientTableState>,
    ticket: &LoadTicket,
) -> LoadOutcome {
    let result = api.patients_page(ticket.request()).await;
    state.lock().finish_load(ticket, result)
}

fn publish(tx: &Sender<TableEvent>, state: &Mutex<PatientTableState>, outcome: LoadOutcome) {
    let event = match outcome {
        LoadOutcome::Loaded { .. } => TableEvent::Loaded(state.lock().snapshot()),
        LoadOutcome::Failed { page, error } => TableEvent::Failed { page, error },
        LoadOutcome::Stale { seq } => TableEvent::Stale { seq },
    };
    let _ = tx.send(event);
}
