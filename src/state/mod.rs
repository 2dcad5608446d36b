//! State - Per-Grid Table State
//!
//! Synchronous bookkeeping for one lazily loaded table; controllers drive
//! it and do the I/O.

pub mod table_state;

pub use table_state::*;
