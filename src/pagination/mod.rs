//! Pagination
//!
//! Forward-only cursor bookkeeping shared by every paged list.

mod cursor;

pub use cursor::CursorTracker;
