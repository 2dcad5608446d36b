//! Page Cursor Tracker
//!
//! Maps page indices to the cursor that fetches them. The endpoint only
//! supports forward scans, so page `i` becomes reachable once page `i - 1`
//! has been loaded and returned a cursor.

use crate::domain::Cursor;
use crate::error::{Error, Result};

/// Cursor table for one grid instance
///
/// Entry 0 is always `None` (first page). Cursors are only valid for the
/// filter state and page size that produced them; call [`reset`] whenever
/// either changes.
///
/// [`reset`]: CursorTracker::reset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorTracker {
    cursors: Vec<Option<Cursor>>,
    current_page: usize,
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorTracker {
    pub fn new() -> Self {
        Self {
            cursors: vec![None],
            current_page: 0,
        }
    }

    /// Resolve the cursor for `page` and make it the current page
    pub fn request(&mut self, page: usize) -> Result<Option<Cursor>> {
        let cursor = self.cursor_for(page)?;
        self.current_page = page;
        tracing::debug!(page, cursor = ?cursor, "Resolved page cursor");
        Ok(cursor)
    }

    /// Resolve the cursor for the page after the current one
    pub fn next_page(&mut self) -> Result<Option<Cursor>> {
        self.request(self.current_page + 1)
    }

    /// Cursor for `page` without moving the current page
    pub fn cursor_for(&self, page: usize) -> Result<Option<Cursor>> {
        self.cursors
            .get(page)
            .cloned()
            .ok_or(Error::OutOfSequencePage {
                page,
                known: self.cursors.len(),
            })
    }

    /// Record the outcome of loading `page`
    pub fn on_page_loaded(&mut self, page: usize, next: Option<Cursor>) -> Result<()> {
        if page >= self.cursors.len() {
            return Err(Error::OutOfSequencePage {
                page,
                known: self.cursors.len(),
            });
        }

        match next {
            Some(cursor) => {
                let slot = page + 1;
                match self.cursors.get(slot) {
                    Some(Some(existing)) if *existing == cursor => {}
                    _ => {
                        // Downstream entries came from a different scan
                        self.cursors.truncate(slot);
                        self.cursors.push(Some(cursor));
                    }
                }
                tracing::debug!(page, known = self.cursors.len(), "Stored next page cursor");
            }
            None => {
                self.cursors.truncate(page + 1);
                tracing::debug!(page, "No further pages");
            }
        }
        Ok(())
    }

    /// Forget every cursor (filter, search, sort or page size changed)
    pub fn reset(&mut self) {
        self.cursors.clear();
        self.cursors.push(None);
        self.current_page = 0;
        tracing::debug!("Cursor table reset");
    }

    /// Number of pages whose cursor is known
    pub fn known_pages(&self) -> usize {
        self.cursors.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Whether a cursor past the current page is known
    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.cursors.len()
    }

    pub fn cursors(&self) -> &[Option<Cursor>] {
        &self.cursors
    }
}
