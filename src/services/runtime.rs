//! Tokio Runtime Bridge
//!
//! Table controllers are driven from synchronous UI callbacks, while the HTTP
//! client needs tokio. This module owns one shared runtime for both.
//!
//! ## Pattern
//!
//! ```text
//! UI callback (sync)
//!       │
//!       ▼
//! spawn_in_tokio(async { fetch page })  ──►  JoinHandle (abort on teardown)
//!       │
//!       ▼
//! TableEvent over crossbeam channel
//! ```

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Global tokio runtime instance
static TOKIO_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get or initialize the global tokio runtime
fn get_runtime() -> &'static Runtime {
    TOKIO_RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create tokio runtime"))
}

/// Spawn a task on the shared runtime
///
/// The returned handle is what a controller aborts when a newer load
/// supersedes this one.
pub fn spawn_in_tokio<F, T>(future: F) -> JoinHandle<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    get_runtime().spawn(future)
}

/// Block on a future synchronously
///
/// **Warning**: This blocks the current thread. Use it from `main` or other
/// synchronous entry points, never from inside a task.
pub fn block_on<F, T>(future: F) -> T
where
    F: Future<Output = T>,
{
    get_runtime().block_on(future)
}
