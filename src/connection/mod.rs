//! Connection Management
//!
//! Endpoint configuration and access token handling.

mod config;
mod credential;

pub use config::*;
pub use credential::*;
