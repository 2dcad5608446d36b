//! Query Layer
//!
//! Grid state snapshot in, page request descriptor and wire parameters out.

mod builder;
mod params;

pub use builder::*;
