//! CLI command implementations
//!
//! Commands take a `&ReleaseContext` built once in main.

pub mod release;

pub use release::{ReleaseOptions, run_release};
