//! Core building blocks shared by every release stage
//!
//! - **config**: js-rail.toml parsing and validation
//! - **context**: root, config and collaborators, built once in main
//! - **error**: error types with exit codes and help messages
//! - **process**: logged subprocess execution for npm/yarn/pnpm
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod vcs;
