//! Release pipeline stages
//!
//! Every run releases all publishable packages at one shared version
//! (fixed versioning). Stages, in pipeline order:
//!
//! - **preflight**: branch, clean tree, registry auth, tests and lint
//! - **plan**: bump inference from conventional commits, next version
//! - **verify**: npm and yarn must agree on each package's published files
//! - **writer**: new version into every manifest
//! - **changelog**: entry prepended to CHANGELOG.md
//! - **gitflow**: temp branch commit, then main/tag/push or rollback
//! - **publish**: bounded-concurrency registry uploads

pub mod changelog;
pub mod commits;
pub mod gitflow;
pub mod plan;
pub mod preflight;
pub mod publish;
pub mod verify;
pub mod writer;
