//! Node.js package tooling: manifests, workspace discovery, package managers, registry

pub mod discover;
pub mod frontend;
pub mod manifest;
pub mod registry;

pub use discover::PackageDiscoverer;
pub use frontend::{PackagingFrontend, PublishedFileSet, frontend_for};
pub use manifest::PackageRecord;
pub use registry::{NpmRegistry, RegistryClient};
