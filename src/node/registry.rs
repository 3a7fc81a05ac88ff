//! npm registry access: authentication probe and publish

use crate::core::error::RailResult;
use crate::core::process::{describe, run_captured, tool_cmd};
use std::path::{Path, PathBuf};

/// Registry operations the release pipeline needs
pub trait RegistryClient: Send + Sync {
  /// Logged-in user name; fails when not authenticated
  fn whoami(&self) -> RailResult<String>;

  /// Publish the package in `dir` with public access
  ///
  /// Tool output is captured and only surfaced through the error on failure.
  fn publish(&self, dir: &Path) -> RailResult<()>;
}

/// Registry client backed by the npm CLI
#[derive(Debug)]
pub struct NpmRegistry {
  /// Directory whose `.npmrc` decides which registry and credentials are used
  root: PathBuf,
}

impl NpmRegistry {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl RegistryClient for NpmRegistry {
  fn whoami(&self) -> RailResult<String> {
    let args = ["whoami"];
    let user = run_captured(tool_cmd("npm", &args, &self.root), &describe("npm", &args))?;
    Ok(user.trim().to_string())
  }

  fn publish(&self, dir: &Path) -> RailResult<()> {
    let args = ["publish", "--access", "public"];
    run_captured(tool_cmd("npm", &args, dir), &describe("npm", &args))?;
    Ok(())
  }
}
