//! Release context - build once in main, pass everywhere
//!
//! Holds the repository root, the loaded configuration and every external
//! collaborator behind a trait object. Production code builds it with
//! `ReleaseContext::build`; tests assemble one from in-memory doubles.

use crate::core::config::RailConfig;
use crate::core::error::{RailResult, ResultExt};
use crate::core::vcs::{GitClient, SystemGit};
use crate::node::frontend_for;
use crate::node::{NpmRegistry, PackagingFrontend, RegistryClient};
use crate::release::preflight::{CheckRunner, CommandChecks};
use std::path::{Path, PathBuf};

pub struct ReleaseContext {
  /// Repository root (absolute path)
  pub root: PathBuf,

  /// js-rail.toml, or defaults when absent
  pub config: RailConfig,

  pub git: Box<dyn GitClient>,

  /// The two package managers whose dry-run packs must agree
  pub frontends: [Box<dyn PackagingFrontend>; 2],

  pub registry: Box<dyn RegistryClient>,

  pub checks: Box<dyn CheckRunner>,
}

impl ReleaseContext {
  /// Build the production context for the repository at `root`
  pub fn build(root: &Path) -> RailResult<Self> {
    let root = root
      .canonicalize()
      .with_context(|| format!("Cannot access {}", root.display()))?;

    let config = RailConfig::load(&root)?;
    let git = SystemGit::open(&root)?;
    let settings = &config.release;

    let frontends = [frontend_for(&settings.frontends[0])?, frontend_for(&settings.frontends[1])?];
    let registry = NpmRegistry::new(&root);
    let checks = CommandChecks::new(
      &root,
      settings.test_command.clone(),
      settings.lint_command.clone(),
    );

    log::debug!(
      "release context: root={} frontends={}/{} concurrency={}",
      root.display(),
      settings.frontends[0],
      settings.frontends[1],
      settings.concurrency
    );

    Ok(Self {
      root,
      config,
      git: Box::new(git),
      frontends,
      registry: Box::new(registry),
      checks: Box::new(checks),
    })
  }
}
