//! Preflight checks run before anything is mutated

use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::core::process::{run_inherited, tool_cmd};
use crate::core::vcs::GitClient;
use crate::node::RegistryClient;
use std::path::PathBuf;

/// Project test and lint commands
pub trait CheckRunner: Send + Sync {
  fn run_tests(&self) -> RailResult<()>;
  fn run_lint(&self) -> RailResult<()>;
}

/// Runs the configured commands in the repository root, output streamed to the terminal
pub struct CommandChecks {
  root: PathBuf,
  test_command: Vec<String>,
  lint_command: Vec<String>,
}

impl CommandChecks {
  pub fn new(root: impl Into<PathBuf>, test_command: Vec<String>, lint_command: Vec<String>) -> Self {
    Self {
      root: root.into(),
      test_command,
      lint_command,
    }
  }

  fn run(&self, command: &[String]) -> RailResult<()> {
    let (program, args) = command
      .split_first()
      .ok_or_else(|| RailError::message("Empty check command"))?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_inherited(tool_cmd(program, &args, &self.root), &command.join(" "))
  }
}

impl CheckRunner for CommandChecks {
  fn run_tests(&self) -> RailResult<()> {
    self.run(&self.test_command)
  }

  fn run_lint(&self) -> RailResult<()> {
    self.run(&self.lint_command)
  }
}

/// Which optional checks to skip
#[derive(Debug, Clone, Copy, Default)]
pub struct PreflightOptions {
  pub skip_test: bool,
  pub skip_lint: bool,
}

pub struct PreflightChecker<'a> {
  git: &'a dyn GitClient,
  registry: &'a dyn RegistryClient,
  checks: &'a dyn CheckRunner,
  main_branch: &'a str,
}

impl<'a> PreflightChecker<'a> {
  pub fn new(
    git: &'a dyn GitClient,
    registry: &'a dyn RegistryClient,
    checks: &'a dyn CheckRunner,
    main_branch: &'a str,
  ) -> Self {
    Self {
      git,
      registry,
      checks,
      main_branch,
    }
  }

  /// Run every check in order, stopping at the first failure
  pub fn validate(&self, options: PreflightOptions) -> RailResult<()> {
    let current = self.git.current_branch()?;
    if current != self.main_branch {
      return Err(RailError::Release(ReleaseError::NotOnMainBranch {
        current,
        expected: self.main_branch.to_string(),
      }));
    }

    let changes = self.git.status()?;
    if !changes.is_empty() {
      return Err(RailError::Release(ReleaseError::DirtyWorkingTree { changes }));
    }

    let user = self.registry.whoami().map_err(|e| {
      RailError::Release(ReleaseError::NotAuthenticated {
        reason: e.to_string(),
      })
    })?;
    log::debug!("registry user: {}", user);

    if options.skip_test {
      println!("⚠️  Skipping tests");
    } else {
      println!("🧪 Running tests...");
      self.checks.run_tests().map_err(|e| check_failed("test", e))?;
    }

    if options.skip_lint {
      println!("⚠️  Skipping lint");
    } else {
      println!("🔍 Running lint...");
      self.checks.run_lint().map_err(|e| check_failed("lint", e))?;
    }

    Ok(())
  }
}

fn check_failed(check: &str, err: RailError) -> RailError {
  RailError::Release(ReleaseError::CheckFailed {
    check: check.to_string(),
    reason: err.to_string(),
  })
}
