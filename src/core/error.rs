//! Error types for js-rail with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Release errors carry enough context
//! (package name, underlying tool output) to act on without re-running verbosely.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for js-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, nothing to release)
  User = 1,
  /// System error (git, registry, I/O)
  System = 2,
  /// Validation failure (preflight, publishability)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for js-rail
#[derive(Debug)]
pub enum RailError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Release pipeline errors (preflight, discovery, verification, publish)
  Release(ReleaseError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  ///
  /// Structured variants keep their identity; I/O errors are folded into a message
  /// so the context is not lost.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context, help } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RailError::Io(e) => RailError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", e)),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RailError::Config(_) => ExitCode::User,
      RailError::Git(_) => ExitCode::System,
      RailError::Release(e) => e.exit_code(),
      RailError::Io(_) => ExitCode::System,
      RailError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::Config(e) => e.help_message(),
      RailError::Git(e) => e.help_message(),
      RailError::Release(e) => e.help_message(),
      RailError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for RailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RailError::Config(e) => write!(f, "{}", e),
      RailError::Git(e) => write!(f, "{}", e),
      RailError::Release(e) => write!(f, "{}", e),
      RailError::Io(e) => write!(f, "I/O error: {}", e),
      RailError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RailError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RailError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RailError {
  fn from(err: io::Error) -> Self {
    RailError::Io(err)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

impl From<ReleaseError> for RailError {
  fn from(err: ReleaseError) -> Self {
    RailError::Release(err)
  }
}

impl From<GitError> for RailError {
  fn from(err: GitError) -> Self {
    RailError::Git(err)
  }
}

impl From<toml_edit::de::Error> for RailError {
  fn from(err: toml_edit::de::Error) -> Self {
    RailError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RailError {
  fn from(err: serde_json::Error) -> Self {
    RailError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for RailError {
  fn from(err: semver::Error) -> Self {
    RailError::message(format!("Invalid semantic version: {}", err))
  }
}

impl From<glob::PatternError> for RailError {
  fn from(err: glob::PatternError) -> Self {
    RailError::message(format!("Invalid workspace pattern: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for RailError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    RailError::message(format!("Failed to start worker pool: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config value is out of range or inconsistent
  Invalid { field: String, reason: String },

  /// package.json is missing or unreadable
  ManifestNotFound { path: PathBuf },

  /// package.json is missing a required field
  MissingField { manifest: PathBuf, field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { .. } => Some("Check the [release] table in js-rail.toml.".to_string()),
      ConfigError::ManifestNotFound { .. } => {
        Some("Run js-rail from the repository root, or pass --cwd <dir>.".to_string())
      }
      ConfigError::MissingField { field, .. } => Some(format!("Add a \"{}\" field to the manifest.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid configuration value for '{}': {}", field, reason)
      }
      ConfigError::ManifestNotFound { path } => {
        write!(f, "No package.json found at {}", path.display())
      }
      ConfigError::MissingField { manifest, field } => {
        write!(f, "Missing required field '{}' in {}", field, manifest.display())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Branch operation failed
  BranchError { message: String },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("fetch first") {
          Some("The remote has commits you don't have. Pull main, then release again.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and push access to the remote.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::BranchError { message } => {
        write!(f, "Branch operation failed: {}", message)
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason.trim_end())
      }
    }
  }
}

/// Release pipeline errors
#[derive(Debug)]
pub enum ReleaseError {
  /// Release must start from the main branch
  NotOnMainBranch { current: String, expected: String },

  /// Working tree has pending changes
  DirtyWorkingTree { changes: Vec<String> },

  /// Registry authentication probe failed
  NotAuthenticated { reason: String },

  /// Test or lint collaborator failed
  CheckFailed { check: String, reason: String },

  /// Workspaces declared but every package is private
  NoPublishablePackagesFound { root: PathBuf },

  /// Nothing at all to release (private root, no workspaces)
  NothingToRelease { root: PathBuf },

  /// Tag of the current version does not exist
  MissingReleaseTag { tag: String },

  /// Two packaging front-ends disagree on the published file set
  PublishedFilesMismatch {
    package: String,
    frontend_a: String,
    frontend_b: String,
    only_in_a: Vec<String>,
    only_in_b: Vec<String>,
  },

  /// Packaging front-end could not be queried or its output parsed
  FrontendFailed {
    frontend: String,
    package: String,
    reason: String,
  },

  /// Manifest or changelog write failed mid-pipeline
  WriteFailed { path: PathBuf, reason: String },

  /// Registry rejected a package
  PublishFailed { package: String, reason: String },

  /// Git flow step requested from the wrong state
  InvalidTransition { from: String, action: String },

  /// Rollback left something behind
  RollbackIncomplete { failures: Vec<String> },
}

impl ReleaseError {
  fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::NotOnMainBranch { .. }
      | ReleaseError::DirtyWorkingTree { .. }
      | ReleaseError::NotAuthenticated { .. }
      | ReleaseError::CheckFailed { .. }
      | ReleaseError::PublishedFilesMismatch { .. } => ExitCode::Validation,
      ReleaseError::NoPublishablePackagesFound { .. }
      | ReleaseError::NothingToRelease { .. }
      | ReleaseError::MissingReleaseTag { .. } => ExitCode::User,
      ReleaseError::FrontendFailed { .. }
      | ReleaseError::WriteFailed { .. }
      | ReleaseError::PublishFailed { .. }
      | ReleaseError::InvalidTransition { .. }
      | ReleaseError::RollbackIncomplete { .. } => ExitCode::System,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::NotOnMainBranch { expected, .. } => Some(format!("Run `git checkout {}` first.", expected)),
      ReleaseError::DirtyWorkingTree { .. } => Some("Commit or stash your changes before releasing.".to_string()),
      ReleaseError::NotAuthenticated { .. } => Some("Run `npm login` and try again.".to_string()),
      ReleaseError::CheckFailed { check, .. } => Some(format!(
        "Fix the {} failures, or pass --skip-{} to bypass this check.",
        check, check
      )),
      ReleaseError::NoPublishablePackagesFound { .. } => {
        Some("Every workspace package is marked \"private\": true.".to_string())
      }
      ReleaseError::NothingToRelease { .. } => {
        Some("The root package is private and declares no workspaces.".to_string())
      }
      ReleaseError::MissingReleaseTag { .. } => Some(
        "Create the tag for the current version, or pass the bump explicitly: js-rail release <major|minor|patch>"
          .to_string(),
      ),
      ReleaseError::PublishedFilesMismatch { .. } => Some(
        "Align the \"files\" field, .npmignore and .gitignore so both package managers pack the same files."
          .to_string(),
      ),
      ReleaseError::WriteFailed { .. } => {
        Some("Manifests may be partially updated. Run `git checkout .` to restore them.".to_string())
      }
      ReleaseError::PublishFailed { .. } => Some(
        "Packages published before the failure stay published. Check the registry before retrying.".to_string(),
      ),
      ReleaseError::RollbackIncomplete { .. } => Some(
        "Inspect `git status` and `git branch`, then remove leftover temp/release-v* branches manually.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::NotOnMainBranch { current, expected } => {
        write!(f, "Releases must run from '{}' (currently on '{}')", expected, current)
      }
      ReleaseError::DirtyWorkingTree { changes } => {
        write!(f, "Working tree has {} pending change(s)", changes.len())?;
        for change in changes.iter().take(10) {
          write!(f, "\n  {}", change)?;
        }
        if changes.len() > 10 {
          write!(f, "\n  ... and {} more", changes.len() - 10)?;
        }
        Ok(())
      }
      ReleaseError::NotAuthenticated { reason } => {
        write!(f, "Not authenticated with the registry: {}", reason.trim_end())
      }
      ReleaseError::CheckFailed { check, reason } => {
        write!(f, "Pre-release {} failed: {}", check, reason.trim_end())
      }
      ReleaseError::NoPublishablePackagesFound { root } => {
        write!(f, "No publishable packages found in workspace {}", root.display())
      }
      ReleaseError::NothingToRelease { root } => {
        write!(f, "Nothing to release in {}", root.display())
      }
      ReleaseError::MissingReleaseTag { tag } => {
        write!(f, "Release tag '{}' not found, cannot infer the version bump", tag)
      }
      ReleaseError::PublishedFilesMismatch {
        package,
        frontend_a,
        frontend_b,
        only_in_a,
        only_in_b,
      } => {
        write!(
          f,
          "Published files differ for '{}' between {} and {}",
          package, frontend_a, frontend_b
        )?;
        for file in only_in_a {
          write!(f, "\n  Only in {}: {}", frontend_a, file)?;
        }
        for file in only_in_b {
          write!(f, "\n  Only in {}: {}", frontend_b, file)?;
        }
        Ok(())
      }
      ReleaseError::FrontendFailed {
        frontend,
        package,
        reason,
      } => {
        write!(f, "{} could not pack '{}': {}", frontend, package, reason.trim_end())
      }
      ReleaseError::WriteFailed { path, reason } => {
        write!(f, "Failed to write {}: {}", path.display(), reason)
      }
      ReleaseError::PublishFailed { package, reason } => {
        write!(f, "Failed to publish '{}': {}", package, reason.trim_end())
      }
      ReleaseError::InvalidTransition { from, action } => {
        write!(f, "Cannot {} while release branch is {}", action, from)
      }
      ReleaseError::RollbackIncomplete { failures } => {
        write!(f, "Rollback did not complete:")?;
        for failure in failures {
          write!(f, "\n  {}", failure)?;
        }
        Ok(())
      }
    }
  }
}

/// Result type alias for js-rail
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RailResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn context(self, ctx: impl Into<String>) -> RailResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RailError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for RailError {
  fn from(err: anyhow::Error) -> Self {
    RailError::message(err.to_string())
  }
}
