use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for js-rail
/// Searched in order: js-rail.toml, .js-rail.toml, .config/js-rail.toml
///
/// Every field has a default, so a repository without a config file gets the
/// shared opinionated setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RailConfig {
  #[serde(default)]
  pub release: ReleaseSettings,
}

/// `[release]` table
///
/// # Example
///
/// ```toml
/// [release]
/// main_branch = "main"
/// remote = "origin"
/// changelog = "CHANGELOG.md"
/// concurrency = 5
/// commit_message = "v{version}"
/// frontends = ["npm", "yarn"]
/// test_command = ["yarn", "run", "test"]
/// lint_command = ["yarn", "run", "lint"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSettings {
  /// Branch releases are cut from and fast-forwarded on success
  #[serde(default = "default_main_branch")]
  pub main_branch: String,

  /// Remote receiving the release commit and tag
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Changelog path, relative to the repository root
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,

  /// Maximum simultaneous pack/publish subprocesses
  #[serde(default = "default_concurrency")]
  pub concurrency: usize,

  /// Release commit message, `{version}` is substituted
  #[serde(default = "default_commit_message")]
  pub commit_message: String,

  /// The two packaging front-ends compared before publishing
  #[serde(default = "default_frontends")]
  pub frontends: Vec<String>,

  /// Command run by the preflight test step
  #[serde(default = "default_test_command")]
  pub test_command: Vec<String>,

  /// Command run by the preflight lint step
  #[serde(default = "default_lint_command")]
  pub lint_command: Vec<String>,
}

fn default_main_branch() -> String {
  "main".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_changelog() -> PathBuf {
  PathBuf::from("CHANGELOG.md")
}

fn default_concurrency() -> usize {
  5
}

fn default_commit_message() -> String {
  "v{version}".to_string()
}

fn default_frontends() -> Vec<String> {
  vec!["npm".to_string(), "yarn".to_string()]
}

fn default_test_command() -> Vec<String> {
  vec!["npm".to_string(), "test".to_string()]
}

fn default_lint_command() -> Vec<String> {
  vec!["npm".to_string(), "run".to_string(), "lint".to_string()]
}

impl Default for ReleaseSettings {
  fn default() -> Self {
    Self {
      main_branch: default_main_branch(),
      remote: default_remote(),
      changelog: default_changelog(),
      concurrency: default_concurrency(),
      commit_message: default_commit_message(),
      frontends: default_frontends(),
      test_command: default_test_command(),
      lint_command: default_lint_command(),
    }
  }
}

/// Front-ends with a dry-run pack that reports JSON
pub const KNOWN_FRONTENDS: &[&str] = &["npm", "yarn", "pnpm"];

impl ReleaseSettings {
  /// Validate release settings
  pub fn validate(&self) -> RailResult<()> {
    if self.main_branch.trim().is_empty() {
      return Err(invalid("release.main_branch", "must not be empty"));
    }

    if self.concurrency == 0 {
      return Err(invalid("release.concurrency", "must be at least 1"));
    }

    if !self.commit_message.contains("{version}") {
      return Err(invalid("release.commit_message", "must contain the {version} placeholder"));
    }

    if self.frontends.len() != 2 {
      return Err(invalid(
        "release.frontends",
        &format!("expected exactly two front-ends, found {}", self.frontends.len()),
      ));
    }
    if self.frontends[0] == self.frontends[1] {
      return Err(invalid("release.frontends", "the two front-ends must differ"));
    }
    for frontend in &self.frontends {
      if !KNOWN_FRONTENDS.contains(&frontend.as_str()) {
        return Err(invalid(
          "release.frontends",
          &format!("unknown front-end '{}' (supported: {})", frontend, KNOWN_FRONTENDS.join(", ")),
        ));
      }
    }

    if self.test_command.is_empty() {
      return Err(invalid("release.test_command", "must not be empty"));
    }
    if self.lint_command.is_empty() {
      return Err(invalid("release.lint_command", "must not be empty"));
    }

    Ok(())
  }

  /// Render the release commit message for a version
  pub fn commit_message_for(&self, version: &str) -> String {
    self.commit_message.replace("{version}", version)
  }
}

fn invalid(field: &str, reason: &str) -> RailError {
  RailError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}

impl RailConfig {
  /// Find config file in search order: js-rail.toml, .js-rail.toml, .config/js-rail.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("js-rail.toml"),
      path.join(".js-rail.toml"),
      path.join(".config").join("js-rail.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> RailResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      log::debug!("no js-rail.toml under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: RailConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.release.validate()?;

    log::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }
}
