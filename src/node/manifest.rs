//! package.json handling
//!
//! Manifests are kept as raw JSON objects so fields js-rail doesn't know about
//! survive a rewrite untouched and in their original order.

use crate::core::error::{ConfigError, RailError, RailResult, ReleaseError, ResultExt};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

/// One package.json on disk
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
  /// Absolute path to the manifest file
  pub manifest_path: PathBuf,
  /// Parsed manifest content
  pub manifest: Map<String, Value>,
}

/// `workspaces` field: `["packages/*"]` or `{ "packages": ["packages/*"] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceSpec {
  Array(Vec<String>),
  Object {
    #[serde(default)]
    packages: Vec<String>,
  },
}

impl WorkspaceSpec {
  fn into_patterns(self) -> Vec<String> {
    match self {
      WorkspaceSpec::Array(patterns) => patterns,
      WorkspaceSpec::Object { packages } => packages,
    }
  }
}

impl PackageRecord {
  /// Load the manifest in `dir`
  pub fn load_dir(dir: &Path) -> RailResult<Self> {
    Self::load(&dir.join(MANIFEST_FILE))
  }

  /// Load a manifest file that must carry a `name`
  pub fn load(manifest_path: &Path) -> RailResult<Self> {
    let record = Self::read(manifest_path)?;
    record.require_name()?;
    Ok(record)
  }

  /// Parse a manifest without checking its fields
  ///
  /// Private workspace roots often have no `name`.
  pub fn read(manifest_path: &Path) -> RailResult<Self> {
    if !manifest_path.is_file() {
      return Err(RailError::Config(ConfigError::ManifestNotFound {
        path: manifest_path.to_path_buf(),
      }));
    }

    let content = std::fs::read_to_string(manifest_path)
      .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let value: Value = serde_json::from_str(&content)
      .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

    let Value::Object(manifest) = value else {
      return Err(RailError::message(format!(
        "{} must contain a JSON object",
        manifest_path.display()
      )));
    };

    Ok(Self {
      manifest_path: manifest_path.to_path_buf(),
      manifest,
    })
  }

  pub fn require_name(&self) -> RailResult<&str> {
    self.name().ok_or_else(|| {
      RailError::Config(ConfigError::MissingField {
        manifest: self.manifest_path.clone(),
        field: "name".to_string(),
      })
    })
  }

  /// Package name, always present on records built by `load`
  pub fn name(&self) -> Option<&str> {
    self.manifest.get("name").and_then(Value::as_str)
  }

  /// Name for messages, falling back to the manifest path
  pub fn display_name(&self) -> String {
    self
      .name()
      .map(str::to_string)
      .unwrap_or_else(|| self.manifest_path.display().to_string())
  }

  pub fn version(&self) -> Option<&str> {
    self.manifest.get("version").and_then(Value::as_str)
  }

  /// Parsed `version`, required for anything that gets released
  pub fn semver(&self) -> RailResult<semver::Version> {
    let version = self.version().ok_or_else(|| {
      RailError::Config(ConfigError::MissingField {
        manifest: self.manifest_path.clone(),
        field: "version".to_string(),
      })
    })?;
    semver::Version::parse(version).with_context(|| format!("Invalid version in {}", self.manifest_path.display()))
  }

  /// Whether `private` is truthy in the JavaScript sense
  pub fn is_private(&self) -> bool {
    self.manifest.get("private").is_some_and(is_truthy)
  }

  /// Workspace glob patterns, empty when none are declared
  pub fn workspace_patterns(&self) -> Vec<String> {
    self
      .manifest
      .get("workspaces")
      .cloned()
      .and_then(|v| serde_json::from_value::<WorkspaceSpec>(v).ok())
      .map(WorkspaceSpec::into_patterns)
      .unwrap_or_default()
  }

  /// Directory holding the manifest
  pub fn dir(&self) -> &Path {
    self.manifest_path.parent().unwrap_or_else(|| Path::new("."))
  }

  pub fn set_version(&mut self, version: &str) {
    self
      .manifest
      .insert("version".to_string(), Value::String(version.to_string()));
  }

  /// Persist the manifest (2-space indentation, trailing newline, key order kept)
  pub fn save(&self) -> RailResult<()> {
    let mut content = serde_json::to_string_pretty(&self.manifest)?;
    content.push('\n');

    std::fs::write(&self.manifest_path, content).map_err(|e| {
      RailError::Release(ReleaseError::WriteFailed {
        path: self.manifest_path.clone(),
        reason: e.to_string(),
      })
    })
  }
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}
