//! Packaging front-ends (npm, yarn, pnpm) and their dry-run pack output
//!
//! Each tool reports the files it would upload in a slightly different JSON
//! shape, and the shape also drifts between tool versions. `parse_packed_files`
//! accepts all of them and reduces them to a sorted, deduplicated set.

use crate::core::error::{ConfigError, RailError, RailResult};
use crate::core::process::{describe, run_captured, tool_cmd};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Sorted, deduplicated relative paths a front-end would publish
pub type PublishedFileSet = BTreeSet<String>;

/// A package manager able to report what it would publish
pub trait PackagingFrontend: Send + Sync {
  fn name(&self) -> &str;

  /// Files a dry-run pack of the package in `dir` would include
  fn packed_files(&self, dir: &Path) -> RailResult<PublishedFileSet>;
}

/// Front-end driven through its CLI
pub struct CliFrontend {
  name: &'static str,
  program: &'static str,
  args: &'static [&'static str],
}

impl CliFrontend {
  pub fn npm() -> Self {
    Self {
      name: "npm",
      program: "npm",
      args: &["pack", "--dry-run", "--json"],
    }
  }

  pub fn yarn() -> Self {
    Self {
      name: "yarn",
      program: "yarn",
      args: &["pack", "--dry-run", "--json"],
    }
  }

  pub fn pnpm() -> Self {
    Self {
      name: "pnpm",
      program: "pnpm",
      args: &["pack", "--dry-run", "--json"],
    }
  }
}

impl PackagingFrontend for CliFrontend {
  fn name(&self) -> &str {
    self.name
  }

  fn packed_files(&self, dir: &Path) -> RailResult<PublishedFileSet> {
    let label = describe(self.program, self.args);
    let stdout = run_captured(tool_cmd(self.program, self.args, dir), &label)?;
    parse_packed_files(&stdout)
  }
}

/// Build the front-end registered under `name`
pub fn frontend_for(name: &str) -> RailResult<Box<dyn PackagingFrontend>> {
  match name {
    "npm" => Ok(Box::new(CliFrontend::npm())),
    "yarn" => Ok(Box::new(CliFrontend::yarn())),
    "pnpm" => Ok(Box::new(CliFrontend::pnpm())),
    other => Err(RailError::Config(ConfigError::Invalid {
      field: "release.frontends".to_string(),
      reason: format!("unknown packaging front-end '{}'", other),
    })),
  }
}

/// Parse dry-run pack output into a file set
///
/// Accepted shapes:
/// - `[{"files": [...]}, ...]` (npm)
/// - `{"files": [...]}` (pnpm, older npm)
/// - `{"<name>": {"files": [...]}}`
/// - newline-delimited records, one `{"location": ...}` or `{"path": ...}` per line (yarn)
///
/// File entries are objects with `path` or `location`, or bare strings.
pub fn parse_packed_files(output: &str) -> RailResult<PublishedFileSet> {
  let trimmed = output.trim();
  if trimmed.is_empty() {
    return Err(RailError::message("pack produced no output"));
  }

  let mut files = PublishedFileSet::new();

  match serde_json::from_str::<Value>(trimmed) {
    Ok(value) => collect_document(&value, &mut files),
    Err(_) => {
      for line in trimmed.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let value: Value = serde_json::from_str(line)
          .map_err(|e| RailError::message(format!("unparseable pack output line '{}': {}", line, e)))?;
        collect_document(&value, &mut files);
      }
    }
  }

  Ok(files)
}

fn collect_document(value: &Value, files: &mut PublishedFileSet) {
  match value {
    Value::Array(results) => {
      for result in results {
        collect_document(result, files);
      }
    }
    Value::Object(map) => {
      if let Some(entries) = map.get("files").and_then(Value::as_array) {
        entries.iter().for_each(|entry| collect_entry(entry, files));
      } else if map.contains_key("path") || map.contains_key("location") {
        collect_entry(value, files);
      } else {
        // keyed by package name
        for nested in map.values().filter(|v| v.is_object()) {
          collect_document(nested, files);
        }
      }
    }
    Value::String(_) => collect_entry(value, files),
    _ => {}
  }
}

fn collect_entry(entry: &Value, files: &mut PublishedFileSet) {
  let path = match entry {
    Value::String(s) => Some(s.as_str()),
    Value::Object(map) => map
      .get("path")
      .or_else(|| map.get("location"))
      .and_then(Value::as_str),
    _ => None,
  };

  if let Some(path) = path.map(normalize_path).filter(|p| !p.is_empty()) {
    files.insert(path);
  }
}

/// Forward slashes, no leading `./`
pub fn normalize_path(path: &str) -> String {
  let path = path.trim().replace('\\', "/");
  let mut rest = path.as_str();
  while let Some(stripped) = rest.strip_prefix("./") {
    rest = stripped;
  }
  rest.to_string()
}
