//! Workspace discovery: which package.json files take part in a release

use super::manifest::{MANIFEST_FILE, PackageRecord};
use crate::core::error::{RailError, RailResult, ReleaseError};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Finds the publishable packages under a repository root
pub struct PackageDiscoverer {
  root: PathBuf,
}

impl PackageDiscoverer {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Discover publishable packages
  ///
  /// The root comes first when it is publishable. Workspace packages follow in
  /// pattern order, sorted by path within each pattern. A package matched by more
  /// than one pattern is listed once, at its first match.
  pub fn discover(&self) -> RailResult<Vec<PackageRecord>> {
    let root = PackageRecord::read(&self.root.join(MANIFEST_FILE))?;
    if !root.is_private() {
      root.require_name()?;
    }
    let patterns = root.workspace_patterns();

    if patterns.is_empty() {
      if root.is_private() {
        log::debug!("root package is private and declares no workspaces");
        return Ok(Vec::new());
      }
      return Ok(vec![root]);
    }

    let (excludes, includes): (Vec<_>, Vec<_>) = patterns.iter().partition(|p| p.starts_with('!'));
    let excludes = excludes
      .iter()
      .map(|p| glob::Pattern::new(normalize_pattern(&p[1..])))
      .collect::<Result<Vec<_>, _>>()?;

    let mut packages = Vec::new();
    let mut seen = HashSet::new();

    if !root.is_private() {
      seen.insert(root.dir().to_path_buf());
      packages.push(root);
    }

    for pattern in includes {
      for manifest_path in self.expand(pattern)? {
        let Some(dir) = manifest_path.parent() else {
          continue;
        };
        let relative = relative_key(&self.root, dir);

        if excludes.iter().any(|ex| ex.matches(&relative)) {
          log::debug!("{} excluded by workspace pattern", relative);
          continue;
        }
        if !seen.insert(dir.to_path_buf()) {
          continue;
        }

        let record = PackageRecord::read(&manifest_path)?;
        if record.is_private() {
          log::debug!("skipping private package {}", record.display_name());
          continue;
        }
        record.require_name()?;
        packages.push(record);
      }
    }

    if packages.is_empty() {
      return Err(RailError::Release(ReleaseError::NoPublishablePackagesFound {
        root: self.root.clone(),
      }));
    }

    Ok(packages)
  }

  /// Manifest paths matched by one workspace pattern, sorted lexicographically
  fn expand(&self, pattern: &str) -> RailResult<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&self.root.to_string_lossy());
    let full = format!("{}/{}/{}", base, normalize_pattern(pattern), MANIFEST_FILE);

    let mut matches: Vec<PathBuf> = glob::glob(&full)?
      .filter_map(|entry| match entry {
        Ok(path) => Some(path),
        Err(e) => {
          log::warn!("skipping unreadable workspace path: {}", e);
          None
        }
      })
      .filter(|path| !in_node_modules(&self.root, path))
      .collect();

    matches.sort();
    Ok(matches)
  }
}

fn normalize_pattern(pattern: &str) -> &str {
  let pattern = pattern.trim();
  let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
  pattern.trim_end_matches('/')
}

/// Forward-slash path of `dir` relative to `root`
fn relative_key(root: &Path, dir: &Path) -> String {
  let relative = dir.strip_prefix(root).unwrap_or(dir);
  relative
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

fn in_node_modules(root: &Path, path: &Path) -> bool {
  path
    .strip_prefix(root)
    .unwrap_or(path)
    .components()
    .any(|c| c.as_os_str() == "node_modules")
}
