//! Writes the new version into every released manifest

use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::node::PackageRecord;
use crate::node::manifest::MANIFEST_FILE;
use semver::Version;
use std::path::{Path, PathBuf};

pub struct VersionWriter {
  root: PathBuf,
}

impl VersionWriter {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Set `version` in each package (in order), then in the root manifest if it was not released itself
  ///
  /// Returns the manifests written. There is no multi-file transaction: a failure
  /// part way leaves earlier manifests updated.
  pub fn apply(&self, packages: &mut [PackageRecord], new_version: &Version) -> RailResult<Vec<PathBuf>> {
    let version = new_version.to_string();
    let mut written = Vec::with_capacity(packages.len() + 1);

    for package in packages.iter_mut() {
      package.set_version(&version);
      package.save().map_err(|e| partial_write(e, &written))?;
      log::debug!("{} -> {}", package.manifest_path.display(), version);
      written.push(package.manifest_path.clone());
    }

    let root_manifest = self.root.join(MANIFEST_FILE);
    if root_manifest.is_file() && !written.iter().any(|p| same_file(p, &root_manifest)) {
      let mut root = PackageRecord::read(&root_manifest).map_err(|e| partial_write(e, &written))?;
      root.set_version(&version);
      root.save().map_err(|e| partial_write(e, &written))?;
      written.push(root_manifest);
    }

    Ok(written)
  }
}

fn same_file(a: &Path, b: &Path) -> bool {
  match (a.canonicalize(), b.canonicalize()) {
    (Ok(a), Ok(b)) => a == b,
    _ => a == b,
  }
}

/// Mention how to recover when some manifests were already rewritten
fn partial_write(err: RailError, written: &[PathBuf]) -> RailError {
  if written.is_empty() {
    return err;
  }
  match err {
    RailError::Release(ReleaseError::WriteFailed { path, reason }) => RailError::Release(ReleaseError::WriteFailed {
      path,
      reason: format!(
        "{} ({} manifest(s) already updated, run `git checkout .` to restore them)",
        reason,
        written.len()
      ),
    }),
    other => other.context(format!(
      "{} manifest(s) already updated, run `git checkout .` to restore them",
      written.len()
    )),
  }
}
