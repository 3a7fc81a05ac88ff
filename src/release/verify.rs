//! Publishability check: two package managers must agree on what gets published
//!
//! npm and yarn apply `files`, `.npmignore` and `.gitignore` slightly
//! differently. A package whose published contents depend on which tool
//! publishes it is rejected before anything is mutated.

use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::node::{PackageRecord, PackagingFrontend, PublishedFileSet};
use crate::ui::progress::PackageProgress;
use rayon::prelude::*;

pub struct PublishabilityVerifier<'a> {
  frontend_a: &'a dyn PackagingFrontend,
  frontend_b: &'a dyn PackagingFrontend,
  concurrency: usize,
  show_progress: bool,
}

impl<'a> PublishabilityVerifier<'a> {
  pub fn new(frontend_a: &'a dyn PackagingFrontend, frontend_b: &'a dyn PackagingFrontend, concurrency: usize) -> Self {
    Self {
      frontend_a,
      frontend_b,
      concurrency: concurrency.max(1),
      show_progress: true,
    }
  }

  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Dry-run pack every package with both front-ends and compare the results
  ///
  /// Packages are dispatched in order, `concurrency` at a time, and announced
  /// as they start. Every package is checked; when several fail, the error of
  /// the earliest package in `packages` order is returned.
  pub fn verify(&self, packages: &[PackageRecord]) -> RailResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.concurrency)
      .build()?;

    let progress = if self.show_progress {
      PackageProgress::new(packages.len(), "Verifying packages")
    } else {
      PackageProgress::hidden()
    };

    let mut results: Vec<RailResult<()>> = Vec::with_capacity(packages.len());
    for batch in packages.chunks(self.concurrency) {
      for package in batch {
        println!("   checking {}", package.display_name());
      }

      let batch_results: Vec<RailResult<()>> = pool.install(|| {
        batch
          .par_iter()
          .map(|package| {
            let result = self.verify_one(package);
            progress.inc();
            result
          })
          .collect()
      });
      results.extend(batch_results);
    }

    results.into_iter().collect()
  }

  fn verify_one(&self, package: &PackageRecord) -> RailResult<()> {
    let name = package.display_name();
    let files_a = self.packed(self.frontend_a, package, &name)?;
    let files_b = self.packed(self.frontend_b, package, &name)?;
    log::debug!("{}: {} file(s) from {}", name, files_a.len(), self.frontend_a.name());

    compare_file_sets(&name, self.frontend_a.name(), &files_a, self.frontend_b.name(), &files_b)
      .map_err(RailError::Release)
  }

  fn packed(&self, frontend: &dyn PackagingFrontend, package: &PackageRecord, name: &str) -> RailResult<PublishedFileSet> {
    frontend.packed_files(package.dir()).map_err(|e| {
      RailError::Release(ReleaseError::FrontendFailed {
        frontend: frontend.name().to_string(),
        package: name.to_string(),
        reason: e.to_string(),
      })
    })
  }
}

/// Compare two file sets, reporting each side's extra files
pub fn compare_file_sets(
  package: &str,
  name_a: &str,
  files_a: &PublishedFileSet,
  name_b: &str,
  files_b: &PublishedFileSet,
) -> Result<(), ReleaseError> {
  if files_a == files_b {
    return Ok(());
  }

  Err(ReleaseError::PublishedFilesMismatch {
    package: package.to_string(),
    frontend_a: name_a.to_string(),
    frontend_b: name_b.to_string(),
    only_in_a: files_a.difference(files_b).cloned().collect(),
    only_in_b: files_b.difference(files_a).cloned().collect(),
  })
}
