//! Registry publishing with a bounded number of concurrent uploads

use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::node::{PackageRecord, RegistryClient};
use rayon::prelude::*;
use semver::Version;

pub struct Publisher<'a> {
  registry: &'a dyn RegistryClient,
  concurrency: usize,
}

impl<'a> Publisher<'a> {
  pub fn new(registry: &'a dyn RegistryClient, concurrency: usize) -> Self {
    Self {
      registry,
      concurrency: concurrency.max(1),
    }
  }

  /// Publish every package, at most `concurrency` at a time
  ///
  /// Packages are dispatched in order, in batches. When a batch has a failure,
  /// the rest of that batch still finishes, no further batch starts, and the
  /// first failure in dispatch order is returned. Returns the published names.
  pub fn publish_all(&self, packages: &[PackageRecord], version: &Version) -> RailResult<Vec<String>> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.concurrency)
      .build()?;

    let mut published = Vec::with_capacity(packages.len());

    for batch in packages.chunks(self.concurrency) {
      for package in batch {
        println!("📦 publishing {}@{}", package.display_name(), version);
      }

      let results: Vec<RailResult<String>> =
        pool.install(|| batch.par_iter().map(|package| self.publish_one(package)).collect());

      for result in results {
        published.push(result?);
      }
    }

    Ok(published)
  }

  fn publish_one(&self, package: &PackageRecord) -> RailResult<String> {
    let name = package.display_name();
    self.registry.publish(package.dir()).map_err(|e| {
      RailError::Release(ReleaseError::PublishFailed {
        package: name.clone(),
        reason: e.to_string(),
      })
    })?;
    log::debug!("published {}", name);
    Ok(name)
  }
}
