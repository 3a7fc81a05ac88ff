//! Release planning: pick the bump and compute the next fixed version
//!
//! All packages in a run share one version. The baseline is the version of the
//! first discovered package; the bump comes from the CLI or from conventional
//! commits since the tag of that baseline.

use super::commits::{self, ConventionalCommit};
use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::core::vcs::GitClient;
use crate::node::PackageRecord;
use clap::ValueEnum;
use semver::Version;
use std::fmt;

/// Version bump type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum BumpType {
  Patch,
  Minor,
  Major,
}

impl BumpType {
  /// Strongest bump implied by a set of commits
  ///
  /// Breaking changes win over features, features over everything else.
  pub fn infer(commits: &[ConventionalCommit]) -> Self {
    if commits.iter().any(ConventionalCommit::is_breaking) {
      BumpType::Major
    } else if commits.iter().any(|c| c.commit_type == commits::CommitType::Feat) {
      BumpType::Minor
    } else {
      BumpType::Patch
    }
  }
}

impl fmt::Display for BumpType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BumpType::Major => "major",
      BumpType::Minor => "minor",
      BumpType::Patch => "patch",
    };
    f.write_str(name)
  }
}

/// Tag name for a released version
pub fn release_tag(version: &Version) -> String {
  format!("v{}", version)
}

/// Advance `current` by `bump`
///
/// Pre-release baselines follow npm: a pre-release of exactly the target version
/// is promoted instead of skipped (`1.0.0-rc.1` + patch is `1.0.0`, `2.0.0-beta`
/// + major is `2.0.0`). Build metadata is dropped. The result is always greater
/// than `current`.
pub fn compute_next_version(current: &Version, bump: BumpType) -> Version {
  let is_pre = !current.pre.is_empty();

  match bump {
    BumpType::Major if is_pre && current.minor == 0 && current.patch == 0 => {
      Version::new(current.major, 0, 0)
    }
    BumpType::Major => Version::new(current.major + 1, 0, 0),
    BumpType::Minor if is_pre && current.patch == 0 => Version::new(current.major, current.minor, 0),
    BumpType::Minor => Version::new(current.major, current.minor + 1, 0),
    BumpType::Patch if is_pre => Version::new(current.major, current.minor, current.patch),
    BumpType::Patch => Version::new(current.major, current.minor, current.patch + 1),
  }
}

/// Decides the bump type for a run
pub struct VersionPlanner<'a> {
  git: &'a dyn GitClient,
}

impl<'a> VersionPlanner<'a> {
  pub fn new(git: &'a dyn GitClient) -> Self {
    Self { git }
  }

  /// Use the override when given, otherwise infer from commits since `v<current>`
  pub fn plan_bump(&self, cli_override: Option<BumpType>, current: &Version) -> RailResult<BumpType> {
    if let Some(bump) = cli_override {
      log::debug!("using bump override: {}", bump);
      return Ok(bump);
    }

    let tag = release_tag(current);
    if !self.git.tag_exists(&tag)? {
      return Err(RailError::Release(ReleaseError::MissingReleaseTag { tag }));
    }

    let history = self.git.commits_since(Some(&tag))?;
    let parsed = commits::parse_all(&history);
    let bump = BumpType::infer(&parsed);
    log::debug!(
      "{} commit(s) since {}, {} conventional, inferred {}",
      history.len(),
      tag,
      parsed.len(),
      bump
    );
    Ok(bump)
  }
}

/// Everything decided before the first mutation of a run
#[derive(Debug, Clone)]
pub struct ReleaseDescriptor {
  pub bump_type: BumpType,
  pub all_packages: Vec<PackageRecord>,
  pub current_version: Version,
  pub new_version: Version,
  pub skip_changelog: bool,
}

impl ReleaseDescriptor {
  /// Plan a release of `all_packages`
  ///
  /// The first package's version is the baseline for every package.
  pub fn plan(
    planner: &VersionPlanner<'_>,
    all_packages: Vec<PackageRecord>,
    cli_override: Option<BumpType>,
    skip_changelog: bool,
  ) -> RailResult<Self> {
    let first = all_packages
      .first()
      .ok_or_else(|| RailError::message("Cannot plan a release without packages"))?;
    let current_version = first.semver()?;
    let bump_type = planner.plan_bump(cli_override, &current_version)?;
    let new_version = compute_next_version(&current_version, bump_type);

    Ok(Self {
      bump_type,
      all_packages,
      current_version,
      new_version,
      skip_changelog,
    })
  }

  pub fn tag(&self) -> String {
    release_tag(&self.new_version)
  }

  /// Names of the packages in release order
  pub fn package_names(&self) -> Vec<String> {
    self.all_packages.iter().map(PackageRecord::display_name).collect()
  }
}
