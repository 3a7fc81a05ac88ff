//! `js-rail release`: the end-to-end release pipeline
//!
//! preflight -> discover -> plan -> verify -> write versions -> changelog ->
//! temp branch commit -> publish -> finalize (or roll back)

use crate::core::context::ReleaseContext;
use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::node::PackageDiscoverer;
use crate::release::changelog::ChangelogGenerator;
use crate::release::gitflow::ReleaseGitFlow;
use crate::release::plan::{BumpType, ReleaseDescriptor, VersionPlanner};
use crate::release::preflight::{PreflightChecker, PreflightOptions};
use crate::release::publish::Publisher;
use crate::release::verify::PublishabilityVerifier;
use crate::release::writer::VersionWriter;

/// Flags of the release command
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseOptions {
  pub bump: Option<BumpType>,
  pub skip_changelog: bool,
  pub skip_test: bool,
  pub skip_lint: bool,
  pub dry_run: bool,
  pub show_progress: bool,
}

/// What a finished run released (or would release, for a dry run)
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
  pub version: semver::Version,
  pub tag: String,
  pub packages: Vec<String>,
  pub dry_run: bool,
}

/// Run the release pipeline
pub fn run_release(ctx: &ReleaseContext, options: ReleaseOptions) -> RailResult<ReleaseOutcome> {
  let settings = &ctx.config.release;
  let git = ctx.git.as_ref();

  println!("🔍 Running preflight checks...");
  PreflightChecker::new(git, ctx.registry.as_ref(), ctx.checks.as_ref(), &settings.main_branch).validate(
    PreflightOptions {
      skip_test: options.skip_test,
      skip_lint: options.skip_lint,
    },
  )?;

  let packages = PackageDiscoverer::new(&ctx.root).discover()?;
  if packages.is_empty() {
    return Err(RailError::Release(ReleaseError::NothingToRelease { root: ctx.root.clone() }));
  }

  let planner = VersionPlanner::new(git);
  let mut descriptor = ReleaseDescriptor::plan(&planner, packages, options.bump, options.skip_changelog)?;
  print_plan(&descriptor);

  println!("🔬 Verifying published files...");
  PublishabilityVerifier::new(
    ctx.frontends[0].as_ref(),
    ctx.frontends[1].as_ref(),
    settings.concurrency,
  )
  .with_progress(options.show_progress)
  .verify(&descriptor.all_packages)?;

  let outcome = ReleaseOutcome {
    version: descriptor.new_version.clone(),
    tag: descriptor.tag(),
    packages: descriptor.package_names(),
    dry_run: options.dry_run,
  };

  if options.dry_run {
    println!("🔎 Dry run complete, nothing was changed");
    return Ok(outcome);
  }

  println!("✏️  Writing version {}...", descriptor.new_version);
  VersionWriter::new(&ctx.root).apply(&mut descriptor.all_packages, &descriptor.new_version)?;

  if descriptor.skip_changelog {
    println!("⚠️  Skipping changelog");
  } else {
    let generator = ChangelogGenerator::new(git, ctx.root.join(&settings.changelog));
    println!("📝 Updating {}...", settings.changelog.display());
    generator.generate(&descriptor.current_version, &descriptor.new_version)?;
  }

  let mut flow = ReleaseGitFlow::new(git, settings, &descriptor.new_version);
  let publisher = Publisher::new(ctx.registry.as_ref(), settings.concurrency);

  if let Err(err) = commit_publish_finalize(&mut flow, &publisher, &descriptor) {
    if flow.can_rollback() {
      println!("↩️  Rolling back {}...", flow.temp_branch());
      if let Err(rollback_err) = flow.rollback() {
        eprintln!("⚠️  {}", rollback_err);
      }
    }
    return Err(err);
  }

  println!(
    "✅ Released {} ({} package(s))",
    outcome.tag,
    outcome.packages.len()
  );
  Ok(outcome)
}

fn commit_publish_finalize(
  flow: &mut ReleaseGitFlow<'_>,
  publisher: &Publisher<'_>,
  descriptor: &ReleaseDescriptor,
) -> RailResult<()> {
  flow.begin()?;
  flow.commit()?;
  publisher.publish_all(&descriptor.all_packages, &descriptor.new_version)?;
  println!("🏷️  Tagging {} and pushing...", descriptor.tag());
  flow.finalize()
}

fn print_plan(descriptor: &ReleaseDescriptor) {
  println!("📋 Release plan");
  println!(
    "   Bump:     {} ({} → {})",
    descriptor.bump_type, descriptor.current_version, descriptor.new_version
  );
  println!("   Packages: {}", descriptor.package_names().join(", "));
}
