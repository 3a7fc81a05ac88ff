//! End-to-end releases against a bare origin

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_single_package_major_release() -> Result<()> {
  let project = TestProject::new()?;
  project.add_package("", r#"{"name":"solo","version":"1.0.0","main":"index.js"}"#)?;
  project.commit("chore: initial")?;
  project.push_main()?;

  let output = project.js_rail(&["release", "major"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let manifest: serde_json::Value = serde_json::from_str(&project.read("package.json")?)?;
  assert_eq!(manifest["version"], "2.0.0");
  assert_eq!(manifest["main"], "index.js");
  assert!(project.read("CHANGELOG.md")?.contains("## 2.0.0 ("));

  assert_eq!(project.origin_out(&["log", "-1", "--format=%s", "main"])?, "v2.0.0");
  assert_eq!(project.origin_out(&["tag", "--list"])?, "v2.0.0");
  assert_eq!(project.git_out(&["branch", "--list", "temp/*"])?, "");
  assert_eq!(project.git_out(&["status", "--porcelain"])?, "");
  assert_eq!(project.published(), vec!["repo"]);
  assert!(stdout(&output).contains("✅"));
  Ok(())
}

#[test]
fn test_feature_commit_infers_minor_for_workspace() -> Result<()> {
  let project = TestProject::new()?;
  project.add_package(
    "",
    r#"{"name":"monorepo","version":"1.0.0","private":true,"workspaces":["packages/*"]}"#,
  )?;
  project.add_package("packages/alpha", r#"{"name":"@scope/alpha","version":"1.0.0"}"#)?;
  project.add_package("packages/beta", r#"{"name":"@scope/beta","version":"1.0.0"}"#)?;
  project.add_package(
    "packages/internal",
    r#"{"name":"@scope/internal","version":"0.0.1","private":true}"#,
  )?;
  project.add_package("packages/docs", r#"{"private":true}"#)?;
  project.commit("chore: initial")?;
  project.tag("v1.0.0")?;
  project.write("packages/alpha/index.js", "module.exports = { alpha: true };\n")?;
  project.commit("feat(alpha): expose flag")?;
  project.write("packages/beta/index.js", "module.exports = { beta: 1 };\n")?;
  project.commit("fix(beta): off by one")?;
  project.push_main()?;

  let output = project.js_rail(&["release"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  for manifest in ["package.json", "packages/alpha/package.json", "packages/beta/package.json"] {
    let value: serde_json::Value = serde_json::from_str(&project.read(manifest)?)?;
    assert_eq!(value["version"], "1.1.0", "{}", manifest);
  }
  let internal: serde_json::Value = serde_json::from_str(&project.read("packages/internal/package.json")?)?;
  assert_eq!(internal["version"], "0.0.1");

  let changelog = project.read("CHANGELOG.md")?;
  assert!(changelog.contains("### Features"));
  assert!(changelog.contains("* **alpha:** expose flag"));
  assert!(changelog.contains("### Bug Fixes"));
  assert!(changelog.contains("* **beta:** off by one"));

  let mut published = project.published();
  published.sort();
  assert_eq!(published, vec!["alpha", "beta"]);
  assert!(project.origin_out(&["tag", "--list"])?.contains("v1.1.0"));
  Ok(())
}

#[test]
fn test_file_set_mismatch_changes_nothing() -> Result<()> {
  let project = TestProject::new()?;
  project.add_package("", r#"{"name":"solo","version":"1.0.0"}"#)?;
  project.commit("chore: initial")?;
  project.tag("v1.0.0")?;
  project.commit_empty_fix()?;
  project.push_main()?;
  let head = project.git_out(&["rev-parse", "HEAD"])?;

  let output = project.js_rail(&["release"], &[("FAKE_YARN_EXTRA", "dist/debug.log")])?;

  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("Published files differ for 'solo' between npm and yarn"), "stderr: {}", err);
  assert!(err.contains("Only in yarn: dist/debug.log"));

  assert!(project.read("package.json")?.contains(r#""version":"1.0.0""#));
  assert_eq!(project.git_out(&["rev-parse", "HEAD"])?, head);
  assert_eq!(project.git_out(&["tag", "--list"])?, "v1.0.0");
  assert!(project.published().is_empty());
  Ok(())
}

#[test]
fn test_dry_run_and_skip_changelog() -> Result<()> {
  let project = TestProject::new()?;
  project.add_package("", r#"{"name":"solo","version":"0.3.1"}"#)?;
  project.commit("chore: initial")?;
  project.tag("v0.3.1")?;
  project.commit_empty_fix()?;
  project.push_main()?;

  let output = project.js_rail(&["release", "--dry-run"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  let out = stdout(&output);
  assert!(out.contains("0.3.1 → 0.3.2"), "stdout: {}", out);
  assert!(out.contains("Dry run complete"));
  assert_eq!(project.git_out(&["status", "--porcelain"])?, "");

  let output = project.js_rail(&["release", "--skip-changelog"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(!project.path.join("CHANGELOG.md").exists());
  assert_eq!(project.origin_out(&["log", "-1", "--format=%s", "main"])?, "v0.3.2");
  Ok(())
}
