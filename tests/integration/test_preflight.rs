//! Preflight failures stop the release before anything changes

use crate::helpers::*;
use anyhow::Result;

fn single_package() -> Result<TestProject> {
  let project = TestProject::new()?;
  project.add_package("", r#"{"name":"solo","version":"1.0.0"}"#)?;
  project.commit("chore: initial")?;
  project.tag("v1.0.0")?;
  project.push_main()?;
  Ok(project)
}

#[test]
fn test_wrong_branch_is_rejected() -> Result<()> {
  let project = single_package()?;
  project.git_out(&["checkout", "-b", "feature"])?;

  let output = project.js_rail(&["release", "patch"], &[])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Releases must run from 'main' (currently on 'feature')"));
  assert!(stderr(&output).contains("git checkout main"));
  assert!(project.published().is_empty());
  Ok(())
}

#[test]
fn test_dirty_tree_is_rejected() -> Result<()> {
  let project = single_package()?;
  project.write("notes.txt", "wip\n")?;

  let output = project.js_rail(&["release", "patch"], &[])?;

  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("Working tree has 1 pending change(s)"), "stderr: {}", err);
  assert!(err.contains("?? notes.txt"));
  Ok(())
}

#[test]
fn test_failing_tests_abort_unless_skipped() -> Result<()> {
  let project = single_package()?;

  let output = project.js_rail(&["release", "patch"], &[("FAKE_TEST_FAIL", "1")])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("--skip-test"));

  let output = project.js_rail(&["release", "patch", "--skip-test", "--dry-run"], &[("FAKE_TEST_FAIL", "1")])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("Skipping tests"));
  Ok(())
}

#[test]
fn test_missing_tag_needs_an_explicit_bump() -> Result<()> {
  let project = TestProject::new()?;
  project.add_package("", r#"{"name":"solo","version":"1.0.0"}"#)?;
  project.commit("feat: first")?;
  project.push_main()?;

  let output = project.js_rail(&["release"], &[])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Release tag 'v1.0.0' not found"));
  assert_eq!(project.git_out(&["tag", "--list"])?, "");
  Ok(())
}

#[test]
fn test_invalid_bump_is_a_usage_error() -> Result<()> {
  let project = single_package()?;

  let output = project.js_rail(&["release", "huge"], &[])?;

  assert!(!output.status.success());
  assert!(stderr(&output).contains("huge"));
  Ok(())
}
