//! Temporary git repositories for unit tests

use super::{CommitInfo, GitClient, SystemGit};
use crate::core::error::{RailError, RailResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A throwaway repository on `main` with a configured identity
pub struct TestRepo {
  _root: TempDir,
  path: PathBuf,
}

impl TestRepo {
  pub fn new() -> Self {
    let root = TempDir::new().expect("create temp dir");
    let path = root.path().to_path_buf();

    let repo = Self { _root: root, path };
    repo.git(&["init", "--initial-branch=main"]);
    repo.git(&["config", "user.name", "Test User"]);
    repo.git(&["config", "user.email", "test@example.com"]);
    repo.git(&["config", "commit.gpgsign", "false"]);
    repo.git(&["config", "tag.gpgsign", "false"]);
    repo
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn client(&self) -> SystemGit {
    SystemGit::open(&self.path).expect("open test repo")
  }

  /// Write a file (creating parent directories) without committing
  pub fn write(&self, rel: &str, content: &str) {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(file, content).expect("write file");
  }

  /// Write a file and commit it
  pub fn commit_file(&self, rel: &str, content: &str, message: &str) {
    self.write(rel, content);
    self.git(&["add", "--all"]);
    self.git(&["commit", "-m", message]);
  }

  /// Run git and return trimmed stdout, panicking on failure
  pub fn git(&self, args: &[&str]) -> String {
    let output = Command::new("git")
      .current_dir(&self.path)
      .args(args)
      .output()
      .expect("run git");
    assert!(
      output.status.success(),
      "git {} failed: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
  }

  /// Attach a bare repository as `origin`, returning its path
  pub fn add_bare_origin(&self) -> PathBuf {
    let bare = self.path.join(".origin.git");
    let status = Command::new("git")
      .args(["init", "--bare", "--initial-branch=main"])
      .arg(&bare)
      .output()
      .expect("init bare origin")
      .status;
    assert!(status.success());
    // Keep the bare repo out of `git status`
    std::fs::write(self.path.join(".git").join("info").join("exclude"), ".origin.git\n").expect("write exclude");
    self.git(&["remote", "add", "origin", bare.to_str().expect("utf-8 temp path")]);
    bare
  }
}

/// Delegates to a real client but fails one named operation
pub struct FailingGit {
  inner: SystemGit,
  fail_on: &'static str,
}

impl FailingGit {
  pub fn new(inner: SystemGit, fail_on: &'static str) -> Self {
    Self { inner, fail_on }
  }

  fn check(&self, op: &str) -> RailResult<()> {
    if op == self.fail_on {
      Err(RailError::message(format!("injected failure in {}", op)))
    } else {
      Ok(())
    }
  }
}

impl GitClient for FailingGit {
  fn current_branch(&self) -> RailResult<String> {
    self.check("current_branch")?;
    self.inner.current_branch()
  }

  fn head_commit(&self) -> RailResult<String> {
    self.check("head_commit")?;
    self.inner.head_commit()
  }

  fn rev_parse(&self, rev: &str) -> RailResult<String> {
    self.check("rev_parse")?;
    self.inner.rev_parse(rev)
  }

  fn status(&self) -> RailResult<Vec<String>> {
    self.check("status")?;
    self.inner.status()
  }

  fn tag_exists(&self, tag: &str) -> RailResult<bool> {
    self.check("tag_exists")?;
    self.inner.tag_exists(tag)
  }

  fn branch_exists(&self, branch: &str) -> RailResult<bool> {
    self.check("branch_exists")?;
    self.inner.branch_exists(branch)
  }

  fn list_branches(&self, pattern: &str) -> RailResult<Vec<String>> {
    self.check("list_branches")?;
    self.inner.list_branches(pattern)
  }

  fn commits_since(&self, since: Option<&str>) -> RailResult<Vec<CommitInfo>> {
    self.check("commits_since")?;
    self.inner.commits_since(since)
  }

  fn create_and_switch_branch(&self, branch: &str) -> RailResult<()> {
    self.check("create_and_switch_branch")?;
    self.inner.create_and_switch_branch(branch)
  }

  fn switch_branch(&self, branch: &str) -> RailResult<()> {
    self.check("switch_branch")?;
    self.inner.switch_branch(branch)
  }

  fn delete_branch(&self, branch: &str) -> RailResult<()> {
    self.check("delete_branch")?;
    self.inner.delete_branch(branch)
  }

  fn add_all(&self) -> RailResult<()> {
    self.check("add_all")?;
    self.inner.add_all()
  }

  fn commit(&self, message: &str) -> RailResult<()> {
    self.check("commit")?;
    self.inner.commit(message)
  }

  fn reset_hard(&self, commit: &str) -> RailResult<()> {
    self.check("reset_hard")?;
    self.inner.reset_hard(commit)
  }

  fn create_tag(&self, tag: &str, message: &str) -> RailResult<()> {
    self.check("create_tag")?;
    self.inner.create_tag(tag, message)
  }

  fn delete_tag(&self, tag: &str) -> RailResult<()> {
    self.check("delete_tag")?;
    self.inner.delete_tag(tag)
  }

  fn push(&self, remote: &str, branch: &str) -> RailResult<()> {
    self.check("push")?;
    self.inner.push(remote, branch)
  }

  fn push_tags(&self, remote: &str) -> RailResult<()> {
    self.check("push_tags")?;
    self.inner.push_tags(remote)
  }
}
