//! GitClient operations for SystemGit (branches, commits, tags, remotes)

use super::system_git::SystemGit;
use super::{CommitInfo, GitClient};
use crate::core::error::{GitError, RailError, RailResult};

/// Field and record separators used in `git log` output
const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

impl GitClient for SystemGit {
  fn current_branch(&self) -> RailResult<String> {
    match self.run(&["rev-parse", "--abbrev-ref", "HEAD"]) {
      Ok(branch) => Ok(branch.trim().to_string()),
      Err(_) => Ok("HEAD".to_string()), // Unborn or detached HEAD
    }
  }

  fn head_commit(&self) -> RailResult<String> {
    self.rev_parse("HEAD")
  }

  fn rev_parse(&self, rev: &str) -> RailResult<String> {
    let revision = format!("{}^{{commit}}", rev);
    Ok(self.run(&["rev-parse", "--verify", &revision])?.trim().to_string())
  }

  fn status(&self) -> RailResult<Vec<String>> {
    let output = self.run(&["status", "--porcelain"])?;
    Ok(
      output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect(),
    )
  }

  fn tag_exists(&self, tag: &str) -> RailResult<bool> {
    self.probe(&["rev-parse", "--verify", "--quiet", &format!("refs/tags/{}", tag)])
  }

  fn branch_exists(&self, branch: &str) -> RailResult<bool> {
    self.probe(&["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
  }

  fn list_branches(&self, pattern: &str) -> RailResult<Vec<String>> {
    let output = self.run(&["branch", "--list", pattern, "--format=%(refname:short)"])?;
    Ok(
      output
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  }

  fn commits_since(&self, since: Option<&str>) -> RailResult<Vec<CommitInfo>> {
    let range = match since {
      Some(rev) => format!("{}..HEAD", rev),
      None => "HEAD".to_string(),
    };
    let format = format!("--format=%H{sep}%B{rec}", sep = "%x1f", rec = "%x1e");

    let output = self.run(&["log", &format, &range])?;
    parse_log_output(&output)
  }

  fn create_and_switch_branch(&self, branch: &str) -> RailResult<()> {
    self.run(&["checkout", "-b", branch]).map_err(|e| branch_error(e, branch))?;
    Ok(())
  }

  fn switch_branch(&self, branch: &str) -> RailResult<()> {
    self.run(&["checkout", branch]).map_err(|e| branch_error(e, branch))?;
    Ok(())
  }

  fn delete_branch(&self, branch: &str) -> RailResult<()> {
    self.run(&["branch", "-D", branch]).map_err(|e| branch_error(e, branch))?;
    Ok(())
  }

  fn add_all(&self) -> RailResult<()> {
    self.run(&["add", "--all"])?;
    Ok(())
  }

  fn commit(&self, message: &str) -> RailResult<()> {
    self.run(&["commit", "--no-verify", "-m", message])?;
    Ok(())
  }

  fn reset_hard(&self, commit: &str) -> RailResult<()> {
    self.run(&["reset", "--hard", commit])?;
    Ok(())
  }

  fn create_tag(&self, tag: &str, message: &str) -> RailResult<()> {
    self.run(&["tag", "-a", tag, "-m", message])?;
    Ok(())
  }

  fn delete_tag(&self, tag: &str) -> RailResult<()> {
    self.run(&["tag", "-d", tag])?;
    Ok(())
  }

  fn push(&self, remote: &str, branch: &str) -> RailResult<()> {
    println!("   Pushing {} to '{}'...", branch, remote);

    let output = self
      .git_cmd()
      .args(["push", remote, branch])
      .output()
      .map_err(|e| RailError::message(format!("Failed to push: {}", e)))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RailError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        branch: branch.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }

  fn push_tags(&self, remote: &str) -> RailResult<()> {
    println!("   Pushing tags to '{}'...", remote);

    let output = self
      .git_cmd()
      .args(["push", remote, "--tags"])
      .output()
      .map_err(|e| RailError::message(format!("Failed to push tags: {}", e)))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RailError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        branch: "--tags".to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }
}

fn branch_error(err: RailError, branch: &str) -> RailError {
  match err {
    RailError::Git(GitError::CommandFailed { stderr, .. }) => RailError::Git(GitError::BranchError {
      message: format!("{}: {}", branch, stderr.trim_end()),
    }),
    other => other,
  }
}

/// Parse `git log` output produced with the separator format above
///
/// Records are `sha \x1f body \x1e`.
fn parse_log_output(output: &str) -> RailResult<Vec<CommitInfo>> {
  let mut commits = Vec::new();

  for record in output.split(RECORD_SEP) {
    let record = record.trim_start_matches(['\n', '\r']);
    if record.trim().is_empty() {
      continue;
    }

    let mut fields = record.splitn(2, FIELD_SEP);
    let sha = fields
      .next()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or_else(|| RailError::message("Missing commit SHA in git log output"))?;
    let message = fields.next().unwrap_or("").trim().to_string();

    commits.push(CommitInfo {
      sha: sha.to_string(),
      message,
    });
  }

  Ok(commits)
}
