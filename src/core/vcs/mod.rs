pub mod system_git;
mod system_git_ops;

use crate::core::error::RailResult;

pub use system_git::SystemGit;

/// Information about a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
  pub sha: String,
  pub message: String,
}

impl CommitInfo {
  /// Abbreviated SHA for display
  pub fn short_sha(&self) -> &str {
    &self.sha[..self.sha.len().min(7)]
  }
}

/// Git capabilities the release pipeline relies on
///
/// `SystemGit` is the production implementation. Every mutating call is issued
/// sequentially by the release git flow; implementations need not serialize
/// access themselves.
pub trait GitClient: Send + Sync {
  /// Name of the checked-out branch (`HEAD` when detached)
  fn current_branch(&self) -> RailResult<String>;

  /// SHA of HEAD
  fn head_commit(&self) -> RailResult<String>;

  /// Resolve any revision to a SHA
  fn rev_parse(&self, rev: &str) -> RailResult<String>;

  /// `git status --porcelain` entries, empty when the tree is clean
  fn status(&self) -> RailResult<Vec<String>>;

  fn tag_exists(&self, tag: &str) -> RailResult<bool>;

  fn branch_exists(&self, branch: &str) -> RailResult<bool>;

  /// Local branches matching a glob (e.g. `temp/release-v*`)
  fn list_branches(&self, pattern: &str) -> RailResult<Vec<String>>;

  /// Commits reachable from HEAD but not from `since` (all of HEAD when `None`), newest first
  fn commits_since(&self, since: Option<&str>) -> RailResult<Vec<CommitInfo>>;

  fn create_and_switch_branch(&self, branch: &str) -> RailResult<()>;

  fn switch_branch(&self, branch: &str) -> RailResult<()>;

  /// Force-delete a local branch
  fn delete_branch(&self, branch: &str) -> RailResult<()>;

  /// Stage every working-tree change, untracked files included
  fn add_all(&self) -> RailResult<()>;

  fn commit(&self, message: &str) -> RailResult<()>;

  /// Move the current branch (and working tree) to `commit`
  fn reset_hard(&self, commit: &str) -> RailResult<()>;

  /// Create an annotated tag at HEAD
  fn create_tag(&self, tag: &str, message: &str) -> RailResult<()>;

  fn delete_tag(&self, tag: &str) -> RailResult<()>;

  fn push(&self, remote: &str, branch: &str) -> RailResult<()>;

  fn push_tags(&self, remote: &str) -> RailResult<()>;
}

#[cfg(test)]
pub mod test_repo;
