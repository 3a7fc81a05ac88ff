//! Git client backed by the `git` binary
//!
//! Every operation is one subprocess run from the working tree root. Nothing
//! is cached between calls, so the client always sees the repository as the
//! release pipeline left it.

use crate::core::error::{GitError, RailError, RailResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Variables that would point git at a different repository or index
const REDIRECTING_VARS: [&str; 4] = ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_OBJECT_DIRECTORY"];

pub struct SystemGit {
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open the repository containing `path`
  pub fn open(path: &Path) -> RailResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .envs_removed(&REDIRECTING_VARS)
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(RailError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(RailError::message(format!("Failed to open git repository: {}", stderr.trim_end())));
    }

    let work_tree = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    log::debug!("git work tree: {}", work_tree.display());
    Ok(Self { work_tree })
  }

  /// Root of the working tree
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Run a git command and return trimmed stdout
  pub(crate) fn run(&self, args: &[&str]) -> RailResult<String> {
    let command = format!("git {}", args.join(" "));
    log::debug!("{}", command);

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RailError::Git(GitError::CommandFailed {
        command,
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
  }

  /// Run a git command and report only whether it succeeded
  pub(crate) fn probe(&self, args: &[&str]) -> RailResult<bool> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;
    Ok(output.status.success())
  }

  /// `git` bound to the work tree with stable, uncoloured output
  ///
  /// The rest of the environment is inherited so pushes keep their credentials
  /// (ssh agent, credential helpers). Prompts are disabled.
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd
      .arg("-C")
      .arg(&self.work_tree)
      .args(["-c", "core.quotePath=false", "-c", "color.ui=never", "-c", "advice.detachedHead=false"])
      .envs_removed(&REDIRECTING_VARS)
      .env("GIT_TERMINAL_PROMPT", "0");
    cmd
  }
}

trait CommandExt {
  fn envs_removed(&mut self, vars: &[&str]) -> &mut Self;
}

impl CommandExt for Command {
  fn envs_removed(&mut self, vars: &[&str]) -> &mut Self {
    for var in vars {
      self.env_remove(var);
    }
    self
  }
}
