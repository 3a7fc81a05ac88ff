//! Release branch lifecycle
//!
//! A release is committed on `temp/release-v<version>`, and `main` only moves
//! once publishing succeeded. Every mutating step records its own undo, and
//! `rollback` replays those undos newest first.
//!
//! ```text
//! Idle --begin--> OnTempBranch --commit--> Committed --finalize--> Finalized
//!                      |                       |
//!                      +-------rollback--------+--> RolledBack
//! ```

use crate::core::config::ReleaseSettings;
use crate::core::error::{GitError, RailError, RailResult, ReleaseError};
use crate::core::vcs::GitClient;
use semver::Version;
use std::fmt;

/// Prefix of ephemeral release branches
pub const TEMP_BRANCH_PREFIX: &str = "temp/release-v";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
  Idle,
  OnTempBranch,
  Committed,
  Finalized,
  RolledBack,
}

impl fmt::Display for FlowState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      FlowState::Idle => "idle",
      FlowState::OnTempBranch => "on the temp branch",
      FlowState::Committed => "committed",
      FlowState::Finalized => "finalized",
      FlowState::RolledBack => "rolled back",
    };
    f.write_str(name)
  }
}

/// Undo action for a completed step
#[derive(Debug, Clone, PartialEq, Eq)]
enum Compensation {
  SwitchBranch(String),
  DeleteBranch(String),
  ResetBranch { branch: String, commit: String },
  DeleteTag(String),
}

impl Compensation {
  fn run(&self, git: &dyn GitClient) -> RailResult<()> {
    match self {
      Compensation::SwitchBranch(branch) => git.switch_branch(branch),
      Compensation::DeleteBranch(branch) => git.delete_branch(branch),
      Compensation::ResetBranch { branch, commit } => {
        if git.current_branch()? != *branch {
          git.switch_branch(branch)?;
        }
        git.reset_hard(commit)
      }
      Compensation::DeleteTag(tag) => git.delete_tag(tag),
    }
  }
}

impl fmt::Display for Compensation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Compensation::SwitchBranch(branch) => write!(f, "switch back to {}", branch),
      Compensation::DeleteBranch(branch) => write!(f, "delete branch {}", branch),
      Compensation::ResetBranch { branch, commit } => {
        write!(f, "reset {} to {}", branch, &commit[..commit.len().min(7)])
      }
      Compensation::DeleteTag(tag) => write!(f, "delete tag {}", tag),
    }
  }
}

pub struct ReleaseGitFlow<'a> {
  git: &'a dyn GitClient,
  main_branch: String,
  remote: String,
  commit_message: String,
  version: Version,
  state: FlowState,
  compensations: Vec<Compensation>,
}

impl<'a> ReleaseGitFlow<'a> {
  pub fn new(git: &'a dyn GitClient, settings: &ReleaseSettings, version: &Version) -> Self {
    Self {
      git,
      main_branch: settings.main_branch.clone(),
      remote: settings.remote.clone(),
      commit_message: settings.commit_message_for(&version.to_string()),
      version: version.clone(),
      state: FlowState::Idle,
      compensations: Vec::new(),
    }
  }

  pub fn state(&self) -> FlowState {
    self.state
  }

  pub fn temp_branch(&self) -> String {
    format!("{}{}", TEMP_BRANCH_PREFIX, self.version)
  }

  pub fn tag(&self) -> String {
    format!("v{}", self.version)
  }

  /// Whether `rollback` is a valid next step
  pub fn can_rollback(&self) -> bool {
    matches!(self.state, FlowState::OnTempBranch | FlowState::Committed)
  }

  /// Create and switch to the temp release branch
  pub fn begin(&mut self) -> RailResult<()> {
    self.expect_state(FlowState::Idle, "begin")?;

    let temp = self.temp_branch();
    if self.git.branch_exists(&temp)? {
      return Err(RailError::Git(GitError::BranchError {
        message: format!("'{}' already exists from an earlier run; delete it first", temp),
      }));
    }
    self.git.create_and_switch_branch(&temp)?;
    self.compensations.push(Compensation::DeleteBranch(temp));
    self.compensations.push(Compensation::SwitchBranch(self.main_branch.clone()));

    self.state = FlowState::OnTempBranch;
    Ok(())
  }

  /// Stage every change and commit it on the temp branch
  pub fn commit(&mut self) -> RailResult<()> {
    self.expect_state(FlowState::OnTempBranch, "commit")?;

    self.git.add_all()?;
    self.git.commit(&self.commit_message)?;

    self.state = FlowState::Committed;
    Ok(())
  }

  /// Move main to the release commit, tag it, push both, drop the temp branch
  pub fn finalize(&mut self) -> RailResult<()> {
    self.expect_state(FlowState::Committed, "finalize")?;

    let temp = self.temp_branch();
    let tag = self.tag();
    let main = self.main_branch.clone();

    let release_commit = self.git.head_commit()?;
    let original_main = self.git.rev_parse(&main)?;

    self.git.switch_branch(&main)?;
    self.git.reset_hard(&release_commit)?;
    self.compensations.push(Compensation::ResetBranch {
      branch: main.clone(),
      commit: original_main,
    });

    self.git.create_tag(&tag, &self.commit_message)?;
    self.compensations.push(Compensation::DeleteTag(tag));

    self.git.push(&self.remote, &main)?;
    // The remote main holds the release commit now; local main and the tag must stay with it
    self
      .compensations
      .retain(|c| !matches!(c, Compensation::ResetBranch { .. } | Compensation::DeleteTag(_)));

    self.git.push_tags(&self.remote)?;

    self.git.delete_branch(&temp)?;
    self.compensations.clear();

    self.state = FlowState::Finalized;
    Ok(())
  }

  /// Undo every completed step, newest first
  ///
  /// Keeps going when an undo fails; the failures are reported together.
  pub fn rollback(&mut self) -> RailResult<()> {
    if !self.can_rollback() {
      return Err(self.invalid("roll back"));
    }

    let mut failures = Vec::new();
    while let Some(compensation) = self.compensations.pop() {
      log::debug!("rollback: {}", compensation);
      if let Err(e) = compensation.run(self.git) {
        log::warn!("rollback step '{}' failed: {}", compensation, e);
        failures.push(format!("{}: {}", compensation, e));
      }
    }

    self.state = FlowState::RolledBack;

    if failures.is_empty() {
      Ok(())
    } else {
      Err(RailError::Release(ReleaseError::RollbackIncomplete { failures }))
    }
  }

  fn expect_state(&self, expected: FlowState, action: &str) -> RailResult<()> {
    if self.state == expected {
      Ok(())
    } else {
      Err(self.invalid(action))
    }
  }

  fn invalid(&self, action: &str) -> RailError {
    RailError::Release(ReleaseError::InvalidTransition {
      from: self.state.to_string(),
      action: action.to_string(),
    })
  }
}
