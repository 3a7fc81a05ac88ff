//! Changelog generation from conventional commits
//!
//! Entries are grouped the way conventional-changelog's angular preset does it
//! and prepended to the existing file, below its `# Title` block if it has one.

use super::commits::{self, CommitType, ConventionalCommit};
use super::plan::release_tag;
use crate::core::error::{RailError, RailResult, ReleaseError, ResultExt};
use crate::core::vcs::GitClient;
use semver::Version;
use std::path::{Path, PathBuf};

/// Rendered sections, in output order
const SECTIONS: [(CommitType, &str); 4] = [
  (CommitType::Feat, "Features"),
  (CommitType::Fix, "Bug Fixes"),
  (CommitType::Perf, "Performance Improvements"),
  (CommitType::Revert, "Reverts"),
];

/// One changelog entry
#[derive(Debug, Clone)]
pub struct ChangelogEntry {
  pub version: Version,
  pub date: String,
  pub commits: Vec<ConventionalCommit>,
}

impl ChangelogEntry {
  pub fn to_markdown(&self) -> String {
    let mut out = format!("## {} ({})\n\n", self.version, self.date);

    let breaking: Vec<_> = self.commits.iter().filter(|c| c.is_breaking()).collect();
    if !breaking.is_empty() {
      out.push_str("### BREAKING CHANGES\n\n");
      for commit in breaking {
        let note = commit
          .breaking_note
          .as_deref()
          .filter(|n| !n.is_empty())
          .unwrap_or(&commit.description);
        out.push_str(&bullet(commit, note));
      }
      out.push('\n');
    }

    for (commit_type, title) in SECTIONS {
      let mut section = self.commits.iter().filter(|c| c.commit_type == commit_type).peekable();
      if section.peek().is_none() {
        continue;
      }
      out.push_str(&format!("### {}\n\n", title));
      for commit in section {
        out.push_str(&bullet(commit, &commit.description));
      }
      out.push('\n');
    }

    out
  }
}

fn bullet(commit: &ConventionalCommit, text: &str) -> String {
  let scope = commit
    .scope
    .as_ref()
    .map(|s| format!("**{}:** ", s))
    .unwrap_or_default();
  if commit.short_sha.is_empty() {
    format!("* {}{}\n", scope, text)
  } else {
    format!("* {}{} ({})\n", scope, text, commit.short_sha)
  }
}

/// Insert `entry` into existing changelog content
///
/// A leading `# Title` block (everything before the first `## ` heading) stays
/// on top. The existing content is split once and never edited: removing the
/// inserted block from the result gives back `existing` byte for byte.
pub fn prepend_entry(existing: &str, entry: &str) -> String {
  let (header, rest) = existing.split_at(header_len(existing));
  let inserted = inserted_block(header, entry);

  let mut out = String::with_capacity(existing.len() + inserted.len());
  out.push_str(header);
  out.push_str(&inserted);
  out.push_str(rest);
  out
}

/// The entry, led by whatever blank-line padding the title block lacks
fn inserted_block(header: &str, entry: &str) -> String {
  let separator = if header.is_empty() || header.ends_with("\n\n") {
    ""
  } else if header.ends_with('\n') {
    "\n"
  } else {
    "\n\n"
  };
  format!("{}{}", separator, entry)
}

fn header_len(content: &str) -> usize {
  if !content.starts_with("# ") {
    return 0;
  }

  let mut offset = 0;
  for line in content.split_inclusive('\n') {
    if line.starts_with("## ") {
      return offset;
    }
    offset += line.len();
  }
  content.len()
}

/// Writes the changelog entry for a release
pub struct ChangelogGenerator<'a> {
  git: &'a dyn GitClient,
  path: PathBuf,
}

impl<'a> ChangelogGenerator<'a> {
  pub fn new(git: &'a dyn GitClient, path: impl Into<PathBuf>) -> Self {
    Self { git, path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Build the entry for `new_version` from commits since `v<previous_version>`
  ///
  /// Falls back to the whole history when that tag does not exist.
  pub fn entry(&self, previous_version: &Version, new_version: &Version, date: &str) -> RailResult<ChangelogEntry> {
    let tag = release_tag(previous_version);
    let since = if self.git.tag_exists(&tag)? {
      Some(tag.as_str())
    } else {
      log::debug!("{} not found, changelog covers the whole history", tag);
      None
    };

    let history = self.git.commits_since(since)?;
    Ok(ChangelogEntry {
      version: new_version.clone(),
      date: date.to_string(),
      commits: commits::parse_all(&history),
    })
  }

  /// Prepend the entry for `new_version`, creating the file if needed
  pub fn generate(&self, previous_version: &Version, new_version: &Version) -> RailResult<()> {
    let entry = self.entry(previous_version, new_version, &today())?;

    let existing = if self.path.exists() {
      std::fs::read_to_string(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))?
    } else {
      String::new()
    };

    let content = prepend_entry(&existing, &entry.to_markdown());
    std::fs::write(&self.path, content).map_err(|e| {
      RailError::Release(ReleaseError::WriteFailed {
        path: self.path.clone(),
        reason: e.to_string(),
      })
    })
  }
}

/// Local date as `YYYY-MM-DD`
pub fn today() -> String {
  chrono::Local::now().format("%Y-%m-%d").to_string()
}
