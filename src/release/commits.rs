//! Conventional commit parsing
//!
//! Uses winnow for the header grammar `<type>(<scope>)!: <description>`.
//! Non-conventional messages parse to `None` and are ignored by both bump
//! inference and the changelog.

use crate::core::vcs::CommitInfo;

/// A parsed conventional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
  pub commit_type: CommitType,
  pub scope: Option<String>,
  pub description: String,
  /// Text of a `BREAKING CHANGE:` footer, empty when only the `!` marker was used
  pub breaking_note: Option<String>,
  /// Abbreviated SHA, empty when parsed from a bare message
  pub short_sha: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
  Feat,
  Fix,
  Perf,
  Revert,
  Docs,
  Style,
  Refactor,
  Test,
  Build,
  Ci,
  Chore,
  Other,
}

impl CommitType {
  fn parse_keyword(s: &str) -> Self {
    match s.to_ascii_lowercase().as_str() {
      "feat" | "feature" => Self::Feat,
      "fix" => Self::Fix,
      "perf" => Self::Perf,
      "revert" => Self::Revert,
      "docs" => Self::Docs,
      "style" => Self::Style,
      "refactor" => Self::Refactor,
      "test" | "tests" => Self::Test,
      "build" => Self::Build,
      "ci" => Self::Ci,
      "chore" => Self::Chore,
      _ => Self::Other,
    }
  }
}

impl ConventionalCommit {
  pub fn is_breaking(&self) -> bool {
    self.breaking_note.is_some()
  }

  /// Parse a commit from `git log`, keeping its abbreviated SHA
  pub fn from_info(info: &CommitInfo) -> Option<Self> {
    let mut commit = Self::parse(&info.message)?;
    commit.short_sha = info.short_sha().to_string();
    Some(commit)
  }

  /// Parse a full commit message
  pub fn parse(message: &str) -> Option<Self> {
    use winnow::ascii::{alphanumeric1, space0};
    use winnow::combinator::{opt, preceded, terminated};
    use winnow::prelude::*;
    use winnow::token::{take_till, take_while};

    let (header, rest) = message.split_once('\n').unwrap_or((message, ""));
    let header = header.trim_end();

    if let Some(reverted) = parse_git_revert(header) {
      return Some(Self {
        commit_type: CommitType::Revert,
        scope: None,
        description: reverted.to_string(),
        breaking_note: None,
        short_sha: String::new(),
      });
    }

    let mut parser = (
      alphanumeric1::<_, ()>.map(CommitType::parse_keyword),
      opt(preceded('(', terminated(take_till(1.., ')'), ')'))),
      opt('!'),
      ':',
      space0,
      take_while(1.., |_: char| true),
    );

    let Ok((commit_type, scope, bang, _, _, description)) = parser.parse(header) else {
      return None;
    };

    let footer_note = rest.lines().find_map(breaking_footer);
    let breaking_note = match (footer_note, bang) {
      (Some(note), _) => Some(note),
      (None, Some(_)) => Some(String::new()),
      (None, None) => None,
    };

    Some(Self {
      commit_type,
      scope: scope.map(|s: &str| s.trim().to_string()).filter(|s| !s.is_empty()),
      description: description.trim().to_string(),
      breaking_note,
      short_sha: String::new(),
    })
  }
}

/// `BREAKING CHANGE: <note>` (or `BREAKING-CHANGE:`) footer
fn breaking_footer(line: &str) -> Option<String> {
  let (key, value) = line.trim().split_once(':')?;
  let key = key.trim();
  if key == "BREAKING CHANGE" || key == "BREAKING-CHANGE" {
    Some(value.trim().to_string())
  } else {
    None
  }
}

/// Header written by `git revert`: `Revert "<original header>"`
fn parse_git_revert(header: &str) -> Option<&str> {
  header
    .strip_prefix("Revert \"")
    .and_then(|rest| rest.strip_suffix('"'))
    .filter(|inner| !inner.is_empty())
}

/// Parse a batch of commits, dropping non-conventional ones
pub fn parse_all(commits: &[CommitInfo]) -> Vec<ConventionalCommit> {
  commits.iter().filter_map(ConventionalCommit::from_info).collect()
}
