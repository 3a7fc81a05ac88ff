//! Subprocess helpers shared by the npm/yarn/pnpm wrappers
//!
//! Every external tool call goes through here so invocations are logged the same
//! way and failures carry the tool's own stderr.

use crate::core::error::{RailError, RailResult};
use std::path::Path;
use std::process::{Command, Output};

/// Build a command rooted at `dir`
pub fn tool_cmd(program: &str, args: &[&str], dir: &Path) -> Command {
  let mut cmd = Command::new(program);
  cmd.args(args).current_dir(dir);
  cmd
}

/// Printable form of a command line for logs and error messages
pub fn describe(program: &str, args: &[&str]) -> String {
  std::iter::once(program)
    .chain(args.iter().copied())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Run a command with captured output
///
/// Returns stdout on success. On a non-zero exit the error holds stderr (or
/// stdout when the tool reports failures there, as npm sometimes does).
pub fn run_captured(mut cmd: Command, label: &str) -> RailResult<String> {
  log::debug!("running `{}` in {:?}", label, cmd.get_current_dir());

  let output = cmd
    .output()
    .map_err(|e| RailError::message(format!("Failed to run `{}`: {}", label, e)))?;

  if !output.status.success() {
    return Err(RailError::message(failure_text(&output)));
  }

  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a command with inherited stdio, so the operator sees its output live
pub fn run_inherited(mut cmd: Command, label: &str) -> RailResult<()> {
  log::debug!("running `{}` in {:?}", label, cmd.get_current_dir());

  let status = cmd
    .status()
    .map_err(|e| RailError::message(format!("Failed to run `{}`: {}", label, e)))?;

  if !status.success() {
    return Err(RailError::message(format!("`{}` exited with {}", label, status)));
  }

  Ok(())
}

fn failure_text(output: &Output) -> String {
  let stderr = String::from_utf8_lossy(&output.stderr);
  if !stderr.trim().is_empty() {
    return stderr.trim_end().to_string();
  }
  let stdout = String::from_utf8_lossy(&output.stdout);
  if !stdout.trim().is_empty() {
    return stdout.trim_end().to_string();
  }
  format!("exited with {}", output.status)
}
