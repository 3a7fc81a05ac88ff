//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for the npm CLI
///
/// `pack` always reports `package.json` and `index.js`. `publish` appends the
/// package directory name to `$FAKE_PUBLISH_LOG`. `test` fails when
/// `$FAKE_TEST_FAIL` is set.
const FAKE_NPM: &str = r#"#!/bin/sh
case "$1" in
  whoami)
    echo "tester"
    ;;
  pack)
    echo '[{"id":"pkg","files":[{"path":"package.json"},{"path":"index.js"}]}]'
    ;;
  publish)
    basename "$PWD" >> "$FAKE_PUBLISH_LOG"
    ;;
  test)
    if [ -n "$FAKE_TEST_FAIL" ]; then
      echo "1 failing" >&2
      exit 1
    fi
    ;;
  run)
    ;;
  *)
    echo "unexpected: npm $*" >&2
    exit 1
    ;;
esac
"#;

/// Stand-in for the yarn CLI, emitting newline-delimited records
///
/// Adds `$FAKE_YARN_EXTRA` to the packed files when set.
const FAKE_YARN: &str = r#"#!/bin/sh
if [ "$1" != "pack" ]; then
  echo "unexpected: yarn $*" >&2
  exit 1
fi
echo '{"location":"package.json"}'
echo '{"location":"./index.js"}'
if [ -n "$FAKE_YARN_EXTRA" ]; then
  echo "{\"location\":\"$FAKE_YARN_EXTRA\"}"
fi
echo '{"base":"/tmp/pkg"}'
"#;

/// A git repository with a bare `origin` and fake package managers on PATH
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
  pub origin: PathBuf,
  bin: PathBuf,
  publish_log: PathBuf,
}

impl TestProject {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("repo");
    let origin = root.path().join("origin.git");
    let bin = root.path().join("bin");
    let publish_log = root.path().join("published.log");

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&bin)?;
    write_executable(&bin.join("npm"), FAKE_NPM)?;
    write_executable(&bin.join("yarn"), FAKE_YARN)?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", "origin.git"])?;
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;
    git(&path, &["remote", "add", "origin", &origin.to_string_lossy()])?;

    Ok(Self {
      _root: root,
      path,
      origin,
      bin,
      publish_log,
    })
  }

  /// Write a file relative to the repository root
  pub fn write(&self, rel: &str, content: &str) -> Result<()> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  /// Write a package.json plus an index.js under `dir` ("" for the root)
  pub fn add_package(&self, dir: &str, manifest: &str) -> Result<()> {
    let prefix = if dir.is_empty() { String::new() } else { format!("{}/", dir) };
    self.write(&format!("{}package.json", prefix), manifest)?;
    self.write(&format!("{}index.js", prefix), "module.exports = {};\n")
  }

  /// Stage everything and commit
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "--all"])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Record a `fix:` commit without touching any file
  pub fn commit_empty_fix(&self) -> Result<()> {
    git(&self.path, &["commit", "--allow-empty", "-m", "fix: handle empty input"])?;
    Ok(())
  }

  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  /// Push main so the remote has a starting point
  pub fn push_main(&self) -> Result<()> {
    git(&self.path, &["push", "origin", "main"])?;
    Ok(())
  }

  pub fn read(&self, rel: &str) -> Result<String> {
    std::fs::read_to_string(self.path.join(rel)).with_context(|| format!("Failed to read {}", rel))
  }

  /// Run `git` in the repository and return trimmed stdout
  pub fn git_out(&self, args: &[&str]) -> Result<String> {
    let output = git(&self.path, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run `git` in the bare origin and return trimmed stdout
  pub fn origin_out(&self, args: &[&str]) -> Result<String> {
    let output = git(&self.origin, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Package directory names published so far, in completion order
  pub fn published(&self) -> Vec<String> {
    std::fs::read_to_string(&self.publish_log)
      .map(|s| s.lines().map(String::from).collect())
      .unwrap_or_default()
  }

  /// Run js-rail with the fake tools on PATH; extra env pairs are applied last
  pub fn js_rail(&self, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
    let path_var = match std::env::var_os("PATH") {
      Some(existing) => {
        let mut paths = vec![self.bin.clone()];
        paths.extend(std::env::split_paths(&existing));
        std::env::join_paths(paths)?
      }
      None => self.bin.clone().into_os_string(),
    };

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_js-rail"));
    cmd
      .arg("--cwd")
      .arg(&self.path)
      .args(args)
      .env("PATH", path_var)
      .env("FAKE_PUBLISH_LOG", &self.publish_log)
      .env_remove("FAKE_TEST_FAIL")
      .env_remove("FAKE_YARN_EXTRA")
      .env_remove("RUST_LOG");
    for (key, value) in env {
      cmd.env(key, value);
    }

    cmd.output().context("Failed to run js-rail")
  }
}

fn write_executable(path: &Path, script: &str) -> Result<()> {
  std::fs::write(path, script)?;
  let mut perms = std::fs::metadata(path)?.permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(path, perms)?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
