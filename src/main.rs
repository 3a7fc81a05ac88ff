mod commands;
mod core;
mod node;
mod release;
mod ui;

use clap::{Parser, Subcommand};
use commands::ReleaseOptions;
use core::context::ReleaseContext;
use core::error::{RailError, print_error};
use release::plan::BumpType;
use std::path::PathBuf;

/// Release JavaScript packages and workspaces with one command
#[derive(Parser)]
#[command(name = "js-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Enable debug logging (RUST_LOG takes precedence)
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Repository root (defaults to the current directory)
  #[arg(long, global = true, value_name = "DIR")]
  cwd: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Bump, tag and publish every public package
  Release {
    /// Bump type; inferred from conventional commits when omitted
    #[arg(value_enum)]
    bump: Option<BumpType>,

    /// Do not update the changelog
    #[arg(long)]
    skip_changelog: bool,

    /// Do not run the test command
    #[arg(long)]
    skip_test: bool,

    /// Do not run the lint command
    #[arg(long)]
    skip_lint: bool,

    /// Check and plan the release without changing anything
    #[arg(long)]
    dry_run: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let root = match cli.cwd {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(RailError::Io(e)),
    },
  };

  let ctx = match ReleaseContext::build(&root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Release {
      bump,
      skip_changelog,
      skip_test,
      skip_lint,
      dry_run,
    } => commands::run_release(
      &ctx,
      ReleaseOptions {
        bump,
        skip_changelog,
        skip_test,
        skip_lint,
        dry_run,
        show_progress: true,
      },
    ),
  };

  match result {
    Ok(outcome) => log::debug!(
      "{} {} ({} package(s), dry_run={})",
      outcome.tag,
      outcome.version,
      outcome.packages.len(),
      outcome.dry_run
    ),
    Err(e) => handle_error(e),
  }
}

fn init_logging(verbose: bool) {
  let level = if verbose { "debug" } else { "warn" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
    .format_timestamp(None)
    .init();
}

fn handle_error(err: RailError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
