/*
    Reconciles an unpacked Google Photos Takeout export: writes capture dates
    from Takeout sidecars (or folder names) into the media files, then moves
    dated files into a clean archive. Acts as a wrapper around 'exiftool'.

    Copyright 2023-5 Seth Pendergrass. See LICENSE.
*/
use std::{io::Write, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

mod cancel;
mod commands;
mod exiftool;
mod fill;
mod mover;
mod pool;
mod prim;
mod progress;
mod resolve;
mod walk;

#[cfg(test)]
mod testing;

#[derive(Parser)]
struct Args {
  /// Enable Info, Debug and Trace logs (repeat for more). This re-enables the
  /// per-file diagnostics the summary otherwise absorbs.
  #[arg(long, short, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Writes capture dates from Takeout sidecars (or folder names) into the
  /// media files under INPUT_DIR. Dry-run unless --execute is given.
  SetExifFromMetadata {
    input_dir: PathBuf,

    /// Apply changes.
    #[arg(long)]
    execute: bool,

    /// Worker count (0 = logical CPUs, 1 = serial).
    #[arg(long, default_value_t = 0)]
    jobs: usize,
  },
  /// Moves files under INPUT_DIR that carry a trustworthy capture date into
  /// OUTPUT_DIR, with duplicate-safe renaming. Dry-run unless --execute is
  /// given.
  MoveWithExif {
    input_dir:  PathBuf,
    output_dir: PathBuf,

    /// Apply changes.
    #[arg(long)]
    execute: bool,

    /// Worker count (0 = logical CPUs, 1 = serial).
    #[arg(long, default_value_t = 0)]
    jobs: usize,
  },
}

// Sets up env_logger, with the formatting "ERROR_LEVEL message" (e.g. "WARN
// something went wrong").
fn enable_logging(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };

  Builder::new()
    .filter_level(level)
    .format(|buf, record| {
      let style = buf.default_level_style(record.level());
      writeln!(
        buf,
        "{style}{}{style:#} {}",
        record.level(),
        record.args()
      )
    })
    .init();
}

fn main() -> ExitCode {
  let args = Args::parse();
  enable_logging(args.verbose);

  let result = match args.command {
    Commands::SetExifFromMetadata {
      input_dir,
      execute,
      jobs,
    } => commands::set_exif_from_metadata(
      &exiftool::ExifTool,
      input_dir,
      commands::RunOptions { execute, jobs },
    ),
    Commands::MoveWithExif {
      input_dir,
      output_dir,
      execute,
      jobs,
    } => commands::move_with_exif(
      &exiftool::ExifTool,
      input_dir,
      output_dir,
      commands::RunOptions { execute, jobs },
    ),
  };

  match result {
    Ok(_) => ExitCode::SUCCESS,
    Err(e) => {
      log::error!("{e}");
      ExitCode::FAILURE
    }
  }
}
