// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Program subcommands for reconciling a Takeout export.

use std::path::{Path, PathBuf};

use crate::{cancel::CancelFlag, exiftool::MetadataTool, fill, mover, progress::Progress};

/// Options shared by both subcommands.
#[derive(Clone, Copy)]
pub struct RunOptions {
  /// Apply changes. Without this, the run only reports what it would do.
  pub execute: bool,
  /// Worker count. 0 sizes the pool to the logical CPU count; 1 runs
  /// serially.
  pub jobs: usize,
}

/// Derives capture dates from sidecars and folder names, and writes them into
/// the media files under `input_dir`.
pub fn set_exif_from_metadata(
  tool: &dyn MetadataTool,
  input_dir: impl AsRef<Path>,
  options: RunOptions,
) -> Result<Progress, String> {
  let input_dir = check_input_dir(input_dir)?;

  log::info!(
    "{}: Setting capture dates{}.",
    input_dir.display(),
    dry_run_suffix(options.execute)
  );

  let cancel = CancelFlag::new();
  cancel.install_handler();

  let progress = fill::run(tool, &input_dir, options.execute, options.jobs, &cancel)?;
  progress.print_summary();

  Ok(progress)
}

/// Moves files under `input_dir` that carry a trustworthy capture date into
/// `output_dir`, with duplicate-safe renaming.
pub fn move_with_exif(
  tool: &dyn MetadataTool,
  input_dir: impl AsRef<Path>,
  output_dir: impl AsRef<Path>,
  options: RunOptions,
) -> Result<Progress, String> {
  let input_dir = check_input_dir(input_dir)?;
  let output_dir = make_absolute(output_dir.as_ref())?;

  log::info!(
    "{}: Moving dated files to {}{}.",
    input_dir.display(),
    output_dir.display(),
    dry_run_suffix(options.execute)
  );

  let cancel = CancelFlag::new();
  cancel.install_handler();

  let progress = mover::run(
    tool,
    &input_dir,
    &output_dir,
    options.execute,
    options.jobs,
    &cancel,
  )?;
  progress.print_summary();

  Ok(progress)
}

fn check_input_dir(dir: impl AsRef<Path>) -> Result<PathBuf, String> {
  let dir = dir.as_ref();

  if !dir.is_dir() {
    return Err(format!(
      "{}: Input directory does not exist.",
      dir.display()
    ));
  }

  make_absolute(dir)
}

fn make_absolute(path: &Path) -> Result<PathBuf, String> {
  std::path::absolute(path)
    .map_err(|e| format!("{}: Failed to resolve path ({e}).", path.display()))
}

fn dry_run_suffix(execute: bool) -> &'static str {
  if execute { "" } else { " (dry-run)" }
}
