// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Moving of dated files into the destination directory (the move run).
//!
//! Per-file flow: discovered → dated|undated → planned → moved|failed. Under
//! dry-run a planned file is reported as `movable` and nothing on disk
//! changes.

use std::{
  collections::HashSet,
  fs,
  io,
  path::{Path, PathBuf},
};

use crate::{
  cancel::CancelFlag,
  exiftool::MetadataTool,
  pool,
  prim::{self, ContainerClass},
  progress::Progress,
  walk,
};

/// Date & time tags probed, in priority order. Ungrouped, so values living in
/// the QuickTime or XMP groups satisfy the probe.
const DATE_TAGS: [&str; 3] = ["DateTimeOriginal", "CreateDate", "DateCreated"];

/// Runs the move pipeline from `input_dir` into `output_dir`.
pub fn run(
  tool: &dyn MetadataTool,
  input_dir: &Path,
  output_dir: &Path,
  execute: bool,
  jobs: usize,
  cancel: &CancelFlag,
) -> Result<Progress, String> {
  let candidates = walk::files(input_dir, Some(output_dir))?
    .into_iter()
    .filter(|f| prim::is_movable(f))
    .collect::<Vec<PathBuf>>();

  let progress = Progress::new(candidates.len() as u64);

  // Date probing fans out; everything after needs the traversal order intact.
  let dated = pool::map(jobs, cancel, &candidates, |file| {
    let dated = capture_date(tool, file).is_some();
    progress.tick();
    dated
  });

  // Single-threaded reservation pass, so two in-flight files with the same
  // base name can never claim the same destination.
  let mut claims = HashSet::new();
  let mut moves = Vec::new();

  for (file, dated) in candidates.iter().zip(&dated) {
    match dated {
      // Skipped due to cancellation; leave uncounted.
      None => {}
      Some(false) => {
        log::debug!("{}: Not moved (no date).", file.display());
        progress.count("not-moved");
      }
      Some(true) => {
        let (destination, occupied_on_disk) = reserve(&mut claims, output_dir, file);
        progress.count("movable");
        if occupied_on_disk {
          progress.count("duplicates");
        }
        moves.push((file.clone(), destination));
      }
    }
  }

  if execute {
    fs::create_dir_all(output_dir).map_err(|e| {
      format!(
        "{}: Failed to create destination directory ({e}).",
        output_dir.display()
      )
    })?;

    pool::for_each(jobs, cancel, &moves, |(source, destination)| {
      match move_file(source, destination) {
        Ok(()) => progress.count("moved"),
        Err(e) => {
          log::debug!("{e}");
          progress.count("failed");
        }
      }
    });
  }

  progress.finish();
  Ok(progress)
}

/// Returns the first non-empty capture-date tag on `file`, with the
/// modification-time fallback for the formats whose embedded dates are often
/// missing even after a fill run.
fn capture_date(tool: &dyn MetadataTool, file: &Path) -> Option<String> {
  let values = tool.read_tags(file, &DATE_TAGS);

  for tag in DATE_TAGS {
    if let Some(value) = values.get(tag) {
      if !value.is_empty() {
        return Some(value.clone());
      }
    }
  }

  match ContainerClass::of(file) {
    ContainerClass::Png | ContainerClass::Avi => {
      let value = tool.read_tag(file, "FileModifyDate");
      (!value.is_empty()).then_some(value)
    }
    _ => None,
  }
}

/// Claims a destination for `source`: its base name if unclaimed and free on
/// disk, else `stem_k.ext` for the smallest free `k`. Also reports whether
/// the first choice was occupied on disk at scan time.
fn reserve(
  claims: &mut HashSet<PathBuf>,
  output_dir: &Path,
  source: &Path,
) -> (PathBuf, bool) {
  let first_choice = output_dir.join(source.file_name().unwrap_or_default());
  let occupied_on_disk = first_choice.exists();

  let mut destination = first_choice;
  if occupied_on_disk || claims.contains(&destination) {
    let stem = source
      .file_stem()
      .unwrap_or_default()
      .to_string_lossy()
      .into_owned();
    let ext = source
      .extension()
      .unwrap_or_default()
      .to_string_lossy()
      .into_owned();

    for k in 1.. {
      let candidate = output_dir.join(format!("{stem}_{k}.{ext}"));
      if !candidate.exists() && !claims.contains(&candidate) {
        destination = candidate;
        break;
      }
    }
  }

  claims.insert(destination.clone());
  (destination, occupied_on_disk)
}

/// Moves one file, preferring an atomic rename and falling back to
/// copy-then-delete only across devices.
fn move_file(source: &Path, destination: &Path) -> Result<(), String> {
  match fs::rename(source, destination) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
      fs::copy(source, destination).map_err(|e| {
        format!(
          "{}: Failed to copy to {} ({e}).",
          source.display(),
          destination.display()
        )
      })?;
      fs::remove_file(source)
        .map_err(|e| format!("{}: Failed to remove after copy ({e}).", source.display()))
    }
    Err(e) => Err(format!(
      "{}: Failed to move to {} ({e}).",
      source.display(),
      destination.display()
    )),
  }
}
