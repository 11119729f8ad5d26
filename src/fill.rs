// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Writing of capture dates into media files (the fill run).
//!
//! Each container class gets the tag set its mainstream readers consult.
//! Files already carrying an original-date tag are never touched.

use std::path::{Path, PathBuf};

use crate::{
  cancel::CancelFlag,
  exiftool::MetadataTool,
  pool,
  prim::{self, ContainerClass, Provenance},
  progress::Progress,
  resolve,
  walk,
};

/// Per-file outcome of the fill run, as counted in the summary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FillOutcome {
  Written,
  AlreadyDated,
  NoDateSource,
  WriteFailed,
}

impl FillOutcome {
  pub fn counter_name(self) -> &'static str {
    match self {
      Self::Written => "written",
      Self::AlreadyDated => "already-dated",
      Self::NoDateSource => "no-date-source",
      Self::WriteFailed => "write-failed",
    }
  }
}

/// What happened to a single file, with enough detail for the counters.
pub struct FillResult {
  pub outcome:              FillOutcome,
  pub provenance:           Option<Provenance>,
  pub sidecar_parse_failed: bool,
}

/// Runs the fill pipeline over every media file under `input_dir`.
pub fn run(
  tool: &dyn MetadataTool,
  input_dir: &Path,
  execute: bool,
  jobs: usize,
  cancel: &CancelFlag,
) -> Result<Progress, String> {
  let files = walk::files(input_dir, None)?
    .into_iter()
    .filter(|f| prim::is_fill_candidate(f))
    .collect::<Vec<PathBuf>>();

  let progress = Progress::new(files.len() as u64);

  pool::for_each(jobs, cancel, &files, |file| {
    let result = fill_file(tool, file, execute);

    progress.count(result.outcome.counter_name());
    if let Some(provenance) = result.provenance {
      progress.count(provenance.counter_name());
    }
    if result.sidecar_parse_failed {
      progress.count("sidecar-parse-fail");
    }
    progress.tick();
  });

  progress.finish();
  Ok(progress)
}

/// Resolves and writes the capture date for one file.
pub fn fill_file(tool: &dyn MetadataTool, file: &Path, execute: bool) -> FillResult {
  if !tool.read_tag(file, "DateTimeOriginal").is_empty() {
    log::debug!("{}: Already dated.", file.display());
    return FillResult {
      outcome:              FillOutcome::AlreadyDated,
      provenance:           None,
      sidecar_parse_failed: false,
    };
  }

  let resolution = resolve::resolve(file);

  let Some(date) = resolution.date else {
    log::debug!("{}: No date source.", file.display());
    return FillResult {
      outcome:              FillOutcome::NoDateSource,
      provenance:           None,
      sidecar_parse_failed: resolution.sidecar_parse_failed,
    };
  };

  let class = ContainerClass::of(file);
  let value = date.tag_value();

  let outcome = match write_gated(tool, file, &tag_set(class, &value), execute) {
    Ok(()) => FillOutcome::Written,
    // AVI metadata support is spotty; record the time on the file itself.
    Err(e) if class == ContainerClass::Avi => {
      log::debug!(
        "{}: Tag write failed ({e}); falling back to FileModifyDate.",
        file.display()
      );
      match write_gated(
        tool,
        file,
        &[("FileModifyDate".to_string(), value.clone())],
        execute,
      ) {
        Ok(()) => FillOutcome::Written,
        Err(e) => {
          log::debug!("{}: Fallback write failed ({e}).", file.display());
          FillOutcome::WriteFailed
        }
      }
    }
    Err(e) => {
      log::debug!("{}: Tag write failed ({e}).", file.display());
      FillOutcome::WriteFailed
    }
  };

  FillResult {
    outcome,
    provenance: Some(date.provenance),
    sidecar_parse_failed: resolution.sidecar_parse_failed,
  }
}

/// The only call site that mutates media files. Short-circuits under dry-run,
/// reporting what would have been written.
fn write_gated(
  tool: &dyn MetadataTool,
  file: &Path,
  tags: &[(String, String)],
  execute: bool,
) -> Result<(), String> {
  if !execute {
    log::debug!("{}: Would write {} tag(s).", file.display(), tags.len());
    return Ok(());
  }

  tool.write_tags(file, tags)
}

/// The tags presenting a capture date to every mainstream reader of `class`.
fn tag_set(class: ContainerClass, value: &str) -> Vec<(String, String)> {
  let names: &[&str] = match class {
    ContainerClass::Jpeg | ContainerClass::Heic | ContainerClass::Tiff | ContainerClass::Other => {
      &["EXIF:DateTimeOriginal", "EXIF:CreateDate", "EXIF:ModifyDate"]
    }
    ContainerClass::Png => &[
      "EXIF:DateTimeOriginal",
      "EXIF:CreateDate",
      "EXIF:ModifyDate",
      "XMP:DateCreated",
    ],
    ContainerClass::Video => &[
      "QuickTime:CreateDate",
      "QuickTime:ModifyDate",
      "QuickTime:TrackCreateDate",
      "QuickTime:MediaCreateDate",
      "Keys:CreationDate",
    ],
    ContainerClass::Avi => &["DateTimeOriginal", "CreateDate", "ModifyDate"],
  };

  names
    .iter()
    .map(|n| ((*n).to_string(), value.to_string()))
    .collect()
}
