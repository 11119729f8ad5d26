// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Resolution of capture timestamps from Takeout sidecars and folder names.
//!
//! Resolution never mutates files. Sources in priority order: a companion
//! sidecar JSON found by Takeout's (fragile) naming rules, then an enclosing
//! folder name encoding a date.

use std::{
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;

use crate::prim::{Provenance, ResolvedDate};

/// Relevant subset of a Takeout sidecar document. Everything else is ignored;
/// extra fields must not cause failure.
#[derive(Deserialize)]
struct SidecarDoc {
  #[serde(rename = "photoTakenTime")]
  photo_taken_time: Option<PhotoTakenTime>,
}

#[derive(Deserialize)]
struct PhotoTakenTime {
  timestamp: Option<String>,
}

/// Outcome of a resolution attempt. A failed sidecar parse is remembered so
/// the caller can count it, but does not stop folder inference.
#[derive(Default)]
pub struct Resolution {
  pub date: Option<ResolvedDate>,
  pub sidecar_parse_failed: bool,
}

/// Resolves a capture instant for `file`, or nothing if no source yields one.
/// File modification time is never used as a source.
pub fn resolve(file: &Path) -> Resolution {
  let mut resolution = Resolution::default();

  if let Some((sidecar, provenance)) = find_sidecar(file) {
    match read_sidecar(&sidecar) {
      Ok(Some(seconds)) => {
        resolution.date = ResolvedDate::from_epoch_seconds(seconds, provenance);
      }
      Ok(None) => {}
      Err(e) => {
        log::debug!("{e}");
        resolution.sidecar_parse_failed = true;
      }
    }
  }

  if resolution.date.is_none() {
    resolution.date = infer_from_folder(file).map(|date_time| ResolvedDate {
      date_time,
      provenance: Provenance::FolderName,
    });
  }

  resolution
}

/// Probes for an existing sidecar next to `file`. The first existing
/// candidate wins; no further candidates are consulted.
pub fn find_sidecar(file: &Path) -> Option<(PathBuf, Provenance)> {
  let dir = file.parent()?;
  let name = file.file_name()?.to_str()?;
  let stem = file.file_stem()?.to_str()?;

  let candidates = [
    (format!("{name}.json"), Provenance::SidecarPrimary),
    (format!("{stem}.json"), Provenance::SidecarPrimary),
    (
      format!("{name}.supplemental-metadata.json"),
      Provenance::SidecarSupplemental,
    ),
    (
      format!("{name}.supplemental.json"),
      Provenance::SidecarSupplemental,
    ),
    // Takeout truncates long sidecar names.
    (
      format!("{name}.supplemental-m.json"),
      Provenance::SidecarSupplemental,
    ),
    (
      format!("{name}.supplemental-.json"),
      Provenance::SidecarSupplemental,
    ),
  ];

  for (candidate, provenance) in candidates {
    let path = dir.join(candidate);
    if path.is_file() {
      return Some((path, provenance));
    }
  }

  smallest_supp_sidecar(dir, name).map(|path| (path, Provenance::SidecarSupplemental))
}

/// Finds the lexicographically smallest `<name>.supp*.json` in `dir`.
fn smallest_supp_sidecar(dir: &Path, name: &str) -> Option<PathBuf> {
  let prefix = format!("{name}.supp");

  fs::read_dir(dir)
    .ok()?
    .filter_map(Result::ok)
    .filter_map(|entry| entry.file_name().into_string().ok())
    .filter(|n| n.starts_with(&prefix) && n.ends_with(".json"))
    .min()
    .map(|n| dir.join(n))
}

/// Reads `photoTakenTime.timestamp` from `sidecar`. A missing or non-numeric
/// value is no result; an unreadable or unparseable document is an error.
pub fn read_sidecar(sidecar: &Path) -> Result<Option<i64>, String> {
  let content = fs::read_to_string(sidecar)
    .map_err(|e| format!("{}: Failed to read sidecar ({e}).", sidecar.display()))?;

  let doc = serde_json::from_str::<SidecarDoc>(&content)
    .map_err(|e| format!("{}: Failed to parse sidecar ({e}).", sidecar.display()))?;

  Ok(
    doc
      .photo_taken_time
      .and_then(|t| t.timestamp)
      .and_then(|s| s.parse::<i64>().ok()),
  )
}

/// Walks the directory path from `file` upward, returning the date encoded in
/// the deepest matching component.
pub fn infer_from_folder(file: &Path) -> Option<NaiveDateTime> {
  file
    .ancestors()
    .skip(1)
    .filter_map(|dir| dir.file_name().and_then(std::ffi::OsStr::to_str))
    .find_map(parse_component)
}

/// Matches one path component against the date patterns, most specific first.
/// Calendar-invalid matches (e.g. `2019-13-45`) skip the component rather
/// than producing a clamped date.
fn parse_component(component: &str) -> Option<NaiveDateTime> {
  static FULL_DATE: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
      Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap(),
      Regex::new(r"^(\d{4})_(\d{2})_(\d{2})$").unwrap(),
      Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap(),
    ]
  });
  static MONTH: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
      Regex::new(r"^(\d{4})-(\d{2})$").unwrap(),
      Regex::new(r"^(\d{4})(\d{2})$").unwrap(),
    ]
  });
  static YEAR: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
      Regex::new(r"^Photos from (\d{4})$").unwrap(),
      Regex::new(r"^(\d{4})$").unwrap(),
    ]
  });

  for re in FULL_DATE.iter() {
    if let Some(caps) = re.captures(component) {
      return midnight(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
      );
    }
  }

  for re in MONTH.iter() {
    if let Some(caps) = re.captures(component) {
      return midnight(caps[1].parse().ok()?, caps[2].parse().ok()?, 1);
    }
  }

  for re in YEAR.iter() {
    if let Some(caps) = re.captures(component) {
      return midnight(caps[1].parse().ok()?, 1, 1);
    }
  }

  None
}

fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
  NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(0, 0, 0))
}
