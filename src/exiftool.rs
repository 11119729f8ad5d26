// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Adapter around the external `ExifTool` binary.
//!
//! All metadata access goes through the `MetadataTool` trait, so the rest of
//! the pipeline never sees the tool's argv shape and tests can substitute an
//! in-memory implementation.

use std::{
  collections::BTreeMap,
  ffi::{OsStr, OsString},
  path::Path,
  process::Command,
};

use serde_json::Value;

/// Uniform interface to the external metadata tool.
///
/// The adapter never writes unless explicitly told, and has no dry-run mode
/// of its own. Dry-run discipline lives in the callers.
pub trait MetadataTool: Sync {
  /// Returns the tag's textual value, or empty if absent. Failures of the
  /// underlying tool are logged as a diagnostic and reported as empty.
  fn read_tag(&self, file: &Path, tag: &str) -> String {
    self
      .read_tags(file, &[tag])
      .remove(tag)
      .unwrap_or_default()
  }

  /// Batched read. Returns one entry per requested tag (empty when absent).
  fn read_tags(&self, file: &Path, tags: &[&str]) -> BTreeMap<String, String>;

  /// Writes the given tag-value pairs, overwriting the original file (no
  /// `_original` backup retained). Ok iff the underlying tool exits cleanly.
  fn write_tags(&self, file: &Path, tags: &[(String, String)]) -> Result<(), String>;
}

/// `MetadataTool` backed by the `exiftool` binary on `PATH`. Each operation
/// spawns a fresh short-lived process; there is no shared session state.
pub struct ExifTool;

impl MetadataTool for ExifTool {
  fn read_tags(&self, file: &Path, tags: &[&str]) -> BTreeMap<String, String> {
    let mut args = vec![OsString::from("-json")];
    args.extend(tags.iter().map(|t| OsString::from(format!("-{t}"))));
    args.push(file.as_os_str().to_os_string());

    match run_exiftool(args) {
      Ok(stdout) => parse_read_output(&stdout, tags),
      Err(e) => {
        log::debug!("{}: Metadata read failed ({e}).", file.display());
        all_empty(tags)
      }
    }
  }

  fn write_tags(&self, file: &Path, tags: &[(String, String)]) -> Result<(), String> {
    let mut args = vec![OsString::from("-overwrite_original"), OsString::from("-q")];
    args.extend(tags.iter().map(|(t, v)| OsString::from(format!("-{t}={v}"))));
    args.push(file.as_os_str().to_os_string());

    run_exiftool(args).map(|_| ())
  }
}

/// Runs `ExifTool` with `args`, returning stdout.
fn run_exiftool<I: IntoIterator<Item = S>, S: AsRef<OsStr>>(args: I) -> Result<Vec<u8>, String> {
  let mut cmd = Command::new("exiftool");
  cmd.args(args);

  let output = cmd.output().map_err(|e| {
    format!(
      "ExifTool failed to run.\nArgs:\n{}\nError:\n{e}",
      cmd
        .get_args()
        .collect::<Vec<_>>()
        .join(OsStr::new(" "))
        .display(),
    )
  })?;

  if !output.status.success() {
    return Err(format!(
      "ExifTool did not run successfully.\nArgs:\n{}\nstderr:\n{}",
      cmd
        .get_args()
        .collect::<Vec<_>>()
        .join(OsStr::new(" "))
        .display(),
      String::from_utf8_lossy(&output.stderr)
    ));
  }

  Ok(output.stdout)
}

/// Parses `ExifTool`'s JSON read output into one entry per requested tag.
/// Group-qualified requests (`EXIF:DateTimeOriginal`) map back to the bare
/// key `ExifTool` emits.
fn parse_read_output(stdout: &[u8], tags: &[&str]) -> BTreeMap<String, String> {
  // `serde_json` doesn't handle the empty case.
  if stdout.is_empty() {
    return all_empty(tags);
  }

  let Ok(mut parsed) = serde_json::from_slice::<Vec<BTreeMap<String, Value>>>(stdout) else {
    log::debug!(
      "Failed to parse ExifTool output.\nstdout:\n{}",
      String::from_utf8_lossy(stdout)
    );
    return all_empty(tags);
  };

  if parsed.is_empty() {
    return all_empty(tags);
  }

  let values = parsed.remove(0);

  tags
    .iter()
    .map(|tag| {
      let value = values
        .get(bare_tag(tag))
        .map(value_to_string)
        .unwrap_or_default();
      ((*tag).to_string(), value)
    })
    .collect()
}

fn all_empty(tags: &[&str]) -> BTreeMap<String, String> {
  tags
    .iter()
    .map(|t| ((*t).to_string(), String::new()))
    .collect()
}

/// Strips the group prefix from a tag name (`EXIF:CreateDate` → `CreateDate`).
fn bare_tag(tag: &str) -> &str {
  tag.rsplit(':').next().unwrap_or(tag)
}

/// `ExifTool` emits some tags as JSON numbers; normalize everything to text.
fn value_to_string(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    v => v.to_string(),
  }
}
