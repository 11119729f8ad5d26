// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! In-memory `MetadataTool` for tests. No test shells out to the real tool.

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  path::{Path, PathBuf},
  sync::Mutex,
  sync::atomic::{AtomicUsize, Ordering},
};

use crate::exiftool::MetadataTool;

/// Tag store standing in for the external tool. Unqualified read requests
/// resolve group-qualified stored tags by bare name, mirroring how the real
/// tool resolves an unqualified tag across groups.
#[derive(Default)]
pub struct FakeTool {
  tags: Mutex<HashMap<PathBuf, BTreeMap<String, String>>>,
  fail_all: Mutex<HashSet<PathBuf>>,
  fail_date_tags: Mutex<HashSet<PathBuf>>,
  write_count: AtomicUsize,
}

impl FakeTool {
  pub fn new() -> Self {
    Self::default()
  }

  /// Presets a tag, as if the file already carried it.
  pub fn set_tag(&self, file: &Path, tag: &str, value: &str) {
    self
      .tags
      .lock()
      .unwrap()
      .entry(file.to_path_buf())
      .or_default()
      .insert(tag.to_string(), value.to_string());
  }

  /// Direct store inspection, bypassing the read interface.
  pub fn tag(&self, file: &Path, tag: &str) -> Option<String> {
    self
      .tags
      .lock()
      .unwrap()
      .get(file)
      .and_then(|tags| tags.get(tag))
      .cloned()
  }

  /// Every write to `file` fails.
  pub fn fail_writes(&self, file: &Path) {
    self.fail_all.lock().unwrap().insert(file.to_path_buf());
  }

  /// Writes of embedded date tags to `file` fail; a lone `FileModifyDate`
  /// write still succeeds. Emulates a container that rejects embedded
  /// metadata but allows filesystem-date updates.
  pub fn fail_date_tag_writes(&self, file: &Path) {
    self
      .fail_date_tags
      .lock()
      .unwrap()
      .insert(file.to_path_buf());
  }

  /// Number of times `write_tags` was invoked, failed attempts included.
  pub fn write_count(&self) -> usize {
    self.write_count.load(Ordering::Relaxed)
  }
}

impl MetadataTool for FakeTool {
  fn read_tags(&self, file: &Path, tags: &[&str]) -> BTreeMap<String, String> {
    let store = self.tags.lock().unwrap();
    let file_tags = store.get(file);

    tags
      .iter()
      .map(|tag| {
        let value = file_tags.and_then(|m| lookup(m, tag)).unwrap_or_default();
        ((*tag).to_string(), value)
      })
      .collect()
  }

  fn write_tags(&self, file: &Path, tags: &[(String, String)]) -> Result<(), String> {
    self.write_count.fetch_add(1, Ordering::Relaxed);

    if self.fail_all.lock().unwrap().contains(file) {
      return Err(format!("{}: Simulated write failure.", file.display()));
    }

    let only_file_modify_date = tags.len() == 1 && tags[0].0 == "FileModifyDate";
    if self.fail_date_tags.lock().unwrap().contains(file) && !only_file_modify_date {
      return Err(format!("{}: Simulated write failure.", file.display()));
    }

    let mut store = self.tags.lock().unwrap();
    let file_tags = store.entry(file.to_path_buf()).or_default();
    for (tag, value) in tags {
      file_tags.insert(tag.clone(), value.clone());
    }

    Ok(())
  }
}

fn lookup(tags: &BTreeMap<String, String>, requested: &str) -> Option<String> {
  if let Some(value) = tags.get(requested) {
    return Some(value.clone());
  }

  // An unqualified request matches a stored tag in any group.
  if !requested.contains(':') {
    for (tag, value) in tags {
      if tag.rsplit(':').next() == Some(requested) {
        return Some(value.clone());
      }
    }
  }

  None
}

#[cfg(test)]
mod test_read_tags {
  use super::*;

  #[test]
  fn resolves_unqualified_requests_across_groups() {
    let tool = FakeTool::new();
    tool.set_tag(Path::new("clip.mp4"), "QuickTime:CreateDate", "2020:01:01 00:00:00");

    assert_eq!(
      tool.read_tag(Path::new("clip.mp4"), "CreateDate"),
      "2020:01:01 00:00:00"
    );
  }

  #[test]
  fn keeps_qualified_requests_group_strict() {
    let tool = FakeTool::new();
    tool.set_tag(Path::new("clip.mp4"), "QuickTime:CreateDate", "2020:01:01 00:00:00");

    assert_eq!(tool.read_tag(Path::new("clip.mp4"), "EXIF:CreateDate"), "");
  }

  #[test]
  fn returns_one_entry_per_requested_tag() {
    let tool = FakeTool::new();

    let values = tool.read_tags(Path::new("pic.jpg"), &["DateTimeOriginal", "CreateDate"]);

    assert_eq!(values.len(), 2);
    assert!(values.values().all(String::is_empty));
  }
}

#[cfg(test)]
mod test_write_tags {
  use super::*;

  #[test]
  fn records_writes() {
    let tool = FakeTool::new();

    tool
      .write_tags(Path::new("pic.jpg"), &[(
        "EXIF:DateTimeOriginal".to_string(),
        "2020:01:01 00:00:00".to_string(),
      )])
      .unwrap();

    assert_eq!(tool.write_count(), 1);
    assert_eq!(
      tool.tag(Path::new("pic.jpg"), "EXIF:DateTimeOriginal"),
      Some("2020:01:01 00:00:00".to_string())
    );
  }

  #[test]
  fn simulates_failures() {
    let tool = FakeTool::new();
    tool.fail_writes(Path::new("pic.jpg"));

    let result = tool.write_tags(Path::new("pic.jpg"), &[(
      "EXIF:DateTimeOriginal".to_string(),
      "2020:01:01 00:00:00".to_string(),
    )]);

    assert!(result.is_err());
    assert_eq!(tool.tag(Path::new("pic.jpg"), "EXIF:DateTimeOriginal"), None);
  }
}
