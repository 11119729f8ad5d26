// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Deterministic traversal of source trees.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Returns every file under `root` in a stable pre-order walk, sorted
/// lexicographically per directory, optionally skipping the subtree at
/// `exclude`. Collision tie-breaking in the move run depends on this order.
pub fn files(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, String> {
  let mut files = Vec::new();

  for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      // An unreadable root is fatal; anything deeper is a per-file problem.
      Err(e) if e.depth() == 0 => {
        return Err(format!(
          "{}: Failed to read source tree ({e}).",
          root.display()
        ));
      }
      Err(e) => {
        log::debug!("Skipping unreadable entry ({e}).");
        continue;
      }
    };

    if exclude.is_some_and(|x| entry.path().starts_with(x)) {
      continue;
    }

    if entry.file_type().is_file() {
      files.push(entry.path().to_path_buf());
    }
  }

  Ok(files)
}
