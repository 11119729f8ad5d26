// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Media container classification.
//!
//! The extension-to-class mapping is authoritative, except that Takeout
//! sometimes exports a JPEG with a `.png` extension (and vice versa); for that
//! pair the byte signature decides.

use std::{fs::File, io::Read, path::Path};

/// Format family of a media file. Determines which tag set is authoritative.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerClass {
  Jpeg,
  Heic,
  Png,
  Tiff,
  /// MP4, MOV & 3GP share the QuickTime tag set.
  Video,
  Avi,
  Other,
}

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Extensions eligible for `move-with-exif`.
const MOVABLE_EXTENSIONS: [&str; 10] = [
  "jpeg", "jpg", "tiff", "tif", "png", "heic", "mp4", "mov", "3gp", "avi",
];

/// Extensions processed by `set-exif-from-metadata`: the movable set plus
/// common Takeout strays, which get best-effort EXIF writes.
const FILL_EXTENSIONS: [&str; 14] = [
  "jpeg", "jpg", "tiff", "tif", "png", "heic", "mp4", "mov", "3gp", "avi", "gif", "webp", "bmp",
  "m4v",
];

impl ContainerClass {
  /// Classifies `path` by extension, then corrects a mislabeled PNG ↔ JPEG
  /// pair by byte signature.
  pub fn of(path: &Path) -> Self {
    let by_extension = Self::from_extension(path);

    if !matches!(by_extension, Self::Jpeg | Self::Png) {
      return by_extension;
    }

    match sniff(path) {
      Some(by_signature) if by_signature != by_extension => {
        log::debug!(
          "{}: Extension says {by_extension:?}, signature says {by_signature:?}.",
          path.display()
        );
        by_signature
      }
      _ => by_extension,
    }
  }

  fn from_extension(path: &Path) -> Self {
    match extension_lowercase(path).as_deref() {
      Some("jpg" | "jpeg") => Self::Jpeg,
      Some("heic") => Self::Heic,
      Some("png") => Self::Png,
      Some("tif" | "tiff") => Self::Tiff,
      Some("mp4" | "mov" | "3gp") => Self::Video,
      Some("avi") => Self::Avi,
      _ => Self::Other,
    }
  }
}

/// Whether `path` is a candidate for the move run.
pub fn is_movable(path: &Path) -> bool {
  extension_lowercase(path).is_some_and(|e| MOVABLE_EXTENSIONS.contains(&e.as_str()))
}

/// Whether `path` is a candidate for the fill run.
pub fn is_fill_candidate(path: &Path) -> bool {
  extension_lowercase(path).is_some_and(|e| FILL_EXTENSIONS.contains(&e.as_str()))
}

fn extension_lowercase(path: &Path) -> Option<String> {
  path
    .extension()
    .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Reads the first bytes of `path` and identifies a JPEG or PNG signature.
/// Unreadable files and other signatures return `None`.
fn sniff(path: &Path) -> Option<ContainerClass> {
  let mut header = [0_u8; 8];
  File::open(path).ok()?.read_exact(&mut header).ok()?;

  if header == PNG_MAGIC {
    Some(ContainerClass::Png)
  } else if header[..3] == JPEG_MAGIC {
    Some(ContainerClass::Jpeg)
  } else {
    None
  }
}
