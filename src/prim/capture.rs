// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Resolved capture instants and their provenance.

use chrono::{NaiveDateTime, TimeZone};

/// Format used when writing date & time tags. EXIF convention: local civil
/// time, no offset.
pub const TAG_VALUE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Where a resolved date came from. Reported in summaries, but does not
/// change the value written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provenance {
  SidecarPrimary,
  SidecarSupplemental,
  FolderName,
}

impl Provenance {
  pub fn counter_name(self) -> &'static str {
    match self {
      Self::SidecarPrimary => "sidecar-primary",
      Self::SidecarSupplemental => "sidecar-supplemental",
      Self::FolderName => "folder-name",
    }
  }
}

/// A capture instant in local civil time, tagged with its source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedDate {
  pub date_time:  NaiveDateTime,
  pub provenance: Provenance,
}

impl ResolvedDate {
  /// Converts decimal seconds since the Unix epoch to the host's civil time.
  /// Seconds outside the representable range return `None`.
  pub fn from_epoch_seconds(seconds: i64, provenance: Provenance) -> Option<Self> {
    let date_time = chrono::Local
      .timestamp_opt(seconds, 0)
      .single()?
      .naive_local();

    Some(Self {
      date_time,
      provenance,
    })
  }

  /// Renders the instant as written into date & time tags.
  pub fn tag_value(&self) -> String {
    self.date_time.format(TAG_VALUE_FORMAT).to_string()
  }
}
