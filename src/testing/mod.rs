// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Test-only utilities.

mod asserts;
mod fake_tool;
mod test_dir;

pub use fake_tool::*;
pub use test_dir::*;

pub use crate::{assert_dir, assert_err, test_dir, test_path};
use crate::prim::{Provenance, ResolvedDate};

/// The tag value the fill run writes for an epoch timestamp, rendered in the
/// host's time zone (tests must pass regardless of where they run).
pub fn local_tag_value(seconds: i64) -> String {
  ResolvedDate::from_epoch_seconds(seconds, Provenance::SidecarPrimary)
    .unwrap()
    .tag_value()
}

pub fn type_of<T>(_: T) -> &'static str {
  std::any::type_name::<T>()
}
