// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Bounded worker pool for per-file work items.
//!
//! `jobs == 0` sizes the pool to the logical CPU count; `jobs == 1` bypasses
//! the pool entirely and runs serially, which is the mandatory mode in the
//! test suite.

use rayon::prelude::*;

use crate::cancel::CancelFlag;

/// Runs `op` over every item, honoring `cancel` between items.
pub fn for_each<T: Sync>(jobs: usize, cancel: &CancelFlag, items: &[T], op: impl Fn(&T) + Sync) {
  map(jobs, cancel, items, |item| op(item));
}

/// Runs `op` over every item, returning results in item order. Items skipped
/// due to cancellation yield `None`.
pub fn map<T: Sync, R: Send>(
  jobs: usize,
  cancel: &CancelFlag,
  items: &[T],
  op: impl Fn(&T) -> R + Sync,
) -> Vec<Option<R>> {
  if jobs == 1 {
    return map_serial(cancel, items, op);
  }

  match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
    Ok(pool) => pool.install(|| {
      items
        .par_iter()
        .map(|item| {
          if cancel.is_cancelled() {
            return None;
          }
          Some(op(item))
        })
        .collect()
    }),
    Err(e) => {
      log::warn!("Failed to build worker pool ({e}); running serially.");
      map_serial(cancel, items, op)
    }
  }
}

fn map_serial<T, R>(cancel: &CancelFlag, items: &[T], op: impl Fn(&T) -> R) -> Vec<Option<R>> {
  items
    .iter()
    .map(|item| {
      if cancel.is_cancelled() {
        return None;
      }
      Some(op(item))
    })
    .collect()
}
