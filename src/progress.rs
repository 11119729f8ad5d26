// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Shared progress reporting: one live line during scans, and a summary of
//! counters at completion.
//!
//! Takeout exports routinely hold 10⁵ files; per-file output is kept at debug
//! level so a run prints a bounded number of lines.

use std::{
  collections::BTreeMap,
  sync::Mutex,
};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Redraws per second for the live line.
const REFRESH_RATE_HZ: u8 = 5;

/// Thread-safe outcome counters plus a single throttled progress line.
pub struct Progress {
  bar:      ProgressBar,
  counters: Mutex<BTreeMap<&'static str, u64>>,
}

impl Progress {
  pub fn new(total: u64) -> Self {
    let bar =
      ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr_with_hz(REFRESH_RATE_HZ));
    bar.set_style(
      ProgressStyle::with_template("{pos}/{len} ({per_sec}, {elapsed})").unwrap(),
    );

    Self {
      bar,
      counters: Mutex::new(BTreeMap::new()),
    }
  }

  /// Advances the scan position by one file.
  pub fn tick(&self) {
    self.bar.inc(1);
  }

  /// Increments the counter for `outcome`.
  pub fn count(&self, outcome: &'static str) {
    *self.counters.lock().unwrap().entry(outcome).or_insert(0) += 1;
  }

  pub fn get(&self, outcome: &str) -> u64 {
    self
      .counters
      .lock()
      .unwrap()
      .get(outcome)
      .copied()
      .unwrap_or(0)
  }

  /// Clears the live line. Call once, after the last worker finishes.
  pub fn finish(&self) {
    self.bar.finish_and_clear();
  }

  /// Renders the summary block listing every non-zero counter.
  pub fn render_summary(&self) -> String {
    let counters = self.counters.lock().unwrap();

    let width = counters
      .iter()
      .filter(|(_, count)| **count > 0)
      .map(|(name, _)| name.len())
      .max()
      .unwrap_or(0);

    let mut lines = vec!["Summary:".to_string()];
    lines.extend(
      counters
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(name, count)| format!("  {name:<width$}  {count}")),
    );

    lines.join("\n")
  }

  pub fn print_summary(&self) {
    println!("{}", self.render_summary());
  }
}
