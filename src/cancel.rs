// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Interrupt handling.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

/// Shared cancellation flag. Once set, workers stop taking new items;
/// in-flight items drain to a clean stop.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation.
  pub fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }

  /// Routes ctrl-C to this flag. A process can only hold one handler; later
  /// installs keep the first and are logged.
  pub fn install_handler(&self) {
    let flag = self.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.cancel()) {
      log::debug!("Interrupt handler not installed ({e}).");
    }
  }
}
