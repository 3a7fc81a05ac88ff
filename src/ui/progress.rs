//! Progress indicators for long-running operations
//!
//! Uses `linya`, whose bars can be advanced from several worker threads at once.

use linya::{Bar, Progress};
use std::sync::Mutex;

/// Progress bar counting finished packages, shareable across worker threads
pub struct PackageProgress {
  progress: Option<Mutex<Progress>>,
  bar: Option<Bar>,
}

impl PackageProgress {
  /// Create a bar for `total` packages
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      progress: Some(Mutex::new(progress)),
      bar: Some(bar),
    }
  }

  /// A bar that never draws
  pub fn hidden() -> Self {
    Self {
      progress: None,
      bar: None,
    }
  }

  /// Mark one package done (thread-safe)
  pub fn inc(&self) {
    let (Some(progress), Some(bar)) = (&self.progress, &self.bar) else {
      return;
    };
    // A poisoned lock only means another worker panicked mid-draw
    let mut progress = match progress.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    progress.inc_and_draw(bar, 1);
  }
}
