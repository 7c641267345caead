//! Progress bar for the upload phase

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::Outcome;

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )))
}

/// Advance the bar by `n`. Only the outcome collector calls this, so the lock is uncontended.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.update(n);
    }
}

/// Outcome hook for [`Pipeline::on_outcome`](crate::pipeline::Pipeline::on_outcome): one tick per finished file.
pub fn outcome_progress(bar: &ProgressBar) -> impl Fn(&Outcome) + Send + Sync + 'static {
    let bar = Arc::clone(bar);
    move |_outcome: &Outcome| update_progress_bar(&bar, 1)
}
