//! Deadline timer that never fires on its own.
//!
//! Tests arm it through the controller, inspect what was armed and whether
//! it was cancelled, and deliver fires by hand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::TrialId;
use crate::ports::DeadlineTimer;

#[derive(Debug, Clone)]
pub struct ArmedDeadline {
    pub trial: TrialId,
    pub after: Duration,
    cancelled: Arc<AtomicBool>,
}

impl ArmedDeadline {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ManualGuard(Arc<AtomicBool>);

impl Drop for ManualGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Cloning shares the record of armed deadlines.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    armed: Arc<Mutex<Vec<ArmedDeadline>>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> Vec<ArmedDeadline> {
        self.armed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Deadlines armed and not yet cancelled.
    pub fn outstanding(&self) -> Vec<TrialId> {
        self.armed()
            .into_iter()
            .filter(|d| !d.is_cancelled())
            .map(|d| d.trial)
            .collect()
    }

    pub fn last_trial(&self) -> Option<TrialId> {
        self.armed().last().map(|d| d.trial)
    }
}

impl DeadlineTimer for ManualTimer {
    type Guard = ManualGuard;

    fn arm(&mut self, trial: TrialId, after: Duration) -> ManualGuard {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ArmedDeadline {
                trial,
                after,
                cancelled: Arc::clone(&cancelled),
            });
        ManualGuard(cancelled)
    }
}
