//! Scheduled retention sweeps.
//!
//! Runs the cleaner on a fixed interval from a dedicated tokio task.
//! A compare-and-swap guard keeps concurrent invocations (scheduler
//! tick overlapping a manual run) from sweeping twice at once —
//! overlapping sweeps are wasteful, not unsafe, so the guard is
//! best-effort only.

use crate::cleaner::Cleaner;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct RetentionTask {
    cleaner: Arc<Cleaner>,
    interval: Duration,
    running: AtomicBool,
}

impl RetentionTask {
    pub fn new(cleaner: Arc<Cleaner>, interval: Duration) -> Self {
        Self {
            cleaner,
            interval,
            running: AtomicBool::new(false),
        }
    }

    /// Run one sweep now. Returns the number of rows deleted, or 0 when
    /// another sweep is already in flight.
    pub async fn run_once(&self) -> u64 {
        if self
            .running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("Retention sweep already running, skipping this tick");
            return 0;
        }

        let count = self.cleaner.clean_old_logs().await;
        if count > 0 {
            info!(deleted = count, "Retention sweep finished");
        }

        self.running.store(false, Ordering::Release);
        count
    }

    /// Spawn the scheduler loop. The task runs until its handle is
    /// aborted or the runtime shuts down; a failed sweep only logs and
    /// waits for the next tick.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so the sweep
            // starts one full interval after startup.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::LogEntryStore;
    use apitap_core::config::CaptureConfig;
    use apitap_core::entry::LogEntry;
    use arc_swap::ArcSwap;
    use chrono::Utc;

    fn task_over(store: MemoryStore) -> RetentionTask {
        let config = Arc::new(ArcSwap::from_pointee(CaptureConfig::default()));
        let cleaner = Arc::new(Cleaner::new(config, Arc::new(store)));
        RetentionTask::new(cleaner, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn run_once_sweeps_expired_entries() {
        let store = MemoryStore::new();
        let mut old = LogEntry::new("/old", "GET");
        old.created_at = Utc::now() - chrono::Duration::days(90);
        store.save(old).await.unwrap();

        let task = task_over(store.clone());
        assert_eq!(task.run_once().await, 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn run_once_is_zero_when_nothing_expired() {
        let task = task_over(MemoryStore::new());
        assert_eq!(task.run_once().await, 0);
    }

    #[tokio::test]
    async fn guard_clears_after_each_run() {
        let task = task_over(MemoryStore::new());
        // Consecutive runs must both get through the guard.
        assert_eq!(task.run_once().await, 0);
        assert_eq!(task.run_once().await, 0);
    }

    #[tokio::test]
    async fn spawned_task_can_be_aborted() {
        let task = Arc::new(task_over(MemoryStore::new()));
        let handle = task.spawn();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
