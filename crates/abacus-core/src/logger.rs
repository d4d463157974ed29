//! Bounded execution log with on-demand statistics.
//!
//! The logger owns a fixed-capacity FIFO of [`ExecutionLogEntry`]. Readers
//! copy the buffer under the lock and compute outside it, so `record` is
//! never blocked behind a stats pass.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use abacus_types::log::{ExecutionLogEntry, LogStats};

pub const DEFAULT_LOG_CAPACITY: usize = 1000;
pub const DEFAULT_RECENT_LIMIT: usize = 50;

pub struct ExecutionLogger {
    entries: Mutex<VecDeque<ExecutionLogEntry>>,
    capacity: usize,
}

impl Default for ExecutionLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl ExecutionLogger {
    /// Create a logger holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ExecutionLogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append an entry, evicting the oldest when full.
    pub fn record(&self, entry: ExecutionLogEntry) {
        if entry.success {
            tracing::info!(
                skill_id = %entry.skill_id,
                duration_ms = entry.duration_ms,
                source = ?entry.source,
                "skill executed"
            );
        } else {
            tracing::warn!(
                skill_id = %entry.skill_id,
                duration_ms = entry.duration_ms,
                source = ?entry.source,
                kind = ?entry.error_kind,
                error = entry.error.as_deref().unwrap_or_default(),
                "skill execution failed"
            );
        }

        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The `n` most recent entries, most-recent-first.
    pub fn recent(&self, n: usize) -> Vec<ExecutionLogEntry> {
        self.lock().iter().rev().take(n).cloned().collect()
    }

    /// Aggregate statistics over the current buffer contents.
    pub fn stats(&self) -> LogStats {
        let snapshot: Vec<ExecutionLogEntry> = self.lock().iter().cloned().collect();
        compute_stats(&snapshot)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

fn compute_stats(entries: &[ExecutionLogEntry]) -> LogStats {
    let mut stats = LogStats::default();
    let mut total_duration: u64 = 0;

    for entry in entries {
        stats.total += 1;
        total_duration += entry.duration_ms;

        let per_skill = stats.by_skill.entry(entry.skill_id.clone()).or_default();
        per_skill.count += 1;
        per_skill.total_duration_ms += entry.duration_ms;

        if entry.success {
            stats.success += 1;
            per_skill.success_count += 1;
        } else {
            stats.failed += 1;
        }
    }

    if stats.total > 0 {
        stats.success_rate = stats.success as f64 / stats.total as f64 * 100.0;
        stats.avg_duration_ms = total_duration as f64 / stats.total as f64;
    }
    stats
}
