//! Tracking and reaping of background processes.

use crate::command::ExitCode;
use crate::external::exit_code;
use std::process::Child;

/// Upper bound on concurrently tracked background jobs.
pub const MAX_JOBS: usize = 1024;

/// Identifier of a tracked job: the slot it occupies in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobId(usize);

#[derive(Debug)]
struct JobRecord {
    child: Child,
    label: String,
}

/// A background job whose termination has been confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedJob {
    pub pid: u32,
    pub label: String,
    pub exit_code: ExitCode,
}

/// Bounded table of outstanding background process handles.
///
/// Slots are owned exclusively by the single control thread: `register` fills
/// the first free slot, and a slot is freed and becomes reusable only after
/// [`JobTable::poll_finished`] confirms the process terminated. A live
/// process is never represented twice, and a terminated one is never reported
/// twice.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<JobRecord>>,
    capacity: usize,
}

impl JobTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_JOBS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Record a running background process under a display label.
    ///
    /// On success returns the slot the job occupies. When every slot is
    /// taken the child is handed back so the caller can report the job as
    /// untracked and carry on; the process itself keeps running.
    pub fn register(&mut self, child: Child, label: impl Into<String>) -> Result<JobId, Child> {
        let record = JobRecord {
            child,
            label: label.into(),
        };
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(record);
            return Ok(JobId(index));
        }
        if self.slots.len() < self.capacity {
            self.slots.push(Some(record));
            return Ok(JobId(self.slots.len() - 1));
        }
        Err(record.child)
    }

    /// Reap every tracked job that has terminated since the last poll.
    ///
    /// Non-blocking: still-running jobs are left untouched. Results come in
    /// slot (registration) order, not termination order. A wait error leaves
    /// the handle unusable, so the slot is freed and reported with exit
    /// code -1.
    pub fn poll_finished(&mut self) -> Vec<FinishedJob> {
        let mut finished = Vec::new();
        for slot in &mut self.slots {
            let Some(record) = slot else { continue };
            let code = match record.child.try_wait() {
                Ok(Some(status)) => exit_code(status),
                Ok(None) => continue,
                Err(_) => -1,
            };
            if let Some(record) = slot.take() {
                finished.push(FinishedJob {
                    pid: record.child.id(),
                    label: record.label,
                    exit_code: code,
                });
            }
        }
        finished
    }

    /// Number of jobs currently tracked.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}
