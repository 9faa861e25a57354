use heapless::Deque;

use crate::core::JobId;

pub const TRANSITION_HISTORY_LEN: usize = 3;

/// Ids of the jobs behind the most recent level transitions, newest first.
///
/// One history is shared by every job: a job listed here may not change
/// level again until enough other transitions push it out.
#[derive(Debug, Default)]
pub struct TransitionHistory {
    recent: Deque<JobId, TRANSITION_HISTORY_LEN>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, job: JobId) -> bool {
        self.recent.iter().any(|&id| id == job)
    }

    pub fn record(&mut self, job: JobId) {
        if self.recent.is_full() {
            self.recent.pop_back();
        }
        // Cannot fail, a slot was just freed
        let _ = self.recent.push_front(job);
    }

    pub fn iter(&self) -> impl Iterator<Item = JobId> + '_ {
        self.recent.iter().copied()
    }
}
