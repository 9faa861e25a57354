use rustc_hash::FxHashMap;

use super::{JobId, Level, PolicyError, PolicyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Ready,
    Running,
    Blocked,
    Terminated,
}

impl JobState {
    fn can_become(self, to: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, to),
            (Ready, Running)
                | (Running, Ready)
                | (Running, Blocked)
                | (Running, Terminated)
                | (Blocked, Ready)
        )
    }
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: JobId,
    pub state: JobState,
    pub level: Level,
    // Set when the last CPU burst ran to the end of its quantum
    pub quantum_expired: bool,
    pub switch_count: u64,
}

/// Per-job bookkeeping shared by every policy.
///
/// Records are never removed: a terminated job stays in the table so its
/// switch count can still be reported, but every lookup that expects a
/// live job treats it as unknown.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: FxHashMap<JobId, JobRecord>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created job at level 0 in the `Ready` state.
    pub fn create(&mut self, id: JobId) -> PolicyResult<&mut JobRecord> {
        if self.jobs.contains_key(&id) {
            return Err(PolicyError::DuplicateJob(id));
        }

        Ok(self.jobs.entry(id).or_insert(JobRecord {
            id,
            state: JobState::Ready,
            level: 0,
            quantum_expired: false,
            switch_count: 0,
        }))
    }

    pub fn get(&self, id: JobId) -> PolicyResult<&JobRecord> {
        self.jobs.get(&id).ok_or(PolicyError::UnknownJob(id))
    }

    /// Move a live job to `to`, rejecting transitions the lifecycle forbids.
    pub fn transition(&mut self, id: JobId, to: JobState) -> PolicyResult<&mut JobRecord> {
        let job = match self.jobs.get_mut(&id) {
            Some(job) if job.state != JobState::Terminated => job,
            _ => return Err(PolicyError::UnknownJob(id)),
        };

        if !job.state.can_become(to) {
            return Err(PolicyError::InvalidTransition {
                job: id,
                from: job.state,
                to,
            });
        }

        job.state = to;
        Ok(job)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.values()
    }

    /// All records ordered by job id, terminated ones included.
    pub fn sorted(&self) -> Vec<&JobRecord> {
        let mut jobs: Vec<_> = self.jobs.values().collect();
        jobs.sort_by_key(|job| job.id);
        jobs
    }
}
