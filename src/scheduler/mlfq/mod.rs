//! Multi-level feedback queue policy.
//!
//! Jobs start at level 0. Using up a whole quantum demotes a job one
//! level; blocking for I/O before the quantum runs out promotes it one
//! level. Both moves are refused for a job that is still listed in the
//! shared [`TransitionHistory`], so a job cannot dodge demotion by
//! issuing a tiny I/O burst right before every quantum ends.

pub mod history;

use super::{Dispatch, SchedPolicy, SchedReport, queue_set::QueueSet, stats::StatsCollector};
use crate::core::{
    JobId, JobState, JobTable, PolicyError, PolicyResult, Ticks, observer::check_membership,
};
pub use history::{TRANSITION_HISTORY_LEN, TransitionHistory};

#[derive(Debug)]
pub struct MlfqPolicy {
    queues: QueueSet,
    jobs: JobTable,
    stats: StatsCollector,
    history: TransitionHistory,
    guarded: bool,
    current: Option<JobId>,
}

impl MlfqPolicy {
    /// Guarded MLFQ with one level per quantum, level 0 first.
    pub fn new(quanta: &[Ticks]) -> PolicyResult<Self> {
        let queues = QueueSet::new(quanta)?;
        Ok(Self {
            stats: StatsCollector::new(queues.num_levels()),
            queues,
            jobs: JobTable::new(),
            history: TransitionHistory::new(),
            guarded: true,
            current: None,
        })
    }

    /// Textbook MLFQ: every quantum expiry demotes and every early block
    /// promotes, with no transition history.
    pub fn unguarded(quanta: &[Ticks]) -> PolicyResult<Self> {
        let mut policy = Self::new(quanta)?;
        policy.guarded = false;
        Ok(policy)
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn queues(&self) -> &QueueSet {
        &self.queues
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn current(&self) -> Option<JobId> {
        self.current
    }

    fn may_transition(&self, job: JobId) -> bool {
        !self.guarded || !self.history.contains(job)
    }

    fn leave_cpu(&mut self, job: JobId) {
        if self.current == Some(job) {
            self.current = None;
        }
    }

    fn observe(&self) -> PolicyResult<()> {
        if !cfg!(debug_assertions) {
            return Ok(());
        }
        check_membership(&self.queues, &self.jobs)?;
        if let Some(job) = self.current {
            let state = self.jobs.get(job)?.state;
            if state != JobState::Running {
                return Err(PolicyError::InvariantViolation(format!(
                    "current job {job} is {state:?}"
                )));
            }
        }
        Ok(())
    }
}

impl SchedPolicy for MlfqPolicy {
    fn name(&self) -> &'static str {
        if self.guarded { "mlfq" } else { "mlfq-unguarded" }
    }

    fn job_created(&mut self, job: JobId) -> PolicyResult<()> {
        let record = self.jobs.create(job)?;
        self.queues.push_back(record.level, job);
        self.observe()
    }

    fn job_ready(&mut self, job: JobId) -> PolicyResult<()> {
        let record = self.jobs.transition(job, JobState::Ready)?;
        record.quantum_expired = false;

        self.stats.sample(&self.queues);
        self.queues.push_back(record.level, job);
        self.observe()
    }

    fn job_quantum_expired(&mut self, job: JobId) -> PolicyResult<()> {
        let lowest = self.queues.lowest_level();
        let may_transition = self.may_transition(job);
        let record = self.jobs.transition(job, JobState::Ready)?;

        self.stats.sample(&self.queues);
        if record.level < lowest && may_transition {
            record.level += 1;
            record.switch_count += 1;
            log::debug!("job {job} demoted to level {}", record.level);
            if self.guarded {
                self.history.record(job);
            }
        }
        record.quantum_expired = true;
        self.queues.push_back(record.level, job);

        self.leave_cpu(job);
        self.observe()
    }

    fn job_preempted(&mut self, job: JobId) -> PolicyResult<()> {
        let level = self.jobs.transition(job, JobState::Ready)?.level;

        self.stats.sample(&self.queues);
        self.queues.push_front(level, job);

        self.leave_cpu(job);
        self.observe()
    }

    fn job_blocked(&mut self, job: JobId) -> PolicyResult<()> {
        let may_transition = self.may_transition(job);
        let record = self.jobs.transition(job, JobState::Blocked)?;

        if !record.quantum_expired && record.level > 0 && may_transition {
            record.level -= 1;
            record.switch_count += 1;
            log::debug!("job {job} promoted to level {}", record.level);
            if self.guarded {
                self.history.record(job);
            }
        }

        self.leave_cpu(job);
        self.observe()
    }

    fn job_terminated(&mut self, job: JobId) -> PolicyResult<()> {
        self.jobs.transition(job, JobState::Terminated)?;
        self.leave_cpu(job);
        self.observe()
    }

    fn needs_resched(&self) -> PolicyResult<bool> {
        let Some(job) = self.current else {
            return Ok(false);
        };
        let level = self.jobs.get(job)?.level;
        Ok(self.queues.any_non_empty_above(level))
    }

    fn next_job_and_quantum(&mut self) -> PolicyResult<Dispatch> {
        if let Some(running) = self.current {
            return Err(PolicyError::InvariantViolation(format!(
                "dispatch requested while job {running} is still running"
            )));
        }

        let Some((level, job)) = self.queues.pop_front() else {
            return Ok(Dispatch::IDLE);
        };
        self.jobs.transition(job, JobState::Running)?;
        self.current = Some(job);

        let quantum = self.queues.quantum(level);
        log::debug!("dispatch job {job} from level {level} for {quantum} ticks");
        self.observe()?;
        Ok(Dispatch {
            job: Some(job),
            quantum,
        })
    }

    fn report(&self) -> SchedReport {
        self.stats.report(&self.jobs)
    }
}
