use super::{Dispatch, SchedPolicy, SchedReport, queue_set::QueueSet, stats::StatsCollector};
use crate::core::{JobId, JobState, JobTable, PolicyResult, Ticks, observer::check_membership};

/// Single-level round robin; jobs never change level.
#[derive(Debug)]
pub struct RoundRobinPolicy {
    queue: QueueSet,
    jobs: JobTable,
    stats: StatsCollector,
    current: Option<JobId>,
}

impl RoundRobinPolicy {
    pub fn new(quantum: Ticks) -> PolicyResult<Self> {
        Ok(Self {
            queue: QueueSet::new(&[quantum])?,
            jobs: JobTable::new(),
            stats: StatsCollector::new(1),
            current: None,
        })
    }

    pub fn current(&self) -> Option<JobId> {
        self.current
    }

    fn leave_cpu(&mut self, job: JobId) -> PolicyResult<()> {
        if self.current == Some(job) {
            self.current = None;
        }
        if cfg!(debug_assertions) {
            check_membership(&self.queue, &self.jobs)?;
        }
        Ok(())
    }

    fn requeue(&mut self, job: JobId) -> PolicyResult<()> {
        self.jobs.transition(job, JobState::Ready)?;
        self.stats.sample(&self.queue);
        self.queue.push_back(0, job);
        self.leave_cpu(job)
    }
}

impl SchedPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "rr"
    }

    fn job_created(&mut self, job: JobId) -> PolicyResult<()> {
        self.jobs.create(job)?;
        self.queue.push_back(0, job);
        Ok(())
    }

    fn job_ready(&mut self, job: JobId) -> PolicyResult<()> {
        self.requeue(job)
    }

    fn job_quantum_expired(&mut self, job: JobId) -> PolicyResult<()> {
        self.requeue(job)
    }

    fn job_preempted(&mut self, job: JobId) -> PolicyResult<()> {
        self.jobs.transition(job, JobState::Ready)?;
        self.stats.sample(&self.queue);
        self.queue.push_front(0, job);
        self.leave_cpu(job)
    }

    fn job_blocked(&mut self, job: JobId) -> PolicyResult<()> {
        self.jobs.transition(job, JobState::Blocked)?;
        self.leave_cpu(job)
    }

    fn job_terminated(&mut self, job: JobId) -> PolicyResult<()> {
        self.jobs.transition(job, JobState::Terminated)?;
        self.leave_cpu(job)
    }

    // One level, so nothing can ever outrank the running job
    fn needs_resched(&self) -> PolicyResult<bool> {
        Ok(false)
    }

    fn next_job_and_quantum(&mut self) -> PolicyResult<Dispatch> {
        let Some((level, job)) = self.queue.pop_front() else {
            self.current = None;
            return Ok(Dispatch::IDLE);
        };
        self.jobs.transition(job, JobState::Running)?;
        self.current = Some(job);
        Ok(Dispatch {
            job: Some(job),
            quantum: self.queue.quantum(level),
        })
    }

    fn report(&self) -> SchedReport {
        self.stats.report(&self.jobs)
    }
}
