use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;

use super::job::{Job, JobInstance};
use crate::{
    core::{JobId, PolicyError, PolicyResult, SimEvent, Ticks},
    scheduler::SchedPolicy,
};

// KeyedPriorityQueue is a max-heap, so flip the ordering to pop the
// earliest wake-up first (ties broken by job id)
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
struct WakeTime(Ticks, JobId);

impl PartialOrd for WakeTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WakeTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.0, other.1).cmp(&(self.0, self.1))
    }
}

enum BurstOutcome {
    Continue,
    Finished,
    Io(Ticks),
}

#[derive(Debug, Clone, Copy)]
struct Running {
    job: JobId,
    slice_left: Ticks,
}

/// Single-CPU, tick-driven simulator that feeds lifecycle events to a
/// scheduling policy.
pub struct Sim<P: SchedPolicy> {
    pub policy: P,
    pub jobs: Vec<JobInstance>,
    now: Ticks,
    job_cursor: usize,
    // JobId --> jobs[index]
    index: FxHashMap<JobId, usize>,
    io_wait: KeyedPriorityQueue<JobId, WakeTime>,
    running: Option<Running>,
}

impl<P: SchedPolicy> Sim<P> {
    pub fn new(policy: P, mut jobs: Vec<Job>) -> Self {
        jobs.sort_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        let jobs: Vec<_> = jobs.into_iter().map(JobInstance::new).collect();
        let index = jobs
            .iter()
            .enumerate()
            .map(|(i, instance)| (instance.job.id, i))
            .collect();

        Self {
            policy,
            jobs,
            now: 0,
            job_cursor: 0,
            index,
            io_wait: KeyedPriorityQueue::new(),
            running: None,
        }
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn running(&self) -> Option<JobId> {
        self.running.map(|r| r.job)
    }

    /// Advance the simulation by one tick, returning the events it produced.
    pub fn step(&mut self) -> PolicyResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        let arrived = self.handle_arrivals(&mut events)?;
        let woke = self.handle_io_completions(&mut events)?;
        if (arrived || woke) && self.running.is_some() && self.policy.needs_resched()? {
            if let Some(running) = self.running.take() {
                self.policy.job_preempted(running.job)?;
                events.push(SimEvent::Preempted { job: running.job });
            }
        }

        if self.running.is_none() {
            self.try_dispatch(&mut events)?;
        }
        self.tick_cpu(&mut events)?;

        self.now = self.now.saturating_add(1);
        Ok(events)
    }

    /// Step until every job has terminated.
    pub fn run(&mut self) -> PolicyResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        while !self.all_jobs_completed() {
            events.extend(self.step()?);
        }
        Ok(events)
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SimEvent>) -> PolicyResult<bool> {
        let mut arrived = false;
        // Contiguous, since jobs are sorted by arrival time
        while let Some(instance) = self.jobs.get(self.job_cursor) {
            if instance.job.arrival_time > self.now {
                break;
            }
            let job = instance.job.id;
            self.policy.job_created(job)?;
            events.push(SimEvent::Created { job });
            self.job_cursor += 1;
            arrived = true;
        }
        Ok(arrived)
    }

    fn handle_io_completions(&mut self, events: &mut Vec<SimEvent>) -> PolicyResult<bool> {
        let mut woke = false;
        while let Some((_, &WakeTime(at, _))) = self.io_wait.peek() {
            if at > self.now {
                break;
            }
            let Some((job, _)) = self.io_wait.pop() else {
                break;
            };
            let instance = self.instance_mut(job)?;
            instance.burst += 1;
            instance.remaining = instance.job.cpu_bursts[instance.burst];

            self.policy.job_ready(job)?;
            events.push(SimEvent::Ready { job });
            woke = true;
        }
        Ok(woke)
    }

    fn try_dispatch(&mut self, events: &mut Vec<SimEvent>) -> PolicyResult<()> {
        let dispatch = self.policy.next_job_and_quantum()?;
        let Some(job) = dispatch.job else {
            if !self.all_jobs_completed() {
                events.push(SimEvent::Idle);
            }
            return Ok(());
        };

        let now = self.now;
        self.instance_mut(job)?.start_time.get_or_insert(now);
        self.running = Some(Running {
            job,
            slice_left: dispatch.quantum,
        });
        events.push(SimEvent::Dispatched {
            job,
            quantum: dispatch.quantum,
        });
        Ok(())
    }

    fn tick_cpu(&mut self, events: &mut Vec<SimEvent>) -> PolicyResult<()> {
        let Some(mut running) = self.running.take() else {
            return Ok(());
        };
        let job = running.job;
        let end = self.now.saturating_add(1);
        running.slice_left = running.slice_left.saturating_sub(1);

        let instance = self.instance_mut(job)?;
        instance.remaining = instance.remaining.saturating_sub(1);
        let outcome = if instance.remaining > 0 {
            BurstOutcome::Continue
        } else if instance.on_last_burst() {
            instance.completion_time = Some(end);
            BurstOutcome::Finished
        } else {
            BurstOutcome::Io(instance.job.io_bursts[instance.burst])
        };

        // A burst that ends on the last tick of its slice counts as blocking
        match outcome {
            BurstOutcome::Finished => {
                self.policy.job_terminated(job)?;
                events.push(SimEvent::Terminated { job });
            }
            BurstOutcome::Io(io) => {
                let until = end.saturating_add(io);
                self.io_wait.push(job, WakeTime(until, job));
                self.policy.job_blocked(job)?;
                events.push(SimEvent::Blocked { job, until });
            }
            BurstOutcome::Continue if running.slice_left == 0 => {
                self.policy.job_quantum_expired(job)?;
                events.push(SimEvent::QuantumExpired { job });
            }
            BurstOutcome::Continue => self.running = Some(running),
        }
        Ok(())
    }

    fn instance_mut(&mut self, job: JobId) -> PolicyResult<&mut JobInstance> {
        let index = *self.index.get(&job).ok_or(PolicyError::UnknownJob(job))?;
        Ok(&mut self.jobs[index])
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.jobs.iter().all(|job| job.completion_time.is_some())
    }

    pub fn jobs_map<'a, T>(
        &'a self,
        f: impl Fn(&JobInstance) -> T + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        self.jobs.iter().map(f)
    }
}
