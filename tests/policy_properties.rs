use mlfq_model::{
    Dispatch, Job, JobId, MlfqPolicy, PolicyResult, SchedPolicy, SchedReport, Sim, Workload,
    core::JobState,
    scheduler::{DEFAULT_QUANTA, mlfq::TRANSITION_HISTORY_LEN},
    sim::bernoulli_jobs,
};
use rustc_hash::FxHashMap;

/// Wraps an MLFQ policy and checks its invariants around every callback.
struct Checked {
    inner: MlfqPolicy,
    guarded: bool,
    switches: FxHashMap<JobId, u64>,
    // Every level transition in order
    transitions: Vec<JobId>,
}

impl Checked {
    fn new(inner: MlfqPolicy) -> Self {
        let guarded = inner.name() == "mlfq";
        Self {
            inner,
            guarded,
            switches: FxHashMap::default(),
            transitions: Vec::new(),
        }
    }

    fn level(&self, job: JobId) -> usize {
        self.inner.jobs().get(job).unwrap().level
    }

    fn highest_ready_level(&self) -> Option<usize> {
        self.inner.queues().levels().iter().position(|q| !q.is_empty())
    }

    fn after_callback(&mut self, job: JobId, may_switch: bool) {
        let record = self.inner.jobs().get(job).unwrap();
        assert!(record.level < DEFAULT_QUANTA.len());

        let before = self.switches.insert(job, record.switch_count).unwrap_or(0);
        assert!(record.switch_count >= before, "switch count went down");
        assert!(record.switch_count <= before + 1, "more than one switch per event");
        if record.switch_count == before + 1 {
            assert!(may_switch, "job {job} changed level on a non-transition event");
            self.record_transition(job);
        }
    }

    fn record_transition(&mut self, job: JobId) {
        if self.guarded {
            if let Some(last) = self.transitions.iter().rposition(|&j| j == job) {
                let others = self.transitions.len() - last - 1;
                assert!(
                    others >= TRANSITION_HISTORY_LEN,
                    "job {job} transitioned again after only {others} other transitions"
                );
            }
        }
        self.transitions.push(job);
    }
}

impl SchedPolicy for Checked {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn job_created(&mut self, job: JobId) -> PolicyResult<()> {
        self.inner.job_created(job)?;
        assert_eq!(self.level(job), 0);
        self.after_callback(job, false);
        Ok(())
    }

    fn job_ready(&mut self, job: JobId) -> PolicyResult<()> {
        let level = self.level(job);
        self.inner.job_ready(job)?;
        assert_eq!(self.level(job), level);
        self.after_callback(job, false);
        Ok(())
    }

    fn job_quantum_expired(&mut self, job: JobId) -> PolicyResult<()> {
        let level = self.level(job);
        self.inner.job_quantum_expired(job)?;
        let now = self.level(job);
        assert!(now == level || now == level + 1);
        self.after_callback(job, true);
        Ok(())
    }

    fn job_preempted(&mut self, job: JobId) -> PolicyResult<()> {
        let level = self.level(job);
        self.inner.job_preempted(job)?;
        assert_eq!(self.level(job), level);
        let head = self.inner.queues().levels()[level].iter().next();
        assert_eq!(head, Some(job), "preempted job not at the head of its level");
        self.after_callback(job, false);
        Ok(())
    }

    fn job_blocked(&mut self, job: JobId) -> PolicyResult<()> {
        let level = self.level(job);
        self.inner.job_blocked(job)?;
        let now = self.level(job);
        assert!(now == level || now + 1 == level);
        self.after_callback(job, true);
        Ok(())
    }

    fn job_terminated(&mut self, job: JobId) -> PolicyResult<()> {
        self.inner.job_terminated(job)?;
        self.after_callback(job, false);
        Ok(())
    }

    fn needs_resched(&self) -> PolicyResult<bool> {
        let resched = self.inner.needs_resched()?;
        let expected = match self.inner.current() {
            Some(job) => self
                .highest_ready_level()
                .is_some_and(|ready| ready < self.level(job)),
            None => false,
        };
        assert_eq!(resched, expected);
        Ok(resched)
    }

    fn next_job_and_quantum(&mut self) -> PolicyResult<Dispatch> {
        let expected_level = self.highest_ready_level();
        let dispatch = self.inner.next_job_and_quantum()?;
        match (dispatch.job, expected_level) {
            (Some(job), Some(level)) => {
                assert_eq!(self.level(job), level, "dispatched below a ready level");
                assert_eq!(dispatch.quantum, DEFAULT_QUANTA[level]);
                assert_eq!(self.inner.jobs().get(job).unwrap().state, JobState::Running);
            }
            (None, None) => assert_eq!(dispatch.quantum, 0),
            other => panic!("dispatch disagrees with queue contents: {other:?}"),
        }
        Ok(dispatch)
    }

    fn report(&self) -> SchedReport {
        self.inner.report()
    }
}

fn run_checked(policy: MlfqPolicy, seed: u64) -> Sim<Checked> {
    let workload = Workload {
        ticks: 300,
        p_arrival: 0.15,
        seed,
        ..Workload::default()
    };
    let mut sim = Sim::new(Checked::new(policy), bernoulli_jobs(&workload));
    sim.run().unwrap();
    sim
}

#[test]
fn guarded_policy_holds_invariants_on_random_workloads() {
    for seed in 0..20 {
        let sim = run_checked(MlfqPolicy::new(&DEFAULT_QUANTA).unwrap(), seed);
        assert!(sim.all_jobs_completed());
        assert!(!sim.policy.transitions.is_empty(), "seed {seed} never transitioned");
    }
}

#[test]
fn unguarded_policy_holds_invariants_on_random_workloads() {
    for seed in 0..20 {
        let sim = run_checked(MlfqPolicy::unguarded(&DEFAULT_QUANTA).unwrap(), seed);
        assert!(sim.all_jobs_completed());
    }
}

#[test]
fn report_covers_every_job_in_id_order() {
    let sim = run_checked(MlfqPolicy::new(&DEFAULT_QUANTA).unwrap(), 7);
    let report = sim.policy.report();

    let ids: Vec<_> = report.switches.iter().map(|&(job, _)| job).collect();
    let mut expected: Vec<_> = sim.jobs.iter().map(|j| j.job.id).collect();
    expected.sort();
    assert_eq!(ids, expected);

    for (job, switches) in &report.switches {
        assert_eq!(sim.policy.switches[job], *switches);
    }
    assert_eq!(report.levels.len(), DEFAULT_QUANTA.len());
    for level in &report.levels {
        if let (Some(avg), Some(max)) = (level.avg_len, level.max_len) {
            assert!(avg <= max as f64);
        }
    }
}

#[test]
fn history_keeps_a_lone_hog_off_the_lowest_level() {
    let hog = Job::new(1, 0, vec![200], vec![]);
    let run = |policy: MlfqPolicy| {
        let mut sim = Sim::new(Checked::new(policy), vec![hog.clone()]);
        sim.run().unwrap();
        sim.policy.report()
    };

    // Nothing else ever transitions, so the hog never leaves the history
    let guarded = run(MlfqPolicy::new(&DEFAULT_QUANTA).unwrap());
    assert_eq!(guarded.switches, vec![(1, 1)]);

    let unguarded = run(MlfqPolicy::unguarded(&DEFAULT_QUANTA).unwrap());
    assert_eq!(unguarded.switches, vec![(1, 2)]);
}
