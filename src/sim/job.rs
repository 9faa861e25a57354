use rand::prelude::*;

use crate::core::{JobId, Ticks};

/// A job as the driver sees it: CPU bursts separated by I/O bursts.
///
/// `io_bursts[i]` follows `cpu_bursts[i]`, so there is always exactly one
/// fewer I/O burst than CPU bursts and every job ends on the CPU.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub cpu_bursts: Vec<Ticks>,
    pub io_bursts: Vec<Ticks>,
}

impl Job {
    pub fn new(id: JobId, arrival_time: Ticks, cpu_bursts: Vec<Ticks>, io_bursts: Vec<Ticks>) -> Self {
        assert!(!cpu_bursts.is_empty(), "Job {id} needs at least one CPU burst");
        assert!(
            cpu_bursts.iter().all(|&b| b > 0),
            "Job {id} has an empty CPU burst"
        );
        assert_eq!(
            io_bursts.len() + 1,
            cpu_bursts.len(),
            "Job {id} must alternate CPU and I/O bursts"
        );
        Self {
            id,
            arrival_time,
            cpu_bursts,
            io_bursts,
        }
    }

    pub fn service_time(&self) -> Ticks {
        self.cpu_bursts.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    // Index of the CPU burst in progress
    pub burst: usize,
    pub remaining: Ticks,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl JobInstance {
    pub fn new(job: Job) -> Self {
        let remaining = job.cpu_bursts[0];
        Self {
            job,
            burst: 0,
            remaining,
            start_time: None,
            completion_time: None,
        }
    }

    pub fn on_last_burst(&self) -> bool {
        self.burst + 1 == self.job.cpu_bursts.len()
    }
}

#[derive(Debug, Clone)]
pub struct Workload {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_io_bound: f64,
    pub max_bursts: usize,
    pub seed: u64,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            ticks: 200,
            p_arrival: 0.1,
            p_io_bound: 0.5,
            max_bursts: 6,
            seed: 0,
        }
    }
}

/// Bernoulli arrivals, one coin flip per tick.
///
/// I/O-bound jobs get short CPU bursts and longer I/O waits; CPU-bound
/// jobs get long CPU bursts with brief I/O in between.
pub fn bernoulli_jobs(workload: &Workload) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(workload.seed);
    let mut jobs = Vec::new();

    for t in 0..workload.ticks {
        if rng.random::<f64>() >= workload.p_arrival {
            continue;
        }

        let io_bound = rng.random::<f64>() < workload.p_io_bound;
        let (cpu_range, io_range) = if io_bound { (1..=2, 2..=6) } else { (6..=20, 1..=3) };
        let bursts = rng.random_range(1..=workload.max_bursts.max(1));

        let cpu_bursts: Vec<Ticks> = (0..bursts)
            .map(|_| rng.random_range(cpu_range.clone()))
            .collect();
        let io_bursts: Vec<Ticks> = (1..bursts)
            .map(|_| rng.random_range(io_range.clone()))
            .collect();

        jobs.push(Job::new(jobs.len() as JobId, t, cpu_bursts, io_bursts));
    }

    jobs
}
