pub mod mlfq;
pub mod queue_set;
pub mod round_robin;
pub mod stats;

use std::fmt;

use crate::core::{JobId, PolicyResult, Ticks};
pub use mlfq::MlfqPolicy;
pub use round_robin::RoundRobinPolicy;

pub const DEFAULT_QUANTA: [Ticks; 3] = [2, 4, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub job: Option<JobId>,
    pub quantum: Ticks,
}

impl Dispatch {
    pub const IDLE: Self = Self {
        job: None,
        quantum: 0,
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelStats {
    pub samples: u64,
    // None when the level was never sampled
    pub avg_len: Option<f64>,
    pub max_len: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedReport {
    /// Level-switch count per job, sorted by job id.
    pub switches: Vec<(JobId, u64)>,
    pub levels: Vec<LevelStats>,
}

impl fmt::Display for SchedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  JID | # Switches")?;
        writeln!(f, "------------------")?;
        for (job, switches) in &self.switches {
            writeln!(f, "{job:5} | {switches:10}")?;
        }
        writeln!(f)?;
        writeln!(f, "Queue | Avg length | Max length")?;
        writeln!(f, "-------------------------------")?;
        for (level, stats) in self.levels.iter().enumerate() {
            match (stats.avg_len, stats.max_len) {
                (Some(avg), Some(max)) => writeln!(f, "{level:5} | {avg:10.2} | {max:10}")?,
                _ => writeln!(f, "{level:5} | {:>10} | {:>10}", "-", "-")?,
            }
        }
        Ok(())
    }
}

/// The callback surface a driver uses to consult a scheduling policy.
///
/// The driver owns time and job bursts; it reports every lifecycle event
/// and asks the policy what to run next. Every callback naming a job
/// expects that job to have been created and not yet terminated.
pub trait SchedPolicy {
    fn name(&self) -> &'static str;

    /// A new job is ready. `job_ready` is not called for its first burst.
    fn job_created(&mut self, job: JobId) -> PolicyResult<()>;

    /// The job's I/O burst completed.
    fn job_ready(&mut self, job: JobId) -> PolicyResult<()>;

    /// The running job used its whole quantum without finishing its burst.
    fn job_quantum_expired(&mut self, job: JobId) -> PolicyResult<()>;

    /// The running job was taken off the CPU after `needs_resched` said so.
    fn job_preempted(&mut self, job: JobId) -> PolicyResult<()>;

    /// The running job finished its CPU burst and started an I/O burst.
    fn job_blocked(&mut self, job: JobId) -> PolicyResult<()>;

    /// The running job finished its final CPU burst.
    fn job_terminated(&mut self, job: JobId) -> PolicyResult<()>;

    /// Asked after jobs became ready: should the running job be preempted?
    fn needs_resched(&self) -> PolicyResult<bool>;

    /// Pick the next job and its quantum, or `Dispatch::IDLE`.
    fn next_job_and_quantum(&mut self) -> PolicyResult<Dispatch>;

    fn report(&self) -> SchedReport;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_both_tables() {
        let report = SchedReport {
            switches: vec![(1, 2), (12, 0)],
            levels: vec![
                LevelStats {
                    samples: 4,
                    avg_len: Some(0.5),
                    max_len: Some(2),
                },
                LevelStats::default(),
            ],
        };

        let text = report.to_string();
        assert!(text.contains("    1 |          2\n"));
        assert!(text.contains("   12 |          0\n"));
        assert!(text.contains("    0 |       0.50 |          2\n"));
        assert!(text.contains("    1 |          - |          -\n"));
    }
}
