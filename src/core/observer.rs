use rustc_hash::FxHashMap;

use super::{JobState, JobTable, Level, PolicyError, PolicyResult};
use crate::scheduler::queue_set::QueueSet;

/// Cross-check queue membership against the job table.
///
/// Every queued job must be `Ready`, sit at its recorded level and appear
/// exactly once across all levels; every `Ready` job must be queued.
pub fn check_membership(queues: &QueueSet, jobs: &JobTable) -> PolicyResult<()> {
    let mut seen: FxHashMap<_, Level> = FxHashMap::default();

    for (level, queue) in queues.levels().iter().enumerate() {
        for job_id in queue.iter() {
            if let Some(prev) = seen.insert(job_id, level) {
                return Err(PolicyError::InvariantViolation(format!(
                    "job {job_id} queued twice (levels {prev} and {level})"
                )));
            }

            let job = jobs.get(job_id)?;
            if job.state != JobState::Ready {
                return Err(PolicyError::InvariantViolation(format!(
                    "job {job_id} is {:?} but queued at level {level}",
                    job.state
                )));
            }
            if job.level != level {
                return Err(PolicyError::InvariantViolation(format!(
                    "job {job_id} recorded at level {} but queued at level {level}",
                    job.level
                )));
            }
        }
    }

    if let Some(job) = jobs
        .iter()
        .find(|job| job.state == JobState::Ready && !seen.contains_key(&job.id))
    {
        return Err(PolicyError::InvariantViolation(format!(
            "ready job {} missing from every queue",
            job.id
        )));
    }

    Ok(())
}
