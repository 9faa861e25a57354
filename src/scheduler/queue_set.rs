use std::collections::VecDeque;

use crate::core::{JobId, Level, PolicyError, PolicyResult, Ticks};

#[derive(Debug)]
pub struct QueueLevel {
    pub quantum: Ticks,
    jobs: VecDeque<JobId>,
}

impl QueueLevel {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = JobId> + '_ {
        self.jobs.iter().copied()
    }
}

/// One FIFO ready queue per priority level, level 0 first.
///
/// Holds membership and order only; which level a job belongs to is
/// decided by the policy.
#[derive(Debug)]
pub struct QueueSet {
    levels: Vec<QueueLevel>,
}

impl QueueSet {
    pub fn new(quanta: &[Ticks]) -> PolicyResult<Self> {
        if quanta.is_empty() {
            return Err(PolicyError::EmptyQuanta);
        }
        if let Some(level) = quanta.iter().position(|&q| q == 0) {
            return Err(PolicyError::ZeroQuantum { level });
        }

        let levels = quanta
            .iter()
            .map(|&quantum| QueueLevel {
                quantum,
                jobs: VecDeque::new(),
            })
            .collect();
        Ok(Self { levels })
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn lowest_level(&self) -> Level {
        self.levels.len() - 1
    }

    pub fn quantum(&self, level: Level) -> Ticks {
        self.levels[level].quantum
    }

    pub fn levels(&self) -> &[QueueLevel] {
        &self.levels
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.levels.iter().map(QueueLevel::len)
    }

    pub fn push_back(&mut self, level: Level, job: JobId) {
        log::trace!("queue {level}: push_back job {job}");
        self.levels[level].jobs.push_back(job);
    }

    // Only used for preemption, so the job keeps its place at its level
    pub fn push_front(&mut self, level: Level, job: JobId) {
        log::trace!("queue {level}: push_front job {job}");
        self.levels[level].jobs.push_front(job);
    }

    /// Pop the head of the highest-priority non-empty level.
    pub fn pop_front(&mut self) -> Option<(Level, JobId)> {
        self.levels
            .iter_mut()
            .enumerate()
            .find_map(|(level, queue)| queue.jobs.pop_front().map(|job| (level, job)))
    }

    /// True iff some level strictly above `level` has a ready job.
    pub fn any_non_empty_above(&self, level: Level) -> bool {
        self.levels[..level.min(self.levels.len())]
            .iter()
            .any(|queue| !queue.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_quanta() {
        assert_eq!(QueueSet::new(&[]).unwrap_err(), PolicyError::EmptyQuanta);
        assert_eq!(
            QueueSet::new(&[2, 0, 8]).unwrap_err(),
            PolicyError::ZeroQuantum { level: 1 }
        );
    }

    #[test]
    fn pops_by_level_then_fifo() {
        let mut queues = QueueSet::new(&[2, 4, 8]).unwrap();
        queues.push_back(2, 10);
        queues.push_back(1, 20);
        queues.push_back(1, 21);

        assert_eq!(queues.pop_front(), Some((1, 20)));
        assert_eq!(queues.pop_front(), Some((1, 21)));
        assert_eq!(queues.pop_front(), Some((2, 10)));
        assert_eq!(queues.pop_front(), None);
    }

    #[test]
    fn push_front_jumps_the_line() {
        let mut queues = QueueSet::new(&[2]).unwrap();
        queues.push_back(0, 1);
        queues.push_back(0, 2);
        queues.push_front(0, 3);

        let order: Vec<_> = queues.levels()[0].iter().collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn non_empty_above_is_strict() {
        let mut queues = QueueSet::new(&[2, 4, 8]).unwrap();
        queues.push_back(1, 5);

        assert!(!queues.any_non_empty_above(0));
        assert!(!queues.any_non_empty_above(1));
        assert!(queues.any_non_empty_above(2));

        queues.pop_front();
        assert!(!queues.any_non_empty_above(2));
    }
}
