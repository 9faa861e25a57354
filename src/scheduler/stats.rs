use average::{Estimate, Max, Mean};

use super::{LevelStats, SchedReport, queue_set::QueueSet};
use crate::core::JobTable;

/// Samples every level's ready-queue length before each queue mutation.
#[derive(Debug)]
pub struct StatsCollector {
    levels: Vec<LevelSamples>,
}

#[derive(Debug)]
struct LevelSamples {
    mean: Mean,
    max: Max,
}

impl StatsCollector {
    pub fn new(num_levels: usize) -> Self {
        Self {
            levels: (0..num_levels)
                .map(|_| LevelSamples {
                    mean: Mean::new(),
                    max: Max::new(),
                })
                .collect(),
        }
    }

    pub fn sample(&mut self, queues: &QueueSet) {
        debug_assert_eq!(queues.num_levels(), self.levels.len());
        for (samples, len) in self.levels.iter_mut().zip(queues.lengths()) {
            samples.mean.add(len as f64);
            samples.max.add(len as f64);
        }
        log::trace!("sampled queue lengths {:?}", queues.lengths().collect::<Vec<_>>());
    }

    pub fn num_samples(&self) -> u64 {
        self.levels.first().map_or(0, |level| level.mean.len())
    }

    pub fn report(&self, jobs: &JobTable) -> SchedReport {
        let switches = jobs
            .sorted()
            .into_iter()
            .map(|job| (job.id, job.switch_count))
            .collect();

        let levels = self
            .levels
            .iter()
            .map(|samples| {
                if samples.mean.is_empty() {
                    LevelStats::default()
                } else {
                    LevelStats {
                        samples: samples.mean.len(),
                        avg_len: Some(samples.mean.mean()),
                        max_len: Some(samples.max.max() as usize),
                    }
                }
            })
            .collect();

        SchedReport { switches, levels }
    }
}
