pub mod driver;
pub mod job;

pub use driver::Sim;
pub use job::{Job, JobInstance, Workload, bernoulli_jobs};
