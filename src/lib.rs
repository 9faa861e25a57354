pub mod core;
pub mod scheduler;
pub mod sim;

pub use crate::core::{JobId, PolicyError, PolicyResult, SimEvent, Ticks};
pub use scheduler::{Dispatch, MlfqPolicy, RoundRobinPolicy, SchedPolicy, SchedReport};
pub use sim::{Job, Sim, Workload};
