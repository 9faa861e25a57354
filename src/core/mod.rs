pub mod error;
pub mod event;
pub mod observer;
pub mod state;

pub use error::{PolicyError, PolicyResult};
pub use event::SimEvent;
pub use state::{JobRecord, JobState, JobTable};

// Opaque job identifier handed out by the driver; never reused while tracked
pub type JobId = u64;
pub type Ticks = u64;
// Index into the queue set, 0 is the highest priority
pub type Level = usize;
