use crate::core::{JobId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Created { job: JobId },
    // I/O burst finished, job is ready again
    Ready { job: JobId },
    Dispatched { job: JobId, quantum: Ticks },
    Preempted { job: JobId },
    QuantumExpired { job: JobId },
    Blocked { job: JobId, until: Ticks },
    Terminated { job: JobId },
    // CPU idle even after dispatch
    Idle,
}
