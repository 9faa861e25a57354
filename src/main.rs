use anyhow::{Context, Result};
use average::Estimate;
use clap::{Parser, ValueEnum};
use mlfq_model::{
    MlfqPolicy, RoundRobinPolicy, SchedPolicy, Sim, Ticks, Workload,
    scheduler::DEFAULT_QUANTA, sim::bernoulli_jobs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyKind {
    /// MLFQ with the shared transition history
    Mlfq,
    /// MLFQ that demotes and promotes on every qualifying event
    MlfqUnguarded,
    /// Single-level round robin using the first quantum
    Rr,
}

/// Run a random workload through a scheduling policy and print its report.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, value_enum, default_value = "mlfq")]
    policy: PolicyKind,

    /// Quantum per level, highest priority first
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_QUANTA)]
    quanta: Vec<Ticks>,

    /// Ticks during which jobs may arrive
    #[arg(long, default_value_t = 200)]
    ticks: Ticks,

    /// Chance of a job arriving on any given tick
    #[arg(long, default_value_t = 0.1)]
    p_arrival: f64,

    /// Share of arriving jobs that are I/O bound
    #[arg(long, default_value_t = 0.5)]
    p_io_bound: f64,

    #[arg(long, default_value_t = 6)]
    max_bursts: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workload = Workload {
        ticks: args.ticks,
        p_arrival: args.p_arrival,
        p_io_bound: args.p_io_bound,
        max_bursts: args.max_bursts,
        seed: args.seed,
    };

    match args.policy {
        PolicyKind::Mlfq => run(MlfqPolicy::new(&args.quanta)?, &workload),
        PolicyKind::MlfqUnguarded => run(MlfqPolicy::unguarded(&args.quanta)?, &workload),
        PolicyKind::Rr => {
            let quantum = *args.quanta.first().context("no quantum given")?;
            run(RoundRobinPolicy::new(quantum)?, &workload)
        }
    }
}

fn run<P: SchedPolicy>(policy: P, workload: &Workload) -> Result<()> {
    let jobs = bernoulli_jobs(workload);
    log::info!("running {} jobs under {}", jobs.len(), policy.name());

    let mut sim = Sim::new(policy, jobs);
    while !sim.all_jobs_completed() {
        let now = sim.now();
        for event in sim.step().with_context(|| format!("tick {now}"))? {
            log::trace!("t={now} {event:?}");
        }
    }

    let response_times =
        sim.jobs_map(|j| (j.start_time.unwrap_or_default() - j.job.arrival_time) as f64);
    let turnaround_times =
        sim.jobs_map(|j| (j.completion_time.unwrap_or_default() - j.job.arrival_time) as f64);

    print!("{}", sim.policy.report());
    println!();
    println!("Average response time: {:.2} ticks", avg(response_times));
    println!("Average turnaround time: {:.2} ticks", avg(turnaround_times));
    println!("Finished at: {} ticks", sim.now());
    Ok(())
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}
