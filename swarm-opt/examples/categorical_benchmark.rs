//! Categorical Benchmark Example
//!
//! Lets the swarm choose which benchmark function to minimize as well as
//! where. Holder table has the lowest minimum of the set, so a run that hits
//! the target has settled on it.

use std::time::Duration;

use swarm_opt::benchmarks::CategoricalBenchmark;
use swarm_opt::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let benchmark = CategoricalBenchmark::default();

    let result = swarm_opt::builder()
        .particles(40)
        .max_generations(500)
        .max_velocity_fraction(0.05)
        .time_budget(Duration::from_secs(5))
        .optimize(CategoricalBenchmark::template()?, &benchmark)?;

    println!("Termination: {:?}", result.termination());
    println!("Satisfied: {}", result.is_satisfied());
    println!("Generations: {} ({} restarts)", result.generations(), result.restarts());

    let best = result.into_solution()?;
    println!("Best: {best}");
    if let Some(label) = best.parameters()[0].label() {
        println!("Function: {label}");
    }

    Ok(())
}
