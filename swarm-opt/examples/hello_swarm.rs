//! Hello Swarm Example
//!
//! Minimizes a shifted paraboloid over two continuous parameters.
//!
//! Run with `RUST_LOG=debug` to watch each generation.

use swarm_opt::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("SwarmOpt Hello Swarm Example");
    println!("============================");

    let template = vec![
        Parameter::continuous(-10.0, 10.0)?,
        Parameter::continuous(-10.0, 10.0)?,
    ];

    // Minimum at (3, -2)
    let cost = |params: &[Parameter]| {
        let x = params[0].value();
        let y = params[1].value();
        ThresholdOutput::new((x - 3.0).powi(2) + (y + 2.0).powi(2), 1e-6)
    };

    let config = swarm_opt::builder()
        .particles(30)
        .max_generations(1000)
        .max_velocity_fraction(0.1)
        .seed(42)
        .build();

    println!("Configuration:");
    println!("  Particles: {}", config.num_particles);
    println!("  Max generations: {}", config.max_generations);

    let mut swarm = ParticleSwarm::new(config, template)?;
    let result = swarm.optimize(&cost)?;

    println!("\nTermination: {:?}", result.termination());
    println!("Generations: {}", result.generations());
    println!("Restarts: {}", result.restarts());
    println!("Elapsed: {:?}", result.elapsed());

    let best = result.into_solution()?;
    println!("Best: {best}");

    Ok(())
}
