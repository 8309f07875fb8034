//! # SwarmOpt
//!
//! **Derivative-free particle swarm optimization over bounded continuous, integer
//! and categorical parameters.**
//!
//! SwarmOpt searches for a parameter assignment that minimizes a user-supplied cost
//! function, or that satisfies a stopping criterion the cost function defines, without
//! gradient information. The engine lives in `swarm-opt-core`; this crate re-exports it
//! and adds a fluent configuration builder and a set of benchmark cost functions.
//!
//! ## Quick Start
//!
//! ```rust
//! use swarm_opt::prelude::*;
//!
//! let template = vec![Parameter::continuous(0.0, 10.0)?];
//! let cost = |params: &[Parameter]| {
//!     let x = params[0].value();
//!     ThresholdOutput::new((x - 7.0).powi(2), 0.01)
//! };
//!
//! let result = swarm_opt::builder()
//!     .particles(20)
//!     .max_generations(500)
//!     .max_velocity_fraction(0.1)
//!     .seed(7)
//!     .optimize(template, &cost)?;
//!
//! let best = result.into_solution()?;
//! assert!((best.values()[0] - 7.0).abs() < 0.5);
//! # Ok::<(), swarm_opt::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - [`swarm_opt_core`]: Parameters, particles and the swarm coordinator
//! - [`benchmarks`]: Classic test functions and a categorical benchmark

#![forbid(unsafe_code)]

use std::time::Duration;

pub use swarm_opt_core as core;

// Re-export commonly used items at the top level
pub use swarm_opt_core::{
    distribution::Distribution,
    parameter::{CategoryTable, Domain, Parameter, ParameterKind},
    particle::{Coefficients, Particle, ParticleParameter},
    solution::BestDiscoveredSolution,
    swarm::{OptimizationResult, ParticleSwarm, SwarmConfig, Termination},
    traits::{BoundedVariable, CostFunction, CostOutput, ThresholdOutput},
    DecodeError, Error, Result,
};

pub mod benchmarks;

/// Prelude module for convenient imports
///
/// ```rust
/// use swarm_opt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::SwarmConfigBuilder;
}

/// Start building a swarm configuration
pub fn builder() -> SwarmConfigBuilder {
    SwarmConfigBuilder::new()
}

/// Builder for SwarmConfig
#[derive(Debug, Default)]
pub struct SwarmConfigBuilder {
    config: SwarmConfig,
}

impl SwarmConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles
    pub fn particles(mut self, count: usize) -> Self {
        self.config.num_particles = count;
        self
    }

    /// Set the generations per pass of the generation loop
    pub fn max_generations(mut self, generations: u64) -> Self {
        self.config.max_generations = generations;
        self
    }

    /// Set the per-step velocity limit of continuous parameters as a fraction of their range
    pub fn max_velocity_fraction(mut self, fraction: f64) -> Self {
        self.config.max_velocity_fraction = fraction;
        self
    }

    /// Set inertia, cognitive and social weights
    pub fn coefficients(mut self, coefficients: Coefficients) -> Self {
        self.config.inertia = coefficients.inertia;
        self.config.cognitive = coefficients.cognitive;
        self.config.social = coefficients.social;
        self
    }

    /// Set the generations without improvement before a restart
    pub fn stagnation_limit(mut self, generations: u32) -> Self {
        self.config.stagnation_limit = generations;
        self
    }

    /// Keep searching until `budget` is spent or the criterion is met
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget = Some(budget);
        self
    }

    /// Seed the swarm's random source
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the configuration
    pub fn build(self) -> SwarmConfig {
        self.config
    }

    /// Validate the configuration and build a swarm over `template`
    pub fn build_swarm<O: CostOutput>(self, template: Vec<Parameter>) -> Result<ParticleSwarm<O>> {
        ParticleSwarm::new(self.config, template)
    }

    /// Build a swarm over `template` and run it against `cost`
    #[tracing::instrument(
        name = "optimize",
        skip_all,
        fields(particles = self.config.num_particles)
    )]
    pub fn optimize<C: CostFunction>(
        self,
        template: Vec<Parameter>,
        cost: &C,
    ) -> Result<OptimizationResult<C::Output>> {
        self.build_swarm(template)?.optimize(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = builder()
            .particles(12)
            .max_generations(50)
            .coefficients(Coefficients {
                inertia: 0.7,
                cognitive: 1.5,
                social: 1.5,
            })
            .time_budget(Duration::from_secs(2))
            .seed(3)
            .build();

        assert_eq!(config.num_particles, 12);
        assert_eq!(config.max_generations, 50);
        assert!((config.inertia - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.time_budget, Some(Duration::from_secs(2)));
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.stagnation_limit, 5);
    }

    #[test]
    fn test_builder_fails_fast_on_zero_particles() {
        let swarm = builder()
            .particles(0)
            .build_swarm::<ThresholdOutput>(vec![Parameter::continuous(0.0, 1.0).unwrap()]);
        assert!(matches!(swarm, Err(Error::InvalidConfig(_))));
    }
}
