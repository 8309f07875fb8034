//! Swarm coordinator
//!
//! [`ParticleSwarm`] drives the generation loop: every particle is scored by
//! the cost function, the swarm best is tracked, particles are moved, and a
//! swarm that stops improving for `stagnation_limit` generations is
//! restarted. The best solution across restarts is kept as the all-time best.
//!
//! A run ends when an output satisfies the optimization criterion, when the
//! generation budget is exhausted, or, with a time budget configured, when
//! the wall clock runs out. With a time budget the generation loop is
//! re-entered until either the criterion is met or time is up.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parameter::Parameter;
use crate::particle::{velocity_limit_for, Coefficients, Particle, ParticleParameter};
use crate::solution::BestDiscoveredSolution;
use crate::traits::{CostFunction, CostOutput};
use crate::{Error, Result};

/// Particle Swarm Optimization (PSO) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Number of particles in the swarm
    pub num_particles: usize,
    /// Generations per pass of the generation loop
    pub max_generations: u64,
    /// Largest fraction of its range a continuous parameter may move per step
    pub max_velocity_fraction: f64,
    /// Inertia weight (momentum)
    pub inertia: f64,
    /// Cognitive coefficient (attraction to personal best)
    pub cognitive: f64,
    /// Social coefficient (attraction to swarm best)
    pub social: f64,
    /// Generations without improvement before the swarm restarts
    pub stagnation_limit: u32,
    /// Wall-clock budget; the run continues until it is spent
    pub time_budget: Option<Duration>,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        let coefficients = Coefficients::default();
        Self {
            num_particles: 30,
            max_generations: 1000,
            max_velocity_fraction: 0.01,
            inertia: coefficients.inertia,
            cognitive: coefficients.cognitive,
            social: coefficients.social,
            stagnation_limit: 5,
            time_budget: None,
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Check the configuration before any work is done
    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            return Err(Error::InvalidConfig("particle count must be positive"));
        }
        if self.max_generations == 0 {
            return Err(Error::InvalidConfig("generation count must be positive"));
        }
        if !self.max_velocity_fraction.is_finite() || self.max_velocity_fraction <= 0.0 {
            return Err(Error::InvalidConfig(
                "max velocity fraction must be finite and positive",
            ));
        }
        if ![self.inertia, self.cognitive, self.social]
            .iter()
            .all(|c| c.is_finite())
        {
            return Err(Error::InvalidConfig("velocity coefficients must be finite"));
        }
        if self.stagnation_limit == 0 {
            return Err(Error::InvalidConfig("stagnation limit must be positive"));
        }
        Ok(())
    }

    /// Velocity update weights
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            inertia: self.inertia,
            cognitive: self.cognitive,
            social: self.social,
        }
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    /// An output satisfied the optimization criterion
    CriterionSatisfied,
    /// The generation budget ran out
    GenerationsExhausted,
    /// The wall-clock budget ran out
    TimeBudgetExhausted,
}

/// Outcome of [`ParticleSwarm::optimize`]
#[derive(Debug, Clone)]
pub struct OptimizationResult<O> {
    best: Option<BestDiscoveredSolution<O>>,
    termination: Termination,
    generations: u64,
    restarts: u64,
    elapsed: Duration,
}

impl<O> OptimizationResult<O> {
    /// Best solution found, or `None` if no output was ever within restraints
    pub fn best(&self) -> Option<&BestDiscoveredSolution<O>> {
        self.best.as_ref()
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Whether the run stopped on the optimization criterion
    pub fn is_satisfied(&self) -> bool {
        self.termination == Termination::CriterionSatisfied
    }

    /// Generations evaluated by this run
    pub fn generations(&self) -> u64 {
        self.generations
    }

    /// Restarts performed by this run
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The best solution, or [`Error::NoSolution`]
    pub fn into_solution(self) -> Result<BestDiscoveredSolution<O>> {
        self.best.ok_or(Error::NoSolution)
    }
}

/// Result of one pass over all particles
enum Generation<O> {
    Satisfied(BestDiscoveredSolution<O>),
    Improved,
    Stagnant,
}

/// The swarm coordinator
#[derive(Debug)]
pub struct ParticleSwarm<O> {
    config: SwarmConfig,
    particles: Vec<Particle<O>>,
    swarm_best: Option<BestDiscoveredSolution<O>>,
    all_time_best: Option<BestDiscoveredSolution<O>>,
    stagnation_count: u32,
    generation: u64,
    restarts: u64,
    rng: StdRng,
}

impl<O: CostOutput> ParticleSwarm<O> {
    /// Build a swarm whose particles are copies of `template`.
    ///
    /// Each particle's velocity limits are derived from the parameter kinds
    /// and its values are resampled so particles start spread out.
    pub fn new(config: SwarmConfig, template: Vec<Parameter>) -> Result<Self> {
        config.validate()?;
        if template.is_empty() {
            return Err(Error::InvalidConfig("parameter template must not be empty"));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let template: Vec<ParticleParameter> = template
            .into_iter()
            .map(|parameter| {
                let mut parameter = ParticleParameter::new(parameter);
                let limit = velocity_limit_for(&parameter, config.max_velocity_fraction);
                parameter.set_velocity_limit(limit);
                parameter
            })
            .collect();

        let particles = (0..config.num_particles)
            .map(|_| {
                let mut particle = Particle::new(template.clone());
                particle.reinitialize(&mut rng);
                particle
            })
            .collect();

        Ok(Self {
            config,
            particles,
            swarm_best: None,
            all_time_best: None,
            stagnation_count: 0,
            generation: 0,
            restarts: 0,
            rng,
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle<O>] {
        &self.particles
    }

    /// Best solution of the current run segment (since the last restart)
    pub fn swarm_best(&self) -> Option<&BestDiscoveredSolution<O>> {
        self.swarm_best.as_ref()
    }

    /// Best solution promoted across restarts
    pub fn all_time_best(&self) -> Option<&BestDiscoveredSolution<O>> {
        self.all_time_best.as_ref()
    }

    /// Generations since the swarm best last improved
    pub fn stagnation_count(&self) -> u32 {
        self.stagnation_count
    }

    /// Total generations evaluated by this swarm
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total restarts performed by this swarm
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Run the optimization against `cost`.
    ///
    /// Cost-function failures abort the run and are returned as
    /// [`Error::CostFunction`].
    pub fn optimize<C>(&mut self, cost: &C) -> Result<OptimizationResult<O>>
    where
        C: CostFunction<Output = O>,
    {
        let started = Instant::now();
        let first_generation = self.generation;
        let first_restart = self.restarts;

        loop {
            self.stagnation_count = 0;
            for _ in 0..self.config.max_generations {
                if let Some(solution) = self.step(cost)? {
                    return Ok(self.finish(
                        Some(solution),
                        Termination::CriterionSatisfied,
                        started,
                        first_generation,
                        first_restart,
                    ));
                }

                if self.budget_spent(started) {
                    // Promotion only happens on restart, so an unpromoted
                    // swarm best is used only when nothing was promoted.
                    let best = self.all_time_best.clone().or_else(|| self.swarm_best.clone());
                    return Ok(self.finish(
                        best,
                        Termination::TimeBudgetExhausted,
                        started,
                        first_generation,
                        first_restart,
                    ));
                }
            }

            self.promote_swarm_best();

            // A satisfying output returns from inside the pass, so only the
            // clock decides whether another pass runs.
            let Some(budget) = self.config.time_budget else {
                break;
            };
            if started.elapsed() >= budget {
                break;
            }
            debug!(
                generation = self.generation,
                "generation budget spent, continuing within time budget"
            );
        }

        let termination = if self.budget_spent(started) {
            Termination::TimeBudgetExhausted
        } else {
            Termination::GenerationsExhausted
        };
        let best = self.all_time_best.clone().or_else(|| self.swarm_best.clone());
        Ok(self.finish(best, termination, started, first_generation, first_restart))
    }

    /// Evaluate one generation and apply stagnation bookkeeping.
    ///
    /// Returns the satisfying solution if one was found.
    fn step<C>(&mut self, cost: &C) -> Result<Option<BestDiscoveredSolution<O>>>
    where
        C: CostFunction<Output = O>,
    {
        let outcome = self.run_generation(cost)?;
        self.generation += 1;

        let improved = match outcome {
            Generation::Satisfied(solution) => return Ok(Some(solution)),
            Generation::Improved => true,
            Generation::Stagnant => false,
        };

        match &self.swarm_best {
            Some(best) => debug!(
                generation = self.generation,
                best = %best.output(),
                "generation complete"
            ),
            None => debug!(generation = self.generation, "no output within restraints yet"),
        }

        if !improved && self.swarm_best.is_some() {
            self.stagnation_count += 1;
            if self.stagnation_count >= self.config.stagnation_limit {
                self.restart();
            }
        } else {
            self.stagnation_count = 0;
        }
        Ok(None)
    }

    fn run_generation<C>(&mut self, cost: &C) -> Result<Generation<O>>
    where
        C: CostFunction<Output = O>,
    {
        let coefficients = self.config.coefficients();
        let mut improved = false;

        for particle in self.particles.iter_mut() {
            let position = particle.position();
            let output = cost
                .evaluate(&position)
                .map_err(|e| Error::CostFunction(Box::new(e)))?;

            if output.satisfies_criterion() {
                return Ok(Generation::Satisfied(BestDiscoveredSolution::new(
                    position, output,
                )));
            }

            let beats_swarm = self
                .swarm_best
                .as_ref()
                .map_or(true, |best| output.is_better_than(best.output()));
            if output.is_within_restraints() && beats_swarm {
                self.swarm_best = Some(BestDiscoveredSolution::new(position, output.clone()));
                improved = true;
            }

            particle.update(&coefficients, self.swarm_best.as_ref(), &output, &mut self.rng);
        }

        Ok(if improved {
            Generation::Improved
        } else {
            Generation::Stagnant
        })
    }

    /// Keep the swarm best as all-time best if it beats the incumbent
    fn promote_swarm_best(&mut self) {
        let Some(candidate) = &self.swarm_best else {
            return;
        };
        let better = self
            .all_time_best
            .as_ref()
            .map_or(true, |best| candidate.is_better_than(best));
        if better {
            self.all_time_best = Some(candidate.clone());
        }
    }

    /// Promote the swarm best, then resample every particle and forget all
    /// personal bests. The generation counter is kept.
    fn restart(&mut self) {
        self.promote_swarm_best();
        self.swarm_best = None;
        for particle in &mut self.particles {
            particle.reinitialize(&mut self.rng);
            particle.reset_personal_best();
        }
        self.stagnation_count = 0;
        self.restarts += 1;

        match &self.all_time_best {
            Some(best) => info!(
                generation = self.generation,
                restarts = self.restarts,
                all_time_best = %best.output(),
                "swarm stagnated, restarting"
            ),
            None => info!(
                generation = self.generation,
                restarts = self.restarts,
                "swarm stagnated, restarting"
            ),
        }
    }

    fn budget_spent(&self, started: Instant) -> bool {
        self.config
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget)
    }

    fn finish(
        &self,
        best: Option<BestDiscoveredSolution<O>>,
        termination: Termination,
        started: Instant,
        first_generation: u64,
        first_restart: u64,
    ) -> OptimizationResult<O> {
        let result = OptimizationResult {
            best,
            termination,
            generations: self.generation - first_generation,
            restarts: self.restarts - first_restart,
            elapsed: started.elapsed(),
        };
        info!(
            termination = ?result.termination,
            generations = result.generations,
            restarts = result.restarts,
            elapsed_ms = result.elapsed.as_millis() as u64,
            found = result.best.is_some(),
            "optimization finished"
        );
        result
    }
}
