//! Particles
//!
//! A [`Particle`] owns a vector of [`ParticleParameter`]s and its personal
//! best, and applies the canonical PSO update:
//!
//! ```text
//! v' = w*v + r1*c_cog*(personal_best - x) + r2*c_soc*(swarm_best - x)
//! x' = bound(x + v')
//! ```
//!
//! with `r1` and `r2` drawn from `U(0, 1)` for every parameter on every step.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::parameter::{Parameter, ParameterKind};
use crate::solution::BestDiscoveredSolution;
use crate::traits::{BoundedVariable, CostOutput};

/// Weights of the velocity update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Inertia weight (momentum)
    pub inertia: f64,
    /// Cognitive coefficient (attraction to personal best)
    pub cognitive: f64,
    /// Social coefficient (attraction to swarm best)
    pub social: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            inertia: 1.0,
            cognitive: 2.0,
            social: 2.0,
        }
    }
}

/// A [`Parameter`] with velocity state.
///
/// `|velocity| <= velocity_limit` holds after every write, including loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParticleParameterRepr", into = "ParticleParameterRepr")]
pub struct ParticleParameter {
    parameter: Parameter,
    velocity: f64,
    velocity_limit: f64,
}

impl ParticleParameter {
    /// Wrap `parameter` at rest; the velocity limit starts at the full range.
    pub fn new(parameter: Parameter) -> Self {
        let velocity_limit = parameter.spread();
        Self {
            parameter,
            velocity: 0.0,
            velocity_limit,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn velocity_limit(&self) -> f64 {
        self.velocity_limit
    }

    /// Store `velocity`, clamped to `[-limit, limit]`. NaN stores zero.
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(-self.velocity_limit, self.velocity_limit)
        };
    }

    /// Set the maximum velocity magnitude and re-clamp the current velocity
    pub fn set_velocity_limit(&mut self, limit: f64) {
        self.velocity_limit = if limit.is_nan() { 0.0 } else { limit.abs() };
        self.set_velocity(self.velocity);
    }

    /// Owned copy of the embedded parameter
    pub fn to_parameter(&self) -> Parameter {
        self.parameter.clone()
    }

    pub fn into_parameter(self) -> Parameter {
        self.parameter
    }
}

#[derive(Serialize, Deserialize)]
struct ParticleParameterRepr {
    parameter: Parameter,
    velocity: f64,
    velocity_limit: f64,
}

impl From<ParticleParameterRepr> for ParticleParameter {
    fn from(repr: ParticleParameterRepr) -> Self {
        let mut parameter = Self::new(repr.parameter);
        parameter.set_velocity_limit(repr.velocity_limit);
        parameter.set_velocity(repr.velocity);
        parameter
    }
}

impl From<ParticleParameter> for ParticleParameterRepr {
    fn from(parameter: ParticleParameter) -> Self {
        Self {
            parameter: parameter.parameter,
            velocity: parameter.velocity,
            velocity_limit: parameter.velocity_limit,
        }
    }
}

impl From<Parameter> for ParticleParameter {
    fn from(parameter: Parameter) -> Self {
        Self::new(parameter)
    }
}

impl BoundedVariable for ParticleParameter {
    fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.parameter.reinitialize(rng);
    }

    fn update_and_bound<R: Rng + ?Sized>(&mut self, candidate: f64, rng: &mut R) {
        self.parameter.update_and_bound(candidate, rng);
    }
}

/// Velocity limit for a variable: one step for integer and categorical
/// domains, `max_fraction` of the range for continuous ones.
pub fn velocity_limit_for<V: BoundedVariable>(variable: &V, max_fraction: f64) -> f64 {
    match variable.kind() {
        ParameterKind::Integer | ParameterKind::Categorical => 1.0,
        ParameterKind::Continuous => variable.range() * max_fraction,
    }
}

/// One agent of the swarm
#[derive(Debug, Clone)]
pub struct Particle<O> {
    parameters: Vec<ParticleParameter>,
    personal_best: Option<BestDiscoveredSolution<O>>,
}

impl<O: CostOutput> Particle<O> {
    pub fn new(parameters: Vec<ParticleParameter>) -> Self {
        Self {
            parameters,
            personal_best: None,
        }
    }

    pub fn parameters(&self) -> &[ParticleParameter] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [ParticleParameter] {
        &mut self.parameters
    }

    /// Best solution this particle has observed since the last reset
    pub fn personal_best(&self) -> Option<&BestDiscoveredSolution<O>> {
        self.personal_best.as_ref()
    }

    /// Owned copy of the current position, as handed to the cost function
    pub fn position(&self) -> Vec<Parameter> {
        self.parameters.iter().map(ParticleParameter::to_parameter).collect()
    }

    /// Fold `output` (scored at the current position) into the personal best,
    /// then move.
    ///
    /// Until a personal best exists the particle takes a random step of up to
    /// its velocity limit in each dimension, and only an output within
    /// restraints can seed the personal best. Afterwards any better output
    /// replaces it, and the particle follows the
    /// inertia/cognitive/social update; without a swarm best the social term
    /// is dropped.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        coefficients: &Coefficients,
        swarm_best: Option<&BestDiscoveredSolution<O>>,
        output: &O,
        rng: &mut R,
    ) {
        match self.personal_best.take() {
            None => {
                if output.is_within_restraints() {
                    self.personal_best = Some(BestDiscoveredSolution::new(
                        self.position(),
                        output.clone(),
                    ));
                }
                self.scatter(rng);
            }
            Some(best) => {
                let best = if output.is_better_than(best.output()) {
                    trace!(output = %output, "personal best improved");
                    BestDiscoveredSolution::new(self.position(), output.clone())
                } else {
                    best
                };
                self.follow(coefficients, &best, swarm_best, rng);
                self.personal_best = Some(best);
            }
        }
    }

    /// Forget the personal best
    pub fn reset_personal_best(&mut self) {
        self.personal_best = None;
    }

    /// Resample every parameter from its distribution
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for parameter in &mut self.parameters {
            parameter.reinitialize(rng);
        }
    }

    fn scatter<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for parameter in &mut self.parameters {
            let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            parameter.set_velocity(sign * rng.gen::<f64>() * parameter.velocity_limit());
            let candidate = parameter.value() + parameter.velocity();
            parameter.update_and_bound(candidate, rng);
        }
    }

    fn follow<R: Rng + ?Sized>(
        &mut self,
        coefficients: &Coefficients,
        personal_best: &BestDiscoveredSolution<O>,
        swarm_best: Option<&BestDiscoveredSolution<O>>,
        rng: &mut R,
    ) {
        for (i, parameter) in self.parameters.iter_mut().enumerate() {
            let x = parameter.value();
            let toward_personal = personal_best.parameters()[i].value() - x;
            let toward_swarm = swarm_best.map_or(0.0, |best| best.parameters()[i].value() - x);

            let r1: f64 = rng.gen();
            let r2: f64 = rng.gen();
            let velocity = coefficients.inertia * parameter.velocity()
                + r1 * coefficients.cognitive * toward_personal
                + r2 * coefficients.social * toward_swarm;

            parameter.set_velocity(velocity);
            parameter.update_and_bound(x + parameter.velocity(), rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ThresholdOutput;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle_at(values: &[f64], limit: f64, rng: &mut StdRng) -> Particle<ThresholdOutput> {
        let parameters = values
            .iter()
            .map(|&v| {
                let mut p = ParticleParameter::new(Parameter::continuous(-100.0, 100.0).unwrap());
                p.update_and_bound(v, rng);
                p.set_velocity_limit(limit);
                p
            })
            .collect();
        Particle::new(parameters)
    }

    #[test]
    fn velocity_is_clamped_not_rejected() {
        let mut p = ParticleParameter::new(Parameter::continuous(0.0, 10.0).unwrap());
        p.set_velocity_limit(0.5);
        p.set_velocity(3.0);
        assert_eq!(p.velocity(), 0.5);
        p.set_velocity(-3.0);
        assert_eq!(p.velocity(), -0.5);
        p.set_velocity(0.25);
        assert_eq!(p.velocity(), 0.25);
        p.set_velocity_limit(0.1);
        assert_eq!(p.velocity(), 0.1);
    }

    #[test]
    fn loaded_velocity_is_clamped_to_limit() {
        let json = r#"{
            "parameter": {"domain": {"Continuous": {"lower": 0.0, "upper": 10.0}}, "value": 4.0},
            "velocity": -7.5,
            "velocity_limit": 2.0
        }"#;
        let p: ParticleParameter = serde_json::from_str(json).unwrap();
        assert_eq!(p.velocity_limit(), 2.0);
        assert_eq!(p.velocity(), -2.0);
    }

    #[test]
    fn velocity_limits_by_kind() {
        let continuous = ParticleParameter::new(Parameter::continuous(0.0, 50.0).unwrap());
        let integer = ParticleParameter::new(Parameter::integer(0, 50).unwrap());
        let categorical = ParticleParameter::new(Parameter::categorical(["a", "b", "c"]).unwrap());
        assert_eq!(velocity_limit_for(&continuous, 0.1), 5.0);
        assert_eq!(velocity_limit_for(&integer, 0.1), 1.0);
        assert_eq!(velocity_limit_for(&categorical, 0.1), 1.0);
    }

    #[test]
    fn first_update_records_valid_output_and_scatters() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut particle = particle_at(&[10.0, -10.0], 2.0, &mut rng);
        let before = particle.position();

        particle.update(
            &Coefficients::default(),
            None,
            &ThresholdOutput::new(4.0, 0.0),
            &mut rng,
        );

        let best = particle.personal_best().expect("personal best set");
        assert_eq!(best.parameters(), before.as_slice());
        for (p, old) in particle.parameters().iter().zip(&before) {
            assert!((p.value() - old.value()).abs() <= 2.0);
            assert!(p.velocity().abs() <= 2.0);
        }
    }

    #[test]
    fn first_update_skips_invalid_output() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut particle = particle_at(&[1.0], 1.0, &mut rng);
        particle.update(
            &Coefficients::default(),
            None,
            &ThresholdOutput::new(f64::INFINITY, 0.0),
            &mut rng,
        );
        assert!(particle.personal_best().is_none());
    }

    #[test]
    fn worse_output_keeps_personal_best() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut particle = particle_at(&[5.0], 1.0, &mut rng);
        let coefficients = Coefficients::default();

        particle.update(&coefficients, None, &ThresholdOutput::new(1.0, 0.0), &mut rng);
        let first = particle.personal_best().cloned().unwrap();

        particle.update(&coefficients, Some(&first), &ThresholdOutput::new(3.0, 0.0), &mut rng);
        assert_eq!(particle.personal_best(), Some(&first));

        particle.update(&coefficients, Some(&first), &ThresholdOutput::new(0.5, 0.0), &mut rng);
        assert_eq!(particle.personal_best().unwrap().output().value, 0.5);
    }

    #[test]
    fn better_output_replaces_personal_best_regardless_of_restraints() {
        let mut rng = StdRng::seed_from_u64(26);
        let mut particle = particle_at(&[5.0], 1.0, &mut rng);
        let coefficients = Coefficients::default();

        particle.update(&coefficients, None, &ThresholdOutput::new(5.0, -1e9), &mut rng);
        let first = particle.personal_best().cloned().unwrap();

        let unrestrained = ThresholdOutput::new(f64::NEG_INFINITY, -1e9);
        assert!(!unrestrained.is_within_restraints());
        let position = particle.position();
        particle.update(&coefficients, Some(&first), &unrestrained, &mut rng);

        let best = particle.personal_best().unwrap();
        assert_eq!(best.output().value, f64::NEG_INFINITY);
        assert_eq!(best.parameters(), position.as_slice());
    }

    #[test]
    fn social_term_moves_between_position_and_swarm_best() {
        let mut rng = StdRng::seed_from_u64(24);
        let social_only = Coefficients {
            inertia: 0.0,
            cognitive: 0.0,
            social: 1.0,
        };
        let target = BestDiscoveredSolution::new(
            particle_at(&[50.0], 1.0, &mut rng).position(),
            ThresholdOutput::new(0.0, -1.0),
        );
        let mut particle = particle_at(&[-50.0], 200.0, &mut rng);

        particle.update(&social_only, Some(&target), &ThresholdOutput::new(9.0, -1.0), &mut rng);
        let start = particle.parameters()[0].value();
        particle.update(&social_only, Some(&target), &ThresholdOutput::new(9.0, -1.0), &mut rng);
        let moved = particle.parameters()[0].value();

        assert!(moved >= start.min(50.0) - 1e-9 && moved <= start.max(50.0) + 1e-9);
    }

    #[test]
    fn reset_clears_personal_best() {
        let mut rng = StdRng::seed_from_u64(25);
        let mut particle = particle_at(&[0.0], 1.0, &mut rng);
        particle.update(&Coefficients::default(), None, &ThresholdOutput::new(1.0, 0.0), &mut rng);
        assert!(particle.personal_best().is_some());
        particle.reset_personal_best();
        assert!(particle.personal_best().is_none());
    }

    proptest! {
        #[test]
        fn velocity_never_exceeds_limit(
            limit in 0f64..1e3,
            writes in proptest::collection::vec(-1e6f64..1e6, 1..32),
        ) {
            let mut p = ParticleParameter::new(Parameter::continuous(0.0, 1.0).unwrap());
            p.set_velocity_limit(limit);
            for v in writes {
                p.set_velocity(v);
                prop_assert!(p.velocity().abs() <= p.velocity_limit());
            }
        }
    }
}
