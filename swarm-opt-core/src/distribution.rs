//! Sampling distributions
//!
//! A [`Distribution`] turns a center and a spread into a random value. It is
//! stateless: the caller owns the random source and passes it in.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Ratio between a parameter's spread and the Gaussian standard deviation,
/// so that three sigma on either side of the center covers the range.
pub const GAUSSIAN_SPREAD_PER_STD_DEV: f64 = 6.0;

/// Numeric representation a sampled value is cast to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Kept as is
    Real,
    /// Rounded to the nearest integer
    Integral,
}

impl ValueKind {
    /// Apply the cast rule to `value`
    pub fn cast(self, value: f64) -> f64 {
        match self {
            ValueKind::Real => value,
            ValueKind::Integral => value.round(),
        }
    }
}

/// Random distribution used to (re)initialize parameter values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    /// Uniform over `[center - spread/2, center + spread/2]`
    #[default]
    Uniform,
    /// Normal around `center` with standard deviation `spread / 6`
    Gaussian,
}

impl Distribution {
    /// Draw a value around `center` and cast it according to `kind`.
    ///
    /// A zero spread returns the cast center without consuming randomness,
    /// which is how bounded updates reuse the cast rule.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        center: f64,
        spread: f64,
        kind: ValueKind,
    ) -> f64 {
        if spread == 0.0 {
            return kind.cast(center);
        }

        let raw = match self {
            Distribution::Uniform => center + spread * rng.gen_range(-0.5..=0.5),
            Distribution::Gaussian => {
                let z: f64 = rng.sample(StandardNormal);
                center + z * spread / GAUSSIAN_SPREAD_PER_STD_DEV
            }
        };
        kind.cast(raw)
    }
}
