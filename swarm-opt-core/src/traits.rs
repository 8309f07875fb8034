//! Core traits for SwarmOpt
//!
//! These traits define the seams between the engine and the caller: the cost
//! function, the output it produces, and the bounded variables it reads.

use core::convert::Infallible;
use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::parameter::{Parameter, ParameterKind};

/// Result of evaluating a cost function.
///
/// The output owns the notion of "better": the engine never inspects a scalar
/// cost, it only asks these predicates.
pub trait CostOutput: Clone + fmt::Display {
    /// Whether `self` (the candidate) strictly beats `other` (the incumbent).
    /// Ties must return `false`.
    fn is_better_than(&self, other: &Self) -> bool;

    /// Whether the search may stop at this output
    fn satisfies_criterion(&self) -> bool;

    /// Validity predicate independent of the stopping criterion
    fn is_within_restraints(&self) -> bool {
        true
    }
}

/// A function scored over a parameter vector
pub trait CostFunction {
    /// The output type
    type Output: CostOutput;
    /// Failure raised by an evaluation; it aborts the optimization
    type Error: std::error::Error + Send + Sync + 'static;

    /// Score `parameters`. Should be a pure function of the parameter values.
    fn evaluate(&self, parameters: &[Parameter]) -> Result<Self::Output, Self::Error>;
}

impl<F, O> CostFunction for F
where
    F: Fn(&[Parameter]) -> O,
    O: CostOutput,
{
    type Output = O;
    type Error = Infallible;

    fn evaluate(&self, parameters: &[Parameter]) -> Result<O, Infallible> {
        Ok(self(parameters))
    }
}

/// Numeric domain with bounds and randomized (re)initialization.
///
/// Implemented by [`Parameter`] and by wrappers that embed one.
pub trait BoundedVariable {
    /// The embedded parameter
    fn parameter(&self) -> &Parameter;

    /// Resample the value from the parameter's distribution
    fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Move the value to `candidate` within bounds
    fn update_and_bound<R: Rng + ?Sized>(&mut self, candidate: f64, rng: &mut R);

    fn kind(&self) -> ParameterKind {
        self.parameter().kind()
    }

    fn bounds(&self) -> (f64, f64) {
        self.parameter().domain().bounds()
    }

    fn value(&self) -> f64 {
        self.parameter().value()
    }

    /// Width of the bounds
    fn range(&self) -> f64 {
        let (lower, upper) = self.bounds();
        upper - lower
    }
}

/// Scalar minimization output that stops below a threshold.
///
/// Lower values are better; non-finite values are outside restraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOutput {
    /// Cost value
    pub value: f64,
    /// Stop once `value` drops strictly below this
    pub threshold: f64,
}

impl ThresholdOutput {
    pub fn new(value: f64, threshold: f64) -> Self {
        Self { value, threshold }
    }
}

impl CostOutput for ThresholdOutput {
    fn is_better_than(&self, other: &Self) -> bool {
        self.value < other.value
    }

    fn satisfies_criterion(&self) -> bool {
        self.value < self.threshold
    }

    fn is_within_restraints(&self) -> bool {
        self.value.is_finite()
    }
}

impl fmt::Display for ThresholdOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
