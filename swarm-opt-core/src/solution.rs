//! Best discovered solutions
//!
//! Snapshots pairing a parameter vector with the output it produced.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::parameter::Parameter;
use crate::traits::CostOutput;

/// Immutable snapshot of a parameter vector and its cost-function output.
///
/// The parameters are an owned copy taken when the snapshot was made; later
/// moves of the particle that produced them do not affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestDiscoveredSolution<O> {
    parameters: Vec<Parameter>,
    output: O,
}

impl<O> BestDiscoveredSolution<O> {
    pub fn new(parameters: Vec<Parameter>, output: O) -> Self {
        Self { parameters, output }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Numeric values of the parameters, in order
    pub fn values(&self) -> Vec<f64> {
        self.parameters.iter().map(Parameter::value).collect()
    }

    pub fn into_parts(self) -> (Vec<Parameter>, O) {
        (self.parameters, self.output)
    }
}

impl<O: CostOutput> BestDiscoveredSolution<O> {
    /// Whether this solution's output beats `other`'s
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.output.is_better_than(&other.output)
    }
}

impl<O: fmt::Display> fmt::Display for BestDiscoveredSolution<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parameters: ")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, " {}", self.output)
    }
}
