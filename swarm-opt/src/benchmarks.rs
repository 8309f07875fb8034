//! Benchmark cost functions
//!
//! Classic two-dimensional test functions, and a [`CategoricalBenchmark`]
//! whose first parameter picks which of them to minimize. Handy for demos
//! and for exercising mixed categorical/continuous search.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CostFunction, DecodeError, Parameter, ThresholdOutput};

/// Sum of squares, minimum 0 at the origin
pub fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Minimum about -1.9133 at (-0.547, -1.547)
pub fn mccormick(x: f64, y: f64) -> f64 {
    (x + y).sin() + (x - y).powi(2) - 1.5 * x + 2.5 * y + 1.0
}

/// Minimum 0 at (3, 0.5)
pub fn beale(x: f64, y: f64) -> f64 {
    (1.5 - x + x * y).powi(2)
        + (2.25 - x + x * y.powi(2)).powi(2)
        + (2.625 - x + x * y.powi(3)).powi(2)
}

/// Four minima of 0, one at (3, 2)
pub fn himmelblau(x: f64, y: f64) -> f64 {
    (x.powi(2) + y - 11.0).powi(2) + (x + y.powi(2) - 7.0).powi(2)
}

/// Minimum about -959.64 at (512, 404.23)
pub fn eggholder(x: f64, y: f64) -> f64 {
    -(y + 47.0) * (x / 2.0 + y + 47.0).abs().sqrt().sin() - x * (x - y - 47.0).abs().sqrt().sin()
}

/// Four minima of about -2.0626 at (±1.349, ±1.349)
pub fn cross_in_tray(x: f64, y: f64) -> f64 {
    let inner = (x.sin() * y.sin() * (100.0 - x.hypot(y) / PI).abs().exp()).abs() + 1.0;
    -0.0001 * inner.powf(0.1)
}

/// Four minima of about -19.2085 at (±8.055, ±9.665)
pub fn holder_table(x: f64, y: f64) -> f64 {
    -(x.sin() * y.cos() * (1.0 - x.hypot(y) / PI).abs().exp()).abs()
}

/// Two-dimensional test functions selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkFunction {
    McCormick,
    Beale,
    Himmelblau,
    Eggholder,
    CrossInTray,
    HolderTable,
}

impl BenchmarkFunction {
    /// All functions, in label order
    pub const ALL: [BenchmarkFunction; 6] = [
        BenchmarkFunction::McCormick,
        BenchmarkFunction::Beale,
        BenchmarkFunction::Himmelblau,
        BenchmarkFunction::Eggholder,
        BenchmarkFunction::CrossInTray,
        BenchmarkFunction::HolderTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BenchmarkFunction::McCormick => "mccormick",
            BenchmarkFunction::Beale => "beale",
            BenchmarkFunction::Himmelblau => "himmelblau",
            BenchmarkFunction::Eggholder => "eggholder",
            BenchmarkFunction::CrossInTray => "crossintray",
            BenchmarkFunction::HolderTable => "holdertable",
        }
    }

    pub fn evaluate(self, x: f64, y: f64) -> f64 {
        match self {
            BenchmarkFunction::McCormick => mccormick(x, y),
            BenchmarkFunction::Beale => beale(x, y),
            BenchmarkFunction::Himmelblau => himmelblau(x, y),
            BenchmarkFunction::Eggholder => eggholder(x, y),
            BenchmarkFunction::CrossInTray => cross_in_tray(x, y),
            BenchmarkFunction::HolderTable => holder_table(x, y),
        }
    }
}

impl fmt::Display for BenchmarkFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BenchmarkFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| format!("unknown benchmark function {s:?}"))
    }
}

/// Minimizes one of the [`BenchmarkFunction`]s, chosen by a categorical
/// first parameter, over continuous `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoricalBenchmark {
    /// Stop once a value drops below this
    pub threshold: f64,
}

impl CategoricalBenchmark {
    /// Holder table's minimum is the lowest of the set
    pub const HOLDER_TABLE_TARGET: f64 = -19.208;

    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Parameter template: function label, then `x` and `y` in `[-10, 10]`
    pub fn template() -> crate::Result<Vec<Parameter>> {
        Ok(vec![
            Parameter::categorical(BenchmarkFunction::ALL)?,
            Parameter::continuous(-10.0, 10.0)?,
            Parameter::continuous(-10.0, 10.0)?,
        ])
    }
}

impl Default for CategoricalBenchmark {
    fn default() -> Self {
        Self::new(Self::HOLDER_TABLE_TARGET)
    }
}

impl CostFunction for CategoricalBenchmark {
    type Output = ThresholdOutput;
    type Error = DecodeError;

    fn evaluate(&self, parameters: &[Parameter]) -> Result<ThresholdOutput, DecodeError> {
        let selector = &parameters[0];
        let label = selector.decode(selector.value_as_i64())?;
        let function: BenchmarkFunction = label.parse().map_err(|_| DecodeError {
            encoded: selector.value_as_i64(),
            categories: BenchmarkFunction::ALL.len(),
        })?;

        let value = function.evaluate(parameters[1].value(), parameters[2].value());
        Ok(ThresholdOutput::new(value, self.threshold))
    }
}
