//! Bounded decision variables
//!
//! A [`Parameter`] models one decision variable: its [`Domain`], the sampling
//! envelope derived from its bounds, the live value, and the policy applied
//! when an update would leave the bounds.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, ValueKind};
use crate::traits::BoundedVariable;
use crate::{DecodeError, Error, Result};

/// Kind of domain a parameter ranges over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    Continuous,
    Integer,
    Categorical,
}

/// Ordered label table of a categorical parameter.
///
/// Insertion order defines the encoding: the first label is `0`, the next `1`
/// and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategoryTable {
    labels: Vec<String>,
    index: HashMap<String, i64>,
}

impl CategoryTable {
    /// Build a table from labels in encoding order
    pub fn new<I>(labels: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let labels: Vec<String> = labels.into_iter().map(|l| l.to_string()).collect();
        if labels.is_empty() {
            return Err(Error::EmptyCategories);
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i as i64).is_some() {
                return Err(Error::DuplicateCategory(label.clone()));
            }
        }
        Ok(Self { labels, index })
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; a table holds at least one label
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in encoding order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Encoded index of `label`
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.index.get(label).copied()
    }

    /// Label whose encoded index is `encoded`
    pub fn decode(&self, encoded: i64) -> core::result::Result<&str, DecodeError> {
        usize::try_from(encoded)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
            .ok_or(DecodeError {
                encoded,
                categories: self.labels.len(),
            })
    }
}

impl TryFrom<Vec<String>> for CategoryTable {
    type Error = Error;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<CategoryTable> for Vec<String> {
    fn from(table: CategoryTable) -> Self {
        table.labels
    }
}

/// Domain of a parameter.
///
/// The label table is immutable once built, so snapshots share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    Continuous { lower: f64, upper: f64 },
    Integer { lower: i64, upper: i64 },
    Categorical(Arc<CategoryTable>),
}

impl Domain {
    /// Kind tag of this domain
    pub fn kind(&self) -> ParameterKind {
        match self {
            Domain::Continuous { .. } => ParameterKind::Continuous,
            Domain::Integer { .. } => ParameterKind::Integer,
            Domain::Categorical(_) => ParameterKind::Categorical,
        }
    }

    /// Numeric bounds; categorical bounds are the encoded range `0..=N-1`
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Domain::Continuous { lower, upper } => (*lower, *upper),
            Domain::Integer { lower, upper } => (*lower as f64, *upper as f64),
            Domain::Categorical(table) => (0.0, (table.len() - 1) as f64),
        }
    }

    /// Cast rule for values in this domain
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Domain::Continuous { .. } => ValueKind::Real,
            Domain::Integer { .. } | Domain::Categorical(_) => ValueKind::Integral,
        }
    }

    fn validate(&self) -> Result<()> {
        let (lower, upper) = self.bounds();
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(Error::InvalidBounds { lower, upper });
        }
        Ok(())
    }
}

/// Numeric types accepted as parameter bounds.
///
/// Floating point bounds produce a continuous parameter, integer bounds an
/// integer parameter.
pub trait NumericBound: Copy {
    fn into_domain(lower: Self, upper: Self) -> Domain;
}

impl NumericBound for f64 {
    fn into_domain(lower: Self, upper: Self) -> Domain {
        Domain::Continuous { lower, upper }
    }
}

impl NumericBound for f32 {
    fn into_domain(lower: Self, upper: Self) -> Domain {
        Domain::Continuous {
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

impl NumericBound for i64 {
    fn into_domain(lower: Self, upper: Self) -> Domain {
        Domain::Integer { lower, upper }
    }
}

impl NumericBound for i32 {
    fn into_domain(lower: Self, upper: Self) -> Domain {
        Domain::Integer {
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

impl NumericBound for u32 {
    fn into_domain(lower: Self, upper: Self) -> Domain {
        Domain::Integer {
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

/// One bounded decision variable
///
/// Deserialization goes through the same checks as construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterRepr", into = "ParameterRepr")]
pub struct Parameter {
    domain: Domain,
    center: f64,
    spread: f64,
    value: f64,
    distribution: Distribution,
    reinitialize_on_out_of_bounds: bool,
}

impl Parameter {
    /// Create a parameter from numeric bounds; the bound type picks the kind.
    ///
    /// ```
    /// use swarm_opt_core::parameter::{Parameter, ParameterKind};
    ///
    /// assert_eq!(Parameter::new(0.0, 10.0).unwrap().kind(), ParameterKind::Continuous);
    /// assert_eq!(Parameter::new(0, 100).unwrap().kind(), ParameterKind::Integer);
    /// assert!(Parameter::new(5, 1).is_err());
    /// ```
    pub fn new<T: NumericBound>(lower: T, upper: T) -> Result<Self> {
        Self::from_domain(T::into_domain(lower, upper))
    }

    /// Continuous parameter in `[lower, upper]`
    pub fn continuous(lower: f64, upper: f64) -> Result<Self> {
        Self::new(lower, upper)
    }

    /// Integer parameter in `[lower, upper]`
    pub fn integer(lower: i64, upper: i64) -> Result<Self> {
        Self::new(lower, upper)
    }

    /// Categorical parameter over `labels`, encoded in iteration order.
    ///
    /// Anything with a `Display` impl works, so enum variants can be passed
    /// directly.
    pub fn categorical<I>(labels: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        Self::from_domain(Domain::Categorical(Arc::new(CategoryTable::new(labels)?)))
    }

    /// Create a parameter over an explicit domain.
    ///
    /// The initial value is drawn uniformly from the bounds.
    pub fn from_domain(domain: Domain) -> Result<Self> {
        let mut parameter = Self::centered(domain)?;
        parameter.reinitialize(&mut rand::thread_rng());
        Ok(parameter)
    }

    // Validated parameter sitting at the center of its bounds
    fn centered(domain: Domain) -> Result<Self> {
        domain.validate()?;
        let (lower, upper) = domain.bounds();
        let spread = upper - lower;
        let center = lower + spread / 2.0;

        Ok(Self {
            domain,
            center,
            spread,
            value: center,
            distribution: Distribution::default(),
            reinitialize_on_out_of_bounds: false,
        })
    }

    /// Use `distribution` for later reinitializations
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Resample instead of clamping when an update leaves the bounds
    pub fn reinitialize_on_out_of_bounds(mut self) -> Self {
        self.reinitialize_on_out_of_bounds = true;
        self
    }

    pub fn kind(&self) -> ParameterKind {
        self.domain.kind()
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn lower_bound(&self) -> f64 {
        self.domain.bounds().0
    }

    pub fn upper_bound(&self) -> f64 {
        self.domain.bounds().1
    }

    /// Midpoint of the bounds
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Width of the bounds
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Current value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Current value as an integer (exact for integer and categorical kinds)
    pub fn value_as_i64(&self) -> i64 {
        self.value.round() as i64
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn reinitializes_on_out_of_bounds(&self) -> bool {
        self.reinitialize_on_out_of_bounds
    }

    /// Resample the value from the bound distribution
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        self.value = self.sample_envelope(rng);
        self
    }

    /// Bind `distribution` and resample the value from it
    pub fn reinitialize_with<R: Rng + ?Sized>(
        &mut self,
        distribution: Distribution,
        rng: &mut R,
    ) -> &mut Self {
        self.distribution = distribution;
        self.reinitialize(rng)
    }

    /// Move the value to `candidate`, enforcing bounds and the cast rule.
    ///
    /// Out of range candidates either resample the whole envelope or snap to
    /// the violated bound, depending on the out-of-bounds policy. A NaN
    /// candidate has no bound to snap to and always resamples.
    pub fn update_and_bound<R: Rng + ?Sized>(&mut self, candidate: f64, rng: &mut R) {
        let (lower, upper) = self.domain.bounds();
        let kind = self.domain.value_kind();

        self.value = if candidate.is_nan() {
            self.sample_envelope(rng)
        } else if candidate < lower || candidate > upper {
            if self.reinitialize_on_out_of_bounds {
                self.sample_envelope(rng)
            } else {
                let bound = if candidate < lower { lower } else { upper };
                self.distribution.sample(rng, bound, 0.0, kind)
            }
        } else {
            self.distribution.sample(rng, candidate, 0.0, kind)
        };
    }

    /// Category table, for categorical parameters
    pub fn categories(&self) -> Option<&CategoryTable> {
        match &self.domain {
            Domain::Categorical(table) => Some(table),
            _ => None,
        }
    }

    /// Label encoded as `encoded`
    pub fn decode(&self, encoded: i64) -> core::result::Result<&str, DecodeError> {
        match &self.domain {
            Domain::Categorical(table) => table.decode(encoded),
            _ => Err(DecodeError {
                encoded,
                categories: 0,
            }),
        }
    }

    /// Encoded index of `label`
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.categories().and_then(|table| table.encode(label))
    }

    /// Label of the current value, for categorical parameters
    pub fn label(&self) -> Option<&str> {
        self.decode(self.value_as_i64()).ok()
    }

    // Gaussian tails can reach past the bounds, so the draw is clamped.
    fn sample_envelope<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (lower, upper) = self.domain.bounds();
        self.distribution
            .sample(rng, self.center, self.spread, self.domain.value_kind())
            .clamp(lower, upper)
    }
}

/// Stored form of a [`Parameter`]; center and spread are derived on load
#[derive(Serialize, Deserialize)]
struct ParameterRepr {
    domain: Domain,
    value: f64,
    #[serde(default)]
    distribution: Distribution,
    #[serde(default)]
    reinitialize_on_out_of_bounds: bool,
}

impl TryFrom<ParameterRepr> for Parameter {
    type Error = Error;

    fn try_from(repr: ParameterRepr) -> Result<Self> {
        let mut parameter = Self::centered(repr.domain)?;
        let (lower, upper) = parameter.domain.bounds();
        let value = repr.value;
        let castable = parameter.domain.value_kind().cast(value) == value;
        if !(lower..=upper).contains(&value) || !castable {
            return Err(Error::InvalidValue {
                value,
                lower,
                upper,
            });
        }

        parameter.value = value;
        parameter.distribution = repr.distribution;
        parameter.reinitialize_on_out_of_bounds = repr.reinitialize_on_out_of_bounds;
        Ok(parameter)
    }
}

impl From<Parameter> for ParameterRepr {
    fn from(parameter: Parameter) -> Self {
        Self {
            domain: parameter.domain,
            value: parameter.value,
            distribution: parameter.distribution,
            reinitialize_on_out_of_bounds: parameter.reinitialize_on_out_of_bounds,
        }
    }
}

impl BoundedVariable for Parameter {
    fn parameter(&self) -> &Parameter {
        self
    }

    fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        Parameter::reinitialize(self, rng);
    }

    fn update_and_bound<R: Rng + ?Sized>(&mut self, candidate: f64, rng: &mut R) {
        Parameter::update_and_bound(self, candidate, rng);
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ParameterKind::Continuous => write!(f, "{}", self.value),
            ParameterKind::Integer => write!(f, "{}", self.value_as_i64()),
            ParameterKind::Categorical => match self.label() {
                Some(label) => f.write_str(label),
                None => write!(f, "#{}", self.value_as_i64()),
            },
        }
    }
}
