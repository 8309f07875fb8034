//! # SwarmOpt Core
//!
//! Particle swarm optimization engine for SwarmOpt.
//!
//! This crate provides:
//! - Bounded parameters over continuous, integer and categorical domains
//! - Pluggable sampling distributions for (re)initialization
//! - Particles with velocity-clamped position updates and personal bests
//! - A swarm coordinator with stagnation restarts and time-bounded runs
//!
//! The cost function is supplied by the caller through [`traits::CostFunction`];
//! its output decides ordering, validity and the stopping criterion through
//! [`traits::CostOutput`].

#![forbid(unsafe_code)]

pub mod distribution;
pub mod parameter;
pub mod particle;
pub mod solution;
pub mod swarm;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::distribution::*;
    pub use crate::parameter::*;
    pub use crate::particle::*;
    pub use crate::solution::*;
    pub use crate::swarm::*;
    pub use crate::traits::*;
    pub use crate::{Error, Result};
}

/// Result type for SwarmOpt operations
pub type Result<T> = core::result::Result<T, Error>;

/// A categorical index that has no label in the parameter's category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no category encoded as {encoded} (table holds {categories} labels)")]
pub struct DecodeError {
    /// The index that failed to decode
    pub encoded: i64,
    /// Number of labels in the table (0 for numeric parameters)
    pub categories: usize,
}

/// Error type for SwarmOpt core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parameter bounds are inverted or not finite
    #[error("invalid bounds: lower {lower} must be finite and not exceed upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
    /// A stored value lies outside its parameter's domain
    #[error("value {value} is not a valid point of [{lower}, {upper}]")]
    InvalidValue { value: f64, lower: f64, upper: f64 },
    /// A categorical parameter was declared without labels
    #[error("categorical parameter needs at least one label")]
    EmptyCategories,
    /// The same label was given twice
    #[error("duplicate category label {0:?}")]
    DuplicateCategory(String),
    /// Decoding a categorical index failed
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Swarm configuration rejected at construction
    #[error("invalid swarm configuration: {0}")]
    InvalidConfig(&'static str),
    /// The cost function reported a failure
    #[error("cost function evaluation failed: {0}")]
    CostFunction(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// No output within restraints was ever observed
    #[error("no solution within restraints was found")]
    NoSolution,
}
