//! End-to-end optimization runs over each parameter kind.

use std::fmt;
use std::time::{Duration, Instant};

use swarm_opt::benchmarks::sphere;
use swarm_opt::prelude::*;

/// Lower `value` is better; satisfied only by odd `x` of at least 97.
#[derive(Debug, Clone, Copy)]
struct OddCeiling {
    x: i64,
    value: f64,
}

impl CostOutput for OddCeiling {
    fn is_better_than(&self, other: &Self) -> bool {
        self.value < other.value
    }

    fn satisfies_criterion(&self) -> bool {
        self.x % 2 == 1 && self.x >= 97
    }
}

impl fmt::Display for OddCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Satisfied only by an exact zero.
#[derive(Debug, Clone, Copy)]
struct ExactZero(f64);

impl CostOutput for ExactZero {
    fn is_better_than(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    fn satisfies_criterion(&self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for ExactZero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[test]
fn continuous_parabola_converges_to_minimum() {
    let cost = |params: &[Parameter]| {
        let x = params[0].value();
        ThresholdOutput::new((x - 7.0).powi(2), 0.01)
    };

    let result = swarm_opt::builder()
        .particles(30)
        .max_generations(1000)
        .max_velocity_fraction(0.1)
        .seed(11)
        .optimize(vec![Parameter::continuous(0.0, 10.0).unwrap()], &cost)
        .unwrap();

    let best = result.into_solution().unwrap();
    let x = best.values()[0];
    assert!((x - 7.0).abs() < 0.2, "x = {x}");
    assert!((0.0..=10.0).contains(&x));
}

#[test]
fn integer_search_reaches_upper_odd_values() {
    let cost = |params: &[Parameter]| {
        let x = params[0].value_as_i64();
        OddCeiling {
            x,
            value: (100 - x) as f64,
        }
    };

    let result = swarm_opt::builder()
        .particles(30)
        .max_generations(1000)
        .seed(23)
        .optimize(vec![Parameter::integer(0, 100).unwrap()], &cost)
        .unwrap();

    let best = result.into_solution().unwrap();
    let x = best.parameters()[0].value();
    assert_eq!(x, x.round());
    assert!(100.0 - x < 4.0, "x = {x}");
}

#[test]
fn categorical_search_finds_label() {
    let cost = |params: &[Parameter]| match params[0].label() {
        Some("b") => ExactZero(0.0),
        _ => ExactZero(1.0),
    };

    let result = swarm_opt::builder()
        .particles(10)
        .max_generations(200)
        .seed(5)
        .optimize(vec![Parameter::categorical(["a", "b", "c"]).unwrap()], &cost)
        .unwrap();

    assert_eq!(result.termination(), Termination::CriterionSatisfied);
    let best = result.into_solution().unwrap();
    assert_eq!(best.parameters()[0].label(), Some("b"));
    assert_eq!(best.to_string(), "Parameters: b 0");
}

#[test]
fn empty_swarm_is_rejected_up_front() {
    let template = || vec![Parameter::continuous(0.0, 1.0).unwrap()];

    let no_particles = swarm_opt::builder()
        .particles(0)
        .build_swarm::<ThresholdOutput>(template());
    assert!(matches!(no_particles, Err(Error::InvalidConfig(_))));

    let no_generations = swarm_opt::builder()
        .max_generations(0)
        .build_swarm::<ThresholdOutput>(template());
    assert!(matches!(no_generations, Err(Error::InvalidConfig(_))));
}

#[test]
fn time_budget_stops_unsatisfiable_run() {
    let cost = |params: &[Parameter]| {
        let x: Vec<f64> = params.iter().map(Parameter::value).collect();
        ThresholdOutput::new(sphere(&x), f64::NEG_INFINITY)
    };
    let budget = Duration::from_millis(200);

    let started = Instant::now();
    let result = swarm_opt::builder()
        .particles(10)
        .max_generations(50)
        .time_budget(budget)
        .seed(3)
        .optimize(
            vec![
                Parameter::continuous(-5.0, 5.0).unwrap(),
                Parameter::continuous(-5.0, 5.0).unwrap(),
            ],
            &cost,
        )
        .unwrap();
    let wall = started.elapsed();

    assert_eq!(result.termination(), Termination::TimeBudgetExhausted);
    assert!(!result.is_satisfied());
    assert!(result.elapsed() >= budget);
    assert!(wall < Duration::from_secs(5), "took {wall:?}");
    assert!(result.generations() > 50, "generation loop was not re-entered");
    assert!(result.best().is_some());
}

#[test]
fn categorical_benchmark_runs_to_a_labelled_solution() {
    let benchmark = swarm_opt::benchmarks::CategoricalBenchmark::default();

    let result = swarm_opt::builder()
        .particles(20)
        .max_generations(100)
        .seed(17)
        .optimize(
            swarm_opt::benchmarks::CategoricalBenchmark::template().unwrap(),
            &benchmark,
        )
        .unwrap();

    let best = result.into_solution().unwrap();
    let label = best.parameters()[0].label().unwrap();
    assert!(label.parse::<swarm_opt::benchmarks::BenchmarkFunction>().is_ok());
    assert!(best.output().value.is_finite());
}

#[test]
fn config_loads_from_json_with_defaults() {
    let config: SwarmConfig =
        serde_json::from_str(r#"{ "num_particles": 8, "seed": 99 }"#).unwrap();

    assert_eq!(config.num_particles, 8);
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.max_generations, SwarmConfig::default().max_generations);
    assert!(config.validate().is_ok());
}
