//! Optimization configuration.
//!
//! A single owned [`OptimizerConfig`] value is threaded through one
//! optimization call; it is read-only for the duration of the call (§5
//! "Shared-resource policy"). Built with the crate's usual `with_*` builder
//! pattern.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Distance-matrix source (§4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatrixBackend {
    /// Closed-form great-circle distance. Deterministic, total, no I/O.
    Haversine,
    /// Batched HTTP calls to a road-network table service.
    RoadNetwork {
        base_url: String,
        #[serde(with = "duration_secs")]
        request_timeout: Duration,
    },
}

impl Default for MatrixBackend {
    fn default() -> Self {
        MatrixBackend::Haversine
    }
}

/// Route-building engine selector (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    NearestNeighbor,
    OrTools,
    Genetic,
}

/// Genetic-algorithm engine parameters (§4.5, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// Interpreted as a fraction: `elite_size as f64 / population_size as f64`
    /// (§9 Open Question, fixed by this spec).
    pub elite_size: usize,
    pub timeout_s: u64,
    /// Host-supplied PRNG seed; `None` draws a fresh seed per call.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            generations: 200,
            mutation_rate: 0.2,
            crossover_rate: 0.8,
            elite_size: 6,
            timeout_s: 30,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    pub fn with_timeout_s(mut self, secs: u64) -> Self {
        self.timeout_s = secs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Elitism as a fraction of the population (§9 Open Question #3).
    pub fn elitism_fraction(&self) -> f64 {
        if self.population_size == 0 {
            0.0
        } else {
            self.elite_size as f64 / self.population_size as f64
        }
    }
}

/// Constraint-programming engine parameters (§4.4, §4.6, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpConfig {
    pub time_limit: Duration,
    /// When multiple depots are present, formulate one joint model instead
    /// of one model per depot (§4.6 "Joint-CP mode").
    pub joint_multi_depot: bool,
}

impl Default for CpConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
            joint_multi_depot: false,
        }
    }
}

impl CpConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_joint_multi_depot(mut self, joint: bool) -> Self {
        self.joint_multi_depot = joint;
        self
    }

    /// Default single-depot time limit per §4.4.
    pub fn single_depot_default() -> Duration {
        Duration::from_secs(30)
    }

    /// Default multi-depot time limit per §4.4.
    pub fn multi_depot_default() -> Duration {
        Duration::from_secs(60)
    }
}

/// Top-level configuration for one optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub matrix_backend: MatrixBackend,
    pub algorithm: Algorithm,
    pub ga: GaConfig,
    pub cp: CpConfig,
    /// §9 Open Question #1: whether every courier is eligible each call
    /// (`true`, default) or only couriers the caller has pre-filtered to
    /// "free" ones (`false`, no behavior difference at this layer — the
    /// filtering happens in the caller's snapshot before the call).
    pub release_all_couriers: bool,
    /// Optional `depot_id` filter (§6): restrict optimization to one depot.
    pub depot_filter: Option<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            matrix_backend: MatrixBackend::default(),
            algorithm: Algorithm::NearestNeighbor,
            ga: GaConfig::default(),
            cp: CpConfig::default(),
            release_all_couriers: true,
            depot_filter: None,
        }
    }
}

impl OptimizerConfig {
    pub fn with_matrix_backend(mut self, backend: MatrixBackend) -> Self {
        self.matrix_backend = backend;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_ga_config(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    pub fn with_cp_config(mut self, cp: CpConfig) -> Self {
        self.cp = cp;
        self
    }

    pub fn with_release_all_couriers(mut self, release_all: bool) -> Self {
        self.release_all_couriers = release_all;
        self
    }

    pub fn with_depot_filter(mut self, depot_id: impl Into<String>) -> Self {
        self.depot_filter = Some(depot_id.into());
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_haversine_and_nn() {
        let config = OptimizerConfig::default();
        assert_eq!(config.matrix_backend, MatrixBackend::Haversine);
        assert_eq!(config.algorithm, Algorithm::NearestNeighbor);
        assert!(config.release_all_couriers);
    }

    #[test]
    fn builder_chain_overrides_defaults() {
        let config = OptimizerConfig::default()
            .with_algorithm(Algorithm::Genetic)
            .with_depot_filter("d1");
        assert_eq!(config.algorithm, Algorithm::Genetic);
        assert_eq!(config.depot_filter.as_deref(), Some("d1"));
    }

    #[test]
    fn elitism_fraction_divides_elite_by_population() {
        let ga = GaConfig::default().with_population_size(50).with_elite_size(5);
        assert!((ga.elitism_fraction() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn elitism_fraction_zero_population_is_zero() {
        let ga = GaConfig::default().with_population_size(0);
        assert_eq!(ga.elitism_fraction(), 0.0);
    }

    #[test]
    fn cp_defaults_match_single_depot_time_limit() {
        assert_eq!(CpConfig::default().time_limit, CpConfig::single_depot_default());
    }
}
