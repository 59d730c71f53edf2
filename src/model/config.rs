//! Game parameters and solver configuration.
//!
//! `GameParameters` describes one instance of the dispersal game.
//! `SolverConfig` controls how the solvers treat ties and how large an
//! instance the exact solver is allowed to expand.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Parameters of a single dispersal game.
///
/// Field names follow the notation of the model (`N`, `Rmin`, ...), which is
/// also the key set accepted in JSON parameter files.
///
/// # Example
/// ```
/// use dispersal_nash::model::GameParameters;
///
/// let params = GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameParameters {
    /// Broods represented per disperser.
    #[serde(rename = "N")]
    pub broods: u32,

    /// Number of players sharing the pool.
    #[serde(rename = "n")]
    pub players: usize,

    /// Resource inflow into the pool per day, split among present players.
    pub r: f64,

    /// Resources consumed per day of transit.
    pub c: f64,

    /// Resources every player starts with.
    #[serde(rename = "Rmin")]
    pub r_min: f64,

    /// Resources needed to complete transit without further cost.
    #[serde(rename = "Rmax")]
    pub r_max: f64,

    /// Horizon in days. A departure day equal to this value means "never".
    #[serde(rename = "Tmax")]
    pub horizon: usize,

    /// Fitness bonus for completing transit.
    pub b: f64,

    /// Half-saturation constant of the survival curve.
    pub k: f64,

    /// Baseline fitness per day.
    pub f: f64,
}

impl GameParameters {
    /// Create a parameter set in model order `(N, n, r, c, Rmin, Rmax, Tmax, b, k, f)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        broods: u32,
        players: usize,
        r: f64,
        c: f64,
        r_min: f64,
        r_max: f64,
        horizon: usize,
        b: f64,
        k: f64,
        f: f64,
    ) -> Self {
        Self {
            broods,
            players,
            r,
            c,
            r_min,
            r_max,
            horizon,
            b,
            k,
            f,
        }
    }

    /// Builder method: set the number of players.
    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    /// Builder method: set the horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Builder method: set the pool inflow rate.
    pub fn with_inflow(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Builder method: set the transit consumption rate.
    pub fn with_consumption(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Builder method: set `Rmax` to the resources a lone share of the pool
    /// reaches by the horizon, `Rmin + Tmax * r / n`.
    pub fn with_reachable_rmax(mut self) -> Self {
        self.r_max = self.r_min + self.horizon as f64 * self.r / self.players.max(1) as f64;
        self
    }

    /// Total number of stay/depart decision cells, `n * Tmax`.
    pub fn cells(&self) -> usize {
        self.players.saturating_mul(self.horizon)
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse parameters from a JSON string and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Load a batch of parameter sets. Accepts a single object or an array.
    ///
    /// Entries are not validated here; each one is validated when solved so
    /// that one bad entry does not reject the whole batch.
    pub fn batch_from_json_str(json: &str) -> Result<Vec<Self>, ConfigError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(GameParameters),
            Many(Vec<GameParameters>),
        }

        let parsed: OneOrMany =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        match parsed {
            OneOrMany::One(params) => Ok(vec![params]),
            OneOrMany::Many(batch) => Ok(batch),
        }
    }

    /// Validate the parameters.
    ///
    /// Every field must be strictly positive and finite, and `Rmax` must
    /// exceed `Rmin`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broods == 0 {
            return Err(ConfigError::non_positive("N"));
        }
        if self.players == 0 {
            return Err(ConfigError::non_positive("n"));
        }
        if self.horizon == 0 {
            return Err(ConfigError::non_positive("Tmax"));
        }

        let reals = [
            ("r", self.r),
            ("c", self.c),
            ("Rmin", self.r_min),
            ("Rmax", self.r_max),
            ("b", self.b),
            ("k", self.k),
            ("f", self.f),
        ];
        for (field, value) in reals {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::non_positive(field));
            }
        }

        if self.r_max <= self.r_min {
            return Err(ConfigError::InvalidValue {
                field: "Rmax".to_string(),
                message: format!("Rmax ({}) must exceed Rmin ({})", self.r_max, self.r_min),
            });
        }

        Ok(())
    }
}

/// How the fast solver reacts to a tie among maximal candidate payoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Fail with `AmbiguousEquilibrium`.
    #[default]
    Reject,
    /// Log a warning and keep the earliest maximal candidate.
    Warn,
}

/// Configuration shared by both solvers.
///
/// # Example
/// ```
/// use dispersal_nash::model::{SolverConfig, TiePolicy};
///
/// let config = SolverConfig::default();
/// assert_eq!(config.tie_policy, TiePolicy::Reject);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Reaction to tied maximal payoffs in the fast solver.
    #[serde(default)]
    pub tie_policy: TiePolicy,

    /// Relative tolerance under which two payoffs count as equal.
    ///
    /// Two payoffs `a` and `b` are tied when
    /// `|a - b| <= tolerance * max(1, |a|, |b|)`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Largest `n * Tmax` the exact solver accepts.
    ///
    /// The decision tree has `(Tmax + 1)^n` leaves, so this bound keeps the
    /// oracle to validation-sized instances.
    #[serde(default = "default_max_exact_cells")]
    pub max_exact_cells: usize,
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_max_exact_cells() -> usize {
    16
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tie_policy: TiePolicy::Reject,
            tolerance: default_tolerance(),
            max_exact_cells: default_max_exact_cells(),
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that rejects every tie.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Configuration that tolerates ties, keeping the earliest candidate.
    pub fn lenient() -> Self {
        Self {
            tie_policy: TiePolicy::Warn,
            ..Default::default()
        }
    }

    /// Builder method: set the tie policy.
    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }

    /// Builder method: set the tie tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: set the exact solver's size bound.
    pub fn with_max_exact_cells(mut self, cells: usize) -> Self {
        self.max_exact_cells = cells;
        self
    }

    /// Whether `a` and `b` are equal under the configured tolerance.
    pub fn tied(&self, a: f64, b: f64) -> bool {
        let scale = 1f64.max(a.abs()).max(b.abs());
        (a - b).abs() <= self.tolerance * scale
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "tolerance".to_string(),
                message: format!("tolerance {} must be a non-negative number", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field holds a value outside its domain.
    InvalidValue {
        /// Offending field, using model notation.
        field: String,
        /// Human-readable reason.
        message: String,
    },
    /// The configuration file could not be read.
    IoError(String),
    /// The configuration file is not valid JSON for this type.
    ParseError(String),
}

impl ConfigError {
    fn non_positive(field: &str) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("{} must be strictly positive", field),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid value for {}: {}", field, message)
            }
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
