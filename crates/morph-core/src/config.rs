// Configuration loading and parsing (morph.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

/// Name of the single config file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "morph.toml";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub game: GameConfig,
    pub scoring: ScoringConfig,
    pub dictionary: DictionaryConfig,
    pub oracle: OracleConfig,
}

/// Raw deserialization target for the whole morph.toml file.
#[derive(Debug, Clone, Deserialize)]
struct MorphFile {
    #[serde(default)]
    game: GameConfig,
    #[serde(default)]
    scoring: ScoringConfig,
    dictionary: DictionaryConfig,
    #[serde(default)]
    oracle: OracleConfig,
}

// ---------------------------------------------------------------------------
// [game]
// ---------------------------------------------------------------------------

/// Duel rules. Defaults are the reference game's constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub word_length: usize,
    /// Turn ceiling; reaching it without a finisher concludes the match.
    pub max_turns: u32,
    /// Degree floor for random start/target picks.
    pub min_start_degree: usize,
    pub max_hints_per_player: u32,
    /// Suggestions per hint request when the caller asks for 0.
    pub hints_per_request: usize,
    /// Neighbor words carried in each insight for display.
    pub neighbor_sample: usize,
    /// Random draws allowed while looking for a target distinct from the start.
    pub max_pick_attempts: usize,
    pub distance_metric: DistanceMetric,
    pub turn_limit_tie: TurnLimitTie,
    pub branching: BranchingThresholds,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            word_length: 5,
            max_turns: 50,
            min_start_degree: 6,
            max_hints_per_player: 5,
            hints_per_request: 3,
            neighbor_sample: 8,
            max_pick_attempts: 32,
            distance_metric: DistanceMetric::default(),
            turn_limit_tie: TurnLimitTie::default(),
            branching: BranchingThresholds::default(),
        }
    }
}

/// Degree cutoffs for branch classification: `high` if degree >= `high`,
/// `low` if degree <= `low`, otherwise medium.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BranchingThresholds {
    pub high: usize,
    pub low: usize,
}

impl Default for BranchingThresholds {
    fn default() -> Self {
        BranchingThresholds { high: 12, low: 3 }
    }
}

/// How distance-to-target is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Differing letter positions. Cheap; can undercount the real path length
    /// when the naive intermediate words are not in the dictionary.
    #[default]
    Hamming,
    /// Shortest path through the morph graph (BFS from the target).
    Graph,
}

/// Adjudication when the turn limit hits and both players' last words have
/// the same green count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnLimitTie {
    /// No winner.
    #[default]
    Draw,
    /// The first player in seat order wins.
    FirstPlayer,
}

// ---------------------------------------------------------------------------
// [scoring]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_base: u32,
    pub points_per_step_penalty: u32,
    pub first_to_finish_bonus: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            points_base: 100,
            points_per_step_penalty: 5,
            first_to_finish_bonus: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// [dictionary] / [oracle]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictionaryConfig {
    /// Word list path, relative to the config base directory.
    pub path: String,
    /// Iterative degree pruning floor for the morph graph; 0 disables.
    #[serde(default)]
    pub prune_min_degree: usize,
    /// Keep only the graph's largest connected component.
    #[serde(default)]
    pub largest_component_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig { timeout_ms: 2_000 }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/morph.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` which does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: MorphFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        game: file.game,
        scoring: file.scoring,
        dictionary: file.dictionary,
        oracle: file.oracle,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/morph.toml` from `defaults/morph.toml` on first run.
///
/// Returns the seeded path, or `None` when a config file is already in
/// place. An existing `config/morph.toml` is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let seed = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.is_file() {
        return Ok(None);
    }
    if !seed.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {CONFIG_FILE} in {}/config or {}/defaults",
                base_dir.display(),
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;
    let contents = std::fs::read(&seed).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", seed.display()),
    })?;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };
    std::io::Write::write_all(&mut dest, &contents).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;

    info!("Seeded {} from defaults", target.display());
    Ok(Some(target))
}

/// Seed `config/morph.toml` if needed, then load it.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let game = &config.game;

    let nonzero_fields: &[(&str, usize)] = &[
        ("game.word_length", game.word_length),
        ("game.max_turns", game.max_turns as usize),
        ("game.max_hints_per_player", game.max_hints_per_player as usize),
        ("game.hints_per_request", game.hints_per_request),
        ("game.max_pick_attempts", game.max_pick_attempts),
    ];
    for (name, val) in nonzero_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if game.branching.low >= game.branching.high {
        return Err(ConfigError::ValidationError {
            field: "game.branching".into(),
            message: format!(
                "low ({}) must be below high ({})",
                game.branching.low, game.branching.high
            ),
        });
    }

    if config.dictionary.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "dictionary.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.oracle.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "oracle.timeout_ms".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
