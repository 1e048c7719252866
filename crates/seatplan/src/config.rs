use crate::{
    constants::{DEFAULT_ATTEMPTS, DEFAULT_CANDIDATES, DEFAULT_MAX_NODES, DEFAULT_PROGRESS_EVERY},
    csv_reader::read_roster_csv,
    error::{Result, SeatPlanError},
    evaluate::ScoringPolicy,
    ranker::RankOptions,
    roster::ClassInput,
    solver::SolveOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum_macros::Display;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub class: ClassConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    /// Directory of the loaded file, used to resolve `roster_csv`
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClassConfig {
    #[serde(flatten)]
    pub input: ClassInput,
    /// Optional `Name,Gender` file appended to `students`
    #[serde(default)]
    pub roster_csv: Option<PathBuf>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, Display, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// First valid seating, preferences only bias the search
    Single,
    /// Best scoring seatings out of the whole budget
    #[default]
    Ranked,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    pub mode: Mode,
    pub attempts: usize,
    pub candidates: usize,
    /// Fixed RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
    pub progress_every: usize,
    pub bias_preferences: bool,
    /// Placements one attempt may try before it counts as failed
    pub max_nodes: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Ranked,
            attempts: DEFAULT_ATTEMPTS,
            candidates: DEFAULT_CANDIDATES,
            seed: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            bias_preferences: true,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl From<&SolverConfig> for SolveOptions {
    fn from(cfg: &SolverConfig) -> Self {
        Self {
            attempts: cfg.attempts,
            bias_preferences: cfg.bias_preferences,
            max_nodes: cfg.max_nodes,
        }
    }
}

impl From<&SolverConfig> for RankOptions {
    fn from(cfg: &SolverConfig) -> Self {
        Self {
            attempts: cfg.attempts,
            candidates: cfg.candidates,
            progress_every: cfg.progress_every,
            bias_preferences: cfg.bias_preferences,
            max_nodes: cfg.max_nodes,
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SeatPlanError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| {
            SeatPlanError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let solver = &self.solver;
        if solver.attempts == 0 {
            return Err(SeatPlanError::Config(
                "solver.attempts must be greater than 0".to_string(),
            ));
        }
        if solver.candidates == 0 {
            return Err(SeatPlanError::Config(
                "solver.candidates must be greater than 0".to_string(),
            ));
        }
        if solver.progress_every == 0 {
            return Err(SeatPlanError::Config(
                "solver.progress_every must be greater than 0".to_string(),
            ));
        }
        if solver.max_nodes == 0 {
            return Err(SeatPlanError::Config(
                "solver.max_nodes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the roster file, relative paths taken from the config's directory
    pub fn roster_path(&self) -> Option<PathBuf> {
        let path = self.class.roster_csv.as_ref()?;
        match &self.base_dir {
            Some(dir) if path.is_relative() => Some(dir.join(path)),
            _ => Some(path.clone()),
        }
    }

    /// Class input with the roster file merged in.
    ///
    /// CSV names follow the names listed inline. Gender tags from the file
    /// never override inline tags.
    pub fn class_input(&self) -> Result<ClassInput> {
        let mut input = self.class.input.clone();
        let Some(path) = self.roster_path() else {
            return Ok(input);
        };

        let entries = read_roster_csv(&path)?;
        log::info!("loaded {} students from {}", entries.len(), path.display());
        for entry in entries {
            if let Some(gender) = entry.gender {
                input.genders.entry(entry.name.clone()).or_insert(gender);
            }
            input.students.push(entry.name);
        }
        Ok(input)
    }
}
