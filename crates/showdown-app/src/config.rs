// Configuration loading and parsing (showdown.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use showdown_core::analysis::DEFAULT_CANDIDATE_POOL_SIZE;
use showdown_core::assignment::{AssignmentMode, AssignmentSettings, DEFAULT_EXPOSURE_TOP_N};
use showdown_core::entry::{PatternClassifier, DEFAULT_CASH_PATTERNS};
use showdown_core::generator::{
    GenerationSettings, Termination, DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_INTERVAL,
};
use showdown_core::EngineError;

const CONFIG_FILE: &str = "showdown.toml";

/// Shipped defaults, written to `config/showdown.toml` when it is missing.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/showdown.toml");

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

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub generation: GenerationConfig,
    pub assignment: AssignmentConfig,
    #[serde(default)]
    pub contests: ContestsConfig,
    pub data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub salary_min: u32,
    pub salary_max: u32,
    pub projection_floor_percent: f64,
    #[serde(default)]
    pub target_count: Option<usize>,
    #[serde(default)]
    pub max_duration_seconds: Option<f64>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    /// Fixed RNG seed for reproducible runs. Drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentConfig {
    pub mode: AssignmentMode,
    pub diversity_strength: f64,
    #[serde(default)]
    pub min_uniques: usize,
    #[serde(default = "default_candidate_pool_size")]
    pub candidate_pool_size: usize,
    #[serde(default = "default_exposure_top_n")]
    pub exposure_top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestsConfig {
    pub cash_patterns: Vec<String>,
}

impl Default for ContestsConfig {
    fn default() -> Self {
        ContestsConfig {
            cash_patterns: DEFAULT_CASH_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub entries: String,
    pub output_dir: String,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL.as_millis() as u64
}

fn default_candidate_pool_size() -> usize {
    DEFAULT_CANDIDATE_POOL_SIZE
}

fn default_exposure_top_n() -> usize {
    DEFAULT_EXPOSURE_TOP_N
}

// ---------------------------------------------------------------------------
// Conversion into engine settings
// ---------------------------------------------------------------------------

impl GenerationConfig {
    /// Engine settings. Assumes the config passed validation, which
    /// guarantees exactly one termination policy is set. A duration that is
    /// negative or not finite maps to zero, which the engine rejects.
    pub fn to_settings(&self) -> GenerationSettings {
        let termination = match (self.target_count, self.max_duration_seconds) {
            (Some(target), _) => Termination::Count(target),
            (None, Some(secs)) => {
                Termination::Duration(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
            }
            (None, None) => Termination::Count(0),
        };
        let mut settings = GenerationSettings::new(
            self.salary_min,
            self.salary_max,
            self.projection_floor_percent,
            termination,
        );
        settings.batch_size = self.batch_size;
        settings.progress_interval = Duration::from_millis(self.progress_interval_ms);
        settings
    }
}

impl AssignmentConfig {
    pub fn to_settings(&self) -> AssignmentSettings {
        let mut settings = AssignmentSettings::new(self.mode, self.diversity_strength);
        settings.min_uniques = self.min_uniques;
        settings.candidate_pool_size = self.candidate_pool_size;
        settings.exposure_top_n = self.exposure_top_n;
        settings
    }
}

impl ContestsConfig {
    pub fn classifier(&self) -> PatternClassifier {
        PatternClassifier::new(&self.cash_patterns)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/showdown.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Write the shipped defaults to `config/showdown.toml` under `base_dir`
/// unless a config is already there. Returns the path when it was written.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    if path.exists() {
        return Ok(None);
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", path.display()),
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(copy_err)?;
    }
    std::fs::write(&path, DEFAULT_CONFIG).map_err(copy_err)?;
    Ok(Some(path))
}

/// Loads config relative to the current working directory, writing the
/// defaults first if no config exists yet.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Qualify an engine validation error with its config section.
fn in_section(section: &str) -> impl Fn(EngineError) -> ConfigError + '_ {
    move |e| match e {
        EngineError::InvalidConfig { field, message } => {
            invalid(&format!("{section}.{field}"), message)
        }
        other => invalid(section, other.to_string()),
    }
}

/// Value ranges are checked by the engine settings themselves; only the
/// shape of the termination policy is specific to the file format.
fn validate(config: &Config) -> Result<(), ConfigError> {
    let g = &config.generation;
    match (g.target_count, g.max_duration_seconds) {
        (Some(_), Some(_)) => {
            return Err(invalid(
                "generation.target_count",
                "set either target_count or max_duration_seconds, not both",
            ));
        }
        (None, None) => {
            return Err(invalid(
                "generation.target_count",
                "one of target_count or max_duration_seconds is required",
            ));
        }
        _ => {}
    }

    g.to_settings().validate().map_err(in_section("generation"))?;
    config
        .assignment
        .to_settings()
        .validate()
        .map_err(in_section("assignment"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn default_text() -> String {
        DEFAULT_CONFIG.to_string()
    }

    /// Write `text` as config/showdown.toml under a fresh temp dir.
    fn temp_config(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/showdown.toml"), text).unwrap();
        tmp
    }

    fn expect_validation_field(name: &str, text: &str, expected: &str) {
        let tmp = temp_config(name, text);
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_default_config() {
        let tmp = temp_config("showdown_config_defaults", &default_text());
        let config = load_config_from(&tmp).expect("defaults should load");

        assert_eq!(config.generation.salary_min, 45_000);
        assert_eq!(config.generation.salary_max, 50_000);
        assert_eq!(config.generation.target_count, Some(5000));
        assert!(config.generation.max_duration_seconds.is_none());
        assert_eq!(config.generation.batch_size, 1000);
        assert_eq!(config.assignment.mode, AssignmentMode::Portfolio);
        assert!((config.assignment.diversity_strength - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.assignment.candidate_pool_size, 200);
        assert!(config.contests.cash_patterns.contains(&"double".to_string()));
        assert_eq!(config.data_paths.players, "data/players.csv");

        let settings = config.generation.to_settings();
        assert_eq!(settings.termination, Termination::Count(5000));
        assert_eq!(settings.progress_interval, Duration::from_millis(100));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn duration_mode_and_optional_sections() {
        let text = r#"
[generation]
salary_min = 49000
salary_max = 50000
projection_floor_percent = 0.0
max_duration_seconds = 1.5

[assignment]
mode = "balanced"
diversity_strength = 0.0

[data_paths]
players = "p.csv"
entries = "e.csv"
output_dir = "out"
"#;
        let tmp = temp_config("showdown_config_duration", text);
        let config = load_config_from(&tmp).expect("minimal config should load");

        assert_eq!(
            config.generation.to_settings().termination,
            Termination::Duration(Duration::from_millis(1500))
        );
        assert_eq!(config.generation.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.assignment.exposure_top_n, DEFAULT_EXPOSURE_TOP_N);
        assert_eq!(config.assignment.to_settings().mode, AssignmentMode::Balanced);
        assert_eq!(config.contests.cash_patterns.len(), DEFAULT_CASH_PATTERNS.len());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_inverted_salary_window() {
        let text = default_text().replace("salary_min = 45000", "salary_min = 51000");
        expect_validation_field("showdown_config_window", &text, "generation.salary_min");
    }

    #[test]
    fn rejects_both_termination_policies() {
        let text = default_text().replace("# max_duration_seconds = 30", "max_duration_seconds = 30");
        expect_validation_field("showdown_config_both", &text, "generation.target_count");
    }

    #[test]
    fn rejects_missing_termination_policy() {
        let text = default_text().replace("target_count = 5000", "");
        expect_validation_field("showdown_config_neither", &text, "generation.target_count");
    }

    #[test]
    fn rejects_floor_above_hundred() {
        let text = default_text().replace(
            "projection_floor_percent = 10.0",
            "projection_floor_percent = 150.0",
        );
        expect_validation_field(
            "showdown_config_floor",
            &text,
            "generation.projection_floor_percent",
        );
    }

    #[test]
    fn rejects_diversity_out_of_range() {
        let text = default_text().replace("diversity_strength = 5.0", "diversity_strength = 10.5");
        expect_validation_field(
            "showdown_config_diversity",
            &text,
            "assignment.diversity_strength",
        );
    }

    #[test]
    fn rejects_min_uniques_above_lineup_size() {
        let text = default_text().replace("min_uniques = 0", "min_uniques = 7");
        expect_validation_field("showdown_config_uniques", &text, "assignment.min_uniques");
    }

    #[test]
    fn rejects_unknown_mode() {
        let text = default_text().replace("mode = \"portfolio\"", "mode = \"greedy\"");
        let tmp = temp_config("showdown_config_mode", &text);
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = std::env::temp_dir().join("showdown_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("showdown.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config("showdown_config_invalid", "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("showdown.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_non_positive_duration() {
        for (name, secs) in [("zero", "0.0"), ("negative", "-5.0"), ("nan", "nan")] {
            let text = default_text()
                .replace("target_count = 5000", "")
                .replace("# max_duration_seconds = 30", &format!("max_duration_seconds = {secs}"));
            expect_validation_field(
                &format!("showdown_config_duration_{name}"),
                &text,
                "generation.max_duration_seconds",
            );
        }
    }

    #[test]
    fn engine_range_checks_carry_section_prefix() {
        let text = default_text().replace("target_count = 5000", "target_count = 0");
        expect_validation_field("showdown_config_zero_target", &text, "generation.target_count");

        let text = default_text().replace("batch_size = 1000", "batch_size = 0");
        expect_validation_field("showdown_config_zero_batch", &text, "generation.batch_size");

        let text = default_text().replace("candidate_pool_size = 200", "candidate_pool_size = 0");
        expect_validation_field(
            "showdown_config_zero_pool",
            &text,
            "assignment.candidate_pool_size",
        );
    }

    #[test]
    fn ensure_config_file_writes_defaults_when_missing() {
        let tmp = std::env::temp_dir().join("showdown_config_ensure_writes");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let written = ensure_config_file(&tmp).expect("should succeed");
        assert_eq!(written, Some(tmp.join("config/showdown.toml")));

        let config = load_config_from(&tmp).expect("written defaults should load");
        assert_eq!(config.generation.target_count, Some(5000));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_existing() {
        let tmp = temp_config("showdown_config_ensure_keeps", "# custom\n");

        let written = ensure_config_file(&tmp).expect("should succeed");
        assert!(written.is_none());
        let content = fs::read_to_string(tmp.join("config/showdown.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }
}
