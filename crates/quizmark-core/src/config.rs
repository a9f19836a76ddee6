//! quizmark configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Identity recorded on automatic grades.
    #[serde(default = "default_grader")]
    pub grader: String,
    /// Max attempts graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for grade reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Passing percentage for quizzes that do not set one.
    #[serde(default = "default_passing_score")]
    pub default_passing_score: f64,
}

fn default_grader() -> String {
    "quizmark".to_string()
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizmark-results")
}
fn default_passing_score() -> f64 {
    70.0
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            grader: default_grader(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            default_passing_score: default_passing_score(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again, so a value containing `${...}`
/// is kept literally.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable overrides: `QUIZMARK_GRADER`, `QUIZMARK_PARALLELISM`.
pub fn load_config() -> Result<QuizmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizmark.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmarkConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a config document and expand `${VAR}` references in string values.
pub fn parse_config(content: &str) -> Result<QuizmarkConfig> {
    let mut config: QuizmarkConfig = toml::from_str(content)?;
    config.grader = resolve_env_vars(&config.grader);
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));
    if config.parallelism == 0 {
        anyhow::bail!("parallelism must be at least 1");
    }
    Ok(config)
}

fn apply_env_overrides(config: &mut QuizmarkConfig) -> Result<()> {
    if let Ok(grader) = std::env::var("QUIZMARK_GRADER") {
        config.grader = grader;
    }
    if let Ok(parallelism) = std::env::var("QUIZMARK_PARALLELISM") {
        config.parallelism = parallelism
            .parse()
            .ok()
            .filter(|p| *p > 0)
            .with_context(|| format!("invalid QUIZMARK_PARALLELISM: {parallelism}"))?;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}
