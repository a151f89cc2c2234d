//! Configuration types for the cache, search provider and synthesizer.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the Inquisitor folder.
pub const ENV_INQUISITOR_FOLDER: &str = "INQUISITOR_FOLDER";
/// Environment variable holding the `SerpAPI` key.
pub const ENV_SERPAPI_KEY: &str = "SERPAPI_KEY";
/// Environment variable holding the `OpenAI` key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Complete Inquisitor configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct InquisitorConfig {
    /// Question/answer cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Web search settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Answer synthesis settings
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether answers are looked up in and stored to the cache
    pub enabled: bool,
    /// Directory holding `qa_cache.json` (defaults to `~/.inquisitor_cache`)
    pub directory: Option<PathBuf>,
    /// Minimum similarity (0.0-1.0) for a rephrased question to count as a hit
    pub similarity_threshold: f64,
    /// Maximum matches returned by a similarity search
    pub max_similar_results: usize,
    /// Number of entries listed by the recent command
    pub recent_count: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            similarity_threshold: 0.8,
            max_similar_results: 5,
            recent_count: 10,
        }
    }
}

impl CacheConfig {
    /// Resolves the cache directory, falling back to `~/.inquisitor_cache`.
    ///
    /// # Errors
    /// Returns an error if no directory is configured and the home directory
    /// cannot be determined
    pub fn resolve_directory(&self) -> Result<PathBuf> {
        if let Some(directory) = &self.directory {
            return Ok(directory.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".inquisitor_cache"))
    }
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of results requested per query
    pub num_results: usize,
    /// `SerpAPI` key (falls back to `SERPAPI_KEY`)
    pub serpapi_key: Option<String>,
    /// Country code passed as `gl`
    pub country: String,
    /// Language code passed as `hl`
    pub language: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_results: 8,
            serpapi_key: None,
            country: "us".to_owned(),
            language: "en".to_owned(),
            timeout_seconds: 10,
        }
    }
}

/// Synthesizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat model name
    pub model: String,
    /// `OpenAI` key (falls back to `OPENAI_API_KEY`)
    pub api_key: Option<String>,
    /// Chat completions endpoint
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in the answer
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_owned(),
            api_key: None,
            base_url: "https://api.openai.com/v1/chat/completions".to_owned(),
            temperature: 0.3,
            max_tokens: 800,
        }
    }
}

impl InquisitorConfig {
    /// Get the config directory path (`~/.inquisitor`, or `INQUISITOR_FOLDER`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(folder) = env::var(ENV_INQUISITOR_FOLDER) {
            return Ok(PathBuf::from(folder));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".inquisitor"))
    }

    /// Get the default config file path (`~/.inquisitor/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with default values
    /// if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or created
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;

        let header = "# Inquisitor Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let threshold = self.cache.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "cache.similarity_threshold must be within 0.0..=1.0, got {threshold}"
            )));
        }
        if self.cache.max_similar_results == 0 {
            return Err(Error::Config(
                "cache.max_similar_results must be at least 1".to_owned(),
            ));
        }
        if self.search.num_results == 0 {
            return Err(Error::Config(
                "search.num_results must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// `SerpAPI` key from the config file, then the environment.
    pub fn serpapi_key(&self) -> Option<String> {
        self.search
            .serpapi_key
            .clone()
            .or_else(|| env::var(ENV_SERPAPI_KEY).ok())
            .filter(|key| !key.is_empty())
    }

    /// `OpenAI` key from the config file, then the environment.
    pub fn openai_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .or_else(|| env::var(ENV_OPENAI_API_KEY).ok())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = InquisitorConfig::default();
        assert!(config.cache.enabled);
        assert!((config.cache.similarity_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.search.num_results, 8);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        config.validate().unwrap();
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = InquisitorConfig::default();
        config.cache.similarity_threshold = 0.65;
        config.search.num_results = 4;
        config.save_to_file(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Inquisitor Configuration File"));

        let loaded = InquisitorConfig::load_from_file(&path).unwrap();
        assert!((loaded.cache.similarity_threshold - 0.65).abs() < f64::EPSILON);
        assert_eq!(loaded.search.num_results, 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[cache]\nrecent_count = 3\n").unwrap();

        let loaded = InquisitorConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.cache.recent_count, 3);
        assert_eq!(loaded.cache.max_similar_results, 5);
        assert_eq!(loaded.search.country, "us");
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[cache]\nsimilarity_threshold = 1.5\n").unwrap();

        let error = InquisitorConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn test_configured_cache_directory_wins() {
        let config = CacheConfig {
            directory: Some(PathBuf::from("/tmp/qa")),
            ..CacheConfig::default()
        };
        assert_eq!(config.resolve_directory().unwrap(), PathBuf::from("/tmp/qa"));
    }
}
