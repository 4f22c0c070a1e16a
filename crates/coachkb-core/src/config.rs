//! Lightweight configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RETRIEVAL__HYBRID_ENABLED=false`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration files located in `base`.
    pub fn load_from(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(resolve_with_base(base, "config.toml")));
        match env_name.as_str() {
            "dev" | "development" => {
                figment = figment.merge(Toml::file(resolve_with_base(base, "config.dev.toml")));
            }
            "prod" | "production" => {
                figment = figment.merge(Toml::file(resolve_with_base(base, "config.prod.toml")));
            }
            "test" | "testing" => {
                figment = figment.merge(Toml::file(resolve_with_base(base, "config.test.toml")));
            }
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        debug!(base = %base.display(), env = %env_name, "configuration sources merged");

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        info!(env = %env_name, "configuration loaded");
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document. No files or env vars.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml));
        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Like [`Config::get`] but `Ok(None)` when the key is absent.
    pub fn find<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.figment.find_value(key).is_err() {
            return Ok(None);
        }
        self.get(key).map(Some)
    }

    /// Keys of a table, e.g. the configured domain ids under `domains`.
    pub fn table_keys(&self, key: &str) -> Vec<String> {
        self.figment
            .find_value(key)
            .ok()
            .and_then(|value| value.into_dict())
            .map(|dict| dict.into_keys().collect())
            .unwrap_or_default()
    }

    /// Values under `key` merged over `base`; keys absent from the
    /// configuration keep their `base` value.
    pub fn overlay<T>(&self, key: &str, base: T) -> anyhow::Result<T>
    where
        T: Serialize + serde::de::DeserializeOwned,
    {
        Figment::from(Serialized::defaults(base))
            .merge(self.figment.focus(key))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to overlay '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.validate()?;
        match env {
            "prod" | "production" => {
                if settings.embedding.model == "hash" {
                    return Err(crate::Error::InvalidConfig(
                        "the hash embedder is for development and tests only".to_string(),
                    )
                    .into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub processing: ProcessingOptions,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub ingest: IngestConfig,
}

impl Settings {
    pub fn validate(&self) -> crate::Result<()> {
        self.processing.check().map_err(crate::Error::InvalidConfig)?;
        if self.embedding.dimension == 0 {
            return Err(crate::Error::InvalidConfig("embedding.dimension must be > 0".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(crate::Error::InvalidConfig("embedding.batch_size must be > 0".to_string()));
        }
        if self.ingest.max_concurrency == 0 || self.ingest.max_attempts == 0 {
            return Err(crate::Error::InvalidConfig(
                "ingest.max_concurrency and ingest.max_attempts must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Weights of the four quality sub-scores. Heuristic; expected to sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QualityWeights {
    pub content: f32,
    pub structure: f32,
    pub metadata: f32,
    pub embedding: f32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self { content: 0.4, structure: 0.2, metadata: 0.2, embedding: 0.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub min_quality_score: f32,
    pub preserve_structure: bool,
    pub infer_metadata: bool,
    pub extract_relationships: bool,
    /// Bounds the all-pairs reference pass to chunks at most this far apart.
    pub relationship_window: Option<usize>,
    pub continuation_threshold: f32,
    pub reference_threshold: f32,
    pub quality_weights: QualityWeights,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 100,
            max_chunk_size: 1500,
            min_quality_score: 0.5,
            preserve_structure: true,
            infer_metadata: true,
            extract_relationships: true,
            relationship_window: None,
            continuation_threshold: 0.5,
            reference_threshold: 0.7,
            quality_weights: QualityWeights::default(),
            batch_size: 5,
            batch_delay_ms: 100,
        }
    }
}

impl ProcessingOptions {
    /// Coherence of the chunking parameters.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.min_chunk_size > self.chunk_size || self.chunk_size > self.max_chunk_size {
            return Err(format!(
                "expected min_chunk_size <= chunk_size <= max_chunk_size, got {} / {} / {}",
                self.min_chunk_size, self.chunk_size, self.max_chunk_size
            ));
        }
        if !(0.0..=1.0).contains(&self.min_quality_score) {
            return Err("min_quality_score must be within [0, 1]".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub hybrid_enabled: bool,
    pub rrf_k: f32,
    pub semantic_weight: f32,
    pub text_weight: f32,
    /// Semantic branch fetches `limit * candidate_multiplier` rows in hybrid mode.
    pub candidate_multiplier: usize,
    /// Semantic branch threshold factor in hybrid mode.
    pub threshold_relaxation: f32,
    pub default_limit: usize,
    pub default_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            hybrid_enabled: true,
            rrf_k: 60.0,
            semantic_weight: 0.7,
            text_weight: 0.3,
            candidate_multiplier: 2,
            threshold_relaxation: 0.8,
            default_limit: 10,
            default_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub max_input_chars: usize,
    pub batch_size: usize,
    pub batch_pause_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "hash".to_string(),
            dimension: 384,
            max_input_chars: 512,
            batch_size: 16,
            batch_pause_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    pub max_concurrency: usize,
    pub max_attempts: usize,
    pub retry_backoff_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { max_concurrency: 3, max_attempts: 3, retry_backoff_ms: 200 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
