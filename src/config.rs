//! Configuration System
//!
//! Layered configuration for the renderer and the logging subscriber:
//! built-in defaults, then an optional TOML file, then `CASCADE_*`
//! environment variables (`CASCADE_RENDERER__MAX_RENDERS_PER_BATCH=500`).

use crate::error::RenderError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod sources;

/// Renderer limits and delivery options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Renders allowed in one batch before the pass fails with a render loop error
    #[serde(default = "default_max_renders_per_batch")]
    pub max_renders_per_batch: usize,

    /// Hand batches with no diffs and no disposals to the host anyway
    #[serde(default)]
    pub deliver_empty_batches: bool,
}

pub(crate) const DEFAULT_MAX_RENDERS_PER_BATCH: usize = 10_000;

fn default_max_renders_per_batch() -> usize {
    DEFAULT_MAX_RENDERS_PER_BATCH
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_renders_per_batch: default_max_renders_per_batch(),
            deliver_empty_batches: false,
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_renders_per_batch == 0 {
            return Err("max_renders_per_batch must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Renderer(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Renderer(msg) => write!(f, "Renderer: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CascadeConfig {
    /// Load configuration: defaults, then `path` if given, then environment.
    pub fn load(path: Option<&Path>) -> Result<Self, RenderError> {
        let mut builder = sources::builder_with_defaults()?;
        if let Some(path) = path {
            builder = sources::add_file(builder, path)?;
        }
        let config: CascadeConfig = sources::add_environment(builder).build()?.try_deserialize()?;

        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            RenderError::Config(messages.join("; "))
        })?;
        Ok(config)
    }

    /// Load from a single TOML file without environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, RenderError> {
        let builder = sources::add_file(sources::builder_with_defaults()?, path)?;
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.renderer.validate() {
            errors.push(ValidationError::Renderer(e));
        }

        if !matches!(self.logging.format.as_str(), "json" | "text") {
            errors.push(ValidationError::Logging(format!(
                "Invalid log format: {}",
                self.logging.format
            )));
        }
        if let Err(e) = crate::logging::LogOutput::parse(&self.logging.output) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML, e.g. to print the effective configuration.
    pub fn to_toml(&self) -> Result<String, RenderError> {
        toml::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))
    }
}
