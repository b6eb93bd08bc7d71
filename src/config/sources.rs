//! Configuration sources in precedence order: defaults, file, environment.

use super::DEFAULT_MAX_RENDERS_PER_BATCH;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Create a Config builder with defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default(
            "renderer.max_renders_per_batch",
            DEFAULT_MAX_RENDERS_PER_BATCH as i64,
        )?
        .set_default("renderer.deliver_empty_batches", false)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}

/// Add an explicit TOML file. The file must exist.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    debug!(config_path = %path.display(), "Loading configuration file");
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}

/// `CASCADE_<SECTION>__<KEY>` variables override everything else.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("CASCADE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
