use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
mod defaults;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    DataSourceConfig, DataSourceMode, IndexDefinition, LoggingConfig, MAX_HISTORY_DAYS,
    MAX_SHAPE_FACTOR, Settings, Simulation,
};

/// Prefix for environment overrides, e.g. `MARKETSIM__SIMULATION__GAP_FACTOR=0.3`.
pub const ENV_PREFIX: &str = "MARKETSIM";

/// Loads the application configuration from an optional `config.toml` in the working
/// directory, layered under `MARKETSIM__*` environment variables.
///
/// A missing file is not an error: every section falls back to its built-in default.
/// Nothing is logged here since tracing is configured from the result.
pub fn load_config() -> Result<Settings, ConfigError> {
    build(config::File::with_name("config").required(false))
}

/// Same as [`load_config`] but reads an explicit file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<T>(file: T) -> Result<Settings, ConfigError>
where
    T: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
