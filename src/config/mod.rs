//! Configuration loading.
//!
//! Settings are read once by the binary and handed to the bus, the auth gate
//! and the panel at construction time.

mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{AuthSettings, BusSettings, PanelSettings, PartialSettings, Settings};

/// Prefix for environment overrides, e.g. `TOPICPANEL__BUS__ENDPOINT`.
pub const ENV_PREFIX: &str = "TOPICPANEL";

/// Loads the configuration from the default file and environment variables
/// and merges it with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`], reading the optional file at `path` (extension
/// resolved by the `config` crate).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_onto(Settings::default()))
}
