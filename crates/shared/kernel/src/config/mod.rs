use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of environment overrides (`COHORT__ENGINE__ROSTER_PATH` maps to `engine.roster_path`).
pub const ENV_PREFIX: &str = "COHORT";

const DEFAULT_CONFIG_FILE: &str = "server";

#[cohort_derive::cohort_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration from a file layered under environment overrides.
///
/// 1. **Base file**: any format the `config` crate understands, resolved by path with or
///    without its extension. Defaults to `server` in the working directory.
/// 2. **Environment**: variables prefixed with `COHORT__`; nested keys use double underscores.
///
/// # Errors
/// Fails if the file cannot be found or its content (merged with the environment) does not
/// deserialize into `T`.
///
/// # Example
/// ```rust
/// use cohort_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());
    info!("Loading config from {}", effective_path.display());
    build(Some(&effective_path))
}

/// Like [`load_config`], but a missing file is not an error: `T`'s serde defaults and the
/// environment fill in everything.
///
/// # Errors
/// Fails if a present file or the environment holds values that do not deserialize into `T`.
pub fn load_config_or_default<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    match path {
        Some(path) => {
            let path = path.as_ref();
            if path.exists() {
                info!("Loading config from {}", path.display());
                build(Some(path))
            } else {
                debug!("Config file {} not found, using defaults", path.display());
                build(None)
            }
        },
        None => build(None),
    }
}

fn build<T>(file: Option<&Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    if let Some(file) = file {
        builder = builder.add_source(File::from(file).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
