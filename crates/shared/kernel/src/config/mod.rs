use catalog_domain::constants::{APP_NAME, ENV_PREFIX, ENV_SEPARATOR};
use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Custom error type for config loading.
#[catalog_derive::catalog_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered configuration into `T`.
///
/// Sources, later ones winning:
/// 1. **Defaults** of `T` (every section uses `#[serde(default)]`).
/// 2. **Main file**, `config/catalog.toml` unless `path` is given. Optional.
/// 3. **Module files** `catalog-<module>.toml` next to the main file, one per entry
///    of `modules`. Optional.
/// 4. **Environment** variables prefixed with `CATALOG__`; nested keys use double
///    underscores (`CATALOG__DATABASE__URL` maps to `database.url`).
///
/// # Errors
/// Returns an error if a present file is malformed or the merged values do not fit `T`.
///
/// # Example
/// ```rust
/// use catalog_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// #[serde(default)]
/// struct Settings {
///     port: u16,
/// }
///
/// let cfg: Settings = load_config(Some("does/not/exist.toml"), &[]).unwrap();
/// assert_eq!(cfg.port, 0);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>, modules: &[&str]) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    build(path, modules, None)
}

fn build<T>(
    path: Option<impl AsRef<Path>>,
    modules: &[&str],
    env: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let main = path.map_or_else(default_path, |p| p.as_ref().to_path_buf());
    let dir = main.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut builder = Config::builder().add_source(File::from(main.as_path()).required(false));
    for module in modules {
        let file = dir.join(format!("{APP_NAME}-{module}.toml"));
        debug!(module, file = %file.display(), "Adding module config source");
        builder = builder.add_source(File::from(file).required(false));
    }
    builder = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR).source(env));

    info!(file = %main.display(), modules = modules.len(), "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

fn default_path() -> PathBuf {
    PathBuf::from("config").join(format!("{APP_NAME}.toml"))
}
