use crate::error;
use crate::util::Result;
use crate::source::MimeType;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use snafu::ResultExt;
use std::path::PathBuf;
use std::sync::{LazyLock, RwLock};
use url::Url;

/// Built-in defaults; files and environment variables only override them
const DEFAULT_SETTINGS: &str = include_str!("../Settings-default.toml");

static SETTINGS: LazyLock<std::result::Result<RwLock<Config>, String>> =
    LazyLock::new(init_settings);

fn init_settings() -> std::result::Result<RwLock<Config>, String> {
    let mut settings =
        Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml));

    let dir: PathBuf = std::env::current_dir()
        .context(error::MissingWorkingDirectory)
        .map_err(|error| error.to_string())?;

    #[cfg(test)]
    let override_file = "Settings-test.toml";

    #[cfg(not(test))]
    let override_file = "Settings.toml";

    let override_file = dir.join(override_file);
    if override_file.exists() {
        settings = settings.add_source(File::from(override_file));
    }

    // Override config with environment variables that start with `GEOPATCH__`,
    // e.g. `GEOPATCH__LOGGING__LOG_SPEC=debug`
    // Note: Since variables contain underscores, we need to use something different
    // for separating groups, for instance double underscores `__`
    settings = settings.add_source(Environment::with_prefix("geopatch").separator("__"));

    settings
        .build()
        .map(RwLock::new)
        .map_err(|error| error.to_string())
}

fn settings() -> Result<&'static RwLock<Config>> {
    SETTINGS
        .as_ref()
        .map_err(|reason| error::Error::ConfigInit {
            reason: reason.clone(),
        })
}

#[cfg(test)]
pub fn set_config<T>(key: &str, value: T) -> Result<()>
where
    T: Into<config::Value>,
{
    let mut settings = settings()?
        .write()
        .map_err(|_error| error::Error::ConfigLockFailed)?;

    let builder = Config::builder()
        .add_source(settings.clone())
        .set_override(key, value)
        .context(error::Config)?;

    *settings = builder.build().context(error::Config)?;
    Ok(())
}

pub fn get_config<'a, T>(key: &str) -> Result<T>
where
    T: Deserialize<'a>,
{
    settings()?
        .read()
        .map_err(|_error| error::Error::ConfigLockFailed)?
        .get::<T>(key)
        .context(error::Config)
}

pub fn get_config_element<'a, T>() -> Result<T>
where
    T: ConfigElement + Deserialize<'a>,
{
    get_config(T::KEY)
}

pub trait ConfigElement {
    const KEY: &'static str;
}

#[derive(Debug, Deserialize)]
pub struct Logging {
    pub log_spec: String,
}

impl ConfigElement for Logging {
    const KEY: &'static str = "logging";
}

/// Access parameters of the remote feature service that are handed to the clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceAccess {
    pub base_url: Url,
    pub instance_id: String,
    pub timeout_seconds: u64,
}

impl ConfigElement for ServiceAccess {
    const KEY: &'static str = "service_access";
}

/// Defaults of the raster overlay parameters that are not given explicitly
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RasterOverlayDefaults {
    pub mean_abs_difference: f64,
    pub image_format: MimeType,
}

impl ConfigElement for RasterOverlayDefaults {
    const KEY: &'static str = "raster_overlay_defaults";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let logging: Logging = get_config_element().unwrap();
        assert!(!logging.log_spec.is_empty());

        let service_access: ServiceAccess = get_config_element().unwrap();
        assert_eq!(service_access.base_url.scheme(), "https");
        assert!(service_access.timeout_seconds > 0);

        let defaults: RasterOverlayDefaults = get_config_element().unwrap();
        assert!(defaults.mean_abs_difference > 0.);
        assert_eq!(defaults.image_format, MimeType::Png);
    }

    #[test]
    fn override_setting() {
        set_config("service_access.instance_id", "overridden").unwrap();

        let service_access: ServiceAccess = get_config_element().unwrap();
        assert_eq!(service_access.instance_id, "overridden");
    }
}
