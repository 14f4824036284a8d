//! Configuration provider using Figment

use crate::{error::ConfigError, types::PanelConfig, ConfigResult};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix for environment variable overrides (`PANELKIT_MAX_ITEMS_PER_PAGE`).
pub const ENV_PREFIX: &str = "PANELKIT_";

/// File stem looked up in the configuration directory.
pub const CONFIG_FILE_STEM: &str = "panelkit";

/// Configuration provider using figment
///
/// No caching is performed; every `load` reads the sources again.
#[derive(Debug, Default)]
pub struct ConfigProvider {
    config_dir: Option<PathBuf>,
}

impl ConfigProvider {
    /// Create a provider reading defaults and environment only.
    pub fn new() -> Self {
        Self { config_dir: None }
    }

    /// Also read `panelkit.{toml,yaml,yml,json}` from `dir`.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> ConfigResult<PanelConfig> {
        let config: PanelConfig = self.build_figment().extract()?;
        validate(&config)?;
        debug!(
            items_per_page = config.items_per_page,
            max_items_per_page = config.max_items_per_page,
            multi_domains = config.multi_domains,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Sources in precedence order: defaults, file, environment.
    fn build_figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(PanelConfig::default()));

        if let Some(dir) = &self.config_dir {
            figment = figment.merge(config_files(dir));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }
}

fn config_files(dir: &Path) -> Figment {
    let mut figment = Figment::new();
    for ext in ["toml", "yaml", "yml", "json"] {
        let path = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
        if !path.is_file() {
            continue;
        }
        trace!(path = %path.display(), "loading config file");
        figment = match ext {
            "toml" => figment.merge(Toml::file(&path)),
            "json" => figment.merge(Json::file(&path)),
            _ => figment.merge(Yaml::file(&path)),
        };
    }
    figment
}

fn validate(config: &PanelConfig) -> ConfigResult<()> {
    if config.max_items_per_page == 0 {
        return Err(ConfigError::validation(
            "max_items_per_page must be greater than zero",
        ));
    }
    if config.framework_package.trim().is_empty() {
        return Err(ConfigError::validation("framework_package cannot be empty"));
    }
    Ok(())
}
