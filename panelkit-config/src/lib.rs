//! panelkit configuration management using figment
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`PanelConfig::default`])
//! 2. A `panelkit.{toml,yaml,yml,json}` file in the configured directory
//! 3. Environment variables prefixed with `PANELKIT_`
//!
//! ```no_run
//! use panelkit_config::ConfigProvider;
//!
//! let config = ConfigProvider::new().with_config_dir(".").load()?;
//! assert!(config.max_items_per_page >= config.items_per_page);
//! # Ok::<(), panelkit_config::ConfigError>(())
//! ```

mod error;
mod provider;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, CONFIG_FILE_STEM, ENV_PREFIX};
pub use types::PanelConfig;
