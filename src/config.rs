//! Configuration of the demos
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`CE_SECTION__KEY`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{error::Result, params::BounceParams, slider::SliderConfig, vision::VisionConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreConfig {
    /// Ball-paddle system and its MPC
    #[serde(default)]
    pub bounce: BounceParams,
    /// Slider block on a table
    #[serde(default)]
    pub slider: SliderConfig,
    /// Depth camera viewer
    #[serde(default)]
    pub vision: VisionConfig,
}

impl ExploreConfig {
    /// Load configuration from the `config` directory
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }
        // CE_SLIDER__FINAL_TIME=2 -> slider.final_time = 2
        figment = figment.merge(Env::prefixed("CE_").split("__"));

        Ok(figment.extract()?)
    }

    /// Load the configuration, falling back to defaults on failure
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }
}
