//! Configuration loading using Figment
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Default values (hardcoded)
//! 2. `planboard.toml`, `planboard.yaml`, `planboard.json` in the config directory
//! 3. Environment variables with the `PLANBOARD_` prefix

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use planboard_fields::{CodecMode, Scope, ValueCodec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::{Result, TaskError};
use crate::types::{PriorityLevel, TaskPriority, Urgency};
use crate::validate::{TaskRules, TaskValidator};

/// Prefix of environment variables read by the provider
pub const ENV_PREFIX: &str = "PLANBOARD_";

/// File stem of discovered configuration files
pub const CONFIG_FILE_STEM: &str = "planboard";

/// Runtime settings of the task engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanboardConfig {
    /// How the value codec treats malformed input
    pub codec_mode: CodecMode,
    /// Priority given to new project tasks that don't name one
    pub default_project_priority: PriorityLevel,
    /// Priority given to new global tasks that don't name one
    pub default_global_priority: Urgency,
    pub title_min_len: usize,
    pub title_max_len: usize,
    pub description_max_len: usize,
    /// Root for the file store and property registry, when file-backed
    pub data_dir: Option<PathBuf>,
}

impl Default for PlanboardConfig {
    fn default() -> Self {
        let rules = TaskRules::default();
        Self {
            codec_mode: CodecMode::Lenient,
            default_project_priority: PriorityLevel::P3,
            default_global_priority: Urgency::Medium,
            title_min_len: rules.title_min,
            title_max_len: rules.title_max,
            description_max_len: rules.description_max,
            data_dir: None,
        }
    }
}

impl PlanboardConfig {
    /// Priority used when a new task in `scope` doesn't supply one
    pub fn default_priority(&self, scope: &Scope) -> TaskPriority {
        match scope {
            Scope::Global => self.default_global_priority.into(),
            Scope::Project(_) => self.default_project_priority.into(),
        }
    }

    pub fn codec(&self) -> ValueCodec {
        ValueCodec::new(self.codec_mode)
    }

    pub fn rules(&self) -> TaskRules {
        TaskRules {
            title_min: self.title_min_len,
            title_max: self.title_max_len,
            description_max: self.description_max_len,
        }
    }

    pub fn validator(&self) -> TaskValidator {
        TaskValidator::new(self.rules())
    }

    fn check(&self) -> Result<()> {
        if self.title_min_len > self.title_max_len {
            return Err(TaskError::config(format!(
                "title_min_len ({}) is greater than title_max_len ({})",
                self.title_min_len, self.title_max_len
            )));
        }
        Ok(())
    }
}

/// Configuration provider using figment
///
/// No caching is performed; configuration is read fresh on every `load`.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    config_dir: Option<PathBuf>,
}

impl ConfigProvider {
    /// Provider reading defaults and environment only
    pub fn new() -> Self {
        Self::default()
    }

    /// Also discover configuration files in `dir`
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Load and check the configuration from all sources
    pub fn load(&self) -> Result<PlanboardConfig> {
        let config: PlanboardConfig = self
            .build_figment()
            .extract()
            .map_err(|e| TaskError::config(e.to_string()))?;
        config.check()?;
        info!(
            codec_mode = ?config.codec_mode,
            data_dir = ?config.data_dir,
            "configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(&self) -> Figment {
        debug!("Building figment configuration with precedence order");
        let mut figment = Figment::new().merge(Serialized::defaults(PlanboardConfig::default()));
        if let Some(dir) = &self.config_dir {
            figment = figment.merge(self.load_config_files(dir));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }

    fn load_config_files(&self, dir: &Path) -> Figment {
        let toml = dir.join(format!("{CONFIG_FILE_STEM}.toml"));
        let yaml = dir.join(format!("{CONFIG_FILE_STEM}.yaml"));
        let json = dir.join(format!("{CONFIG_FILE_STEM}.json"));
        for path in [&toml, &yaml, &json] {
            if path.is_file() {
                trace!(path = %path.display(), "config file found");
            }
        }
        // Missing files contribute nothing
        Figment::new()
            .merge(Toml::file(toml))
            .merge(Yaml::file(yaml))
            .merge(Json::file(json))
    }
}
