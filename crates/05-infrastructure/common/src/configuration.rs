//! 容器配置
//!
//! 使用 `config` crate 从可选的配置文件和 `DI_` 前缀的环境变量加载。

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 默认配置文件（不含扩展名，支持 toml/json/yaml）
pub const DEFAULT_CONFIG_FILE: &str = "config/di";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DI";

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 是否输出每个解析步骤的调试日志
    pub log_resolution_steps: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 100,
            log_resolution_steps: false,
        }
    }
}

impl ContainerConfig {
    /// 从默认配置文件和环境变量加载
    pub fn load() -> ConfigResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(environment());
        Self::build(builder)
    }

    /// 从指定配置文件加载，环境变量仍然优先
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("加载容器配置文件: {}", path.display());
        let builder = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment());
        Self::build(builder)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ConfigResult<Self> {
        let settings = builder.build().map_err(|e| {
            error!("容器配置构建失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        let config: Self = settings.try_deserialize().map_err(|e| {
            error!("容器配置绑定失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        config.validate()?;
        debug!("容器配置加载完成: {:?}", config);
        Ok(config)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
