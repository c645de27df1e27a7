//! 注册表设置
//!
//! 从可选的 `config/registry.{toml,json,yaml}` 文件和 `ADSP_REGISTRY__*`
//! 环境变量加载，环境变量优先。

use crate::errors::CompositionResult;
use crate::logging::LoggingConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "ADSP_REGISTRY";

/// 默认设置文件（不含扩展名）
pub const DEFAULT_SETTINGS_FILE: &str = "config/registry";

/// 注册表设置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrySettings {
    /// 描述符文件，按顺序加载
    #[serde(default)]
    pub descriptor_files: Vec<PathBuf>,
    /// 日志过滤表达式
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// 是否输出 JSON 日志
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            descriptor_files: Vec::new(),
            log_filter: default_log_filter(),
            json_logs: false,
        }
    }
}

impl RegistrySettings {
    /// 从默认位置加载
    pub fn load() -> CompositionResult<Self> {
        Self::load_from(DEFAULT_SETTINGS_FILE, false)
    }

    /// 从指定文件加载，`required` 为假时文件可以不存在
    pub fn load_from(file: impl AsRef<Path>, required: bool) -> CompositionResult<Self> {
        let file = file.as_ref().to_string_lossy().into_owned();
        let settings = config::Config::builder()
            .set_default("log_filter", default_log_filter())?
            .set_default("json_logs", false)?
            .add_source(config::File::with_name(&file).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("descriptor_files")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// 对应的日志配置
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            filter: self.log_filter.clone(),
            json_format: self.json_logs,
            ..LoggingConfig::default()
        }
    }
}
