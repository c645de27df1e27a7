//! 组合层错误类型

use infrastructure_common::ServiceError;
use thiserror::Error;

/// 组合层错误
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("注册表设置加载失败: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("描述符文件加载失败: {0}")]
    Descriptor(#[from] infrastructure_common::ConfigError),

    #[error("日志初始化失败: {message}")]
    Logging { message: String },

    #[error("未设置类型目录")]
    MissingCatalog,

    #[error("注册表构建失败: {0}")]
    Registry(#[from] ServiceError),

    #[error("服务上下文尚未安装")]
    NotInstalled,
}

pub type CompositionResult<T> = Result<T, CompositionError>;
