//! 错误类型定义

use thiserror::Error;

/// 装箱错误，用于构造闭包与外部协作者的边界
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {path}, 原因: {source}")]
    ParseError { path: String, source: BoxError },

    #[error("配置提供者未设置路径: {provider}")]
    PathNotSet { provider: String },

    #[error("配置提供者失败: {provider}, 原因: {message}")]
    ProviderError { provider: String, message: String },
}

/// 值转换错误类型
///
/// 字符串参数或属性值转换为目标类型时产生。
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("构造参数缺少目标类型名: 值 {value:?}")]
    MissingParameterType { value: String },

    #[error("未知的参数类型: {type_name}")]
    UnknownParameterType { type_name: String },

    #[error("值 {value:?} 无法转换为 {kind}: {reason}")]
    InvalidValue {
        value: String,
        kind: String,
        reason: String,
    },

    #[error("目标不存在属性: {property}")]
    UnknownProperty { property: String },

    #[error("类型 {type_name} 没有匹配的构造函数: ({signature})")]
    NoMatchingConstructor {
        type_name: String,
        signature: String,
    },

    #[error("构造参数 #{index} 类型不匹配: 期望 {expected}, 实际 {actual}")]
    ArgumentMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

impl ConversionError {
    /// 创建值无效错误
    pub fn invalid_value(
        value: impl Into<String>,
        kind: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            value: value.into(),
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// 加载失败的具体原因
///
/// 服务、工厂或规则批次在实例化、配置过程中的任何失败。
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("工厂 {factory} 声明为运行时提供, 但尚未注册实例")]
    FactoryNotSupplied { factory: String },

    #[error("未声明工厂: {factory}")]
    FactoryNotDeclared { factory: String },

    #[error("类型目录中不存在类型: {type_name} (模块: {module})")]
    TypeNotFound { type_name: String, module: String },

    #[error("类型 {type_name} 属于模块 {actual}, 描述符要求模块 {expected}")]
    ModuleMismatch {
        type_name: String,
        expected: String,
        actual: String,
    },

    #[error("类型 {type_name} 未实现所需能力: {capability}")]
    MissingCapability {
        type_name: String,
        capability: String,
    },

    #[error("类型 {type_name} (模块: {module}) 构造失败: {source}")]
    Construction {
        type_name: String,
        module: String,
        source: BoxError,
    },

    #[error("类型 {type_name} 设置属性 {property} 失败: {source}")]
    Property {
        type_name: String,
        property: String,
        source: ConversionError,
    },

    #[error("服务 {service} 的配置提供者 {provider} 失败: {source}")]
    Provider {
        service: String,
        provider: String,
        source: ConfigError,
    },

    #[error("服务 {type_name} 加载配置失败: {source}")]
    ServiceLoad { type_name: String, source: BoxError },

    #[error("描述符无效: {message}")]
    InvalidDescriptor { message: String },

    #[error("注册键冲突: {key} 已指向 {existing}")]
    DuplicateKey { key: String, existing: String },

    #[error("检测到循环解析: {chain}")]
    CircularResolution { chain: String },

    #[error("规则 {identifier} 构建失败: {source}")]
    Rule { identifier: String, source: BoxError },

    /// 规则批次中至少一个描述符失败，只保留最后一个失败的细节
    #[error("规则批次加载失败 ({failed} 个失败), 最后一个错误: {last}")]
    RuleBatch { failed: usize, last: Box<LoadError> },
}

/// 服务与规则注册表错误类型
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("服务未注册: {key}")]
    NotRegistered { key: String },

    #[error("加载失败: {0}")]
    LoadFailure(#[from] LoadError),

    #[error("规则未找到: {key}")]
    RuleNotFound { key: String },

    #[error("规则类型不匹配: {key}, 期望 {expected}, 实际 {actual}")]
    RuleTypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },
}

impl ServiceError {
    /// 创建未注册错误
    pub fn not_registered(key: impl Into<String>) -> Self {
        Self::NotRegistered { key: key.into() }
    }

    /// 是否为加载失败
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::LoadFailure(_))
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ConversionResult<T> = Result<T, ConversionError>;
pub type LoadResult<T> = Result<T, LoadError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
