//! # Infrastructure Common
//!
//! 服务与业务规则注册表共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`metadata`] - 服务、工厂、提供者、规则及参数描述符
//! - [`configuration`] - 配置元素与集合
//! - [`conversion`] - 字符串值到目标类型的转换
//! - [`errors`] - 错误类型
//! - [`lifecycle`] - 释放与生命周期状态
//! - [`component`] - 类型擦除辅助

pub mod component;
pub mod configuration;
pub mod conversion;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use configuration::*;
pub use conversion::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
