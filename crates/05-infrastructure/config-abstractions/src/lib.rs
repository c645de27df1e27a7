//! # Configuration Abstractions
//!
//! 配置提供者抽象层。服务在加载时从已注册的提供者拉取配置元素。
//!
//! ## 核心接口
//!
//! - [`ConfigurationProvider`] - 配置提供者接口

pub mod provider;

pub use provider::*;
