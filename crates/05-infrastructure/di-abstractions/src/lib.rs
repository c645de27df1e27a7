//! # Service & Rule Abstractions
//!
//! 服务注册表与业务规则的抽象层。
//!
//! ## 核心接口
//!
//! - [`Service`] - 可按名称解析的单例服务
//! - [`ServiceFactory`] - 服务构建策略
//! - [`ServiceResolver`] - 服务解析接口
//! - [`BusinessRule`] / [`BusinessRulesService`] - 业务规则与规则服务
//! - [`RuleKey`] - 以枚举值寻址规则

pub mod factory;
pub mod resolver;
pub mod rules;
pub mod service;

pub use factory::*;
pub use resolver::*;
pub use rules::*;
pub use service::*;
