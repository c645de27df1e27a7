//! # Service & Rule Registry Implementation
//!
//! 服务注册表与业务规则注册表的具体实现。
//!
//! - [`TypeCatalog`] - 按名称登记的可构造类型
//! - [`DefaultServiceFactory`] - 默认服务构建策略
//! - [`ServiceRegistry`] - 多键、延迟构建、单例缓存的服务注册表
//! - [`RuleRegistry`] - 部分失败可继续的业务规则注册表
//! - [`RuleSetService`] - 现成的业务规则服务

pub mod catalog;
pub mod default_factory;
pub mod rule_registry;
pub mod rule_service;
pub mod service_registry;

pub use catalog::*;
pub use default_factory::DefaultServiceFactory;
pub use rule_registry::RuleRegistry;
pub use rule_service::RuleSetService;
pub use service_registry::{ServiceInfo, ServiceRegistry};
