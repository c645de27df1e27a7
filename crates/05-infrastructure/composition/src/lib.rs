//! # 注册表组合层
//!
//! 将类型目录、描述符文件和日志设置组合成可用的服务注册表，
//! 并提供进程级的服务上下文。
//!
//! ## 主要组件
//!
//! - [`RegistryBuilder`] - 构建者模式组装 [`di_impl::ServiceRegistry`]
//! - [`ServiceContext`] - 进程级当前注册表，支持整体替换式重新加载
//! - [`RegistrySettings`] - 文件与环境变量分层的注册表设置
//! - [`LoggingConfig`] - 基于 `tracing-subscriber` 的日志配置
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{RegistryBuilder, RegistrySettings};
//! use di_impl::{RuleSetService, TypeCatalog};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = TypeCatalog::builder()
//!         .with_service(RuleSetService::catalog_entry("RuleSetService"))
//!         .build()?;
//!
//!     let settings = RegistrySettings::load()?;
//!     let registry = RegistryBuilder::new()
//!         .with_catalog(catalog)
//!         .with_settings(&settings)?
//!         .install()?;
//!
//!     let rules = registry.get("BusinessRulesService")?;
//!     println!("已加载: {:?}", rules);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod errors;
pub mod logging;
pub mod settings;

pub use builder::RegistryBuilder;
pub use context::ServiceContext;
pub use errors::{CompositionError, CompositionResult};
pub use logging::{init_logging, LoggingConfig};
pub use settings::RegistrySettings;
