//! # Configuration Implementation
//!
//! 配置提供者的具体实现。
//!
//! ## 主要组件
//!
//! - [`InMemoryConfigurationProvider`] - 内存提供者，测试与程序内装配
//! - [`JsonConfigurationProvider`] - JSON 描述符文件提供者
//! - [`TomlConfigurationProvider`] - TOML 描述符文件提供者
//! - [`DescriptorDocument`] - 描述符文件结构

pub mod document;
pub mod providers;

pub use document::*;
pub use providers::*;

#[cfg(test)]
mod tests;
