//! 配置提供者抽象接口

use infrastructure_common::{ConfigError, ConfigurationElements, PropertyTarget};
use std::fmt::Debug;
use thiserror::Error;

/// 配置提供者 trait
///
/// 向服务提供一批同类的配置元素。核心只消费返回的集合，
/// 不关心元素来自文件、数据库还是测试数据。同一次调用内顺序稳定。
///
/// 提供者自身可以被属性设置描述符配置（例如文件路径），
/// 因此要求实现 [`PropertyTarget`]。
pub trait ConfigurationProvider: PropertyTarget + Send + Sync + Debug {
    /// 获取配置元素
    fn get_elements(&self) -> Result<ConfigurationElements, ConfigError>;

    /// 获取提供者名称
    fn name(&self) -> &str;

    /// 重新加载底层数据源
    fn reload(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// 某个提供者收集失败
#[derive(Error, Debug)]
#[error("配置提供者 {provider} 失败: {source}")]
pub struct ProviderFailure {
    pub provider: String,
    #[source]
    pub source: ConfigError,
}

/// 从多个提供者依次收集配置元素，遇到第一个失败即停止
pub fn collect_elements<'a, I, P>(providers: I) -> Result<ConfigurationElements, ProviderFailure>
where
    I: IntoIterator<Item = &'a P>,
    P: ConfigurationProvider + ?Sized + 'a,
{
    let mut elements = ConfigurationElements::new();
    for provider in providers {
        let batch = provider.get_elements().map_err(|source| ProviderFailure {
            provider: provider.name().to_string(),
            source,
        })?;
        elements.extend(batch);
    }
    Ok(elements)
}
