//! 服务抽象接口

use config_abstractions::{collect_elements, ConfigurationProvider};
use infrastructure_common::{
    short_type_name, AsAny, BoxError, ConfigurationElements, LoadError, LoadResult,
    PropertyTarget,
};
use std::fmt::Debug;

/// 服务 trait
///
/// 长期存在、按需构建的单例组件。注册表在首次解析时构建服务，
/// 然后调用 [`Service::load`] 让服务从自己的配置提供者拉取配置。
pub trait Service: AsAny + PropertyTarget + Debug {
    /// 注册配置提供者
    fn register_configuration_provider(&mut self, provider: Box<dyn ConfigurationProvider>);

    /// 已注册的配置提供者
    fn configuration_providers(&self) -> &[Box<dyn ConfigurationProvider>];

    /// 使用显式给定的配置元素初始化
    fn load_elements(&mut self, elements: ConfigurationElements) -> Result<(), BoxError>;

    /// 使用默认配置源初始化
    ///
    /// 依次从每个已注册的提供者收集元素，再交给 [`Service::load_elements`]。
    fn load(&mut self) -> LoadResult<()> {
        let service = short_type_name((*self).concrete_type_name()).to_string();
        let providers = self.configuration_providers();
        let elements = collect_elements(providers.iter().map(|provider| provider.as_ref()))
            .map_err(|failure| LoadError::Provider {
                service: service.clone(),
                provider: failure.provider,
                source: failure.source,
            })?;

        self.load_elements(elements)
            .map_err(|source| LoadError::ServiceLoad {
                type_name: service,
                source,
            })
    }
}

/// 服务基础实现
///
/// 保存配置提供者列表，具体服务嵌入后委托即可。
#[derive(Debug, Default)]
pub struct ServiceBase {
    providers: Vec<Box<dyn ConfigurationProvider>>,
}

impl ServiceBase {
    /// 创建新的服务基础实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册配置提供者
    pub fn register(&mut self, provider: Box<dyn ConfigurationProvider>) {
        self.providers.push(provider);
    }

    /// 已注册的配置提供者
    pub fn providers(&self) -> &[Box<dyn ConfigurationProvider>] {
        &self.providers
    }

    /// 提供者数量
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}
