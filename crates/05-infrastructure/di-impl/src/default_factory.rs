//! 默认服务工厂

use crate::catalog::TypeCatalog;
use di_abstractions::{Service, ServiceFactory};
use infrastructure_common::{LoadError, LoadResult, PropertyTarget, ServiceDescriptor};
use std::sync::Arc;
use tracing::debug;

/// 默认服务工厂
///
/// 服务描述符未指定工厂别名时使用。依次完成：
///
/// 1. 用类型目录中的无参构造函数实例化（描述符指定模块时校验模块）；
/// 2. 描述符声明了接口时，校验目录条目声明了该接口；
/// 3. 按顺序应用属性设置；
/// 4. 实例化每个配置提供者描述符，设置属性后注册到服务。
#[derive(Debug, Clone)]
pub struct DefaultServiceFactory {
    catalog: Arc<TypeCatalog>,
}

impl DefaultServiceFactory {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }
}

impl PropertyTarget for DefaultServiceFactory {}

impl ServiceFactory for DefaultServiceFactory {
    fn create_service(&self, descriptor: &ServiceDescriptor) -> LoadResult<Box<dyn Service>> {
        let type_name = descriptor.type_name.as_str();
        let (mut service, entry) = self
            .catalog
            .instantiate_service(type_name, descriptor.module.as_deref())?;

        if let Some(interface) = descriptor.interface.as_deref().filter(|i| !i.is_empty()) {
            if !entry.provides(interface) {
                return Err(LoadError::MissingCapability {
                    type_name: format!("{} (模块: {})", type_name, entry.module_name()),
                    capability: interface.to_string(),
                });
            }
        }

        self.catalog
            .apply_properties(&mut *service, type_name, &descriptor.properties)?;

        for provider_descriptor in &descriptor.providers {
            let mut provider = self.catalog.instantiate_provider(
                &provider_descriptor.type_name,
                provider_descriptor.module.as_deref(),
            )?;
            self.catalog.apply_properties(
                &mut *provider,
                &provider_descriptor.type_name,
                &provider_descriptor.properties,
            )?;
            debug!(
                "服务 {} 注册配置提供者 {}",
                type_name,
                provider.name()
            );
            service.register_configuration_provider(provider);
        }

        debug!("默认工厂创建服务: {} ({})", type_name, entry.module_name());
        Ok(service)
    }

    fn name(&self) -> &str {
        "DefaultServiceFactory"
    }
}
