//! 服务解析器抽象接口

use crate::service::Service;
use infrastructure_common::{short_type_name, AsAny, LoadError, ServiceError, ServiceResult};
use std::sync::Arc;

/// 服务解析器 trait
///
/// 按类型名、接口名或别名解析服务实例。
pub trait ServiceResolver: Send + Sync {
    /// 解析服务
    fn resolve(&self, key: &str) -> ServiceResult<Arc<dyn Service>>;

    /// 是否存在该键
    fn contains(&self, key: &str) -> bool;
}

/// 类型化解析扩展
pub trait ServiceResolverExt: ServiceResolver {
    /// 解析并还原为具体类型
    fn resolve_as<T: Service>(&self, key: &str) -> ServiceResult<Arc<T>> {
        let service = self.resolve(key)?;
        downcast_service(key, service)
    }
}

impl<R: ServiceResolver + ?Sized> ServiceResolverExt for R {}

/// 把服务实例还原为具体类型
pub fn downcast_service<T: Service>(
    key: &str,
    service: Arc<dyn Service>,
) -> ServiceResult<Arc<T>> {
    let actual = short_type_name((*service).concrete_type_name()).to_string();
    AsAny::into_any_arc(service).downcast::<T>().map_err(|_| {
        ServiceError::from(LoadError::MissingCapability {
            type_name: format!("{} ({})", actual, key),
            capability: short_type_name(std::any::type_name::<T>()).to_string(),
        })
    })
}
