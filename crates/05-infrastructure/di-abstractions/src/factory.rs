//! 服务工厂抽象接口
//!
//! 工厂是把服务描述符变成服务实例的策略对象。

use crate::service::Service;
use infrastructure_common::{
    short_type_name, AsAny, LoadResult, PropertyTarget, ServiceDescriptor,
};
use std::fmt;

/// 服务工厂 trait
pub trait ServiceFactory: AsAny + PropertyTarget + fmt::Debug {
    /// 按描述符创建并配置服务实例
    fn create_service(&self, descriptor: &ServiceDescriptor) -> LoadResult<Box<dyn Service>>;

    /// 工厂名称
    fn name(&self) -> &str {
        short_type_name((*self).concrete_type_name())
    }
}

/// Lambda 工厂包装器
///
/// 用闭包实现的工厂，常用于运行时注册。
pub struct LambdaFactory<F>
where
    F: Fn(&ServiceDescriptor) -> LoadResult<Box<dyn Service>> + Send + Sync + 'static,
{
    name: String,
    factory_fn: F,
}

impl<F> LambdaFactory<F>
where
    F: Fn(&ServiceDescriptor) -> LoadResult<Box<dyn Service>> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, factory_fn: F) -> Self {
        Self {
            name: name.into(),
            factory_fn,
        }
    }
}

impl<F> fmt::Debug for LambdaFactory<F>
where
    F: Fn(&ServiceDescriptor) -> LoadResult<Box<dyn Service>> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaFactory")
            .field("name", &self.name)
            .field("factory_fn", &"<function>")
            .finish()
    }
}

impl<F> PropertyTarget for LambdaFactory<F> where
    F: Fn(&ServiceDescriptor) -> LoadResult<Box<dyn Service>> + Send + Sync + 'static
{
}

impl<F> ServiceFactory for LambdaFactory<F>
where
    F: Fn(&ServiceDescriptor) -> LoadResult<Box<dyn Service>> + Send + Sync + 'static,
{
    fn create_service(&self, descriptor: &ServiceDescriptor) -> LoadResult<Box<dyn Service>> {
        (self.factory_fn)(descriptor)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
