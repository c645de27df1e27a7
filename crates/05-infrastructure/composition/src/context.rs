//! 进程级服务上下文
//!
//! 持有当前生效的 [`ServiceRegistry`]。重新加载时先完整构建新注册表，
//! 成功后再替换，已取得旧注册表句柄的调用方不受影响。

use crate::errors::{CompositionError, CompositionResult};
use config_abstractions::ConfigurationProvider;
use di_abstractions::Service;
use di_impl::ServiceRegistry;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// 当前服务注册表
static CURRENT_REGISTRY: Lazy<RwLock<Option<Arc<ServiceRegistry>>>> =
    Lazy::new(|| RwLock::new(None));

/// 服务上下文
pub struct ServiceContext;

impl ServiceContext {
    /// 安装注册表，返回被替换的旧注册表
    pub fn install(registry: Arc<ServiceRegistry>) -> Option<Arc<ServiceRegistry>> {
        info!("安装服务注册表: {}", registry.id());
        CURRENT_REGISTRY.write().replace(registry)
    }

    /// 当前注册表
    pub fn current() -> CompositionResult<Arc<ServiceRegistry>> {
        Self::try_current().ok_or(CompositionError::NotInstalled)
    }

    pub fn try_current() -> Option<Arc<ServiceRegistry>> {
        CURRENT_REGISTRY.read().clone()
    }

    /// 用新的配置提供者重建注册表并替换当前注册表
    ///
    /// 沿用当前注册表的类型目录。构建失败时当前注册表保持不变。
    pub fn reload(provider: &dyn ConfigurationProvider) -> CompositionResult<Arc<ServiceRegistry>> {
        let current = Self::current()?;
        let registry = Arc::new(ServiceRegistry::from_provider(
            Arc::clone(current.catalog()),
            provider,
        )?);
        info!("重新加载服务注册表: {} -> {}", current.id(), registry.id());
        Self::install(Arc::clone(&registry));
        Ok(registry)
    }

    /// 移除当前注册表
    pub fn reset() -> Option<Arc<ServiceRegistry>> {
        CURRENT_REGISTRY.write().take()
    }

    /// 从当前注册表解析服务
    pub fn get(key: &str) -> CompositionResult<Arc<dyn Service>> {
        Ok(Self::current()?.get(key)?)
    }
}
