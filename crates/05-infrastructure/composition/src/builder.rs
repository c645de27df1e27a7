//! 注册表构建器

use crate::context::ServiceContext;
use crate::errors::{CompositionError, CompositionResult};
use crate::logging::{init_logging, LoggingConfig};
use crate::settings::RegistrySettings;
use config_abstractions::{collect_elements, ConfigurationProvider};
use config_impl::provider_for_path;
use di_impl::{ServiceRegistry, TypeCatalog};
use infrastructure_common::{LoadError, ServiceError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 注册表构建器
///
/// 收集类型目录、配置提供者和日志设置，构建 [`ServiceRegistry`]。
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// 类型目录
    catalog: Option<Arc<TypeCatalog>>,
    /// 配置提供者列表，按顺序合并
    providers: Vec<Box<dyn ConfigurationProvider>>,
    /// 日志配置，设置后在构建时初始化日志
    logging: Option<LoggingConfig>,
}

impl RegistryBuilder {
    /// 创建新的注册表构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置类型目录
    pub fn with_catalog(mut self, catalog: Arc<TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// 添加配置提供者
    pub fn add_provider<T: ConfigurationProvider + 'static>(mut self, provider: T) -> Self {
        info!("添加配置提供者: {}", provider.name());
        self.providers.push(Box::new(provider));
        self
    }

    /// 添加描述符文件，按扩展名选择 JSON 或 TOML
    pub fn add_descriptor_file<P: AsRef<Path>>(mut self, path: P) -> CompositionResult<Self> {
        let path = path.as_ref();
        info!("添加描述符文件: {}", path.display());
        self.providers.push(provider_for_path(path)?);
        Ok(self)
    }

    /// 应用注册表设置：描述符文件与日志配置
    pub fn with_settings(mut self, settings: &RegistrySettings) -> CompositionResult<Self> {
        for file in &settings.descriptor_files {
            self = self.add_descriptor_file(file)?;
        }
        self.logging = Some(settings.logging());
        Ok(self)
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 构建注册表
    pub fn build(self) -> CompositionResult<ServiceRegistry> {
        if let Some(logging) = &self.logging {
            init_logging(logging)?;
        }

        let catalog = self.catalog.ok_or(CompositionError::MissingCatalog)?;
        let elements = collect_elements(self.providers.iter().map(|provider| provider.as_ref()))
            .map_err(|failure| {
                ServiceError::from(LoadError::Provider {
                    service: "RegistryBuilder".to_string(),
                    provider: failure.provider,
                    source: failure.source,
                })
            })?;
        debug!("从 {} 个提供者收集到 {} 个配置元素", self.providers.len(), elements.len());

        let registry = ServiceRegistry::from_elements(catalog, &elements)?;
        info!("注册表构建完成: {}", registry.id());
        Ok(registry)
    }

    /// 构建注册表并安装为进程级上下文
    pub fn install(self) -> CompositionResult<Arc<ServiceRegistry>> {
        let registry = Arc::new(self.build()?);
        ServiceContext::install(Arc::clone(&registry));
        Ok(registry)
    }
}
