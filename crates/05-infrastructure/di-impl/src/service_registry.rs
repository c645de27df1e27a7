//! 服务注册表
//!
//! 服务描述符以类型名、接口名和别名登记，每个规范键（类型名）
//! 对应一个实例槽。实例在首次解析时构建并缓存，此后同一注册表
//! 内所有键都返回同一个实例。

use crate::catalog::TypeCatalog;
use crate::default_factory::DefaultServiceFactory;
use chrono::{DateTime, Utc};
use config_abstractions::ConfigurationProvider;
use dashmap::DashMap;
use di_abstractions::{downcast_service, Service, ServiceFactory, ServiceResolver};
use infrastructure_common::{
    ConfigurationElement, ConfigurationElements, FactoryDescriptor, LoadError, LoadResult,
    ServiceDescriptor, ServiceError, ServiceResult,
};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// 实例槽
#[derive(Default)]
struct InstanceSlot {
    instance: Option<Arc<dyn Service>>,
    built_at: Option<DateTime<Utc>>,
}

/// 服务信息快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// 规范键（实现类型名）
    pub canonical_key: String,
    /// 所有注册键
    pub keys: Vec<String>,
    /// 定义模块
    pub module: String,
    /// 工厂别名，`None` 表示默认工厂
    pub factory: Option<String>,
    /// 构建时间，未构建时为 `None`
    pub built_at: Option<DateTime<Utc>>,
}

impl ServiceInfo {
    pub fn is_built(&self) -> bool {
        self.built_at.is_some()
    }
}

/// 服务注册表
pub struct ServiceRegistry {
    id: Uuid,
    catalog: Arc<TypeCatalog>,
    default_factory: Arc<dyn ServiceFactory>,
    /// 注册键 -> 描述符（初始化后只读）
    descriptors: HashMap<String, Arc<ServiceDescriptor>>,
    /// 规范键 -> 实例槽
    instances: DashMap<String, InstanceSlot>,
    /// 工厂键 -> 工厂，运行时提供的工厂在提供前为空
    factories: DashMap<String, Option<Arc<dyn ServiceFactory>>>,
    /// 构建锁，同时记录当前线程正在构建的规范键链
    building: ReentrantMutex<RefCell<Vec<String>>>,
}

impl ServiceRegistry {
    /// 从配置元素初始化
    ///
    /// 工厂描述符立即构建（运行时提供的只保留空槽），服务描述符
    /// 只登记不构建，其它元素忽略。
    pub fn from_elements(
        catalog: Arc<TypeCatalog>,
        elements: &ConfigurationElements,
    ) -> ServiceResult<Self> {
        let id = Uuid::new_v4();
        let _span = info_span!("service_registry", registry = %id).entered();

        let mut registry = Self {
            id,
            default_factory: Arc::new(DefaultServiceFactory::new(Arc::clone(&catalog))),
            catalog,
            descriptors: HashMap::new(),
            instances: DashMap::new(),
            factories: DashMap::new(),
            building: ReentrantMutex::new(RefCell::new(Vec::new())),
        };

        for element in elements.iter() {
            match element {
                ConfigurationElement::Factory(descriptor) => registry.declare_factory(descriptor)?,
                ConfigurationElement::Service(descriptor) => registry.declare_service(descriptor)?,
                other => debug!("忽略配置元素: {}", other.kind()),
            }
        }

        info!(
            "服务注册表初始化完成: {} 个服务, {} 个工厂",
            registry.instances.len(),
            registry.factories.len()
        );
        Ok(registry)
    }

    /// 从配置提供者初始化
    pub fn from_provider(
        catalog: Arc<TypeCatalog>,
        provider: &dyn ConfigurationProvider,
    ) -> ServiceResult<Self> {
        let elements = provider
            .get_elements()
            .map_err(|source| LoadError::Provider {
                service: "ServiceRegistry".to_string(),
                provider: provider.name().to_string(),
                source,
            })?;
        Self::from_elements(catalog, &elements)
    }

    fn declare_factory(&mut self, descriptor: &FactoryDescriptor) -> LoadResult<()> {
        let key = descriptor.canonical_key().to_string();
        if self.factories.contains_key(&key) {
            return Err(LoadError::DuplicateKey {
                existing: format!("工厂 {}", key),
                key,
            });
        }

        if descriptor.runtime_supplied {
            debug!("登记运行时工厂槽: {}", key);
            self.factories.insert(key, None);
            return Ok(());
        }

        let mut factory = self
            .catalog
            .instantiate_factory(&descriptor.type_name, descriptor.module.as_deref())?;
        self.catalog
            .apply_properties(&mut *factory, &descriptor.type_name, &descriptor.properties)?;
        debug!("构建工厂: {} ({})", key, descriptor.module_name());
        self.factories.insert(key, Some(Arc::from(factory)));
        Ok(())
    }

    fn declare_service(&mut self, descriptor: &ServiceDescriptor) -> LoadResult<()> {
        if descriptor.type_name.trim().is_empty() {
            return Err(LoadError::InvalidDescriptor {
                message: "服务描述符缺少实现类型名".to_string(),
            });
        }

        let descriptor = Arc::new(descriptor.clone());
        for key in descriptor.keys() {
            if let Some(existing) = self.descriptors.get(key) {
                return Err(LoadError::DuplicateKey {
                    key: key.to_string(),
                    existing: existing.type_name.clone(),
                });
            }
        }

        for key in descriptor.keys() {
            self.descriptors
                .insert(key.to_string(), Arc::clone(&descriptor));
        }
        self.instances
            .insert(descriptor.canonical_key().to_string(), InstanceSlot::default());
        debug!("登记服务: {:?}", descriptor.keys());
        Ok(())
    }

    /// 注册表标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// 解析服务，首次解析时构建
    pub fn get(&self, key: &str) -> ServiceResult<Arc<dyn Service>> {
        let descriptor = self
            .descriptors
            .get(key)
            .ok_or_else(|| ServiceError::not_registered(key))?;
        let canonical = descriptor.canonical_key();

        if let Some(instance) = self.cached(canonical) {
            return Ok(instance);
        }

        let guard = self.building.lock();
        if let Some(instance) = self.cached(canonical) {
            return Ok(instance);
        }

        {
            let mut chain = guard.borrow_mut();
            if chain.iter().any(|building| building == canonical) {
                let mut cycle = chain.clone();
                cycle.push(canonical.to_string());
                return Err(LoadError::CircularResolution {
                    chain: cycle.join(" -> "),
                }
                .into());
            }
            chain.push(canonical.to_string());
        }

        let entry = ChainEntry(&*guard);
        let _span = info_span!("build_service", registry = %self.id, service = canonical).entered();
        let result = self.build(descriptor);
        drop(entry);

        let instance: Arc<dyn Service> = Arc::from(result?);
        if let Some(mut slot) = self.instances.get_mut(canonical) {
            slot.instance = Some(Arc::clone(&instance));
            slot.built_at = Some(Utc::now());
        }
        info!("服务构建完成: {}", canonical);
        Ok(instance)
    }

    /// 解析并还原为具体类型
    pub fn get_as<T: Service>(&self, key: &str) -> ServiceResult<Arc<T>> {
        downcast_service(key, self.get(key)?)
    }

    fn cached(&self, canonical: &str) -> Option<Arc<dyn Service>> {
        self.instances
            .get(canonical)
            .and_then(|slot| slot.instance.clone())
    }

    fn build(&self, descriptor: &ServiceDescriptor) -> LoadResult<Box<dyn Service>> {
        let factory = self.resolve_factory(descriptor)?;
        debug!(
            "使用工厂 {} 构建服务 {}",
            factory.name(),
            descriptor.type_name
        );
        let mut service = factory.create_service(descriptor)?;
        service.load()?;
        Ok(service)
    }

    fn resolve_factory(&self, descriptor: &ServiceDescriptor) -> LoadResult<Arc<dyn ServiceFactory>> {
        let Some(alias) = descriptor.factory.as_deref().filter(|alias| !alias.is_empty()) else {
            return Ok(Arc::clone(&self.default_factory));
        };
        let slot = self
            .factories
            .get(alias)
            .ok_or_else(|| LoadError::FactoryNotDeclared {
                factory: alias.to_string(),
            })?;
        let factory = slot.value().clone();
        factory.ok_or_else(|| LoadError::FactoryNotSupplied {
            factory: alias.to_string(),
        })
    }

    /// 运行时提供工厂
    ///
    /// 键必须已通过工厂描述符声明，已提供的工厂会被替换。
    pub fn register_factory(
        &self,
        key: &str,
        factory: Arc<dyn ServiceFactory>,
    ) -> ServiceResult<()> {
        let mut slot = self
            .factories
            .get_mut(key)
            .ok_or_else(|| ServiceError::not_registered(key))?;
        if slot.is_some() {
            warn!("替换已存在的工厂: {}", key);
        }
        info!("注册运行时工厂: {} -> {}", key, factory.name());
        *slot = Some(factory);
        Ok(())
    }

    /// 是否存在该注册键
    pub fn contains(&self, key: &str) -> bool {
        self.descriptors.contains_key(key)
    }

    /// 所有注册键（排序）
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.descriptors.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 该键对应的服务是否已构建
    pub fn is_built(&self, key: &str) -> bool {
        self.descriptors
            .get(key)
            .map(|descriptor| self.cached(descriptor.canonical_key()).is_some())
            .unwrap_or(false)
    }

    /// 是否声明了该工厂键
    pub fn has_factory(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// 服务信息快照（按规范键排序）
    pub fn services(&self) -> Vec<ServiceInfo> {
        let mut infos: Vec<ServiceInfo> = self
            .descriptors
            .iter()
            .filter(|(key, descriptor)| key.as_str() == descriptor.canonical_key())
            .map(|(_, descriptor)| ServiceInfo {
                canonical_key: descriptor.canonical_key().to_string(),
                keys: descriptor.keys().into_iter().map(str::to_string).collect(),
                module: descriptor.module_name().to_string(),
                factory: descriptor.factory.clone(),
                built_at: self
                    .instances
                    .get(descriptor.canonical_key())
                    .and_then(|slot| slot.built_at),
            })
            .collect();
        infos.sort_by(|a, b| a.canonical_key.cmp(&b.canonical_key));
        infos
    }

    /// 丢弃所有已构建实例，描述符和工厂保留
    pub fn clear(&self) {
        let _guard = self.building.lock();
        let mut dropped = 0;
        for mut slot in self.instances.iter_mut() {
            if slot.instance.take().is_some() {
                dropped += 1;
            }
            slot.built_at = None;
        }
        info!("服务注册表已清空: 丢弃 {} 个实例", dropped);
    }
}

/// 构建链上的一项，离开作用域（包括展开）时出栈
struct ChainEntry<'a>(&'a RefCell<Vec<String>>);

impl Drop for ChainEntry<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().pop();
    }
}

impl ServiceResolver for ServiceRegistry {
    fn resolve(&self, key: &str) -> ServiceResult<Arc<dyn Service>> {
        self.get(key)
    }

    fn contains(&self, key: &str) -> bool {
        ServiceRegistry::contains(self, key)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("id", &self.id)
            .field("keys", &self.keys())
            .field("factories", &self.factories.len())
            .finish_non_exhaustive()
    }
}
