//! 类型目录
//!
//! 按名称登记可构造的服务、工厂、配置提供者和业务规则类型。
//! 目录在启动时由 [`TypeCatalogBuilder`] 一次性填充，冻结为
//! `Arc<TypeCatalog>` 后只读共享。

use config_abstractions::ConfigurationProvider;
use di_abstractions::{BusinessRule, Service, ServiceFactory};
use infrastructure_common::{
    BoxError, ConversionError, ConversionResult, LoadError, LoadResult, ParameterKind,
    PropertySetterDescriptor, PropertyTarget, PropertyType, PropertyValue, RuleDescriptor,
    ValueConverters, UNSPECIFIED_MODULE,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 服务构造函数，接收目录以便服务内部继续构建规则等组件
pub type ServiceConstructor =
    Arc<dyn Fn(&Arc<TypeCatalog>) -> Result<Box<dyn Service>, BoxError> + Send + Sync>;

/// 工厂构造函数
pub type FactoryConstructor =
    Arc<dyn Fn(&Arc<TypeCatalog>) -> Result<Box<dyn ServiceFactory>, BoxError> + Send + Sync>;

/// 配置提供者构造函数
pub type ProviderConstructor =
    Arc<dyn Fn() -> Result<Box<dyn ConfigurationProvider>, BoxError> + Send + Sync>;

/// 规则构造函数，参数已按重载签名转换
pub type RuleConstructor =
    Arc<dyn Fn(ConstructorArgs) -> Result<Box<dyn BusinessRule>, BoxError> + Send + Sync>;

/// 已转换的构造参数
#[derive(Debug, Clone, Default)]
pub struct ConstructorArgs {
    values: Vec<PropertyValue>,
}

impl ConstructorArgs {
    pub fn new(values: Vec<PropertyValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按位置取参数并转换为目标类型
    pub fn get<T: PropertyType>(&self, index: usize) -> ConversionResult<T> {
        let value = self
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| ConversionError::ArgumentMismatch {
                index,
                expected: T::kind().to_string(),
                actual: "missing".to_string(),
            })?;
        let actual = value.describe();
        T::from_value(value).map_err(|_| ConversionError::ArgumentMismatch {
            index,
            expected: T::kind().to_string(),
            actual,
        })
    }
}

/// 服务类型登记
#[derive(Clone)]
pub struct ServiceType {
    name: String,
    module: Option<String>,
    interfaces: Vec<String>,
    constructor: ServiceConstructor,
}

impl ServiceType {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Arc<TypeCatalog>) -> Result<Box<dyn Service>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            module: None,
            interfaces: Vec::new(),
            constructor: Arc::new(constructor),
        }
    }

    /// 以 `Default` 作为无参构造函数
    pub fn of<T: Service + Default>(name: impl Into<String>) -> Self {
        Self::new(name, |_| Ok(Box::new(T::default())))
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// 声明实现的接口
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }

    /// 是否声明了接口（类型名本身总是满足）
    pub fn provides(&self, interface: &str) -> bool {
        interface == self.name || self.interfaces.iter().any(|declared| declared == interface)
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceType")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

/// 工厂类型登记
#[derive(Clone)]
pub struct FactoryType {
    name: String,
    module: Option<String>,
    constructor: FactoryConstructor,
}

impl FactoryType {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Arc<TypeCatalog>) -> Result<Box<dyn ServiceFactory>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            module: None,
            constructor: Arc::new(constructor),
        }
    }

    pub fn of<T: ServiceFactory + Default>(name: impl Into<String>) -> Self {
        Self::new(name, |_| Ok(Box::new(T::default())))
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }
}

impl fmt::Debug for FactoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryType")
            .field("name", &self.name)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// 配置提供者类型登记
#[derive(Clone)]
pub struct ProviderType {
    name: String,
    module: Option<String>,
    constructor: ProviderConstructor,
}

impl ProviderType {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ConfigurationProvider>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            module: None,
            constructor: Arc::new(constructor),
        }
    }

    pub fn of<T: ConfigurationProvider + Default + 'static>(name: impl Into<String>) -> Self {
        Self::new(name, || Ok(Box::new(T::default())))
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }
}

impl fmt::Debug for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderType")
            .field("name", &self.name)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// 规则构造重载
#[derive(Clone)]
struct RuleOverload {
    signature: Vec<ParameterKind>,
    constructor: RuleConstructor,
}

/// 业务规则类型登记
#[derive(Clone)]
pub struct RuleType {
    name: String,
    module: Option<String>,
    overloads: Vec<RuleOverload>,
}

impl RuleType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            overloads: Vec::new(),
        }
    }

    /// 以 `Default` 作为无参构造函数
    pub fn of<T: BusinessRule + Default>(name: impl Into<String>) -> Self {
        Self::new(name).with_constructor(Vec::new(), |_| Ok(Box::new(T::default())))
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// 增加一个构造重载
    pub fn with_constructor<F>(mut self, signature: Vec<ParameterKind>, constructor: F) -> Self
    where
        F: Fn(ConstructorArgs) -> Result<Box<dyn BusinessRule>, BoxError> + Send + Sync + 'static,
    {
        self.overloads.push(RuleOverload {
            signature,
            constructor: Arc::new(constructor),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }

    fn overload(&self, signature: &[ParameterKind]) -> Option<&RuleOverload> {
        self.overloads
            .iter()
            .find(|overload| overload.signature.as_slice() == signature)
    }
}

impl fmt::Debug for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signatures: Vec<String> = self
            .overloads
            .iter()
            .map(|overload| describe_signature(&overload.signature))
            .collect();
        f.debug_struct("RuleType")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("overloads", &signatures)
            .finish()
    }
}

fn describe_signature(signature: &[ParameterKind]) -> String {
    signature
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 检查描述符要求的模块
fn check_module(type_name: &str, requested: Option<&str>, actual: Option<&str>) -> LoadResult<()> {
    match requested.filter(|module| !module.is_empty()) {
        Some(expected) if Some(expected) != actual => Err(LoadError::ModuleMismatch {
            type_name: type_name.to_string(),
            expected: expected.to_string(),
            actual: actual.unwrap_or(UNSPECIFIED_MODULE).to_string(),
        }),
        _ => Ok(()),
    }
}

fn lookup<'a, T>(
    table: &'a BTreeMap<String, T>,
    type_name: &str,
    module: Option<&str>,
    module_of: impl Fn(&T) -> Option<&str>,
) -> LoadResult<&'a T> {
    let entry = table.get(type_name).ok_or_else(|| LoadError::TypeNotFound {
        type_name: type_name.to_string(),
        module: module.unwrap_or(UNSPECIFIED_MODULE).to_string(),
    })?;
    check_module(type_name, module, module_of(entry))?;
    Ok(entry)
}

/// 类型目录
pub struct TypeCatalog {
    services: BTreeMap<String, ServiceType>,
    factories: BTreeMap<String, FactoryType>,
    providers: BTreeMap<String, ProviderType>,
    rules: BTreeMap<String, RuleType>,
    converters: ValueConverters,
}

impl TypeCatalog {
    pub fn builder() -> TypeCatalogBuilder {
        TypeCatalogBuilder::new()
    }

    /// 值转换器
    pub fn converters(&self) -> &ValueConverters {
        &self.converters
    }

    /// 查找服务类型
    pub fn service(&self, type_name: &str, module: Option<&str>) -> LoadResult<&ServiceType> {
        lookup(&self.services, type_name, module, |entry| entry.module.as_deref())
    }

    pub fn factory(&self, type_name: &str, module: Option<&str>) -> LoadResult<&FactoryType> {
        lookup(&self.factories, type_name, module, |entry| entry.module.as_deref())
    }

    pub fn provider(&self, type_name: &str, module: Option<&str>) -> LoadResult<&ProviderType> {
        lookup(&self.providers, type_name, module, |entry| entry.module.as_deref())
    }

    pub fn rule(&self, type_name: &str, module: Option<&str>) -> LoadResult<&RuleType> {
        lookup(&self.rules, type_name, module, |entry| entry.module.as_deref())
    }

    /// 用无参构造函数实例化服务
    pub fn instantiate_service(
        self: &Arc<Self>,
        type_name: &str,
        module: Option<&str>,
    ) -> LoadResult<(Box<dyn Service>, &ServiceType)> {
        let entry = self.service(type_name, module)?;
        let service = (entry.constructor)(self).map_err(|source| LoadError::Construction {
            type_name: type_name.to_string(),
            module: entry.module_name().to_string(),
            source,
        })?;
        Ok((service, entry))
    }

    /// 实例化工厂
    pub fn instantiate_factory(
        self: &Arc<Self>,
        type_name: &str,
        module: Option<&str>,
    ) -> LoadResult<Box<dyn ServiceFactory>> {
        let entry = self.factory(type_name, module)?;
        (entry.constructor)(self).map_err(|source| LoadError::Construction {
            type_name: type_name.to_string(),
            module: entry.module_name().to_string(),
            source,
        })
    }

    /// 实例化配置提供者
    pub fn instantiate_provider(
        &self,
        type_name: &str,
        module: Option<&str>,
    ) -> LoadResult<Box<dyn ConfigurationProvider>> {
        let entry = self.provider(type_name, module)?;
        (entry.constructor)().map_err(|source| LoadError::Construction {
            type_name: type_name.to_string(),
            module: entry.module_name().to_string(),
            source,
        })
    }

    /// 按规则描述符构造规则实例（不含属性设置）
    ///
    /// 有参数时每个参数都必须声明类型名，按类型签名选择重载；
    /// 无参数时使用无参构造函数。
    pub fn instantiate_rule(&self, descriptor: &RuleDescriptor) -> LoadResult<Box<dyn BusinessRule>> {
        let entry = self.rule(&descriptor.type_name, descriptor.module.as_deref())?;
        let construction = |source: BoxError| LoadError::Construction {
            type_name: descriptor.type_name.clone(),
            module: entry.module_name().to_string(),
            source,
        };

        let mut signature = Vec::with_capacity(descriptor.parameters.len());
        let mut values = Vec::with_capacity(descriptor.parameters.len());
        for parameter in &descriptor.parameters {
            let (kind, value) = self
                .converters
                .convert_parameter(parameter)
                .map_err(|error| construction(error.into()))?;
            signature.push(kind);
            values.push(value);
        }

        let overload = entry.overload(&signature).ok_or_else(|| {
            construction(
                ConversionError::NoMatchingConstructor {
                    type_name: descriptor.type_name.clone(),
                    signature: describe_signature(&signature),
                }
                .into(),
            )
        })?;
        debug!(
            "构造规则 {} ({})",
            descriptor.type_name,
            describe_signature(&signature)
        );
        (overload.constructor)(ConstructorArgs::new(values)).map_err(construction)
    }

    /// 依次应用属性设置
    pub fn apply_properties<T>(
        &self,
        target: &mut T,
        type_name: &str,
        setters: &[PropertySetterDescriptor],
    ) -> LoadResult<()>
    where
        T: PropertyTarget + ?Sized,
    {
        for setter in setters {
            self.converters
                .apply_property(target, setter)
                .map_err(|source| LoadError::Property {
                    type_name: type_name.to_string(),
                    property: setter.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("converters", &self.converters)
            .finish()
    }
}

/// 类型目录构建器
#[derive(Default)]
pub struct TypeCatalogBuilder {
    services: Vec<ServiceType>,
    factories: Vec<FactoryType>,
    providers: Vec<ProviderType>,
    rules: Vec<RuleType>,
    converters: ValueConverters,
}

impl TypeCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: ServiceType) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_factory(mut self, factory: FactoryType) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn with_provider(mut self, provider: ProviderType) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_rule(mut self, rule: RuleType) -> Self {
        self.rules.push(rule);
        self
    }

    /// 注册枚举属性类型
    pub fn with_enum<E: PropertyType>(mut self) -> Self {
        self.converters.register_enum::<E>();
        self
    }

    /// 注册自定义类型转换器
    pub fn with_converter<T, F>(mut self, type_name: impl Into<String>, convert: F) -> Self
    where
        T: std::any::Any + Send + Sync,
        F: Fn(&str) -> ConversionResult<T> + Send + Sync + 'static,
    {
        self.converters.register_custom(type_name, convert);
        self
    }

    /// 冻结目录，同一张表内重名时失败
    pub fn build(self) -> LoadResult<Arc<TypeCatalog>> {
        let catalog = TypeCatalog {
            services: index("service", self.services, |entry| entry.name.clone())?,
            factories: index("factory", self.factories, |entry| entry.name.clone())?,
            providers: index("provider", self.providers, |entry| entry.name.clone())?,
            rules: index("rule", self.rules, |entry| entry.name.clone())?,
            converters: self.converters,
        };
        debug!(
            "类型目录构建完成: {} 个服务, {} 个工厂, {} 个提供者, {} 个规则",
            catalog.services.len(),
            catalog.factories.len(),
            catalog.providers.len(),
            catalog.rules.len()
        );
        Ok(Arc::new(catalog))
    }
}

impl fmt::Debug for TypeCatalogBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalogBuilder")
            .field("services", &self.services.len())
            .field("factories", &self.factories.len())
            .field("providers", &self.providers.len())
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn index<T>(
    table: &str,
    entries: Vec<T>,
    name_of: impl Fn(&T) -> String,
) -> LoadResult<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let name = name_of(&entry);
        if name.trim().is_empty() {
            return Err(LoadError::InvalidDescriptor {
                message: format!("{} 类型名为空", table),
            });
        }
        if map.contains_key(&name) {
            return Err(LoadError::DuplicateKey {
                key: name,
                existing: format!("{} 类型目录", table),
            });
        }
        map.insert(name, entry);
    }
    Ok(map)
}
