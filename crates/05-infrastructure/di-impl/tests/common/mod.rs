//! 集成测试共用的服务、规则与类型目录

#![allow(dead_code)]

use component_macros::{Properties, PropertyEnum, RuleKey};
use config_abstractions::ConfigurationProvider;
use config_impl::JsonConfigurationProvider;
use di_abstractions::{BusinessRule, Service, ServiceBase};
use di_impl::{ProviderType, RuleSetService, RuleType, ServiceType, TypeCatalog};
use infrastructure_common::{BoxError, ConfigurationElements, Disposable, ParameterKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 可配置的测试服务
#[derive(Debug, Default, Properties)]
pub struct Foo {
    pub level: i32,
    pub enabled: bool,
    #[property(skip)]
    pub base: ServiceBase,
    #[property(skip)]
    pub loaded_elements: usize,
}

impl Service for Foo {
    fn register_configuration_provider(&mut self, provider: Box<dyn ConfigurationProvider>) {
        self.base.register(provider);
    }

    fn configuration_providers(&self) -> &[Box<dyn ConfigurationProvider>] {
        self.base.providers()
    }

    fn load_elements(&mut self, elements: ConfigurationElements) -> Result<(), BoxError> {
        self.loaded_elements = elements.len();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PropertyEnum)]
pub enum Tier {
    Bronze,
    Gold,
}

#[derive(RuleKey)]
pub enum OrderRule {
    Limit,
    Audit,
    Missing,
}

/// 支持克隆读取的规则
#[derive(Debug, Clone, Default, PartialEq, Properties)]
pub struct LimitRule {
    pub max: i64,
    pub enabled: bool,
    pub tier: Option<Tier>,
}

impl BusinessRule for LimitRule {
    fn clone_rule(&self) -> Option<Box<dyn BusinessRule>> {
        Some(Box::new(self.clone()))
    }
}

/// 共享实例、可释放的规则
#[derive(Debug, Default, Properties)]
pub struct AuditRule {
    pub channel: String,
    #[property(skip)]
    pub disposals: AtomicUsize,
}

impl AuditRule {
    pub fn disposal_count(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }
}

impl Disposable for AuditRule {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

impl BusinessRule for AuditRule {
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

/// 标准测试目录
pub fn catalog() -> Arc<TypeCatalog> {
    catalog_with(|builder| builder)
}

/// 在标准目录基础上追加类型
pub fn catalog_with(
    extend: impl FnOnce(di_impl::TypeCatalogBuilder) -> di_impl::TypeCatalogBuilder,
) -> Arc<TypeCatalog> {
    let builder = TypeCatalog::builder()
        .with_service(ServiceType::of::<Foo>("Foo").in_module("Bar").implements("IFoo"))
        .with_service(RuleSetService::catalog_entry("RuleSetService").in_module("rules"))
        .with_provider(ProviderType::of::<JsonConfigurationProvider>(
            "JsonConfigurationProvider",
        ))
        .with_rule(
            RuleType::of::<LimitRule>("LimitRule").with_constructor(
                vec![ParameterKind::Integer],
                |args| {
                    Ok(Box::new(LimitRule {
                        max: args.get(0)?,
                        ..LimitRule::default()
                    }))
                },
            ),
        )
        .with_rule(RuleType::of::<AuditRule>("AuditRule"))
        .with_enum::<Tier>();
    extend(builder).build().expect("测试目录应该构建成功")
}
