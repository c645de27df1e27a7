//! 规则集服务
//!
//! 现成的业务规则服务：从自己的配置提供者收集 `Rule` 元素并加载。

use crate::catalog::{ServiceType, TypeCatalog};
use crate::rule_registry::RuleRegistry;
use config_abstractions::ConfigurationProvider;
use di_abstractions::{BusinessRulesService, Rule, Service, ServiceBase};
use infrastructure_common::{BoxError, ConfigurationElements, PropertyTarget};
use std::sync::Arc;
use tracing::info;

/// 规则集服务
#[derive(Debug)]
pub struct RuleSetService {
    base: ServiceBase,
    registry: RuleRegistry,
}

impl RuleSetService {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            base: ServiceBase::new(),
            registry: RuleRegistry::new(catalog),
        }
    }

    /// 以给定名称登记到类型目录的条目
    pub fn catalog_entry(name: impl Into<String>) -> ServiceType {
        ServiceType::new(name, |catalog| Ok(Box::new(RuleSetService::new(Arc::clone(catalog)))))
            .implements("BusinessRulesService")
    }

    /// 底层规则注册表
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }
}

impl PropertyTarget for RuleSetService {}

impl Service for RuleSetService {
    fn register_configuration_provider(&mut self, provider: Box<dyn ConfigurationProvider>) {
        self.base.register(provider);
    }

    fn configuration_providers(&self) -> &[Box<dyn ConfigurationProvider>] {
        self.base.providers()
    }

    fn load_elements(&mut self, elements: ConfigurationElements) -> Result<(), BoxError> {
        let loaded = self.registry.load(elements.rules())?;
        info!("规则集服务加载 {} 个规则", loaded);
        Ok(())
    }
}

impl BusinessRulesService for RuleSetService {
    fn find_rule(&self, identifier: &str) -> Option<Rule> {
        self.registry.rule(identifier)
    }

    fn loaded_rules(&self) -> Vec<Rule> {
        self.registry.rules()
    }

    fn close(&self) {
        self.registry.dispose();
    }
}
