//! 描述符文件 -> 注册表 -> 服务 -> 规则 的端到端流程

use component_macros::{Properties, RuleKey};
use config_abstractions::ConfigurationProvider;
use config_impl::TomlConfigurationProvider;
use di_abstractions::{
    BusinessRule, BusinessRulesService, BusinessRulesServiceExt, LambdaFactory, Service,
    ServiceBase,
};
use di_impl::{ProviderType, RuleSetService, RuleType, ServiceRegistry, ServiceType, TypeCatalog};
use infrastructure_common::{BoxError, ConfigurationElements, LoadError, ParameterKind, ServiceError};
use infrastructure_composition::RegistryBuilder;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[derive(Debug, Default, Properties)]
struct GreetingService {
    greeting: String,
    repeat: u32,
    #[property(skip)]
    base: ServiceBase,
    #[property(skip)]
    region: Option<String>,
}

impl GreetingService {
    fn render(&self) -> String {
        vec![self.greeting.as_str(); self.repeat as usize].join(" ")
    }
}

impl Service for GreetingService {
    fn register_configuration_provider(&mut self, provider: Box<dyn ConfigurationProvider>) {
        self.base.register(provider);
    }

    fn configuration_providers(&self) -> &[Box<dyn ConfigurationProvider>] {
        self.base.providers()
    }

    fn load_elements(&mut self, elements: ConfigurationElements) -> Result<(), BoxError> {
        self.region = elements.setting("region").map(str::to_string);
        Ok(())
    }
}

#[derive(RuleKey)]
enum PricingRule {
    Discount,
    Ceiling,
}

#[derive(Debug, Clone, Default, Properties)]
struct DiscountRule {
    rate: f64,
    label: String,
}

impl BusinessRule for DiscountRule {
    fn clone_rule(&self) -> Option<Box<dyn BusinessRule>> {
        Some(Box::new(self.clone()))
    }
}

#[derive(Debug, Default, Properties)]
struct CeilingRule {
    limit: u64,
}

impl BusinessRule for CeilingRule {}

fn catalog() -> Arc<TypeCatalog> {
    TypeCatalog::builder()
        .with_service(ServiceType::of::<GreetingService>("GreetingService").in_module("greetings"))
        .with_service(RuleSetService::catalog_entry("RuleSetService"))
        .with_provider(ProviderType::of::<TomlConfigurationProvider>(
            "TomlConfigurationProvider",
        ))
        .with_rule(RuleType::new("DiscountRule").with_constructor(
            vec![ParameterKind::Float],
            |args| {
                Ok(Box::new(DiscountRule {
                    rate: args.get(0)?,
                    ..DiscountRule::default()
                }))
            },
        ))
        .with_rule(RuleType::of::<CeilingRule>("CeilingRule"))
        .build()
        .expect("目录应该构建成功")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("写入描述符文件");
    path
}

fn services_toml(rules_path: &Path) -> String {
    format!(
        r#"
[[services]]
type = "GreetingService"
module = "greetings"
alias = "greeter"
properties = [
    {{ name = "Greeting", value = "hello" }},
    {{ name = "Repeat", value = "2" }},
]

[[services.providers]]
type = "TomlConfigurationProvider"
properties = [{{ name = "Path", value = '{rules}' }}]

[[services]]
type = "RuleSetService"
interface = "BusinessRulesService"

[[services.providers]]
type = "TomlConfigurationProvider"
properties = [{{ name = "Path", value = '{rules}' }}]
"#,
        rules = rules_path.display()
    )
}

const RULES_TOML: &str = r#"
[settings]
region = "eu"

[[rules]]
id = "PricingRule_Discount"
type = "DiscountRule"
parameters = [{ value = "0.15", type = "f64" }]
properties = [{ name = "Label", value = "spring" }]

[[rules]]
id = "PricingRule_Ceiling"
type = "CeilingRule"
properties = [{ name = "Limit", value = "500" }]
"#;

#[test]
fn test_descriptor_files_drive_services_and_rules() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let rules = write_file(&dir, "rules.toml", RULES_TOML);
    let services = write_file(&dir, "services.toml", &services_toml(&rules));

    let registry = RegistryBuilder::new()
        .with_catalog(catalog())
        .add_descriptor_file(&services)?
        .build()?;

    let greeter = registry.get_as::<GreetingService>("greeter")?;
    assert_eq!(greeter.render(), "hello hello");
    assert_eq!(greeter.region.as_deref(), Some("eu"));

    let rules = registry.get_as::<RuleSetService>("BusinessRulesService")?;
    assert_eq!(rules.loaded_rules().len(), 2);

    let discount = rules.rule::<DiscountRule, _>(PricingRule::Discount)?;
    assert!((discount.rate - 0.15).abs() < f64::EPSILON);
    assert_eq!(discount.label, "spring");

    let ceiling = rules.rule::<CeilingRule, _>(PricingRule::Ceiling)?;
    assert_eq!(ceiling.limit, 500);
    Ok(())
}

#[test]
fn test_rule_reads_are_isolated_or_shared() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let rules = write_file(&dir, "rules.toml", RULES_TOML);
    let services = write_file(&dir, "services.toml", &services_toml(&rules));
    let registry = RegistryBuilder::new()
        .with_catalog(catalog())
        .add_descriptor_file(&services)?
        .build()?;
    let rules = registry.get_as::<RuleSetService>("RuleSetService")?;

    let first = rules.rule::<DiscountRule, _>(PricingRule::Discount)?;
    let second = rules.rule::<DiscountRule, _>(PricingRule::Discount)?;
    assert!(!Arc::ptr_eq(&first, &second));

    let first = rules.rule::<CeilingRule, _>(PricingRule::Ceiling)?;
    let second = rules.rule::<CeilingRule, _>(PricingRule::Ceiling)?;
    assert!(Arc::ptr_eq(&first, &second));

    let mismatch = rules.rule::<CeilingRule, _>(PricingRule::Discount);
    assert!(matches!(mismatch, Err(ServiceError::RuleTypeMismatch { .. })));
    Ok(())
}

#[test]
fn test_bad_rule_batch_fails_the_service_load() -> anyhow::Result<()> {
    let mut rules = tempfile::Builder::new().suffix(".toml").tempfile()?;
    write!(
        rules,
        r#"
[[rules]]
id = "PricingRule_Ceiling"
type = "CeilingRule"

[[rules]]
id = "PricingRule_Discount"
type = "UnknownRule"
"#
    )?;
    let services = tempfile::Builder::new().suffix(".toml").tempfile()?;
    std::fs::write(services.path(), services_toml(rules.path()))?;

    let registry = RegistryBuilder::new()
        .with_catalog(catalog())
        .add_descriptor_file(services.path())?
        .build()?;

    let error = registry
        .get("BusinessRulesService")
        .expect_err("规则批次失败时服务不可用");
    let message = error.to_string();
    assert!(matches!(
        error,
        ServiceError::LoadFailure(LoadError::ServiceLoad { .. })
    ));
    assert!(message.contains("PricingRule_Discount"));
    assert!(message.contains("UnknownRule"));
    assert!(!registry.is_built("RuleSetService"));
    Ok(())
}

#[test]
fn test_runtime_factory_supplied_after_build() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let services = write_file(
        &dir,
        "services.toml",
        r#"
[[factories]]
type = "RemoteFactory"
alias = "remote"
runtime_supplied = true

[[services]]
type = "GreetingService"
factory = "remote"
"#,
    );
    let registry = RegistryBuilder::new()
        .with_catalog(catalog())
        .add_descriptor_file(&services)?
        .build()?;

    assert!(matches!(
        registry.get("GreetingService"),
        Err(ServiceError::LoadFailure(LoadError::FactoryNotSupplied { .. }))
    ));

    registry.register_factory(
        "remote",
        Arc::new(LambdaFactory::new("remote", |_| {
            Ok(Box::new(GreetingService {
                greeting: "remote".to_string(),
                repeat: 1,
                ..GreetingService::default()
            }))
        })),
    )?;

    let greeter = registry.get_as::<GreetingService>("GreetingService")?;
    assert_eq!(greeter.render(), "remote");
    Ok(())
}

#[test]
fn test_concurrent_resolution_builds_once() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let rules = write_file(&dir, "rules.toml", RULES_TOML);
    let services = write_file(&dir, "services.toml", &services_toml(&rules));
    let registry = RegistryBuilder::new()
        .with_catalog(catalog())
        .add_descriptor_file(&services)?
        .build()?;

    let resolved: Vec<Arc<dyn Service>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = &registry;
                scope.spawn(move || {
                    let key = if i % 2 == 0 { "RuleSetService" } else { "BusinessRulesService" };
                    registry.get(key).expect("解析服务")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("线程不应该 panic"))
            .collect()
    });

    assert!(resolved.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    Ok(())
}

#[test]
fn test_registry_from_single_provider() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let services = write_file(
        &dir,
        "services.toml",
        r#"
[[services]]
type = "GreetingService"
module = "elsewhere"
"#,
    );
    let provider = TomlConfigurationProvider::new(&services)?;
    let registry = ServiceRegistry::from_provider(catalog(), &provider)?;

    assert!(matches!(
        registry.get("GreetingService"),
        Err(ServiceError::LoadFailure(LoadError::ModuleMismatch { .. }))
    ));
    Ok(())
}
