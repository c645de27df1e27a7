//! 描述符文件提供者测试

use crate::providers::{
    provider_for_path, InMemoryConfigurationProvider, JsonConfigurationProvider,
    TomlConfigurationProvider,
};
use config_abstractions::ConfigurationProvider;
use infrastructure_common::{
    ConfigError, PropertySetterDescriptor, RuleDescriptor, ServiceDescriptor, ValueConverters,
};
use std::io::Write;
use tempfile::NamedTempFile;

const JSON_DOCUMENT: &str = r#"{
    "factories": [
        { "type": "RemoteFactory", "alias": "remote", "runtime_supplied": true }
    ],
    "services": [
        {
            "type": "OrderService",
            "module": "orders",
            "interface": "IOrderService",
            "alias": "orders",
            "properties": [{ "name": "Level", "value": "3" }]
        }
    ],
    "rules": [
        {
            "id": "OrderRule_Limit",
            "type": "LimitRule",
            "parameters": [{ "value": "10", "type": "i32" }]
        }
    ],
    "settings": { "region": "eu" }
}"#;

const TOML_DOCUMENT: &str = r#"
[[services]]
type = "OrderService"
module = "orders"
alias = "orders"

[[services.properties]]
name = "Enabled"
value = "true"

[[rules]]
id = "OrderRule_Limit"
type = "LimitRule"

[settings]
region = "us"
"#;

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("创建临时文件应该成功");
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_json_provider_reads_document() {
    let file = temp_file(".json", JSON_DOCUMENT);
    let provider = JsonConfigurationProvider::new(file.path()).unwrap();

    let elements = provider.get_elements().unwrap();
    assert_eq!(elements.len(), 4);

    let factory = elements.factories().next().unwrap();
    assert!(factory.runtime_supplied);
    assert_eq!(factory.canonical_key(), "remote");

    let service = elements.services().next().unwrap();
    assert_eq!(service.keys(), vec!["OrderService", "IOrderService", "orders"]);
    assert_eq!(service.properties[0], PropertySetterDescriptor::new("Level", "3"));

    let rule = elements.rules().next().unwrap();
    assert_eq!(rule.identifier, "OrderRule_Limit");
    assert_eq!(elements.setting("region"), Some("eu"));
}

#[test]
fn test_toml_provider_reads_document() {
    let file = temp_file(".toml", TOML_DOCUMENT);
    let provider = TomlConfigurationProvider::new(file.path()).unwrap();

    let elements = provider.get_elements().unwrap();
    let service = elements.services().next().unwrap();
    assert_eq!(service.alias.as_deref(), Some("orders"));
    assert_eq!(service.properties[0].name, "Enabled");
    assert_eq!(elements.rules().count(), 1);
    assert_eq!(elements.setting("region"), Some("us"));
}

#[test]
fn test_missing_file_is_reported() {
    let error = JsonConfigurationProvider::new("/definitely/not/here.json").unwrap_err();
    assert!(matches!(error, ConfigError::FileNotFound { .. }));
}

#[test]
fn test_malformed_document_is_parse_error() {
    let file = temp_file(".json", "{ \"services\": [ { \"alias\": \"no type\" } ] }");
    let error = JsonConfigurationProvider::new(file.path()).unwrap_err();
    assert!(matches!(error, ConfigError::ParseError { .. }));
}

#[test]
fn test_path_property_configures_unconfigured_provider() {
    let file = temp_file(".json", JSON_DOCUMENT);
    let mut provider = JsonConfigurationProvider::unconfigured();

    let error = provider.get_elements().unwrap_err();
    assert!(matches!(error, ConfigError::PathNotSet { .. }));

    let setter = PropertySetterDescriptor::new("Path", file.path().display().to_string());
    ValueConverters::new()
        .apply_property(&mut provider, &setter)
        .unwrap();

    assert_eq!(provider.path(), Some(file.path()));
    assert_eq!(provider.get_elements().unwrap().services().count(), 1);
}

#[test]
fn test_reload_picks_up_changes() {
    let mut file = temp_file(".json", r#"{ "settings": { "region": "eu" } }"#);
    let mut provider = JsonConfigurationProvider::new(file.path()).unwrap();
    assert_eq!(provider.get_elements().unwrap().setting("region"), Some("eu"));

    file.as_file_mut().set_len(0).unwrap();
    std::fs::write(file.path(), r#"{ "settings": { "region": "ap" } }"#).unwrap();

    // 缓存仍是旧内容，直到 reload
    assert_eq!(provider.get_elements().unwrap().setting("region"), Some("eu"));
    provider.reload().unwrap();
    assert_eq!(provider.get_elements().unwrap().setting("region"), Some("ap"));
}

#[test]
fn test_provider_for_path_selects_by_extension() {
    let json = temp_file(".json", JSON_DOCUMENT);
    let toml = temp_file(".toml", TOML_DOCUMENT);

    assert_eq!(
        provider_for_path(json.path()).unwrap().name(),
        "JsonConfigurationProvider"
    );
    assert_eq!(
        provider_for_path(toml.path()).unwrap().name(),
        "TomlConfigurationProvider"
    );

    let other = temp_file(".yaml", "services: []");
    assert!(provider_for_path(other.path()).is_err());
}

#[test]
fn test_in_memory_provider() {
    let provider = InMemoryConfigurationProvider::default()
        .with_name("fixture")
        .with_element(ServiceDescriptor::new("Foo"))
        .with_element(RuleDescriptor::new("OrderRule_Limit", "LimitRule"))
        .with_setting("region", "eu");

    assert_eq!(provider.name(), "fixture");
    let elements = provider.get_elements().unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements.setting("region"), Some("eu"));
}
