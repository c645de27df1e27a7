//! 派生宏生成的属性、枚举与规则键在类型目录和规则注册表中的行为

use component_macros::{Properties, PropertyEnum, RuleKey};
use di_abstractions::{BusinessRule, RuleKey as _};
use di_impl::{RuleRegistry, RuleType, TypeCatalog};
use infrastructure_common::{
    ConversionError, ConversionResult, LoadError, ParameterKind, PropertyType, PropertyValue,
    RuleDescriptor, ServiceError,
};
use std::sync::Arc;
use std::time::Duration;

/// 以 `10s` / `250ms` 表示的时间窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Window(Duration);

fn parse_window(raw: &str) -> ConversionResult<Window> {
    let raw = raw.trim();
    let invalid = || ConversionError::invalid_value(raw, "Window", "期望 <数字>ms 或 <数字>s");
    let (digits, scale) = if let Some(ms) = raw.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(secs) = raw.strip_suffix('s') {
        (secs, 1000)
    } else {
        return Err(invalid());
    };
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    Ok(Window(Duration::from_millis(value * scale)))
}

impl PropertyType for Window {
    fn kind() -> ParameterKind {
        ParameterKind::Custom("Window".to_string())
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        if let Some(window) = value.downcast_custom::<Window>() {
            return Ok(window);
        }
        match value {
            PropertyValue::Raw(raw) | PropertyValue::Text(raw) => parse_window(&raw),
            other => Err(ConversionError::invalid_value(
                other.describe(),
                "Window",
                "不支持的值",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PropertyEnum)]
enum Channel {
    Web,
    Mobile,
}

#[derive(Debug, Default, Properties)]
struct ThrottleRule {
    window: Window,
    #[property(name = "Max")]
    max_requests: u32,
    r#type: String,
    channel: Option<Channel>,
}

impl BusinessRule for ThrottleRule {}

#[derive(RuleKey)]
enum Limits {
    Throttle,
    Missing,
}

fn catalog() -> Arc<TypeCatalog> {
    TypeCatalog::builder()
        .with_rule(
            RuleType::of::<ThrottleRule>("ThrottleRule").with_constructor(
                vec![Window::kind()],
                |args| {
                    Ok(Box::new(ThrottleRule {
                        window: args.get(0)?,
                        ..ThrottleRule::default()
                    }))
                },
            ),
        )
        .with_enum::<Channel>()
        .with_converter("Window", parse_window)
        .build()
        .expect("目录应该构建成功")
}

fn throttle(window: &str) -> RuleDescriptor {
    RuleDescriptor::new(Limits::Throttle.rule_key(), "ThrottleRule").with_parameter(window, "Window")
}

#[test]
fn test_derived_rule_built_from_descriptor() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![throttle("10s")
        .with_property("Max", "100")
        .with_property("Type", "burst")
        .with_property("Channel", "mobile")];

    assert_eq!(registry.load(&descriptors).unwrap(), 1);

    let rule = registry.get::<ThrottleRule>(Limits::Throttle).unwrap();
    assert_eq!(rule.window, Window(Duration::from_secs(10)));
    assert_eq!(rule.max_requests, 100);
    assert_eq!(rule.r#type, "burst");
    assert_eq!(rule.channel, Some(Channel::Mobile));
}

#[test]
fn test_parameterless_overload_still_available() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![
        RuleDescriptor::new("Limits_Throttle", "ThrottleRule").with_property("Max", "5"),
    ];

    registry.load(&descriptors).unwrap();
    let rule = registry.get::<ThrottleRule>(Limits::Throttle).unwrap();
    assert_eq!(rule.window, Window::default());
    assert_eq!(rule.max_requests, 5);
}

#[test]
fn test_custom_converter_failure_skips_rule() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![throttle("ten seconds")];

    let error = registry.load(&descriptors).unwrap_err();
    assert!(matches!(error, LoadError::RuleBatch { failed: 1, .. }));
    assert!(error.to_string().contains("Limits_Throttle"));
    assert!(registry.is_empty());
}

#[test]
fn test_unknown_enum_variant_is_property_failure() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![throttle("250ms").with_property("Channel", "Billboard")];

    let error = registry.load(&descriptors).unwrap_err();
    let LoadError::RuleBatch { last, .. } = error else {
        panic!("期望规则批次错误");
    };
    let LoadError::Rule { source, .. } = *last else {
        panic!("期望单条规则错误");
    };
    assert!(matches!(
        source.downcast_ref::<LoadError>(),
        Some(LoadError::Property { .. })
    ));
}

#[test]
fn test_rule_key_addresses_missing_rule() {
    let registry = RuleRegistry::new(catalog());
    registry.load(&[throttle("1s")]).unwrap();

    match registry.get::<ThrottleRule>(Limits::Missing) {
        Err(ServiceError::RuleNotFound { key }) => assert_eq!(key, "Limits_Missing"),
        other => panic!("期望规则未找到, 实际 {:?}", other.map(|_| ())),
    }
}
