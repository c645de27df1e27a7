//! 业务规则注册表集成测试

mod common;

use common::{catalog, catalog_with, AuditRule, LimitRule, OrderRule, Tier};
use di_impl::{RuleRegistry, RuleType};
use infrastructure_common::{LoadError, RuleDescriptor, ServiceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

fn limit(id: &str, max: &str) -> RuleDescriptor {
    RuleDescriptor::new(id, "LimitRule").with_parameter(max, "i32")
}

fn batch_failure(result: Result<usize, LoadError>) -> (usize, LoadError) {
    match result {
        Err(LoadError::RuleBatch { failed, last }) => (failed, *last),
        other => panic!("期望批次失败, 实际: {other:?}"),
    }
}

fn failed_identifier(error: &LoadError) -> &str {
    match error {
        LoadError::Rule { identifier, .. } => identifier,
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_partial_batch_keeps_valid_rules() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![
        limit("OrderRule_Limit", "10"),
        RuleDescriptor::new("OrderRule_Audit", "AuditRule"),
        RuleDescriptor::new("OrderRule_Broken", "MissingRule"),
        limit("Pricing_Cap", "99"),
    ];

    let (failed, last) = batch_failure(registry.load(&descriptors));
    assert_eq!(failed, 1);
    assert_eq!(failed_identifier(&last), "OrderRule_Broken");

    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.identifiers(),
        vec!["OrderRule_Audit", "OrderRule_Limit", "Pricing_Cap"]
    );
    assert_eq!(registry.get::<LimitRule>(OrderRule::Limit).unwrap().max, 10);
}

#[test]
fn test_only_last_failure_is_reported() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![
        limit("First_Bad", "not-a-number"),
        limit("OrderRule_Limit", "1"),
        RuleDescriptor::new("Second_Bad", "AuditRule").with_property("Unknown", "x"),
    ];

    let (failed, last) = batch_failure(registry.load(&descriptors));
    assert_eq!(failed, 2);
    assert_eq!(failed_identifier(&last), "Second_Bad");
    assert!(!last.to_string().contains("First_Bad"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_clean_batch_returns_count() {
    let registry = RuleRegistry::new(catalog());
    let loaded = registry
        .load(&[limit("OrderRule_Limit", "5"), RuleDescriptor::new("OrderRule_Audit", "AuditRule")])
        .unwrap();
    assert_eq!(loaded, 2);
    assert!(!registry.is_empty());
}

#[test]
fn test_missing_rule_and_type_mismatch() {
    let registry = RuleRegistry::new(catalog());
    registry.load(&[limit("OrderRule_Limit", "5")]).unwrap();

    match registry.get::<LimitRule>(OrderRule::Missing) {
        Err(ServiceError::RuleNotFound { key }) => assert_eq!(key, "OrderRule_Missing"),
        other => panic!("unexpected result: {other:?}"),
    }

    match registry.get::<AuditRule>(OrderRule::Limit) {
        Err(ServiceError::RuleTypeMismatch {
            key,
            expected,
            actual,
        }) => {
            assert_eq!(key, "OrderRule_Limit");
            assert_eq!(expected, "AuditRule");
            assert_eq!(actual, "LimitRule");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_clone_capable_rule_returns_fresh_copies() {
    let registry = RuleRegistry::new(catalog());
    registry
        .load(&[
            limit("OrderRule_Limit", "5"),
            RuleDescriptor::new("OrderRule_Audit", "AuditRule"),
        ])
        .unwrap();

    let first = registry.get::<LimitRule>(OrderRule::Limit).unwrap();
    let second = registry.get::<LimitRule>(OrderRule::Limit).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);

    let shared = registry.get::<AuditRule>(OrderRule::Audit).unwrap();
    let again = registry.get_by_id::<AuditRule>("OrderRule_Audit").unwrap();
    assert!(Arc::ptr_eq(&shared, &again));
}

#[test]
fn test_parameters_and_properties_are_converted() {
    let registry = RuleRegistry::new(catalog());
    registry
        .load(&[limit("OrderRule_Limit", " 42 ")
            .with_property("Enabled", "TRUE")
            .with_property("tier", "Gold")])
        .unwrap();

    let rule = registry.get::<LimitRule>(OrderRule::Limit).unwrap();
    assert_eq!(rule.max, 42);
    assert!(rule.enabled);
    assert_eq!(rule.tier, Some(Tier::Gold));
}

#[test]
fn test_parameter_without_type_fails_descriptor() {
    let registry = RuleRegistry::new(catalog());
    let descriptor = RuleDescriptor::new("OrderRule_Limit", "LimitRule").with_untyped_parameter("5");

    let (failed, last) = batch_failure(registry.load(&[descriptor]));
    assert_eq!(failed, 1);
    assert!(matches!(last, LoadError::Rule { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_and_empty_identifiers() {
    let registry = RuleRegistry::new(catalog());
    let (failed, last) = batch_failure(registry.load(&[
        limit("OrderRule_Limit", "1"),
        limit("OrderRule_Limit", "2"),
        limit("  ", "3"),
    ]));

    assert_eq!(failed, 2);
    assert!(matches!(
        last,
        LoadError::Rule { ref source, .. } if source.to_string().contains("标识符")
    ));
    assert_eq!(registry.get::<LimitRule>(OrderRule::Limit).unwrap().max, 1);
}

#[test]
fn test_reload_disposes_previous_rules() {
    let registry = RuleRegistry::new(catalog());
    registry
        .load(&[RuleDescriptor::new("OrderRule_Audit", "AuditRule")])
        .unwrap();
    let old = registry.get::<AuditRule>(OrderRule::Audit).unwrap();

    registry.load(&[limit("OrderRule_Limit", "1")]).unwrap();
    assert_eq!(old.disposal_count(), 1);
    assert!(registry.rule("OrderRule_Audit").is_none());
}

#[test]
fn test_concurrent_dispose_runs_once() {
    let registry = RuleRegistry::new(catalog());
    registry
        .load(&[RuleDescriptor::new("OrderRule_Audit", "AuditRule")
            .with_property("Channel", "ops")])
        .unwrap();
    let audit = registry.get::<AuditRule>(OrderRule::Audit).unwrap();
    assert_eq!(audit.channel, "ops");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| registry.dispose());
        }
    });

    assert_eq!(audit.disposal_count(), 1);
    assert!(registry.is_empty());
}

#[test]
fn test_drop_disposes_rules() {
    let registry = RuleRegistry::new(catalog());
    registry
        .load(&[RuleDescriptor::new("OrderRule_Audit", "AuditRule")])
        .unwrap();
    let audit = registry.get::<AuditRule>(OrderRule::Audit).unwrap();

    drop(registry);
    assert_eq!(audit.disposal_count(), 1);
}

#[test]
fn test_identifier_is_trimmed() {
    let registry = RuleRegistry::new(catalog());
    let descriptors = vec![limit(" OrderRule_Limit ", "7"), limit("OrderRule_Limit", "8")];

    let (failed, last) = batch_failure(registry.load(&descriptors));
    assert_eq!(failed, 1);
    assert_eq!(failed_identifier(&last), "OrderRule_Limit");
    match last {
        LoadError::Rule { source, .. } => {
            assert!(matches!(source.downcast_ref::<LoadError>(), Some(LoadError::DuplicateKey { .. })))
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(registry.identifiers(), vec!["OrderRule_Limit".to_string()]);
    assert_eq!(registry.get::<LimitRule>(OrderRule::Limit).unwrap().max, 7);
}

#[test]
fn test_rule_constructor_can_read_registry() {
    let slot: Arc<OnceLock<Weak<RuleRegistry>>> = Arc::new(OnceLock::new());
    let observed = Arc::new(AtomicUsize::new(usize::MAX));
    let (reader, seen) = (Arc::clone(&slot), Arc::clone(&observed));
    let catalog = catalog_with(move |builder| {
        builder.with_rule(RuleType::new("LookupRule").with_constructor(Vec::new(), move |_| {
            if let Some(registry) = reader.get().and_then(Weak::upgrade) {
                seen.store(registry.len(), Ordering::SeqCst);
            }
            Ok(Box::new(LimitRule::default()))
        }))
    });
    let registry = Arc::new(RuleRegistry::new(catalog));
    slot.set(Arc::downgrade(&registry)).unwrap();

    registry.load(&[limit("OrderRule_Limit", "1")]).unwrap();
    let descriptors = vec![
        limit("OrderRule_Limit", "2"),
        RuleDescriptor::new("Pricing_Lookup", "LookupRule"),
    ];
    assert_eq!(registry.load(&descriptors).unwrap(), 2);

    assert_eq!(observed.load(Ordering::SeqCst), 0);
    assert!(registry.rule("Pricing_Lookup").is_some());
}
