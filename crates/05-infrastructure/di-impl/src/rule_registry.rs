//! 业务规则注册表
//!
//! 以规则标识符为键保存已构建的规则。批次加载时逐个构建描述符，
//! 单个失败不影响其余描述符；批次结束后若有失败，只返回一个错误，
//! 携带失败数量和最后一个失败的细节。

use crate::catalog::TypeCatalog;
use di_abstractions::{BusinessRule, Rule, RuleBuilder, RuleKey};
use infrastructure_common::{LoadError, LoadResult, RuleDescriptor, ServiceError, ServiceResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 业务规则注册表
pub struct RuleRegistry {
    catalog: Arc<TypeCatalog>,
    rules: Mutex<BTreeMap<String, Rule>>,
}

impl RuleRegistry {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            rules: Mutex::new(BTreeMap::new()),
        }
    }

    /// 加载一批规则描述符，返回成功加载的数量
    ///
    /// 先释放并清空现有规则。失败的描述符被跳过，成功的规则保留。
    /// 规则在锁外构建，构造过程中可以读取本注册表。
    pub fn load<'a, I>(&self, descriptors: I) -> LoadResult<usize>
    where
        I: IntoIterator<Item = &'a RuleDescriptor>,
    {
        let previous = std::mem::take(&mut *self.rules.lock());
        dispose_all(previous.values());

        let mut rules = BTreeMap::new();
        let mut failed = 0;
        let mut last_failure = None;
        for descriptor in descriptors {
            match self.build(descriptor, &rules) {
                Ok(rule) => {
                    debug!("规则加载成功: {} ({})", rule.identifier(), rule.type_name());
                    rules.insert(rule.identifier().to_string(), rule);
                }
                Err(error) => {
                    warn!("规则加载失败: {}", error);
                    failed += 1;
                    last_failure = Some(error);
                }
            }
        }

        let loaded = rules.len();
        let replaced = std::mem::replace(&mut *self.rules.lock(), rules);
        dispose_all(replaced.values());

        info!("规则批次加载完成: 成功 {}, 失败 {}", loaded, failed);
        match last_failure {
            Some(last) => Err(LoadError::RuleBatch {
                failed,
                last: Box::new(last),
            }),
            None => Ok(loaded),
        }
    }

    fn build(&self, descriptor: &RuleDescriptor, loaded: &BTreeMap<String, Rule>) -> LoadResult<Rule> {
        let identifier = descriptor.identifier.trim();
        let wrap = |source: LoadError| LoadError::Rule {
            identifier: identifier.to_string(),
            source: Box::new(source),
        };

        if identifier.is_empty() {
            return Err(wrap(LoadError::InvalidDescriptor {
                message: format!("规则 {} 缺少标识符", descriptor.type_name),
            }));
        }
        if let Some(existing) = loaded.get(identifier) {
            return Err(wrap(LoadError::DuplicateKey {
                key: identifier.to_string(),
                existing: existing.type_name().to_string(),
            }));
        }

        let instance = self.catalog.instantiate_rule(descriptor).map_err(wrap)?;
        let mut builder = RuleBuilder::new(instance);
        self.catalog
            .apply_properties(
                builder.instance_mut(),
                &descriptor.type_name,
                &descriptor.properties,
            )
            .map_err(wrap)?;
        Ok(builder.identify(identifier))
    }

    /// 按枚举值和具体类型查找
    pub fn get<T: BusinessRule>(&self, key: impl RuleKey) -> ServiceResult<Arc<T>> {
        self.get_by_id(&key.rule_key())
    }

    /// 按标识符和具体类型查找
    pub fn get_by_id<T: BusinessRule>(&self, identifier: &str) -> ServiceResult<Arc<T>> {
        self.rule(identifier)
            .ok_or_else(|| ServiceError::RuleNotFound {
                key: identifier.to_string(),
            })?
            .read::<T>()
    }

    /// 按标识符取规则句柄
    pub fn rule(&self, identifier: &str) -> Option<Rule> {
        self.rules.lock().get(identifier).cloned()
    }

    /// 所有标识符（排序）
    pub fn identifiers(&self) -> Vec<String> {
        self.rules.lock().keys().cloned().collect()
    }

    /// 所有规则（按标识符排序）
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.lock().is_empty()
    }

    /// 释放所有可释放的规则并清空
    ///
    /// 规则先在锁内取出，并发调用时每个规则只会被释放一次。
    pub fn dispose(&self) {
        let rules = std::mem::take(&mut *self.rules.lock());
        if rules.is_empty() {
            return;
        }
        dispose_all(rules.values());
        info!("规则注册表已释放: {} 个规则", rules.len());
    }
}

fn dispose_all<'a>(rules: impl Iterator<Item = &'a Rule>) {
    for rule in rules {
        rule.dispose();
    }
}

impl Drop for RuleRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.identifiers())
            .finish_non_exhaustive()
    }
}
