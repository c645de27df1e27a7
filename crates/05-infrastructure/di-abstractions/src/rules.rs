//! 业务规则抽象接口
//!
//! 规则由规则注册表按描述符构建，以 `{枚举类型名}_{枚举值名}` 为键寻址。

use crate::service::Service;
use infrastructure_common::{
    short_type_name, AsAny, Disposable, PropertyTarget, ServiceError, ServiceResult,
};
use std::fmt::Debug;
use std::sync::Arc;

/// 业务规则 trait
pub trait BusinessRule: AsAny + PropertyTarget + Debug {
    /// 克隆能力
    ///
    /// 返回 `Some` 的规则在每次读取时交出新副本，调用方可随意修改。
    fn clone_rule(&self) -> Option<Box<dyn BusinessRule>> {
        None
    }

    /// 释放能力
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// 规则键
///
/// 为单元枚举实现，通常通过 `#[derive(RuleKey)]` 生成。
pub trait RuleKey {
    /// 枚举类型名
    const ENUM_NAME: &'static str;

    /// 枚举值名
    fn variant_name(&self) -> &'static str;

    /// 规则标识符 `{枚举类型名}_{枚举值名}`
    fn rule_key(&self) -> String {
        format!("{}_{}", Self::ENUM_NAME, self.variant_name())
    }
}

/// 已标识的规则
///
/// 只能通过 [`RuleBuilder::identify`] 得到，标识符此后不可修改。
#[derive(Debug, Clone)]
pub struct Rule {
    identifier: Arc<str>,
    instance: Arc<dyn BusinessRule>,
}

impl Rule {
    /// 规则标识符
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 共享实例
    pub fn instance(&self) -> &Arc<dyn BusinessRule> {
        &self.instance
    }

    /// 实现类型短名
    pub fn type_name(&self) -> &str {
        short_type_name((*self.instance).concrete_type_name())
    }

    /// 是否支持克隆读取
    pub fn is_cloneable(&self) -> bool {
        self.instance.clone_rule().is_some()
    }

    /// 按具体类型读取
    ///
    /// 支持克隆的规则返回新副本，否则返回共享实例。
    pub fn read<T: BusinessRule>(&self) -> ServiceResult<Arc<T>> {
        if (*self.instance).as_any().downcast_ref::<T>().is_none() {
            return Err(self.mismatch::<T>(self.type_name()));
        }

        match self.instance.clone_rule() {
            Some(copy) => {
                let actual = short_type_name((*copy).concrete_type_name()).to_string();
                AsAny::into_any_box(copy)
                    .downcast::<T>()
                    .map(Arc::from)
                    .map_err(|_| self.mismatch::<T>(&actual))
            }
            None => AsAny::into_any_arc(Arc::clone(&self.instance))
                .downcast::<T>()
                .map_err(|_| self.mismatch::<T>(self.type_name())),
        }
    }

    /// 释放实例（如果支持）
    pub fn dispose(&self) {
        if let Some(disposable) = self.instance.as_disposable() {
            disposable.dispose();
        }
    }

    fn mismatch<T>(&self, actual: &str) -> ServiceError {
        ServiceError::RuleTypeMismatch {
            key: self.identifier.to_string(),
            expected: short_type_name(std::any::type_name::<T>()).to_string(),
            actual: actual.to_string(),
        }
    }
}

/// 规则构建器
///
/// 持有尚未标识的规则实例，属性设置完成后调用 [`RuleBuilder::identify`]。
#[derive(Debug)]
pub struct RuleBuilder {
    instance: Box<dyn BusinessRule>,
}

impl RuleBuilder {
    pub fn new(instance: Box<dyn BusinessRule>) -> Self {
        Self { instance }
    }

    /// 可变访问，用于应用属性设置
    pub fn instance_mut(&mut self) -> &mut dyn BusinessRule {
        self.instance.as_mut()
    }

    /// 设置标识符并冻结规则
    pub fn identify(self, identifier: impl Into<String>) -> Rule {
        Rule {
            identifier: Arc::from(identifier.into()),
            instance: Arc::from(self.instance),
        }
    }
}

/// 业务规则服务 trait
pub trait BusinessRulesService: Service {
    /// 按标识符查找规则
    fn find_rule(&self, identifier: &str) -> Option<Rule>;

    /// 所有已加载的规则（按标识符排序）
    fn loaded_rules(&self) -> Vec<Rule>;

    /// 释放并清空所有规则
    fn close(&self);
}

/// 类型化规则查找扩展
pub trait BusinessRulesServiceExt: BusinessRulesService {
    /// 按枚举值和具体类型查找规则
    fn rule<T: BusinessRule, K: RuleKey>(&self, key: K) -> ServiceResult<Arc<T>> {
        let key = key.rule_key();
        self.find_rule(&key)
            .ok_or(ServiceError::RuleNotFound { key })?
            .read::<T>()
    }
}

impl<S: BusinessRulesService + ?Sized> BusinessRulesServiceExt for S {}
