//! 配置元素定义
//!
//! 配置提供者返回的数据单元，服务在加载时消费。

use crate::metadata::{FactoryDescriptor, RuleDescriptor, ServiceDescriptor};
use serde::{Deserialize, Serialize};

/// 配置元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationElement {
    /// 服务描述符
    Service(ServiceDescriptor),
    /// 工厂描述符
    Factory(FactoryDescriptor),
    /// 业务规则描述符
    Rule(RuleDescriptor),
    /// 键值设置
    Setting { name: String, value: String },
}

impl ConfigurationElement {
    /// 元素类别名（日志用）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Service(_) => "service",
            Self::Factory(_) => "factory",
            Self::Rule(_) => "rule",
            Self::Setting { .. } => "setting",
        }
    }
}

impl From<ServiceDescriptor> for ConfigurationElement {
    fn from(descriptor: ServiceDescriptor) -> Self {
        Self::Service(descriptor)
    }
}

impl From<FactoryDescriptor> for ConfigurationElement {
    fn from(descriptor: FactoryDescriptor) -> Self {
        Self::Factory(descriptor)
    }
}

impl From<RuleDescriptor> for ConfigurationElement {
    fn from(descriptor: RuleDescriptor) -> Self {
        Self::Rule(descriptor)
    }
}

/// 配置元素集合
///
/// 保持提供者返回的顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationElements {
    elements: Vec<ConfigurationElement>,
}

impl ConfigurationElements {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加元素
    pub fn push(&mut self, element: impl Into<ConfigurationElement>) {
        self.elements.push(element.into());
    }

    /// 追加一个设置项
    pub fn push_setting(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.elements.push(ConfigurationElement::Setting {
            name: name.into(),
            value: value.into(),
        });
    }

    /// 合并另一个集合
    pub fn extend(&mut self, other: ConfigurationElements) {
        self.elements.extend(other.elements);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationElement> {
        self.elements.iter()
    }

    /// 所有服务描述符
    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.elements.iter().filter_map(|element| match element {
            ConfigurationElement::Service(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    /// 所有工厂描述符
    pub fn factories(&self) -> impl Iterator<Item = &FactoryDescriptor> {
        self.elements.iter().filter_map(|element| match element {
            ConfigurationElement::Factory(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    /// 所有规则描述符
    pub fn rules(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.elements.iter().filter_map(|element| match element {
            ConfigurationElement::Rule(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    /// 查找设置项，同名时后出现的覆盖先出现的
    pub fn setting(&self, name: &str) -> Option<&str> {
        self.elements
            .iter()
            .rev()
            .find_map(|element| match element {
                ConfigurationElement::Setting { name: key, value } if key == name => {
                    Some(value.as_str())
                }
                _ => None,
            })
    }
}

impl FromIterator<ConfigurationElement> for ConfigurationElements {
    fn from_iter<I: IntoIterator<Item = ConfigurationElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ConfigurationElements {
    type Item = ConfigurationElement;
    type IntoIter = std::vec::IntoIter<ConfigurationElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
