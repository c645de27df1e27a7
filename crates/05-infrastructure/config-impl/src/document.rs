//! 描述符文档格式
//!
//! JSON/TOML 提供者读取的文件结构。各节均可省略。

use infrastructure_common::{
    ConfigurationElements, FactoryDescriptor, RuleDescriptor, ServiceDescriptor,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 描述符文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDocument {
    /// 工厂描述符
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factories: Vec<FactoryDescriptor>,
    /// 服务描述符
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceDescriptor>,
    /// 业务规则描述符
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleDescriptor>,
    /// 键值设置
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl DescriptorDocument {
    /// 转换为配置元素集合
    ///
    /// 顺序：工厂、服务、规则、设置（按键排序）。
    pub fn into_elements(self) -> ConfigurationElements {
        let mut elements = ConfigurationElements::new();
        for factory in self.factories {
            elements.push(factory);
        }
        for service in self.services {
            elements.push(service);
        }
        for rule in self.rules {
            elements.push(rule);
        }
        for (name, value) in self.settings {
            elements.push_setting(name, value);
        }
        elements
    }
}
