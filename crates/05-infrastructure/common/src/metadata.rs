//! 描述符定义
//!
//! 描述如何构建服务、工厂、配置提供者和业务规则的声明式数据。
//! 描述符在注册表初始化（或规则批次加载）时创建，此后不可变。

use serde::{Deserialize, Serialize};

/// 未指定模块时在诊断信息中使用的占位名称
pub const UNSPECIFIED_MODULE: &str = "<unspecified>";

/// 构造参数描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// 原始字符串值
    pub value: String,
    /// 目标类型名
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ParameterDescriptor {
    /// 创建带类型名的参数描述符
    pub fn new(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            type_name: Some(type_name.into()),
        }
    }

    /// 创建未声明类型的参数描述符
    pub fn untyped(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            type_name: None,
        }
    }
}

/// 属性设置描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySetterDescriptor {
    /// 属性名
    pub name: String,
    /// 原始字符串值
    pub value: String,
}

impl PropertySetterDescriptor {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 配置提供者描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// 实现类型名
    #[serde(rename = "type")]
    pub type_name: String,
    /// 定义模块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 属性设置
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySetterDescriptor>,
}

impl ProviderDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            module: None,
            properties: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .push(PropertySetterDescriptor::new(name, value));
        self
    }

    /// 模块名（诊断用）
    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }
}

/// 服务描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// 实现类型名，同时是规范键
    #[serde(rename = "type")]
    pub type_name: String,
    /// 定义模块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 公开接口名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// 别名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// 构造工厂别名，缺省时使用默认工厂
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    /// 配置提供者（按顺序注册）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderDescriptor>,
    /// 属性设置（按顺序应用）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySetterDescriptor>,
}

impl ServiceDescriptor {
    /// 创建新的服务描述符
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            module: None,
            interface: None,
            alias: None,
            factory: None,
            providers: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_factory(mut self, factory: impl Into<String>) -> Self {
        self.factory = Some(factory.into());
        self
    }

    pub fn with_provider(mut self, provider: ProviderDescriptor) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .push(PropertySetterDescriptor::new(name, value));
        self
    }

    /// 规范键（实现类型名）
    pub fn canonical_key(&self) -> &str {
        &self.type_name
    }

    /// 模块名（诊断用）
    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }

    /// 所有注册键：类型名、接口名（不同时）、别名（存在时），去重且保持顺序
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = vec![self.type_name.as_str()];
        for key in [self.interface.as_deref(), self.alias.as_deref()]
            .into_iter()
            .flatten()
        {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// 工厂描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryDescriptor {
    /// 实现类型名
    #[serde(rename = "type")]
    pub type_name: String,
    /// 定义模块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 别名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// 是否在运行时由外部提供
    #[serde(default)]
    pub runtime_supplied: bool,
    /// 属性设置
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySetterDescriptor>,
}

impl FactoryDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            module: None,
            alias: None,
            runtime_supplied: false,
            properties: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// 标记为运行时由外部提供
    pub fn supplied_at_runtime(mut self) -> Self {
        self.runtime_supplied = true;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .push(PropertySetterDescriptor::new(name, value));
        self
    }

    /// 规范键：别名优先，否则类型名
    pub fn canonical_key(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.type_name,
        }
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }
}

/// 业务规则描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// 规则标识符，通常为 `{枚举类型名}_{枚举值名}`
    #[serde(rename = "id")]
    pub identifier: String,
    /// 实现类型名
    #[serde(rename = "type")]
    pub type_name: String,
    /// 定义模块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 构造参数（按顺序匹配构造函数）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescriptor>,
    /// 属性设置
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySetterDescriptor>,
}

impl RuleDescriptor {
    pub fn new(identifier: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            type_name: type_name.into(),
            module: None,
            parameters: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_parameter(mut self, value: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(ParameterDescriptor::new(value, type_name));
        self
    }

    pub fn with_untyped_parameter(mut self, value: impl Into<String>) -> Self {
        self.parameters.push(ParameterDescriptor::untyped(value));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .push(PropertySetterDescriptor::new(name, value));
        self
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(UNSPECIFIED_MODULE)
    }
}
