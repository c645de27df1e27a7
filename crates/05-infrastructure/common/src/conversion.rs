//! 字符串参数与属性值转换
//!
//! 描述符中的值均为字符串。构造参数通过显式类型名确定目标类型，
//! 属性通过目标对象自身声明的属性类型确定。每种目标类型对应一个
//! 独立的解析函数，由 [`ParameterKind`] 选择，失败时返回结构化错误。
//!
//! 属性转换顺序：
//!
//! 1. 文本属性直接赋值原始字符串；
//! 2. 已注册的枚举/自定义类型转换器；
//! 3. 内置转换（整数、无符号整数、浮点、布尔、按名称匹配枚举值）；
//! 4. 其余情况把原始字符串交给属性类型自身转换。

use crate::errors::{ConversionError, ConversionResult};
use crate::metadata::{ParameterDescriptor, PropertySetterDescriptor};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// 参数/属性的目标类型类别
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// 字符串
    Text,
    /// 有符号整数
    Integer,
    /// 无符号整数
    Unsigned,
    /// 浮点数
    Float,
    /// 布尔值
    Boolean,
    /// 枚举，携带枚举类型名
    Enum(String),
    /// 自定义类型，携带类型名
    Custom(String),
}

impl ParameterKind {
    /// 识别内置类型名
    ///
    /// 同时接受 Rust 原生类型名与配置文件中常见的通用类型名。
    pub fn builtin(type_name: &str) -> Option<Self> {
        let name = type_name.trim();
        let name = name.strip_prefix("System.").unwrap_or(name);
        let kind = match name.to_ascii_lowercase().as_str() {
            "string" | "str" | "text" | "char" | "path" | "pathbuf" => Self::Text,
            "i8" | "i16" | "i32" | "i64" | "isize" | "int" | "integer" | "long" | "short"
            | "sbyte" | "int16" | "int32" | "int64" => Self::Integer,
            "u8" | "u16" | "u32" | "u64" | "usize" | "uint" | "ulong" | "ushort" | "byte"
            | "uint16" | "uint32" | "uint64" => Self::Unsigned,
            "f32" | "f64" | "float" | "double" | "single" | "decimal" => Self::Float,
            "bool" | "boolean" => Self::Boolean,
            _ => return None,
        };
        Some(kind)
    }

    /// 枚举或自定义类型的类型名
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Enum(name) | Self::Custom(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Integer => f.write_str("integer"),
            Self::Unsigned => f.write_str("unsigned"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum(name) => write!(f, "enum {}", name),
            Self::Custom(name) => write!(f, "custom {}", name),
        }
    }
}

/// 转换后的值
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    /// 枚举值名，由枚举类型自身解析
    Enum { type_name: String, variant: String },
    /// 自定义转换器产生的值
    Custom {
        type_name: String,
        value: Arc<dyn Any + Send + Sync>,
    },
    /// 未经转换的原始字符串，由属性类型自身转换
    Raw(String),
}

impl PropertyValue {
    /// 值类别名（错误信息用）
    pub fn describe(&self) -> String {
        match self {
            Self::Text(_) => "text".to_string(),
            Self::Integer(_) => "integer".to_string(),
            Self::Unsigned(_) => "unsigned".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Boolean(_) => "boolean".to_string(),
            Self::Enum { type_name, .. } => format!("enum {}", type_name),
            Self::Custom { type_name, .. } => format!("custom {}", type_name),
            Self::Raw(_) => "raw".to_string(),
        }
    }

    /// 取出自定义值
    pub fn downcast_custom<T: Any + Clone>(&self) -> Option<T> {
        match self {
            Self::Custom { value, .. } => value.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &str) -> ConversionError {
        ConversionError::invalid_value(
            format!("{:?}", self),
            expected,
            format!("不能从 {} 转换", self.describe()),
        )
    }
}

/// 整数解析（忽略首尾空白）
pub fn parse_integer(raw: &str) -> ConversionResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ConversionError::invalid_value(raw, "integer", e.to_string()))
}

/// 无符号整数解析
pub fn parse_unsigned(raw: &str) -> ConversionResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConversionError::invalid_value(raw, "unsigned", e.to_string()))
}

/// 浮点解析，小数点固定为 `.`
pub fn parse_float(raw: &str) -> ConversionResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ConversionError::invalid_value(raw, "float", e.to_string()))
}

/// 布尔解析，只接受 true/false（不区分大小写）
pub fn parse_boolean(raw: &str) -> ConversionResult<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConversionError::invalid_value(
            raw,
            "boolean",
            "期望 true 或 false",
        ))
    }
}

/// 可作为属性或构造参数的类型
pub trait PropertyType: Sized {
    /// 目标类型类别
    fn kind() -> ParameterKind;

    /// 从转换后的值构建
    fn from_value(value: PropertyValue) -> ConversionResult<Self>;
}

impl PropertyType for String {
    fn kind() -> ParameterKind {
        ParameterKind::Text
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        match value {
            PropertyValue::Text(s) | PropertyValue::Raw(s) => Ok(s),
            PropertyValue::Integer(i) => Ok(i.to_string()),
            PropertyValue::Unsigned(u) => Ok(u.to_string()),
            PropertyValue::Float(f) => Ok(f.to_string()),
            PropertyValue::Boolean(b) => Ok(b.to_string()),
            PropertyValue::Enum { variant, .. } => Ok(variant),
            other => Err(other.mismatch("text")),
        }
    }
}

impl PropertyType for PathBuf {
    fn kind() -> ParameterKind {
        ParameterKind::Text
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        String::from_value(value).map(PathBuf::from)
    }
}

impl PropertyType for bool {
    fn kind() -> ParameterKind {
        ParameterKind::Boolean
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        match value {
            PropertyValue::Boolean(b) => Ok(b),
            PropertyValue::Text(s) | PropertyValue::Raw(s) => parse_boolean(&s),
            other => Err(other.mismatch("boolean")),
        }
    }
}

macro_rules! impl_signed_property {
    ($($ty:ty),*) => {
        $(
            impl PropertyType for $ty {
                fn kind() -> ParameterKind {
                    ParameterKind::Integer
                }

                fn from_value(value: PropertyValue) -> ConversionResult<Self> {
                    let wide = match value {
                        PropertyValue::Integer(i) => i,
                        PropertyValue::Unsigned(u) => i64::try_from(u).map_err(|e| {
                            ConversionError::invalid_value(u.to_string(), stringify!($ty), e.to_string())
                        })?,
                        PropertyValue::Text(s) | PropertyValue::Raw(s) => parse_integer(&s)?,
                        other => return Err(other.mismatch(stringify!($ty))),
                    };
                    <$ty>::try_from(wide).map_err(|e| {
                        ConversionError::invalid_value(wide.to_string(), stringify!($ty), e.to_string())
                    })
                }
            }
        )*
    };
}

macro_rules! impl_unsigned_property {
    ($($ty:ty),*) => {
        $(
            impl PropertyType for $ty {
                fn kind() -> ParameterKind {
                    ParameterKind::Unsigned
                }

                fn from_value(value: PropertyValue) -> ConversionResult<Self> {
                    let wide = match value {
                        PropertyValue::Unsigned(u) => u,
                        PropertyValue::Integer(i) => u64::try_from(i).map_err(|e| {
                            ConversionError::invalid_value(i.to_string(), stringify!($ty), e.to_string())
                        })?,
                        PropertyValue::Text(s) | PropertyValue::Raw(s) => parse_unsigned(&s)?,
                        other => return Err(other.mismatch(stringify!($ty))),
                    };
                    <$ty>::try_from(wide).map_err(|e| {
                        ConversionError::invalid_value(wide.to_string(), stringify!($ty), e.to_string())
                    })
                }
            }
        )*
    };
}

impl_signed_property!(i8, i16, i32, i64, isize);
impl_unsigned_property!(u8, u16, u32, u64, usize);

impl PropertyType for f64 {
    fn kind() -> ParameterKind {
        ParameterKind::Float
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        match value {
            PropertyValue::Float(f) => Ok(f),
            PropertyValue::Integer(i) => Ok(i as f64),
            PropertyValue::Unsigned(u) => Ok(u as f64),
            PropertyValue::Text(s) | PropertyValue::Raw(s) => parse_float(&s),
            other => Err(other.mismatch("f64")),
        }
    }
}

impl PropertyType for f32 {
    fn kind() -> ParameterKind {
        ParameterKind::Float
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl<T: PropertyType> PropertyType for Option<T> {
    fn kind() -> ParameterKind {
        T::kind()
    }

    fn from_value(value: PropertyValue) -> ConversionResult<Self> {
        T::from_value(value).map(Some)
    }
}

/// 可被属性设置描述符配置的对象
///
/// 通常通过 `#[derive(Properties)]` 实现；没有可配置属性的类型
/// 使用默认实现即可。
pub trait PropertyTarget {
    /// 属性声明的目标类型，不存在时返回 `None`
    fn property_kind(&self, name: &str) -> Option<ParameterKind> {
        let _ = name;
        None
    }

    /// 设置属性
    fn set_property(&mut self, name: &str, value: PropertyValue) -> ConversionResult<()> {
        let _ = value;
        Err(ConversionError::UnknownProperty {
            property: name.to_string(),
        })
    }
}

/// 转换函数
pub type ConverterFn = Arc<dyn Fn(&str) -> ConversionResult<PropertyValue> + Send + Sync>;

#[derive(Clone)]
struct Converter {
    kind: ParameterKind,
    convert: ConverterFn,
}

/// 枚举与自定义类型的转换器表
#[derive(Clone, Default)]
pub struct ValueConverters {
    converters: HashMap<String, Converter>,
}

impl fmt::Debug for ValueConverters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.converters.keys().collect();
        names.sort();
        f.debug_struct("ValueConverters")
            .field("types", &names)
            .finish()
    }
}

impl ValueConverters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册枚举类型，值在转换时即校验
    pub fn register_enum<E: PropertyType>(&mut self) {
        let kind = E::kind();
        let Some(type_name) = kind.type_name().map(str::to_string) else {
            return;
        };
        let name = type_name.clone();
        let convert: ConverterFn = Arc::new(move |raw: &str| {
            E::from_value(PropertyValue::Raw(raw.to_string()))?;
            Ok(PropertyValue::Enum {
                type_name: name.clone(),
                variant: raw.trim().to_string(),
            })
        });
        self.converters
            .insert(type_name, Converter { kind, convert });
    }

    /// 注册自定义类型转换器
    pub fn register_custom<T, F>(&mut self, type_name: impl Into<String>, convert: F)
    where
        T: Any + Send + Sync,
        F: Fn(&str) -> ConversionResult<T> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let name = type_name.clone();
        let convert: ConverterFn = Arc::new(move |raw: &str| {
            let value = convert(raw)?;
            Ok(PropertyValue::Custom {
                type_name: name.clone(),
                value: Arc::new(value),
            })
        });
        self.converters.insert(
            type_name.clone(),
            Converter {
                kind: ParameterKind::Custom(type_name),
                convert,
            },
        );
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name)
    }

    /// 解析参数类型名
    pub fn resolve_kind(&self, type_name: &str) -> ConversionResult<ParameterKind> {
        if let Some(kind) = ParameterKind::builtin(type_name) {
            return Ok(kind);
        }
        self.converters
            .get(type_name.trim())
            .map(|converter| converter.kind.clone())
            .ok_or_else(|| ConversionError::UnknownParameterType {
                type_name: type_name.to_string(),
            })
    }

    /// 转换构造参数，参数必须声明类型名
    pub fn convert_parameter(
        &self,
        descriptor: &ParameterDescriptor,
    ) -> ConversionResult<(ParameterKind, PropertyValue)> {
        let type_name = descriptor
            .type_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ConversionError::MissingParameterType {
                value: descriptor.value.clone(),
            })?;
        let kind = self.resolve_kind(type_name)?;
        let value = self.convert(&descriptor.value, &kind)?;
        Ok((kind, value))
    }

    /// 按目标属性类型转换原始字符串
    pub fn convert(&self, raw: &str, kind: &ParameterKind) -> ConversionResult<PropertyValue> {
        match kind {
            ParameterKind::Text => Ok(PropertyValue::Text(raw.to_string())),
            ParameterKind::Enum(type_name) | ParameterKind::Custom(type_name) => {
                if let Some(converter) = self.converters.get(type_name) {
                    return (converter.convert)(raw);
                }
                match kind {
                    ParameterKind::Enum(_) => Ok(PropertyValue::Enum {
                        type_name: type_name.clone(),
                        variant: raw.trim().to_string(),
                    }),
                    _ => Ok(PropertyValue::Raw(raw.to_string())),
                }
            }
            ParameterKind::Integer => parse_integer(raw).map(PropertyValue::Integer),
            ParameterKind::Unsigned => parse_unsigned(raw).map(PropertyValue::Unsigned),
            ParameterKind::Float => parse_float(raw).map(PropertyValue::Float),
            ParameterKind::Boolean => parse_boolean(raw).map(PropertyValue::Boolean),
        }
    }

    /// 把一个属性设置描述符应用到目标对象
    pub fn apply_property<T>(
        &self,
        target: &mut T,
        setter: &PropertySetterDescriptor,
    ) -> ConversionResult<()>
    where
        T: PropertyTarget + ?Sized,
    {
        let kind = target
            .property_kind(&setter.name)
            .ok_or_else(|| ConversionError::UnknownProperty {
                property: setter.name.clone(),
            })?;
        let value = self.convert(&setter.value, &kind)?;
        target.set_property(&setter.name, value)
    }
}
