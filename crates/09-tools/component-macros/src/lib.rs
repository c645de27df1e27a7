//! # Component Macros
//!
//! 服务、规则与属性设置相关的派生宏。
//!
//! ## 核心宏
//!
//! - [`Properties`](derive@Properties) - 按字段生成 `PropertyTarget`
//! - [`RuleKey`](derive@RuleKey) - 为单元枚举生成规则键
//! - [`PropertyEnum`](derive@PropertyEnum) - 让单元枚举可以作为属性类型
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{Properties, PropertyEnum, RuleKey};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PropertyEnum)]
//! pub enum Tier {
//!     Bronze,
//!     Gold,
//! }
//!
//! #[derive(Debug, Default, Properties)]
//! pub struct LimitRule {
//!     level: i32,
//!     #[property(name = "Enabled")]
//!     active: bool,
//!     tier: Option<Tier>,
//!     #[property(skip)]
//!     hits: u64,
//! }
//!
//! #[derive(RuleKey)]
//! pub enum OrderRule {
//!     Limit,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod enums;
mod properties;
mod utils;

/// 属性设置派生宏
///
/// 为具名字段结构体实现 `PropertyTarget`。属性名为字段名的帕斯卡形式，
/// 匹配时忽略大小写。字段类型必须实现 `PropertyType`。
///
/// # 字段参数
///
/// - `#[property(name = "Custom")]` - 自定义属性名
/// - `#[property(skip)]` - 不作为属性公开
#[proc_macro_derive(Properties, attributes(property))]
pub fn derive_properties(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    properties::derive_properties_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 规则键派生宏
///
/// 为单元枚举实现 `RuleKey`，规则标识符为 `{枚举类型名}_{变体名}`。
#[proc_macro_derive(RuleKey)]
pub fn derive_rule_key(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    enums::derive_rule_key_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 属性枚举派生宏
///
/// 为单元枚举实现 `PropertyType`，按变体名（忽略大小写）解析。
#[proc_macro_derive(PropertyEnum)]
pub fn derive_property_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    enums::derive_property_enum_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
