//! 宏工具函数

use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Result};

/// 将蛇形命名转换为帕斯卡命名
pub fn to_pascal_case(s: &str) -> String {
    let s = s.strip_prefix("r#").unwrap_or(s);
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// 字段上的 `#[property(...)]` 选项
#[derive(Debug, Default)]
pub struct PropertyOptions {
    pub name: Option<String>,
    pub skip: bool,
}

/// 解析 `#[property(name = "...")]` 与 `#[property(skip)]`
pub fn parse_property_options(attrs: &[Attribute]) -> Result<PropertyOptions> {
    let mut options = PropertyOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("property")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let name: LitStr = meta.value()?.parse()?;
                options.name = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("不支持的 property 参数，可用: name = \"...\", skip"))
            }
        })?;
    }
    Ok(options)
}

/// 取出单元枚举的所有变体
pub fn unit_variants<'a>(input: &'a DeriveInput, derive: &str) -> Result<Vec<&'a Ident>> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{} 只能用于枚举", derive),
        ));
    };

    data.variants
        .iter()
        .map(|variant| match variant.fields {
            Fields::Unit => Ok(&variant.ident),
            _ => Err(syn::Error::new_spanned(
                variant,
                format!("{} 只支持无字段的枚举变体", derive),
            )),
        })
        .collect()
}
