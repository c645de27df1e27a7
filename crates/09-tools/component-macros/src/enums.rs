//! `#[derive(RuleKey)]` 与 `#[derive(PropertyEnum)]` 实现

use crate::utils::unit_variants;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn derive_rule_key_impl(input: DeriveInput) -> Result<TokenStream> {
    let variants = unit_variants(&input, "RuleKey")?;
    let enum_ident = &input.ident;
    let enum_name = enum_ident.to_string();
    let variant_names: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::di_abstractions::RuleKey for #enum_ident #ty_generics #where_clause {
            const ENUM_NAME: &'static str = #enum_name;

            fn variant_name(&self) -> &'static str {
                match self {
                    #( Self::#variants => #variant_names, )*
                }
            }
        }
    })
}

pub fn derive_property_enum_impl(input: DeriveInput) -> Result<TokenStream> {
    let variants = unit_variants(&input, "PropertyEnum")?;
    let enum_ident = &input.ident;
    let enum_name = enum_ident.to_string();
    let variant_names: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::infrastructure_common::PropertyType for #enum_ident #ty_generics #where_clause {
            fn kind() -> ::infrastructure_common::ParameterKind {
                ::infrastructure_common::ParameterKind::Enum(#enum_name.to_string())
            }

            fn from_value(
                value: ::infrastructure_common::PropertyValue,
            ) -> ::infrastructure_common::ConversionResult<Self> {
                let raw = match value {
                    ::infrastructure_common::PropertyValue::Enum { variant, .. } => variant,
                    ::infrastructure_common::PropertyValue::Text(raw)
                    | ::infrastructure_common::PropertyValue::Raw(raw) => raw,
                    other => {
                        return ::core::result::Result::Err(
                            ::infrastructure_common::ConversionError::invalid_value(
                                other.describe(),
                                #enum_name,
                                "不是枚举值",
                            ),
                        )
                    }
                };
                let name = raw.trim();
                #(
                    if name.eq_ignore_ascii_case(#variant_names) {
                        return ::core::result::Result::Ok(Self::#variants);
                    }
                )*
                ::core::result::Result::Err(::infrastructure_common::ConversionError::invalid_value(
                    raw.as_str(),
                    #enum_name,
                    "未知的枚举值",
                ))
            }
        }
    })
}
