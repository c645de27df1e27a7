//! `#[derive(Properties)]` 实现

use crate::utils::{parse_property_options, to_pascal_case};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn derive_properties_impl(input: DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Properties 只能用于结构体",
        ));
    };

    let mut names = Vec::new();
    let mut idents = Vec::new();
    let mut types = Vec::new();

    if let Fields::Named(fields) = &data.fields {
        for field in &fields.named {
            let options = parse_property_options(&field.attrs)?;
            if options.skip {
                continue;
            }
            let Some(ident) = &field.ident else {
                continue;
            };
            names.push(
                options
                    .name
                    .unwrap_or_else(|| to_pascal_case(&ident.to_string())),
            );
            idents.push(ident);
            types.push(&field.ty);
        }
    }

    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::infrastructure_common::PropertyTarget for #struct_name #ty_generics #where_clause {
            fn property_kind(&self, name: &str) -> ::core::option::Option<::infrastructure_common::ParameterKind> {
                #(
                    if name.eq_ignore_ascii_case(#names) {
                        return ::core::option::Option::Some(
                            <#types as ::infrastructure_common::PropertyType>::kind()
                        );
                    }
                )*
                let _ = name;
                ::core::option::Option::None
            }

            fn set_property(
                &mut self,
                name: &str,
                value: ::infrastructure_common::PropertyValue,
            ) -> ::infrastructure_common::ConversionResult<()> {
                #(
                    if name.eq_ignore_ascii_case(#names) {
                        self.#idents = <#types as ::infrastructure_common::PropertyType>::from_value(value)?;
                        return ::core::result::Result::Ok(());
                    }
                )*
                let _ = value;
                ::core::result::Result::Err(::infrastructure_common::ConversionError::UnknownProperty {
                    property: name.to_string(),
                })
            }
        }
    })
}
