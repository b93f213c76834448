// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Field info for code generation
struct FieldInfo {
    ident: syn::Ident,
    ty: syn::Type,
    /// Column name (raw identifiers lose their `r#` prefix)
    column: String,
}

/// `#[derive(Record)]` macro: generates `Introspect`, `ToNative` and
/// `FromNative` impls for a struct with named fields.
///
/// Field types must implement the same three traits; nested records,
/// `Option`, `Box`, collections, maps, temporals and decimals all work.
/// The class name defaults to `module_path!()::StructName`.
///
/// Attributes:
/// - `#[record(name = "...")]` on the struct overrides the class name
/// - `#[record(rename = "...")]` on a field overrides its column name
///
/// Example:
/// ```ignore
/// use tabula::Record;
///
/// #[derive(Record)]
/// struct Order {
///     id: i64,
///     #[record(rename = "customer_name")]
///     customer: String,
///     lines: Vec<OrderLine>,
///     note: Option<String>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Generic records are not supported",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let mut field_infos = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let column = match record_attr(&field.attrs, "rename")? {
            Some(lit) => lit.value(),
            None => strip_raw(&ident.to_string()),
        };
        if field_infos.iter().any(|f: &FieldInfo| f.column == column) {
            return Err(syn::Error::new_spanned(
                field,
                format!("Duplicate column name `{column}`"),
            ));
        }
        field_infos.push(FieldInfo {
            ident: ident.clone(),
            ty: field.ty.clone(),
            column,
        });
    }

    let type_name = name.to_string();
    let class_name = match record_attr(&input.attrs, "name")? {
        Some(lit) => quote! { #lit },
        None => quote! { concat!(module_path!(), "::", #type_name) },
    };

    let describe_fields = field_infos.iter().map(|f| {
        let column = &f.column;
        let ty = &f.ty;
        quote! {
            .field(#column, <#ty as ::tabula::types::Introspect>::type_descriptor())
        }
    });

    let encode_fields = field_infos.iter().map(|f| {
        let column = &f.column;
        let ident = &f.ident;
        quote! {
            (
                ::std::string::String::from(#column),
                ::tabula::native::ToNative::to_native(&self.#ident),
            )
        }
    });

    let decode_fields = field_infos.iter().map(|f| {
        let column = &f.column;
        let ident = &f.ident;
        let ty = &f.ty;
        quote! {
            #ident: reader.field::<#ty>(#column)?
        }
    });

    Ok(quote! {
        impl ::tabula::types::Introspect for #name {
            fn type_descriptor() -> ::tabula::types::TypeRef {
                let class = #class_name;
                ::tabula::types::describe_class(class, || {
                    ::tabula::types::ClassBuilder::new(class)
                        #(#describe_fields)*
                        .build_ref()
                })
            }
        }

        impl ::tabula::native::ToNative for #name {
            fn to_native(&self) -> ::tabula::value::Value {
                ::tabula::value::Value::object(
                    #class_name,
                    vec![#(#encode_fields),*],
                )
            }
        }

        impl ::tabula::native::FromNative for #name {
            fn from_native(value: ::tabula::value::Value) -> ::tabula::error::Result<Self> {
                let reader = ::tabula::native::ObjectReader::new(value, #class_name)?;
                Ok(Self {
                    #(#decode_fields),*
                })
            }
        }
    })
}

/// Look up `#[record(key = "...")]` among the attributes.
fn record_attr(attrs: &[syn::Attribute], key: &str) -> syn::Result<Option<LitStr>> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                found = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error(format!(
                    "unknown record attribute (expected `{key}`)"
                )))
            }
        })?;
    }
    Ok(found)
}

fn strip_raw(ident: &str) -> String {
    ident.strip_prefix("r#").unwrap_or(ident).to_string()
}
