//! `FormBind` derive implementation.
//!
//! This module turns a parsed struct into a `FormBind` impl whose binding
//! table is built once and cached in a `OnceLock`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{FormField, FormStruct};

/// Expands `#[derive(FormBind)]`.
pub fn expand_derive(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let form = FormStruct::parse(input)?;

    let name = &form.name;
    let fields = form.fields.iter().map(generate_field);

    Ok(quote! {
        impl ::formbind::FormBind for #name {
            fn bindings() -> &'static ::formbind::Bindings<Self> {
                static BINDINGS: ::std::sync::OnceLock<::formbind::Bindings<#name>> =
                    ::std::sync::OnceLock::new();
                BINDINGS.get_or_init(|| {
                    ::formbind::Bindings::<#name>::new()
                        #(#fields)*
                })
            }
        }
    })
}

/// Generates one `.field_with(...)` builder call.
fn generate_field(field: &FormField) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let name = ident.to_string();
    let tag = &field.attr.tag;

    let base = field.attr.base.iter();
    let format = field.attr.format.iter();
    let tz = field.attr.tz.iter();

    quote! {
        .field_with::<#ty>(
            #name,
            #tag,
            ::formbind::FieldOptions::new()
                #(.base(#base))*
                #(.format(#format))*
                #(.tz(#tz))*,
            |record| &mut record.#ident,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: TokenStream) -> String {
        expand_derive(input).unwrap().to_string()
    }

    #[test]
    fn test_expands_impl_with_fields() {
        let output = expand(quote! {
            struct Person {
                #[form("id,required")]
                id: i64,
                #[form("when", format = "%Y-%m-%d", tz = "UTC")]
                when: Option<chrono::DateTime<chrono::Utc>>,
                skipped: bool,
            }
        });

        assert!(output.contains("impl :: formbind :: FormBind for Person"));
        assert!(output.contains("OnceLock"));
        assert!(output.contains("\"id,required\""));
        assert!(output.contains(". format (\"%Y-%m-%d\")"));
        assert!(output.contains(". tz (\"UTC\")"));
        assert!(!output.contains("skipped"));
        assert_eq!(output.matches(". field_with").count(), 2);
    }

    #[test]
    fn test_fields_without_options() {
        let output = expand(quote! {
            struct Empty {
                #[form("-")]
                ignored: String,
            }
        });

        assert!(output.contains("\"ignored\""));
        assert!(!output.contains(". base"));
    }

    #[test]
    fn test_errors_surface() {
        let result = expand_derive(quote! {
            struct Bad {
                #[form(id)]
                id: i64,
            }
        });
        assert!(result.is_err());
    }
}
