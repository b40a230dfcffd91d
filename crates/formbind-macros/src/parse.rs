//! Parsing utilities for the `FormBind` derive.
//!
//! This module parses `#[form(...)]` field attributes and the shape of the
//! deriving struct.

use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    Data, DeriveInput, Expr, ExprLit, Fields, Ident, Lit, LitStr, Meta, Token, Type,
};

/// Parsed `#[form("key,options", base = "..", format = "..", tz = "..")]`.
#[derive(Debug)]
pub struct FormAttr {
    /// The binding annotation, `key[,option]*`.
    pub tag: LitStr,
    /// Integer base.
    pub base: Option<LitStr>,
    /// Time format.
    pub format: Option<LitStr>,
    /// Time zone.
    pub tz: Option<LitStr>,
}

impl Parse for FormAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let tag: LitStr = input.parse()?;
        let mut base = None;
        let mut format = None;
        let mut tz = None;

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }

            let meta: Meta = input.parse()?;
            let span = meta.span();
            let Meta::NameValue(nv) = meta else {
                return Err(syn::Error::new(span, "expected name = \"value\""));
            };

            let ident = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
                .to_string();

            let value = match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.clone(),
                _ => {
                    return Err(syn::Error::new(
                        nv.value.span(),
                        "expected string literal",
                    ))
                }
            };

            let slot = match ident.as_str() {
                "base" => &mut base,
                "format" => &mut format,
                "tz" => &mut tz,
                _ => {
                    return Err(syn::Error::new(
                        nv.path.span(),
                        format!("unknown attribute: {ident}"),
                    ))
                }
            };
            if slot.replace(value).is_some() {
                return Err(syn::Error::new(
                    nv.path.span(),
                    format!("duplicate attribute: {ident}"),
                ));
            }
        }

        Ok(Self {
            tag,
            base,
            format,
            tz,
        })
    }
}

/// A struct field carrying a `#[form]` attribute.
#[derive(Debug)]
pub struct FormField {
    /// The field name.
    pub ident: Ident,
    /// The field type.
    pub ty: Type,
    /// The parsed attribute.
    pub attr: FormAttr,
}

/// Parsed deriving struct.
#[derive(Debug)]
pub struct FormStruct {
    /// The struct name.
    pub name: Ident,
    /// Bound fields in declaration order.
    pub fields: Vec<FormField>,
}

impl FormStruct {
    /// Parses a `DeriveInput` into a `FormStruct`.
    ///
    /// Only non-generic structs with named fields are accepted. Fields without
    /// a `#[form]` attribute are left out.
    pub fn parse(input: DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "FormBind cannot be derived for generic types",
            ));
        }

        let named = match input.data {
            Data::Struct(data) => match data.fields {
                Fields::Named(named) => named,
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "FormBind requires a struct with named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "FormBind can only be derived for structs",
                ))
            }
        };

        let mut fields = Vec::new();
        for field in named.named {
            let mut attrs = field.attrs.iter().filter(|a| a.path().is_ident("form"));
            let Some(attr) = attrs.next() else {
                continue;
            };
            if let Some(extra) = attrs.next() {
                return Err(syn::Error::new(extra.span(), "duplicate #[form] attribute"));
            }

            let ident = field
                .ident
                .ok_or_else(|| syn::Error::new(field.ty.span(), "expected named field"))?;
            fields.push(FormField {
                ident,
                ty: field.ty,
                attr: attr.parse_args()?,
            });
        }

        Ok(Self {
            name: input.ident,
            fields,
        })
    }
}
