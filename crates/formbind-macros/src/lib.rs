//! Procedural macros for formbind.
//!
//! `#[derive(FormBind)]` generates the binding table of a record from
//! `#[form(...)]` field attributes.
//!
//! # Example
//!
//! ```rust,ignore
//! use formbind::FormBind;
//!
//! #[derive(Default, serde::Serialize, serde::Deserialize, FormBind)]
//! struct Upload {
//!     #[form("title,required")]
//!     title: String,
//!     #[serde(skip)]
//!     #[form("picture,base64")]
//!     picture: Option<image::DynamicImage>,
//!     #[form("taken", format = "%Y-%m-%d %H:%M", tz = "Europe/Paris")]
//!     taken: Option<chrono::DateTime<chrono::FixedOffset>>,
//!     // Not bound.
//!     checksum: u64,
//! }
//! ```
//!
//! # Macro Expansion
//!
//! The derive:
//!
//! 1. Collects the named fields carrying a `#[form]` attribute, in order
//! 2. Emits one `Bindings::field_with` call per field with its annotations
//! 3. Caches the table in a `OnceLock` so it is built on first use only

mod derive;
mod parse;

use proc_macro::TokenStream;

/// Derives `formbind::FormBind` for a struct with named fields.
///
/// # Attributes
///
/// - `#[form("key[,base64][,required]")]`: the binding annotation (required)
/// - `base = "16"`: integer base
/// - `format = "%Y-%m-%d"`: time format in `strftime` syntax
/// - `tz = "America/Chicago"`: time zone for values without an offset
///
/// Fields without `#[form]` are not bound. Generic structs are rejected.
///
/// # Generated Code
///
/// The macro generates approximately:
///
/// ```rust,ignore
/// impl ::formbind::FormBind for Upload {
///     fn bindings() -> &'static ::formbind::Bindings<Self> {
///         static BINDINGS: OnceLock<Bindings<Upload>> = OnceLock::new();
///         BINDINGS.get_or_init(|| {
///             Bindings::<Upload>::new()
///                 .field_with::<String>("title", "title,required", FieldOptions::new(), |r| &mut r.title)
///         })
///     }
/// }
/// ```
#[proc_macro_derive(FormBind, attributes(form))]
pub fn derive_form_bind(item: TokenStream) -> TokenStream {
    derive::expand_derive(item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
