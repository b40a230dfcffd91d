//! # formbind
//!
//! Binds request data onto typed records.
//!
//! A record describes, per field, where its value comes from with a binding
//! annotation `key[,option]*`. A bind call reads the query string, URL-encoded
//! and multipart bodies, uploaded files and JSON bodies, converts each raw
//! value into the field's type and writes it.
//!
//! ## Annotations
//!
//! | Annotation | Meaning |
//! |------------|---------|
//! | `key` | Source form key. `-` or empty skips the field |
//! | `base64` | Uploaded file content is base64 encoded |
//! | `required` | Fail when neither a form value nor a file is present |
//! | `base = "16"` | Integer base, `0` infers it from a `0x`/`0o`/`0b` prefix |
//! | `format = "%Y-%m-%d"` | Time layout, RFC 3339 when absent |
//! | `tz = "Europe/Paris"` | Time zone for values without an offset |
//!
//! ## Supported field types
//!
//! `bool`, all integer types, `f32`, `f64`, `String`, `Vec<u8>`,
//! [`bytes::Bytes`], `chrono::DateTime<FixedOffset>`, `chrono::DateTime<Utc>`,
//! `image::DynamicImage`, and `Option<T>` of any of these. An `Option` field
//! becomes `Some` only when a value is written.
//!
//! ## Example
//!
//! ```rust
//! use formbind::{unmarshal, FormBind, RequestContext};
//! use http::{Method, Uri};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, FormBind)]
//! struct Person {
//!     #[form("id")]
//!     id: i64,
//!     #[form("name,required")]
//!     name: String,
//!     #[form("age")]
//!     age: Option<u8>,
//!     #[form("flags", base = "16")]
//!     flags: u32,
//! }
//!
//! # tokio_test::block_on(async {
//! let ctx = RequestContext::builder()
//!     .method(Method::POST)
//!     .uri(Uri::from_static("/people?id=1"))
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .body("name=rick&age=70&flags=ff")
//!     .build();
//!
//! let mut person = Person::default();
//! unmarshal(&ctx, &mut person).await.unwrap();
//!
//! assert_eq!(person.id, 1);
//! assert_eq!(person.name, "rick");
//! assert_eq!(person.age, Some(70));
//! assert_eq!(person.flags, 0xff);
//! # });
//! ```
//!
//! ## Errors
//!
//! Every failure aborts the bind call with a [`BindError`]. Field-scoped
//! errors name the source key, and each error maps to an HTTP status:
//!
//! ```rust
//! use formbind::BindError;
//!
//! let err = BindError::RequiredFieldMissing { field: "name".into() };
//! assert_eq!(err.to_string(), "missing required field [name]");
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod binding;
mod context;
mod error;
mod file;
mod form;
mod kind;
pub mod multipart;
pub mod scalar;
mod tag;

pub use binder::{unmarshal, Binder, BinderConfig};
pub use binding::{Bindings, FieldBinding, FieldOptions, FormBind};
pub use context::{RequestContext, RequestContextBuilder};
pub use error::{BindError, ExtractionError, ExtractionSource, ValueError};
pub use file::decode_file;
pub use form::FormData;
pub use kind::{FieldKind, FieldType, FieldValue, IntWidth};
pub use multipart::{FilePart, MultipartConfig};
pub use tag::{BindingDirective, TagFlags, SKIP_KEY};

pub use formbind_macros::FormBind;
