//! Per-record binding tables.
//!
//! A [`Bindings`] table lists, in declaration order, every field of a record
//! that participates in binding: its annotation, its effective kind and a
//! setter. Tables are usually generated with `#[derive(FormBind)]`, but can be
//! written by hand:
//!
//! ```rust
//! use formbind::{Bindings, FieldOptions, FormBind};
//! use std::sync::OnceLock;
//!
//! #[derive(Default)]
//! struct Search {
//!     query: String,
//!     page: Option<u32>,
//!     mask: u16,
//! }
//!
//! impl FormBind for Search {
//!     fn bindings() -> &'static Bindings<Self> {
//!         static BINDINGS: OnceLock<Bindings<Search>> = OnceLock::new();
//!         BINDINGS.get_or_init(|| {
//!             Bindings::<Self>::new()
//!                 .field("query", "q,required", |s| &mut s.query)
//!                 .field("page", "page", |s| &mut s.page)
//!                 .field_with("mask", "mask", FieldOptions::new().base("16"), |s| &mut s.mask)
//!         })
//!     }
//! }
//!
//! assert_eq!(Search::bindings().len(), 3);
//! ```

use std::fmt;

use crate::{BindingDirective, FieldKind, FieldType, FieldValue};

/// Auxiliary per-field annotations read by specific decoders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Integer base (`base`). Defaults to 10; `0` infers it from a prefix.
    pub base: Option<String>,
    /// Time layout in chrono `strftime` syntax (`format`). Defaults to RFC 3339.
    pub format: Option<String>,
    /// Time zone name (`tz`), IANA identifier, `UTC` or `Local`.
    pub tz: Option<String>,
}

impl FieldOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the integer base annotation.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Sets the time format annotation.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the time zone annotation.
    #[must_use]
    pub fn tz(mut self, tz: impl Into<String>) -> Self {
        self.tz = Some(tz.into());
        self
    }
}

type Assign<T> = Box<dyn Fn(&mut T, FieldValue) -> bool + Send + Sync>;

/// One bindable field of a record.
pub struct FieldBinding<T> {
    name: &'static str,
    directive: BindingDirective,
    kind: FieldKind,
    options: FieldOptions,
    assign: Assign<T>,
}

impl<T> FieldBinding<T> {
    /// Returns the record's field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parsed binding annotation.
    #[must_use]
    pub fn directive(&self) -> &BindingDirective {
        &self.directive
    }

    /// Returns the effective kind of the field.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the auxiliary annotations.
    #[must_use]
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Writes a decoded value into the field.
    ///
    /// Returns `false` if the value does not match the field's kind.
    pub fn assign(&self, record: &mut T, value: FieldValue) -> bool {
        (self.assign)(record, value)
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("directive", &self.directive)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Ordered binding table for a record type.
pub struct Bindings<T> {
    fields: Vec<FieldBinding<T>>,
}

impl<T: 'static> Bindings<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field without auxiliary annotations.
    #[must_use]
    pub fn field<F>(self, name: &'static str, tag: &str, accessor: fn(&mut T) -> &mut F) -> Self
    where
        F: FieldType + 'static,
    {
        self.field_with(name, tag, FieldOptions::default(), accessor)
    }

    /// Adds a field with auxiliary annotations.
    #[must_use]
    pub fn field_with<F>(
        mut self,
        name: &'static str,
        tag: &str,
        options: FieldOptions,
        accessor: fn(&mut T) -> &mut F,
    ) -> Self
    where
        F: FieldType + 'static,
    {
        let assign: Assign<T> = Box::new(move |record, value| match F::from_value(value) {
            Some(value) => {
                *accessor(record) = value;
                true
            }
            None => false,
        });

        self.fields.push(FieldBinding {
            name,
            directive: BindingDirective::parse(tag),
            kind: F::KIND,
            options,
            assign,
        });
        self
    }
}

impl<T> Bindings<T> {
    /// Iterates the fields in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldBinding<T>> {
        self.fields.iter()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the table has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by its record field name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldBinding<T>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl<T: 'static> Default for Bindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Bindings<T> {
    type Item = &'a FieldBinding<T>;
    type IntoIter = std::slice::Iter<'a, FieldBinding<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<T> fmt::Debug for Bindings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.fields).finish()
    }
}

/// A record whose fields can be bound from request data.
///
/// The table is built once per type and reused for every bind call. Derive it
/// with `#[derive(FormBind)]`.
pub trait FormBind: Sized + 'static {
    /// Returns the record's binding table.
    fn bindings() -> &'static Bindings<Self>;
}
