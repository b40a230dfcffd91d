//! Binding annotation parsing.
//!
//! A field's annotation has the shape `key[,option]*`. The key names the form,
//! query or multipart entry to read from; the options toggle per-field
//! behaviour. Unknown options are ignored.

/// Key that marks a field as never bound.
pub const SKIP_KEY: &str = "-";

/// Option flags recognised in a binding annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFlags {
    /// Uploaded file content is base64 encoded (`base64`).
    pub base64: bool,
    /// A form value or file part must be present (`required`).
    pub required: bool,
}

/// Decoded form of a field's binding annotation.
///
/// # Example
///
/// ```rust
/// use formbind::BindingDirective;
///
/// let directive = BindingDirective::parse("avatar,base64,required");
/// assert_eq!(directive.key(), "avatar");
/// assert!(directive.flags().base64);
/// assert!(directive.flags().required);
///
/// assert!(BindingDirective::parse("-").is_skipped());
/// assert!(BindingDirective::parse("").is_skipped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDirective {
    key: String,
    flags: TagFlags,
}

impl BindingDirective {
    /// Parses an annotation string.
    ///
    /// The first comma-separated segment is the source key. Remaining
    /// segments are matched case-sensitively against `base64` and `required`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let mut segments = tag.split(',');
        let key = segments.next().unwrap_or_default().to_string();

        let mut flags = TagFlags::default();
        for option in segments {
            match option {
                "base64" => flags.base64 = true,
                "required" => flags.required = true,
                _ => {}
            }
        }

        Self { key, flags }
    }

    /// Returns the source key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the option flags.
    #[must_use]
    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    /// Returns `true` if the field must not be bound.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.key.is_empty() || self.key == SKIP_KEY
    }
}
