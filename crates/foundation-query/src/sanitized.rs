//! Sanitized value wrappers with marker kinds.
//!
//! Query fragments that originate from user input only reach the builder
//! as `Sanitized<K>`, and the only public way to obtain one is through a
//! sanitizer in [`crate::sanitize`].

use std::fmt;
use std::marker::PhantomData;

/// Marker trait for sanitization kinds.
pub trait SanitizationKind: private::Sealed {}

mod private {
    pub trait Sealed {}
}

/// Marker for stream names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamName;
impl private::Sealed for StreamName {}
impl SanitizationKind for StreamName {}

/// Marker for trace ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId;
impl private::Sealed for TraceId {}
impl SanitizationKind for TraceId {}

/// Marker for log level names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelName;
impl private::Sealed for LevelName {}
impl SanitizationKind for LevelName {}

/// Marker for service names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceName;
impl private::Sealed for ServiceName {}
impl SanitizationKind for ServiceName {}

/// A string that passed the sanitizer for kind `K`.
///
/// ```
/// use foundation_query::sanitize_stream_name;
///
/// let stream = sanitize_stream_name("app_logs")?;
/// assert_eq!(stream.as_str(), "app_logs");
/// # Ok::<(), foundation_query::QueryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sanitized<K: SanitizationKind> {
    value: String,
    _marker: PhantomData<K>,
}

impl<K: SanitizationKind> Sanitized<K> {
    pub(crate) fn new(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the sanitized string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consume the wrapper and return the inner value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl<K: SanitizationKind> AsRef<str> for Sanitized<K> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<K: SanitizationKind> fmt::Display for Sanitized<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A result-size cap that passed [`crate::sanitize::sanitize_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultSize(u32);

impl ResultSize {
    pub(crate) const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the inner value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResultSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
