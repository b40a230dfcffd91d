//! Request context consumed by the binder.
//!
//! [`RequestContext`] carries the parts of an HTTP request that binding reads:
//! method, URI (for the query string), headers and the buffered body.

use bytes::Bytes;
use http::{header, HeaderMap, Method, Uri};

/// The parts of an HTTP request that binding reads.
///
/// # Example
///
/// ```rust
/// use formbind::RequestContext;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let ctx = RequestContext::new(
///     Method::GET,
///     Uri::from_static("/users?id=123"),
///     HeaderMap::new(),
///     Bytes::new(),
/// );
///
/// assert_eq!(ctx.method(), &Method::GET);
/// assert_eq!(ctx.query_string(), Some("id=123"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestContext {
    /// Creates a new request context.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Builds a context from an [`http::Request`] with a buffered body.
    #[must_use]
    pub fn from_request(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body)
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::new()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    ///
    /// A header that is not valid visible ASCII is returned as `Some("")` so
    /// that it is reported as unparseable rather than absent.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or_default())
    }
}

/// Builder for constructing a [`RequestContext`].
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method. Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. Defaults to `/`.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a single header. Invalid values are ignored.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the request context.
    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
        }
    }
}
