//! HTTP exchange types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `ContestClient` builds
//! `HttpRequest` values and parses `Exchange` values without touching the
//! network; `Api` is the only place that performs I/O. An `Exchange` is
//! either a response (any status) or a transport failure, so the problem
//! mapper sees every way a round-trip can end.

/// HTTP method for a request. The backend contract only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request body. Every body the backend accepts is form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Form(Vec<(String, String)>),
}

impl Body {
    /// Value of a form field, if this is a form body carrying it.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match self {
            Body::Form(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ContestClient::build_*` methods and executed by `Api`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Response with the given status, no headers and the given body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Why a request never produced a usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The host could not be reached.
    Connect,
    /// The configured request timeout elapsed.
    Timeout,
    /// The response arrived but its body could not be read or decoded.
    Decode,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of executing one `HttpRequest`.
#[derive(Debug, Clone)]
pub enum Exchange {
    Response(HttpResponse),
    Failed(TransportError),
}

impl From<HttpResponse> for Exchange {
    fn from(response: HttpResponse) -> Self {
        Exchange::Response(response)
    }
}

impl From<TransportError> for Exchange {
    fn from(error: TransportError) -> Self {
        Exchange::Failed(error)
    }
}
