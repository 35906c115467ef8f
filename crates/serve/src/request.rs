use http::header::CONNECTION;
use http::{HeaderMap, Method, Version};

/// The decoded head of a request: everything routing and connection handling need.
///
/// The request target is kept as sent, query string included.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    target: String,
    version: Version,
    headers: HeaderMap,
}

impl RequestHead {
    pub fn new(method: Method, target: impl Into<String>, version: Version, headers: HeaderMap) -> Self {
        Self { method, target: target.into(), version, headers }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw request target, e.g. `/user/alice?tab=posts`.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the connection stays open after this request: HTTP/1.1 unless `Connection: close`,
    /// HTTP/1.0 only with `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        let connection = self.headers.get(CONNECTION).map(|value| value.as_bytes());
        match self.version {
            Version::HTTP_10 => connection.is_some_and(|value| value.eq_ignore_ascii_case(b"keep-alive")),
            _ => !connection.is_some_and(|value| value.eq_ignore_ascii_case(b"close")),
        }
    }
}
