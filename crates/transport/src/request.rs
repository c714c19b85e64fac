//! Transport-neutral request and response values.

/// HTTP method of a [`RequestSpec`]. Only the two the backends use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// No body.
    Get,
    /// JSON body.
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully built request, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Name of the operation, for logging only.
    pub operation: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    /// Extra headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body; `None` for GET.
    pub body: Option<String>,
}

impl RequestSpec {
    /// A GET request with no extra headers.
    pub fn get(operation: &'static str, url: impl Into<String>) -> Self {
        Self {
            operation,
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request carrying `body`.
    pub fn post(operation: &'static str, url: impl Into<String>, body: String) -> Self {
        Self {
            operation,
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the first value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The URL without its query string. Query strings may carry auth
    /// artifacts and must not be logged.
    pub fn loggable_url(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// A response as received, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, in wire order. Repeated headers appear repeatedly.
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 text.
    pub body: String,
}

impl RawResponse {
    /// A response with the given status and body and no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// All values of header `name` (case-insensitive), in wire order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` for a redirect status. On an authenticated backend call
    /// a redirect means the session has expired.
    pub fn is_redirect(&self) -> bool {
        (300..=302).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loggable_url_drops_the_query() {
        let spec = RequestSpec::get("login", "http://host/_ah/login?auth=secret");
        assert_eq!(spec.loggable_url(), "http://host/_ah/login");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = RawResponse::new(302, "")
            .with_header("Set-Cookie", "a=1")
            .with_header("set-cookie", "b=2");
        let values: Vec<_> = response.header_values("SET-COOKIE").collect();
        assert_eq!(values, ["a=1", "b=2"]);
        assert!(response.is_redirect());
    }
}
