//! Responses produced by handlers.

use hyper::StatusCode;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A response on its way back through the handler chain.
///
/// Headers keep insertion order and may repeat (`Set-Cookie`); name
/// comparisons ignore case. Middleware can rewrite any field after
/// `ctx.next()` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// An empty response with `status`.
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub const fn ok() -> Self {
        Self::new(200)
    }

    /// A plain-text response whose body is the reason phrase, e.g.
    /// `404 Not Found`.
    pub fn status_only(status: u16) -> Self {
        let reason = reason_phrase(status);
        Self::new(status).content_type(TEXT_PLAIN).body(reason)
    }

    pub fn text(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::ok().content_type(TEXT_PLAIN).body(body)
    }

    pub fn html(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::ok().content_type("text/html; charset=utf-8").body(body)
    }

    /// Serializes `data`; a value that cannot be serialized becomes a 500.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        serde_json::to_vec(data).map_or_else(
            |_| Self::status_only(500),
            |body| Self::ok().content_type("application/json").body(body),
        )
    }

    /// `302 Found` pointing at `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).header("Location", location)
    }

    pub fn not_found() -> Self {
        Self::status_only(404)
    }

    /// Sets `name`, replacing any earlier value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Adds another value for `name`, keeping earlier ones.
    #[must_use]
    pub fn append_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn content_type(self, value: impl Into<String>) -> Self {
        self.header("Content-Type", value)
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of `name`.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `name`, in insertion order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body as UTF-8, if it is.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    pub fn status_text(&self) -> &'static str {
        reason_phrase(self.status)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}
