//! Response objects produced by [`render_response`](crate::render_response).

/// A rendered response: status, mimetype and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub mimetype: String,
    pub data: String,
}

/// Non-`text/*` mimetypes that still carry a charset.
const CHARSET_MIMETYPES: &[&str] = &[
    "application/ecmascript",
    "application/javascript",
    "application/json",
    "application/xml",
];

impl Response {
    /// Creates a `200 OK` response.
    pub fn new(data: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            status: 200,
            mimetype: mimetype.into(),
            data: data.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// The `Content-Type` header value.
    ///
    /// Textual mimetypes (`text/*`, `*+xml` and a few `application/*`
    /// types) get `; charset=utf-8` appended.
    pub fn content_type(&self) -> String {
        let textual = self.mimetype.starts_with("text/")
            || self.mimetype.ends_with("+xml")
            || CHARSET_MIMETYPES.contains(&self.mimetype.as_str());
        if textual {
            format!("{}; charset=utf-8", self.mimetype)
        } else {
            self.mimetype.clone()
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{header, HeaderValue, StatusCode};

        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = HeaderValue::from_str(&self.content_type())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        let mut response = self.data.into_response();
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
        response
    }
}
