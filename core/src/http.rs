//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `OrderClient` builds `HttpRequest`
//! values and classifies `HttpResponse` values without touching the network;
//! whoever executes the round-trip (a `Transport`, or the host application)
//! converts between these types and a real HTTP stack.
//!
//! Bodies are `Bytes` rather than `String` because the export endpoint
//! returns a binary spreadsheet and uploads are multipart.

use std::fmt;

use bytes::Bytes;

pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: the client's base URL, the endpoint path and any
/// query string.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub(crate) fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn post(url: String, content_type: &str, body: Bytes) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: vec![(CONTENT_TYPE.to_string(), content_type.to_string())],
            body: Some(body),
        }
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The success indicator: any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_indicator_covers_2xx_only() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(HttpResponse::new(299, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse::new(200, "").with_header("Content-Type", "text/csv");
        assert_eq!(response.header("content-type"), Some("text/csv"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn post_sets_content_type() {
        let req = HttpRequest::post("http://h/x".to_string(), APPLICATION_JSON, Bytes::from("{}"));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }
}
