//! `multipart/form-data` bodies for the import endpoint.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{BufMut, Bytes, BytesMut};

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// A plain text field. No `Content-Type` header is sent for it.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: Bytes::from(value.into()),
        }
    }

    /// A file field; the content type is guessed from the extension.
    #[must_use]
    pub fn file(name: impl Into<String>, filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename).to_string();
        Self {
            name: name.into(),
            filename: Some(filename),
            content_type: Some(content_type),
            data: data.into(),
        }
    }

    /// Replace the guessed content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Form field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Client-side file name, present for file fields only.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The `Content-Disposition` and optional `Content-Type` lines,
    /// terminated by the blank line that precedes the data.
    fn header_block(&self) -> String {
        let mut block = format!("Content-Disposition: form-data; name=\"{}\"", escape_quoted(&self.name));
        if let Some(filename) = &self.filename {
            block.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
        }
        block.push_str("\r\n");
        if let Some(content_type) = &self.content_type {
            block.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        block.push_str("\r\n");
        block
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "csv" => "text/csv",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// An ordered set of [`Part`]s sharing one boundary.
///
/// ```
/// use order_core::multipart::{Form, Part};
///
/// let (content_type, body) = Form::with_boundary("B")
///     .part(Part::text("note", "hi"))
///     .into_body();
/// assert_eq!(content_type, "multipart/form-data; boundary=B");
/// assert!(body.ends_with(b"--B--\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Form {
    parts: Vec<Part>,
    boundary: String,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// An empty form with a freshly generated boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// A form with a fixed boundary. It must not occur inside any part.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Append a part. Parts are encoded in insertion order.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// `(content-type header value, encoded body)`.
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        let content_type = self.content_type();
        (content_type, self.encode())
    }

    fn encode(&self) -> Bytes {
        let delimiter = format!("--{}", self.boundary);
        let mut buf = BytesMut::new();
        for part in &self.parts {
            let header = part.header_block();
            buf.reserve(delimiter.len() + header.len() + part.data.len() + 4);
            buf.put_slice(delimiter.as_bytes());
            buf.put_slice(b"\r\n");
            buf.put_slice(header.as_bytes());
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(delimiter.as_bytes());
        buf.put_slice(b"--\r\n");
        buf.freeze()
    }
}

// Quotes and line breaks would end the header value early.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn generate_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("----OrderFormBoundary{nanos:x}")
}
