// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP progress source.
//!
//! Sends a plain HTTP/1.1 `GET` per poll to a URL template such as
//! `http://backup-host:8000/api/vm-replications/replication-progress/{id}/`
//! and decodes the JSON body. Responses are framed by Content-Length or
//! chunked encoding, falling back to reading until the server closes.

use crate::progress::{ProgressError, ProgressSource};
use async_trait::async_trait;
use ot_core::ProgressReport;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Placeholder replaced by the operation id in a URL template.
pub const ID_PLACEHOLDER: &str = "{id}";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 512;

/// Largest response body read from a progress endpoint.
pub(crate) const MAX_BODY: usize = 1024 * 1024;

fn body_too_large() -> ProgressError {
    ProgressError::BodyTooLarge { limit: MAX_BODY }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) path_template: String,
}

impl Endpoint {
    pub(crate) fn parse(template: &str) -> Result<Self, ProgressError> {
        let Some(rest) = template.strip_prefix("http://") else {
            return Err(ProgressError::InvalidUrl(format!("{template}: only http:// is supported")));
        };
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        if authority.is_empty() {
            return Err(ProgressError::InvalidUrl(format!("{template}: missing host")));
        }
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ProgressError::InvalidUrl(format!("{template}: bad port")))?;
                (host, port)
            }
            None => (authority, 80),
        };
        if !path.contains(ID_PLACEHOLDER) {
            return Err(ProgressError::InvalidUrl(format!(
                "{template}: missing {ID_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { host: host.to_string(), port, path_template: path.to_string() })
    }

    pub(crate) fn path_for(&self, id: &str) -> String {
        self.path_template.replace(ID_PLACEHOLDER, &encode_segment(id))
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Progress source polling the backend's progress endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProgressSource {
    endpoint: Endpoint,
    token: Option<String>,
    timeout: Duration,
}

impl HttpProgressSource {
    /// Build a source from a URL template containing `{id}`.
    pub fn new(url_template: &str) -> Result<Self, ProgressError> {
        Ok(Self { endpoint: Endpoint::parse(url_template)?, token: None, timeout: DEFAULT_TIMEOUT })
    }

    /// Send `Authorization: Token <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Bound each request (connect + write + read).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request(&self, id: &str) -> String {
        let mut request = format!(
            "GET {} HTTP/1.1\r\nHost: {}:{}\r\nAccept: application/json\r\nConnection: close\r\n",
            self.endpoint.path_for(id),
            self.endpoint.host,
            self.endpoint.port
        );
        if let Some(token) = &self.token {
            request.push_str(&format!("Authorization: Token {token}\r\n"));
        }
        request.push_str("\r\n");
        request
    }

    async fn send(&self, request: &str) -> Result<(u16, String), ProgressError> {
        let mut stream = TcpStream::connect((self.endpoint.host.as_str(), self.endpoint.port))
            .await
            .map_err(|e| ProgressError::Transport(format!("connect failed: {e}")))?;
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| ProgressError::Transport(format!("write failed: {e}")))?;
        let mut reader = BufReader::new(&mut stream);
        read_http_response(&mut reader).await
    }
}

#[async_trait]
impl ProgressSource for HttpProgressSource {
    async fn fetch_progress(&self, id: &str) -> Result<ProgressReport, ProgressError> {
        let request = self.request(id);
        let (code, body) = tokio::time::timeout(self.timeout, self.send(&request))
            .await
            .map_err(|_| ProgressError::Timeout)??;

        if !(200..300).contains(&code) {
            return Err(ProgressError::Status { code, body: clip(body, MAX_ERROR_BODY) });
        }
        serde_json::from_str(&body).map_err(|e| ProgressError::Decode(e.to_string()))
    }
}

fn clip(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

/// Read an HTTP/1.1 response, returning the status code and body.
pub(crate) async fn read_http_response<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<(u16, String), ProgressError> {
    let read_err = |what: &str, e: std::io::Error| ProgressError::Transport(format!("{what}: {e}"));

    let mut status_line = String::new();
    reader.read_line(&mut status_line).await.map_err(|e| read_err("read status failed", e))?;
    let code = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ProgressError::Transport(format!("bad status line: {status_line:?}")))?;

    let mut content_length: Option<usize> = None;
    let mut chunked = false;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await.map_err(|e| read_err("read header failed", e))?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok();
        } else if name.eq_ignore_ascii_case("transfer-encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            chunked = true;
        }
    }

    let body = if chunked {
        read_chunked(reader).await?
    } else if let Some(len) = content_length {
        if len > MAX_BODY {
            return Err(body_too_large());
        }
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await.map_err(|e| read_err("read body failed", e))?;
        buf
    } else {
        let mut buf = Vec::new();
        let mut limited = (&mut *reader).take(MAX_BODY as u64 + 1);
        limited.read_to_end(&mut buf).await.map_err(|e| read_err("read body failed", e))?;
        if buf.len() > MAX_BODY {
            return Err(body_too_large());
        }
        buf
    };

    Ok((code, String::from_utf8_lossy(&body).into_owned()))
}

async fn read_chunked<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<Vec<u8>, ProgressError> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader
            .read_line(&mut size_line)
            .await
            .map_err(|e| ProgressError::Transport(format!("read chunk size failed: {e}")))?;
        let size_hex = size_line.trim().split(';').next().unwrap_or_default();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| ProgressError::Transport(format!("bad chunk size: {size_line:?}")))?;
        if size == 0 {
            break;
        }
        if body.len().checked_add(size).map_or(true, |total| total > MAX_BODY) {
            return Err(body_too_large());
        }
        // Chunk data is followed by CRLF
        let mut chunk = vec![0u8; size + 2];
        reader
            .read_exact(&mut chunk)
            .await
            .map_err(|e| ProgressError::Transport(format!("read chunk failed: {e}")))?;
        chunk.truncate(size);
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
