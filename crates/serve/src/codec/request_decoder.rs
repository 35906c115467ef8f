//! Request decoder turning raw bytes into [`RequestHead`]s.
//!
//! The head is parsed with `httparse`. Request bodies are never handed to handlers, so a body announced
//! by `Content-Length` is consumed and dropped before the next head is parsed. Chunked request bodies
//! are rejected.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: configurable, 8KB by default

use bytes::{Buf, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Version};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::error::ParseError;
use crate::request::RequestHead;

/// Maximum number of headers allowed in a request
pub const MAX_HEADER_NUM: usize = 64;

/// Default maximum size in bytes of the whole header section
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

#[derive(Debug)]
pub struct RequestDecoder {
    max_header_bytes: usize,
    /// body bytes of the previous request still waiting to be dropped
    remaining_body: u64,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::with_max_header_bytes(DEFAULT_MAX_HEADER_BYTES)
    }

    pub fn with_max_header_bytes(max_header_bytes: usize) -> Self {
        Self { max_header_bytes, remaining_body: 0 }
    }

    fn skip_body(&mut self, src: &mut BytesMut) {
        let skipped = usize::try_from(self.remaining_body).map_or(src.len(), |remaining| remaining.min(src.len()));
        src.advance(skipped);
        self.remaining_body -= skipped as u64;
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining_body > 0 {
            self.skip_body(src);
            if self.remaining_body > 0 {
                return Ok(None);
            }
        }

        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let parsed = req.parse(src).map_err(|e| match e {
            httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e),
        })?;

        let body_offset = match parsed {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(
                    src.len() <= self.max_header_bytes,
                    ParseError::too_large_header(src.len(), self.max_header_bytes)
                );
                return Ok(None);
            }
        };
        ensure!(body_offset <= self.max_header_bytes, ParseError::too_large_header(body_offset, self.max_header_bytes));

        let method = req.method.ok_or(ParseError::InvalidMethod)?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::InvalidMethod)?;
        let target = req.path.ok_or(ParseError::InvalidUri)?.to_owned();
        let version = match req.version {
            Some(0) => Version::HTTP_10,
            Some(1) => Version::HTTP_11,
            v => return Err(ParseError::InvalidVersion(v)),
        };

        let mut header_map = HeaderMap::with_capacity(req.headers.len());
        for header in req.headers.iter() {
            let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
            let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
            header_map.append(name, value);
        }

        let body_length = body_length(&header_map)?;
        trace!(header_size = body_offset, body_length, "parsed request head");

        src.advance(body_offset);
        self.remaining_body = body_length;
        self.skip_body(src);

        Ok(Some(RequestHead::new(method, target, version, header_map)))
    }
}

/// Length of the body that follows the head, 0 when no `Content-Length` is sent.
fn body_length(headers: &HeaderMap) -> Result<u64, ParseError> {
    if headers.contains_key(TRANSFER_ENCODING) {
        return Err(ParseError::invalid_body("transfer-encoding request bodies are not supported"));
    }

    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(0);
    };

    let value = value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;
    value.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {value} is not u64")))
}
