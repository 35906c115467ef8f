//! Response encoder writing a complete `Response<Bytes>` as an HTTP/1.1 message.
//!
//! The status line is followed by `server` and `date` headers (unless the response already carries
//! them), the response headers in their order, a `content-length` when none is present, and the body.

use bytes::{BufMut, Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, DATE, SERVER};
use http::{HeaderValue, Response};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

pub const SERVER_NAME: &str = "MicroServe/1.0";

#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response<Bytes>> for ResponseEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: Response<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut parts, body) = item.into_parts();

        dst.reserve(INIT_HEADER_SIZE + body.len());
        write!(
            FastWrite(dst),
            "HTTP/1.1 {} {}\r\n",
            parts.status.as_str(),
            parts.status.canonical_reason().unwrap_or_default()
        )?;

        if !parts.headers.contains_key(SERVER) {
            put_header(dst, SERVER.as_str().as_bytes(), SERVER_NAME.as_bytes());
        }

        if !parts.headers.contains_key(DATE) {
            let mut date = faf_http_date::get_date_buff_no_key();
            faf_http_date::get_date_no_key(&mut date);
            put_header(dst, DATE.as_str().as_bytes(), &date);
        }

        if !parts.headers.contains_key(CONTENT_LENGTH) {
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        for (name, value) in &parts.headers {
            put_header(dst, name.as_ref(), value.as_bytes());
        }
        dst.put_slice(b"\r\n");
        dst.put_slice(&body);
        Ok(())
    }
}

fn put_header(dst: &mut BytesMut, name: &[u8], value: &[u8]) {
    dst.put_slice(name);
    dst.put_slice(b": ");
    dst.put_slice(value);
    dst.put_slice(b"\r\n");
}

/// Writes formatted text straight into the `BytesMut`, the space was reserved up front.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http::header::CONTENT_TYPE;

    fn encode(response: Response<Bytes>) -> String {
        let mut dst = BytesMut::new();
        ResponseEncoder::new().encode(response, &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn writes_status_headers_and_body() {
        let response = Response::builder()
            .status(StatusCode::CREATED)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, 17)
            .body(Bytes::from_static(br#"{"hello":"world"}"#))
            .unwrap();

        let encoded = encode(response);
        let (head, body) = encoded.split_once("\r\n\r\n").unwrap();

        assert!(head.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(head.contains("\r\nserver: MicroServe/1.0"));
        assert!(head.contains("\r\ndate: "));
        assert!(head.contains("\r\ncontent-type: application/json\r\ncontent-length: 17"));
        assert_eq!(body, r#"{"hello":"world"}"#);
    }

    #[test]
    fn adds_missing_content_length() {
        let encoded = encode(Response::builder().status(StatusCode::NOT_FOUND).body(Bytes::new()).unwrap());

        assert!(encoded.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(encoded.ends_with("content-length: 0\r\n\r\n"));
    }

    #[test]
    fn keeps_explicit_content_length() {
        // HEAD responses announce the length of a body they don't send
        let response = Response::builder().header(CONTENT_LENGTH, 42).body(Bytes::new()).unwrap();
        let encoded = encode(response);

        assert!(encoded.ends_with("content-length: 42\r\n\r\n"));
        assert_eq!(encoded.matches("content-length").count(), 1);
    }

    #[test]
    fn binary_body_passes_through() {
        let body = Bytes::from_static(&[0, 159, 146, 150]);
        let mut dst = BytesMut::new();
        ResponseEncoder::new().encode(Response::new(body.clone()), &mut dst).unwrap();

        assert!(dst.ends_with(&body));
    }
}
