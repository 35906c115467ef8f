//! HTTP/1.1 framing for the transport.
//!
//! - [`RequestDecoder`]: bytes to [`RequestHead`](crate::RequestHead), dropping request bodies
//! - [`ResponseEncoder`]: `Response<Bytes>` to bytes
//!
//! Both plug into `tokio_util::codec::{FramedRead, FramedWrite}`.

mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use request_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use request_decoder::MAX_HEADER_NUM;
pub use response_encoder::ResponseEncoder;
pub use response_encoder::SERVER_NAME;
