//! An asynchronous HTTP/1.1 transport for [`micro_route`].
//!
//! This crate owns everything the router deliberately leaves out: the listening socket, request
//! parsing, response writing, logging setup and the ctrl-c lifecycle. Per request it decodes the
//! method and target, hands them to [`dispatch`], and writes the rendered [`Context`](micro_route::Context)
//! back.
//!
//! # Example
//!
//! ```no_run
//! use micro_route::{handler_fn, Router};
//! use micro_route_serve::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut router = Router::new();
//!     router.get(
//!         "/",
//!         handler_fn(|ctx| {
//!             ctx.json(&serde_json::json!({ "hello": "world" }))?;
//!             Ok(())
//!         }),
//!         vec![],
//!     );
//!
//!     Server::builder().router(router).address("127.0.0.1:8080").build().unwrap().start().await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: `tokio_util` decoder and encoder for HTTP/1.1 messages
//! - [`HttpConnection`]: the request loop of one connection
//! - [`dispatch`]: routing outcome to HTTP response
//! - [`Server`] / [`ServerConfig`]: socket, config and lifecycle
//!
//! # Limitations
//!
//! - Request bodies are read past but never exposed, chunked request bodies are rejected
//! - Responses are always sent with a `Content-Length`, never chunked
//! - No TLS (use a reverse proxy for HTTPS)

pub mod codec;

mod config;
mod connection;
mod dispatch;
mod error;
mod request;
mod server;
mod utils;

pub(crate) use utils::ensure;

pub use config::ServerConfig;
pub use config::DEFAULT_ADDRESS;
pub use connection::HttpConnection;
pub use dispatch::dispatch;
pub use error::ParseError;
pub use error::ServeError;
pub use request::RequestHead;
pub use server::Server;
pub use server::ServerBuilder;
