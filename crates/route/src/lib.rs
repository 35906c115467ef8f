//! A minimal trie based HTTP request router.
//!
//! `micro-route` maps an inbound `(method, path)` pair to a registered [`Handler`]. Route patterns are
//! `/`-separated segments; a segment written as `:name` captures whatever the request has at that
//! position, every other segment matches literally and case-sensitively. There is no normalization:
//! `/post` and `/post/` are different routes.
//!
//! Each route carries, per method, an ordered chain of [`Middleware`]. Matching a request runs that chain
//! on a fresh [`Context`]; a middleware may call [`Context::abort`] to stop the chain before the handler
//! runs.
//!
//! # Example
//!
//! ```
//! use http::{Method, StatusCode};
//! use micro_route::{handler_fn, middleware_fn, MatchOutcome, Router};
//!
//! let mut router = Router::new();
//! router.get(
//!     "/admin",
//!     handler_fn(|ctx| {
//!         ctx.text("welcome");
//!         Ok(())
//!     }),
//!     vec![middleware_fn(|ctx| ctx.abort(StatusCode::UNAUTHORIZED))],
//! );
//!
//! let route_match = router.match_route(&Method::GET, "/admin");
//! assert!(matches!(route_match.outcome(), MatchOutcome::Aborted(status) if *status == StatusCode::UNAUTHORIZED));
//!
//! let route_match = router.match_route(&Method::POST, "/admin");
//! assert!(matches!(route_match.outcome(), MatchOutcome::MethodNotAllowed));
//! ```
//!
//! # Architecture
//!
//! - [`Router`]: registration and matching, returns a [`RouteMatch`]
//! - [`Context`]: path variables plus the response under construction
//! - [`MiddlewareRegistry`]: middleware looked up by name at registration time
//! - [`RouteError`]: registration and response building errors
//!
//! The router does no I/O besides the file reads of [`Context::html`] and [`Context::file`]; serving
//! requests is left to a transport such as `micro-route-serve`.

mod body;
mod context;
mod error;
mod handler;
mod registry;
mod router;
mod trie;

pub use body::ResponseBody;
pub use context::Context;
pub use error::RouteError;
pub use handler::handler_fn;
pub use handler::middleware_fn;
pub use handler::BoxError;
pub use handler::Handler;
pub use handler::HandlerResult;
pub use handler::Middleware;
pub use registry::MiddlewareRegistry;
pub use router::MatchOutcome;
pub use router::RouteMatch;
pub use router::Router;
pub use trie::VARIABLE_MARKER;
