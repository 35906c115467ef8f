//! The [`Router`]: route registration and request matching.
//!
//! Routes are registered with one method per HTTP verb:
//!
//! ```
//! use http::{Method, StatusCode};
//! use micro_route::{handler_fn, middleware_fn, MatchOutcome, Router};
//!
//! let mut router = Router::new();
//! router.get(
//!     "/user/:name",
//!     handler_fn(|ctx| {
//!         let name = ctx.path_variable("name")?.to_owned();
//!         ctx.text(format!("hello {name}"));
//!         Ok(())
//!     }),
//!     vec![middleware_fn(|ctx| ctx.set_status(StatusCode::ACCEPTED))],
//! );
//!
//! let (outcome, mut ctx) = router.match_route(&Method::GET, "/user/alice").into_parts();
//! match outcome {
//!     MatchOutcome::Success(handler) => handler.invoke(&mut ctx).unwrap(),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert_eq!(ctx.body().as_bytes(), b"hello alice");
//! ```
//!
//! Matching classifies the request and runs the middleware chain, it never invokes the handler: the
//! caller decides when and how to do that.

use crate::handler::{Handler, Middleware};
use crate::registry::MiddlewareRegistry;
use crate::trie::RouteTrie;
use crate::{Context, RouteError};
use http::{Method, StatusCode};
use tracing::{debug, trace};

/// How a request was classified by [`Router::match_route`].
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// Every middleware ran without aborting, the handler is ready to be invoked.
    Success(Handler),
    /// No literal or variable child matched a segment.
    NotFound,
    /// The path matched but nothing is registered for the method.
    MethodNotAllowed,
    /// A middleware aborted the request with this status.
    Aborted(StatusCode),
}

/// A [`MatchOutcome`] together with the [`Context`] built while producing it.
#[derive(Debug)]
pub struct RouteMatch {
    outcome: MatchOutcome,
    context: Context,
}

impl RouteMatch {
    fn new(outcome: MatchOutcome, context: Context) -> Self {
        Self { outcome, context }
    }

    pub fn outcome(&self) -> &MatchOutcome {
        &self.outcome
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Success(_))
    }

    pub fn into_parts(self) -> (MatchOutcome, Context) {
        (self.outcome, self.context)
    }
}

/// Maps `(method, path)` to a handler through a segment trie.
///
/// The router is built up front and only read afterwards; it holds no locks, so registering while other
/// threads match is the caller's problem. Handing the router over by value (or behind an `Arc`) rules
/// that out.
#[derive(Debug)]
pub struct Router {
    trie: RouteTrie,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_route {
    ($name:ident, $method:ident) => {
        #[doc = concat!("Registers `handler` and its middleware chain for `", stringify!($method), " path`.")]
        pub fn $name(&mut self, path: &str, handler: Handler, middlewares: Vec<Middleware>) -> &mut Self {
            self.add_route(Method::$method, path, handler, middlewares)
        }
    };
}

impl Router {
    pub fn new() -> Self {
        Self { trie: RouteTrie::new() }
    }

    method_route!(get, GET);
    method_route!(post, POST);
    method_route!(head, HEAD);
    method_route!(put, PUT);
    method_route!(patch, PATCH);
    method_route!(delete, DELETE);
    method_route!(options, OPTIONS);

    /// Registers a route for any method. Registering the same `(method, path)` again replaces both the
    /// handler and the middleware chain.
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        let middleware_count = middlewares.len();
        self.trie.insert(method.clone(), path, handler, middlewares);
        debug!(%method, path, middleware_count, nodes = self.trie.len(), "route registered");
        self
    }

    /// Registers a route whose middleware chain is looked up by name in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidMiddleware`] if a name is unknown; nothing is registered then.
    pub fn add_named_route<S: AsRef<str>>(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        middleware_names: &[S],
        registry: &MiddlewareRegistry,
    ) -> Result<&mut Self, RouteError> {
        let middlewares = registry.resolve_all(middleware_names)?;
        Ok(self.add_route(method, path, handler, middlewares))
    }

    /// Matches `path` for `method` and runs the middleware chain of the matched route.
    ///
    /// `path` is matched as is, a query string is not stripped. The returned [`RouteMatch`] always
    /// carries the context, also for the failed outcomes.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch {
        let mut ctx = Context::new();

        let Some(node_id) = self.trie.find(path, &mut ctx) else {
            trace!(%method, path, "no route found");
            return RouteMatch::new(MatchOutcome::NotFound, ctx);
        };

        let node = self.trie.node(node_id);
        let Some(handler) = node.handler(method) else {
            trace!(%method, path, segment = ?node.segment(), "method not allowed");
            return RouteMatch::new(MatchOutcome::MethodNotAllowed, ctx);
        };

        for (index, middleware) in node.middlewares(method).iter().enumerate() {
            middleware.invoke(&mut ctx);
            if ctx.is_aborted() {
                let status = ctx.status();
                trace!(%method, path, index, %status, "aborted by middleware");
                return RouteMatch::new(MatchOutcome::Aborted(status), ctx);
            }
        }

        trace!(%method, path, segment = ?node.segment(), "route matched");
        RouteMatch::new(MatchOutcome::Success(handler.clone()), ctx)
    }
}
