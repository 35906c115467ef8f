//! Handler and middleware function types.
//!
//! Both are shared, thread safe closures over a mutable [`Context`]. A middleware returns nothing and
//! signals failure by calling [`Context::abort`]; a handler may return an error, which the router never
//! inspects and the transport turns into its own fallback response.

use crate::Context;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// What a handler returns, `Ok(())` once the [`Context`] holds the response.
pub type HandlerResult = Result<(), BoxError>;

type HandlerFn = dyn Fn(&mut Context) -> HandlerResult + Send + Sync;
type MiddlewareFn = dyn Fn(&mut Context) + Send + Sync;

/// A route handler. Cloning is cheap, clones share the same function.
#[derive(Clone)]
pub struct Handler {
    f: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    #[inline]
    pub fn invoke(&self, ctx: &mut Context) -> HandlerResult {
        (self.f)(ctx)
    }

    /// Returns true if both handlers were cloned from the same registration.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

pub fn handler_fn<F>(f: F) -> Handler
where
    F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
{
    Handler::new(f)
}

/// A pre-handler hook, run in registration order before the handler.
#[derive(Clone)]
pub struct Middleware {
    f: Arc<MiddlewareFn>,
}

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    #[inline]
    pub fn invoke(&self, ctx: &mut Context) {
        (self.f)(ctx);
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Middleware::new(f)
}
