use crate::handler::Middleware;
use crate::RouteError;
use std::collections::HashMap;

/// Middleware addressed by name, for route tables that are assembled from configuration.
///
/// Resolution happens when a route is registered, an unknown name fails right there with
/// [`RouteError::InvalidMiddleware`] instead of at request time.
#[derive(Debug, Default, Clone)]
pub struct MiddlewareRegistry {
    middlewares: HashMap<String, Middleware>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `middleware` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, middleware: Middleware) -> &mut Self {
        self.middlewares.insert(name.into(), middleware);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.middlewares.contains_key(name)
    }

    /// # Errors
    ///
    /// Returns [`RouteError::InvalidMiddleware`] if nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Middleware, RouteError> {
        self.middlewares.get(name).cloned().ok_or_else(|| RouteError::invalid_middleware(name))
    }

    /// Resolves every name, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidMiddleware`] for the first unknown name.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Middleware>, RouteError> {
        names.iter().map(|name| self.resolve(name.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::MiddlewareRegistry;
    use crate::{middleware_fn, Context, RouteError};
    use http::StatusCode;

    #[test]
    fn resolve_keeps_order() {
        let mut registry = MiddlewareRegistry::new();
        registry
            .register("teapot", middleware_fn(|ctx| ctx.set_status(StatusCode::IM_A_TEAPOT)))
            .register("deny", middleware_fn(|ctx| ctx.abort(StatusCode::FORBIDDEN)));

        let chain = registry.resolve_all(&["teapot", "deny"]).unwrap();
        assert_eq!(chain.len(), 2);

        let mut ctx = Context::new();
        chain[0].invoke(&mut ctx);
        assert_eq!(ctx.status(), StatusCode::IM_A_TEAPOT);
        chain[1].invoke(&mut ctx);
        assert_eq!(ctx.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unknown_name_is_invalid() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("auth", middleware_fn(|_ctx| {}));

        assert!(registry.contains("auth"));
        let result = registry.resolve_all(&["auth", "missing"]);
        assert!(matches!(result, Err(RouteError::InvalidMiddleware { name }) if name == "missing"));
    }
}
