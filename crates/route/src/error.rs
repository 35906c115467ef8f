use std::io;
use thiserror::Error;

/// Errors raised while registering routes or while building a response on a [`Context`](crate::Context).
///
/// Routing failures (404, 405, aborted middleware) are not errors, see [`MatchOutcome`](crate::MatchOutcome).
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("middleware `{name}` is not registered")]
    InvalidMiddleware { name: String },

    #[error("path variable `{name}` is not bound")]
    VariableNotBound { name: String },

    #[error("can't read resource {path}: {source}")]
    ResourceNotFound {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid header value for {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("json serialize error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl RouteError {
    pub fn invalid_middleware<S: ToString>(name: S) -> Self {
        Self::InvalidMiddleware { name: name.to_string() }
    }

    pub fn variable_not_bound<S: ToString>(name: S) -> Self {
        Self::VariableNotBound { name: name.to_string() }
    }

    pub fn resource_not_found<S: ToString>(path: S, source: io::Error) -> Self {
        Self::ResourceNotFound { path: path.to_string(), source }
    }

    pub fn invalid_header<N: ToString, R: ToString>(name: N, reason: R) -> Self {
        Self::InvalidHeader { name: name.to_string(), reason: reason.to_string() }
    }
}
