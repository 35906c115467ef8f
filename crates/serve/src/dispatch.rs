//! Turns a routed request into a wire response.
//!
//! | outcome              | response                                            |
//! |----------------------|-----------------------------------------------------|
//! | `NotFound`           | 404, empty body                                     |
//! | `MethodNotAllowed`   | 405, empty body                                     |
//! | `Aborted(status)`    | `status` with the headers and body middleware set   |
//! | `Success(handler)`   | handler runs, then the context is rendered          |
//!
//! A handler error becomes an empty 500. Responses to `HEAD` keep their headers but drop the body.

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderValue, Method, Response, StatusCode};
use micro_route::{Context, MatchOutcome, Router};
use tracing::{debug, error};

/// Routes `target` (the raw request target, query string included) and builds the response.
///
/// The query string is cut off before matching, the router only ever sees the path. Handlers run on the
/// calling thread and may block.
pub fn dispatch(router: &Router, method: &Method, target: &str) -> Response<Bytes> {
    let path = strip_query(target);
    let (outcome, mut ctx) = router.match_route(method, path).into_parts();

    let response = match outcome {
        MatchOutcome::NotFound => {
            debug!(%method, path, "no route found");
            empty_response(StatusCode::NOT_FOUND)
        }
        MatchOutcome::MethodNotAllowed => {
            debug!(%method, path, "method not allowed");
            empty_response(StatusCode::METHOD_NOT_ALLOWED)
        }
        MatchOutcome::Aborted(status) => {
            debug!(%method, path, %status, "request aborted by middleware");
            render(ctx)
        }
        MatchOutcome::Success(handler) => match handler.invoke(&mut ctx) {
            Ok(()) => render(ctx),
            Err(e) => {
                error!(%method, path, cause = %e, "handler failed");
                empty_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
    };

    if *method == Method::HEAD { without_body(response) } else { response }
}

pub(crate) fn strip_query(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _query)| path)
}

pub(crate) fn empty_response(status: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status;
    response
}

fn render(ctx: Context) -> Response<Bytes> {
    let (status, headers, body) = ctx.into_response_parts();
    let mut response = Response::new(body.into_bytes());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn without_body(response: Response<Bytes>) -> Response<Bytes> {
    let (mut parts, body) = response.into_parts();
    if !parts.headers.contains_key(CONTENT_LENGTH) {
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    Response::from_parts(parts, Bytes::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use micro_route::{handler_fn, middleware_fn};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn router() -> Router {
        let mut router = Router::new();
        router
            .get(
                "/",
                handler_fn(|ctx| {
                    ctx.set_status(StatusCode::CREATED);
                    ctx.json(&serde_json::json!({ "hello": "world" }))?;
                    Ok(())
                }),
                vec![],
            )
            .get(
                "/user/:name",
                handler_fn(|ctx| {
                    let name = ctx.path_variable("name")?.to_owned();
                    ctx.json(&serde_json::json!({ "name": name }))?;
                    Ok(())
                }),
                vec![],
            )
            .post(
                "/guarded",
                handler_fn(|ctx| {
                    ctx.text("secret");
                    Ok(())
                }),
                vec![middleware_fn(|ctx| {
                    ctx.text("denied");
                    ctx.abort(StatusCode::FORBIDDEN);
                })],
            )
            .get(
                "/broken",
                handler_fn(|ctx| {
                    ctx.html("/definitely/not/here.html")?;
                    Ok(())
                }),
                vec![],
            )
            .head(
                "/",
                handler_fn(|ctx| {
                    ctx.text("only the length is sent");
                    Ok(())
                }),
                vec![],
            );
        router
    }

    #[test]
    fn success_renders_context() {
        let response = dispatch(&router(), &Method::GET, "/");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "17");
        assert_eq!(response.body().as_ref(), br#"{"hello":"world"}"#);
    }

    #[test]
    fn query_string_is_ignored() {
        let response = dispatch(&router(), &Method::GET, "/user/alice?tab=posts&page=2");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#"{"name":"alice"}"#);
    }

    #[test]
    fn not_found_and_method_not_allowed_are_empty() {
        let router = router();

        let response = dispatch(&router, &Method::GET, "/missing");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.body().is_empty());
        assert!(response.headers().is_empty());

        let response = dispatch(&router, &Method::DELETE, "/user/alice");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.body().is_empty());
    }

    #[test]
    fn aborted_keeps_middleware_response() {
        let response = dispatch(&router(), &Method::POST, "/guarded");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body().as_ref(), b"denied");
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "6");
    }

    #[test]
    fn handler_error_is_internal_server_error() {
        let response = dispatch(&router(), &Method::GET, "/broken");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body().is_empty());
    }

    #[test]
    fn head_drops_body_keeps_length() {
        let response = dispatch(&router(), &Method::HEAD, "/");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "23");
    }

    #[test]
    fn abort_inside_handler_only_changes_status() {
        let mut router = Router::new();
        router.get(
            "/late",
            handler_fn(|ctx| {
                ctx.text("partial");
                ctx.abort(StatusCode::CONFLICT);
                Ok(())
            }),
            vec![],
        );

        let response = dispatch(&router, &Method::GET, "/late");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.body().as_ref(), b"partial");
    }

    #[test]
    fn handler_is_not_run_when_aborted() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);

        let mut router = Router::new();
        router.get(
            "/",
            handler_fn(move |_ctx| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }),
            vec![middleware_fn(|ctx| ctx.abort(StatusCode::BAD_REQUEST))],
        );

        let response = dispatch(&router, &Method::GET, "/");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn strip_query_keeps_path_text() {
        assert_eq!(strip_query("/a/b?c=d"), "/a/b");
        assert_eq!(strip_query("/a/b/"), "/a/b/");
        assert_eq!(strip_query("/?"), "/");
        assert_eq!(strip_query("/%20x"), "/%20x");
    }
}
