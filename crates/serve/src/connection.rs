//! Per connection request loop.
//!
//! Requests are read with the [`RequestDecoder`], routed on tokio's blocking pool so that handlers are
//! free to block, and answered in order with the [`ResponseEncoder`].

use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::header::CONNECTION;
use http::{HeaderValue, Response, StatusCode};
use micro_route::Router;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, trace};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::dispatch::{dispatch, empty_response};
use crate::error::ServeError;
use crate::request::RequestHead;

/// An HTTP/1.1 connection serving the requests of one client with a shared [`Router`].
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_decoder(reader, writer, RequestDecoder::new())
    }

    pub fn with_decoder(reader: R, writer: W, decoder: RequestDecoder) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Serves requests until the client closes the connection or asks to close it.
    ///
    /// # Errors
    ///
    /// Malformed requests are answered with 400 and returned as [`ServeError::Parse`]; write failures
    /// are returned as [`ServeError::Io`].
    pub async fn process(mut self, router: Arc<Router>) -> Result<(), ServeError> {
        loop {
            match self.framed_read.next().await {
                Some(Ok(head)) => {
                    let keep_alive = head.keep_alive();
                    let mut response = route(Arc::clone(&router), head).await;
                    if !keep_alive {
                        response.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
                    }
                    self.framed_write.send(response).await?;

                    if !keep_alive {
                        trace!("connection close requested");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't receive next request");
                    let mut response = empty_response(StatusCode::BAD_REQUEST);
                    response.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
                    self.framed_write.send(response).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }
}

async fn route(router: Arc<Router>, head: RequestHead) -> Response<Bytes> {
    let routed = tokio::task::spawn_blocking(move || dispatch(&router, head.method(), head.target())).await;
    match routed {
        Ok(response) => response,
        Err(e) => {
            error!(cause = %e, "handler panicked");
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use micro_route::{handler_fn, middleware_fn};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn router() -> Arc<Router> {
        let mut router = Router::new();
        router
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
                "/post",
                handler_fn(|ctx| {
                    ctx.set_status(StatusCode::ACCEPTED);
                    ctx.raw_json(r#"{"hello": "world"}"#);
                    Ok(())
                }),
                vec![],
            )
            .get("/panic", handler_fn(|_ctx| panic!("handler blew up")), vec![])
            .delete(
                "/admin",
                handler_fn(|_ctx| Ok(())),
                vec![middleware_fn(|ctx| ctx.abort(StatusCode::UNAUTHORIZED))],
            );
        Arc::new(router)
    }

    async fn exchange(request: &str) -> (String, Result<(), ServeError>) {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(router()));

        client.write_all(request.as_bytes()).await.unwrap();
        client.shutdown().await.unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        (response, task.await.unwrap())
    }

    #[tokio::test]
    async fn routes_request() {
        let (response, result) = exchange(indoc! {"
            GET /user/alice?x=1 HTTP/1.1
            Host: 127.0.0.1:8080
            Connection: close

        "})
        .await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("content-type: application/json\r\n"));
        assert!(response.contains("connection: close\r\n"));
        assert!(response.ends_with("\r\n\r\n{\"name\":\"alice\"}"));
    }

    #[tokio::test]
    async fn keep_alive_serves_requests_in_order() {
        let request = concat!(
            "POST /post HTTP/1.1\r\nContent-Length: 4\r\n\r\nbody",
            "GET /nope HTTP/1.1\r\n\r\n",
            "DELETE /admin HTTP/1.1\r\n\r\n",
        );
        let (response, result) = exchange(request).await;

        assert!(result.is_ok());
        let statuses = response.split("HTTP/1.1 ").skip(1).map(|message| &message[..3]).collect::<Vec<_>>();
        assert_eq!(statuses, vec!["202", "404", "401"]);
        assert!(!response.contains("connection: close"));
        assert!(response.contains(r#"{"hello": "world"}"#));
    }

    #[tokio::test]
    async fn panicking_handler_is_internal_server_error() {
        let (response, result) = exchange("GET /panic HTTP/1.1\r\nConnection: close\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[tokio::test]
    async fn malformed_request_is_bad_request() {
        let (response, result) = exchange("GET /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n").await;

        assert!(matches!(result, Err(ServeError::Parse { .. })));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("connection: close\r\n"));
    }

    #[tokio::test]
    async fn http_1_0_response_announces_close() {
        let (response, result) = exchange("GET /user/bob HTTP/1.0\r\n\r\nGET /user/eve HTTP/1.0\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.contains("connection: close\r\n"));
        assert!(response.ends_with("{\"name\":\"bob\"}"));
    }
}
