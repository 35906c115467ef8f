use std::future::Future;
use std::sync::Arc;

use micro_route::Router;
use tokio::net::TcpListener;
use tokio::select;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::codec::RequestDecoder;
use crate::config::ServerConfig;
use crate::connection::HttpConnection;
use crate::error::ServeError;

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    config: ServerConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, config: ServerConfig::default() }
    }

    /// Takes ownership of the router, routes can't change once the server is built.
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    ///
    /// Returns [`ServeError::MissingRouter`] if no router was set.
    pub fn build(self) -> Result<Server, ServeError> {
        let router = self.router.ok_or(ServeError::MissingRouter)?;
        Ok(Server { router: Arc::new(router), config: self.config })
    }
}

/// Owns the listening socket and the process wide concerns (logging, ctrl-c) around a [`Router`].
#[derive(Debug)]
pub struct Server {
    router: Arc<Router>,
    config: ServerConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Installs the log subscriber, binds the configured address and serves until ctrl-c.
    ///
    /// # Errors
    ///
    /// Returns an error if the log level is invalid or the address can't be bound.
    pub async fn start(self) -> Result<(), ServeError> {
        let subscriber = FmtSubscriber::builder().with_max_level(self.config.level()?).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            warn!(cause = %e, "log subscriber already installed, keep using it");
        }

        info!(address = %self.config.address, "start listening");
        let tcp_listener = TcpListener::bind(self.config.address.as_str()).await.inspect_err(|e| {
            error!(cause = %e, "bind server error");
        })?;

        self.serve(tcp_listener, shutdown_signal()).await
    }

    /// Accepts connections on `tcp_listener` until `shutdown` completes. Connections already accepted
    /// keep running in their own task.
    ///
    /// # Errors
    ///
    /// Accept failures are logged and skipped, this only returns `Ok` today.
    pub async fn serve<F>(self, tcp_listener: TcpListener, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (tcp_stream, remote_addr) = select! {
                () = &mut shutdown => {
                    info!("shutdown signal received, stop accepting");
                    return Ok(());
                }
                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let router = Arc::clone(&self.router);
            let decoder = RequestDecoder::with_max_header_bytes(self.config.max_header_bytes);

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_decoder(reader, writer, decoder);
                match connection.process(router).await {
                    Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "can't listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
}
