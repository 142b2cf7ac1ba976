use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::wallet_browser::{
    error::BrowserWalletError, provider::BrowserWalletProvider, router::build_router,
    state::BrowserWalletState, types::Connection,
};

/// Local HTTP server hosting the wallet bridge page.
#[derive(Debug)]
pub struct BrowserWalletServer {
    port: u16,
    timeout: Duration,
    state: Arc<BrowserWalletState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BrowserWalletServer {
    /// Creates a stopped server. Port `0` binds an ephemeral port on [`start`](Self::start).
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            state: Arc::new(BrowserWalletState::new()),
            shutdown: None,
            handle: None,
        }
    }

    /// The bound port once started, the configured one before.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session_token(&self) -> Arc<String> {
        self.state.session_token()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn get_connection(&self) -> Option<Connection> {
        self.is_connected().then(|| self.state.get_connection())
    }

    /// Returns a wallet provider driven by this server's page.
    pub fn provider(&self) -> BrowserWalletProvider {
        BrowserWalletProvider::new(self.state.clone(), self.timeout)
    }

    pub async fn start(&mut self) -> Result<(), BrowserWalletError> {
        if self.is_running() {
            return Err(BrowserWalletError::AlreadyRunning);
        }

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], self.port))).await?;
        self.port = listener.local_addr()?.port();

        let router = build_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                error!(%err, "wallet server failed");
            }
        });

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);
        info!(url = %self.url(), "wallet server listening");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), BrowserWalletError> {
        let (Some(shutdown), Some(handle)) = (self.shutdown.take(), self.handle.take()) else {
            return Err(BrowserWalletError::NotRunning);
        };
        let _ = shutdown.send(());
        handle.await?;
        debug!(port = self.port, "wallet server stopped");
        Ok(())
    }
}
