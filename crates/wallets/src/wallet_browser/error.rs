#[derive(Debug, thiserror::Error)]
pub enum BrowserWalletError {
    #[error("Failed to start the wallet server: {0}")]
    Io(#[from] std::io::Error),
    #[error("The wallet server is already running")]
    AlreadyRunning,
    #[error("The wallet server is not running")]
    NotRunning,
    #[error("The wallet server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
