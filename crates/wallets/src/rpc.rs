use alloy_primitives::Bytes;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportError;
use async_trait::async_trait;
use dapp_session::{ChainClient, RpcError};

/// JSON-RPC error code used when the transport fails without an error response.
const INTERNAL_ERROR_CODE: i64 = -32603;

/// [`ChainClient`] reading contract state through `eth_call` on a node.
#[derive(Clone, Debug)]
pub struct RpcChainClient<P> {
    provider: P,
}

impl<P: Provider> RpcChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainClient for RpcChainClient<P> {
    async fn call(&self, request: TransactionRequest) -> Result<Bytes, RpcError> {
        trace!(to = ?request.to, "eth_call");
        self.provider.call(request).await.map_err(into_rpc_error)
    }
}

/// Keeps the node's error code, message and data when it answered with an error.
fn into_rpc_error(err: TransportError) -> RpcError {
    let Some(payload) = err.as_error_resp() else {
        return RpcError::new(INTERNAL_ERROR_CODE, err.to_string());
    };
    let error = RpcError::new(payload.code, payload.message.to_string());
    match payload.data.as_ref().and_then(|data| serde_json::from_str(data.get()).ok()) {
        Some(data) => error.with_data(data),
        None => error,
    }
}
