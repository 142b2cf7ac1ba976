use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse},
};

use crate::wallet_browser::{
    app::contents,
    state::BrowserWalletState,
    types::{
        BrowserApiResponse, BrowserTransaction, ConnectionUpdate, TransactionResponse,
        WalletDetection,
    },
};

pub(crate) async fn serve_index(
    State(state): State<Arc<BrowserWalletState>>,
) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    let page = contents::INDEX_HTML.replace(contents::TOKEN_PLACEHOLDER, &state.session_token());
    (headers, Html(page))
}

pub(crate) async fn post_wallet_detection(
    State(state): State<Arc<BrowserWalletState>>,
    Json(detection): Json<WalletDetection>,
) -> Json<BrowserApiResponse> {
    debug!(detected = detection.detected, "wallet detection reported");
    state.set_wallet_detected(detection.detected);
    Json(BrowserApiResponse::Ok(()))
}

pub(crate) async fn get_accounts_request(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse> {
    if state.has_accounts_request() {
        Json(BrowserApiResponse::Ok(()))
    } else {
        Json(BrowserApiResponse::error("No pending accounts request"))
    }
}

pub(crate) async fn post_connection_update(
    State(state): State<Arc<BrowserWalletState>>,
    Json(update): Json<ConnectionUpdate>,
) -> Json<BrowserApiResponse> {
    trace!(?update, "connection update");
    state.update_connection(update);
    Json(BrowserApiResponse::Ok(()))
}

pub(crate) async fn get_next_transaction_request(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse<BrowserTransaction>> {
    match state.read_next_transaction_request() {
        Some(transaction) => Json(BrowserApiResponse::Ok(transaction)),
        None => Json(BrowserApiResponse::error("No pending transaction")),
    }
}

pub(crate) async fn post_transaction_response(
    State(state): State<Arc<BrowserWalletState>>,
    Json(response): Json<TransactionResponse>,
) -> Json<BrowserApiResponse> {
    let id = response.id;
    if state.add_transaction_response(response) {
        Json(BrowserApiResponse::Ok(()))
    } else {
        warn!(%id, "response for unknown transaction");
        Json(BrowserApiResponse::error("Unknown transaction id"))
    }
}
