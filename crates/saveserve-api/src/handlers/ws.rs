//! WebSocket upgrade handler for the realtime push channel.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use saveserve_realtime::RealtimeHub;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the WS upgrade. Browsers cannot set an
/// Authorization header on a WebSocket handshake, so the access token
/// rides in the query string.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token=...
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let claims = state.jwt_decoder.decode_access_token(&params.token)?;
    state
        .session_manager
        .validate_session(claims.session_id())
        .await?;

    let user_id = claims.user_id();
    let hub = Arc::clone(&state.hub);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, user_id)))
}

async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>, user_id: Uuid) {
    let (connection_id, mut outbound) = hub.register(user_id);
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            if sender
                .send(Message::Text(msg.to_json().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Drain the inbound side so close frames and pings are processed; the
    // client has nothing meaningful to say on this channel.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unregister(user_id, connection_id);
    debug!(%user_id, "WebSocket closed");
}
