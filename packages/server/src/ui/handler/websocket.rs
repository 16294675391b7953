//! WebSocket connection handlers.
//!
//! 1 接続につき 3 つのタスクが動く。
//!
//! - 読み込みループ（upgrade 後の future 上で実行）
//! - 書き込みタスク（送信キューをソケットへ流す）
//! - ハートビート
//!
//! 3 つは同じ `CancellationToken`（ハブのルートトークンの子）を共有する。

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use confab_shared::time::to_rfc3339;

use crate::{
    domain::{ConnectionHandle, PushFrame, UserId},
    ui::{heartbeat::run_heartbeat, state::AppState},
    usecase::FrameDispatcher,
};

use super::{
    auth::{TokenQuery, authenticate, extract_credentials},
    http::error_response,
};

/// Why a connection's read loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `read_timeout` 内にフレームを受信しなかった
    ReadTimeout,
    /// クライアントが close フレームを送信した
    ClientClosed,
    /// ストリームが終端に達した
    StreamEnded,
    /// 受信エラー
    TransportError(String),
    /// 書き込み側の失敗、またはハブのシャットダウン
    Cancelled,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
) -> Response {
    if state.is_shutting_down() {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Shutting down");
    }

    // 認証に失敗した場合は upgrade せず、状態も作らない
    let credentials = extract_credentials(&headers, query);
    let user_id = match authenticate(&state, &credentials).await {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };

    let tracker = state.tracker.clone();
    ws.on_upgrade(move |socket| tracker.track_future(handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let config = state.config.clone();
    let (sink, stream) = socket.split();
    let (tx, rx) = mpsc::channel(config.outbound_queue_capacity);
    let cancel = state.shutdown.child_token();
    let handle = ConnectionHandle::new(tx, cancel.clone());
    let connection_id = handle.id();

    let connected_at = state
        .connect_participant_usecase
        .execute(user_id.clone(), handle.clone())
        .await;
    tracing::info!(
        user_id = %user_id,
        connection_id = %connection_id,
        connected_at = %to_rfc3339(&connected_at),
        "Connection opened"
    );

    let writer = state.tracker.spawn(writer_loop(
        sink,
        rx,
        cancel.clone(),
        config.write_timeout,
        config.ping_timeout,
    ));
    let heartbeat = state.tracker.spawn(run_heartbeat(
        handle.clone(),
        config.ping_interval,
        config.ping_timeout,
    ));

    let reason = read_loop(
        stream,
        &state.frame_dispatcher,
        &user_id,
        &cancel,
        config.read_timeout,
    )
    .await;

    // Closing: 登録解除は一度だけ行われ、書き込みタスクとハートビートも停止する
    let removed = state
        .disconnect_participant_usecase
        .execute(&user_id, &handle)
        .await;
    let _ = writer.await;
    let _ = heartbeat.await;

    let remaining = state
        .disconnect_participant_usecase
        .count_remaining_connections(&user_id)
        .await;
    tracing::info!(
        user_id = %user_id,
        connection_id = %connection_id,
        reason = ?reason,
        removed,
        remaining,
        "Connection closed"
    );
}

/// Read frames until the connection has to close.
///
/// Any inbound frame, control frames included, restarts the `read_timeout`.
/// Frames that fail to decode or fail to persist are dropped and the loop continues.
pub async fn read_loop<S, E>(
    mut stream: S,
    dispatcher: &FrameDispatcher,
    user_id: &UserId,
    cancel: &CancellationToken,
    read_timeout: Duration,
) -> CloseReason
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return CloseReason::Cancelled,
            next = tokio::time::timeout(read_timeout, stream.next()) => next,
        };

        let message = match next {
            Err(_) => {
                tracing::info!(user_id = %user_id, "Read timed out");
                return CloseReason::ReadTimeout;
            }
            Ok(None) => return CloseReason::StreamEnded,
            Ok(Some(Err(e))) => {
                tracing::warn!(user_id = %user_id, error = %e, "WebSocket receive error");
                return CloseReason::TransportError(e.to_string());
            }
            Ok(Some(Ok(message))) => message,
        };

        match message {
            // 協調者の呼び出しが止まってもキャンセルで抜けられるようにする
            Message::Text(text) => {
                tokio::select! {
                    _ = cancel.cancelled() => return CloseReason::Cancelled,
                    _ = dispatcher.dispatch_text(user_id, text.as_str()) => {}
                }
            }
            Message::Binary(bytes) => {
                tokio::select! {
                    _ = cancel.cancelled() => return CloseReason::Cancelled,
                    _ = dispatcher.dispatch_binary(user_id, &bytes) => {}
                }
            }
            Message::Ping(_) | Message::Pong(_) => {
                tracing::trace!(user_id = %user_id, "control frame received");
            }
            Message::Close(frame) => {
                tracing::debug!(user_id = %user_id, frame = ?frame, "Client requested close");
                return CloseReason::ClientClosed;
            }
        }
    }
}

/// Drain the outbound queue into the socket.
///
/// Each socket send is bounded (`write_timeout` for events, `ping_timeout` for
/// pings). A failed or timed-out send cancels the whole connection, and the
/// close frame is then skipped because the sink is no longer usable.
pub async fn writer_loop<W>(
    mut sink: W,
    mut rx: mpsc::Receiver<PushFrame>,
    cancel: CancellationToken,
    write_timeout: Duration,
    ping_timeout: Duration,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = rx.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };

        let (message, limit) = match frame {
            PushFrame::Text(text) => (Message::Text(text.to_string().into()), write_timeout),
            PushFrame::Ping => (Message::Ping(Bytes::new()), ping_timeout),
        };

        match tokio::time::timeout(limit, sink.send(message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "WebSocket send failed, closing connection");
                cancel.cancel();
                return;
            }
            Err(_) => {
                tracing::warn!("WebSocket send timed out, closing connection");
                cancel.cancel();
                return;
            }
        }
    }

    let _ = tokio::time::timeout(write_timeout, sink.send(Message::Close(None))).await;
}
