use crate::api::error::ApiError;
use crate::protocol::OutboundFrame;
use crate::relay::{MessageRelay, Session};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Admit `client_mrn` before upgrading so bad identifiers get an HTTP error
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(client_mrn): Path<String>,
    State(relay): State<Arc<MessageRelay>>,
) -> Response {
    match relay.open_session(&client_mrn) {
        Ok((session, outbound)) => {
            ws.on_upgrade(move |socket| handle_websocket(socket, session, outbound))
        }
        Err(e) => {
            tracing::warn!(%client_mrn, "Connection refused: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

async fn handle_websocket(
    socket: WebSocket,
    session: Session,
    mut outbound: mpsc::Receiver<OutboundFrame>,
) {
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sink.send(Message::Text(frame.to_json())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(msg) = stream.next().await {
        let reply = match msg {
            Ok(Message::Text(text)) => {
                tracing::debug!(identity = %session.identity(), "Frame received");
                session.handle_text(&text).await
            }
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => session.handle_text(&text).await,
                Err(_) => OutboundFrame::error("binary frames must be UTF-8 JSON"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(identity = %session.identity(), "WebSocket read error: {}", e);
                break;
            }
        };

        if !session.respond(reply).await {
            break;
        }
    }

    // Dropping the session unregisters it; the writer drains and ends once every sender is gone.
    drop(session);
    let _ = writer.await;
}
