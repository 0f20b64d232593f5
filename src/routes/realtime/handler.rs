use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::AppState;

use super::model::ParticipantInserted;

pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<ParticipantInserted>) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to serialize participant event: {}", e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                // 落后只会延迟界面刷新，客户端每次都全量重拉
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("WebSocket subscriber lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_published_inserts() {
        let (tx, _) = broadcast::channel(16);
        let mut rx_a = tx.subscribe();
        let mut rx_b = tx.subscribe();

        let event = ParticipantInserted {
            short_id: "a1b2c3".into(),
            name: "小明".into(),
            is_creator: false,
        };
        tx.send(event.clone()).unwrap();

        assert_eq!(rx_a.recv().await.unwrap(), event);
        assert_eq!(rx_b.recv().await.unwrap(), event);
    }

    #[test]
    fn event_payload_is_plain_json() {
        let event = ParticipantInserted {
            short_id: "a1b2c3".into(),
            name: "小美".into(),
            is_creator: true,
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["short_id"], "a1b2c3");
        assert_eq!(json["is_creator"], true);
    }
}
