use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::models::location::LocationRecord;
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    let updates = state.driver_events_tx.subscribe();

    info!("websocket client connected");
    forward_driver_updates(sender, receiver, updates).await;
    info!("websocket client disconnected");
}

/// Sends driver updates as JSON text frames until either side closes. The
/// other direction is aborted so the broadcast subscription is released.
async fn forward_driver_updates<S, R>(
    mut sender: S,
    mut receiver: R,
    updates: broadcast::Receiver<LocationRecord>,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    let mut updates = BroadcastStream::new(updates);

    let mut send_task = tokio::spawn(async move {
        while let Some(update) = updates.next().await {
            let record = match update {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, "websocket client lagging; driver updates dropped");
                    continue;
                }
            };

            let json = match serde_json::to_string(&record) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize driver location for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = (&mut recv_task).await;
        },
        _ = &mut recv_task => {
            send_task.abort();
            let _ = (&mut send_task).await;
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::extract::ws::Message;
    use futures::channel::mpsc;
    use futures::{stream, StreamExt};
    use tokio::sync::broadcast;

    use super::forward_driver_updates;
    use crate::models::location::{DriverStatus, LocationKind, LocationRecord};
    use crate::models::point::GeoPoint;

    fn driver_update() -> LocationRecord {
        let mut record =
            LocationRecord::new(LocationKind::Driver, "d-1", GeoPoint::new(52.52, 13.40));
        record.status = Some(DriverStatus::Available);
        record
    }

    #[tokio::test]
    async fn client_close_releases_subscription() {
        let (tx, _) = broadcast::channel::<LocationRecord>(8);
        let (sink, _frames) = mpsc::unbounded::<Message>();
        let closed = stream::empty::<Result<Message, axum::Error>>();

        forward_driver_updates(sink, closed, tx.subscribe()).await;

        assert_eq!(tx.receiver_count(), 0);
    }

    #[tokio::test]
    async fn updates_are_sent_as_json_text() {
        let (tx, _) = broadcast::channel::<LocationRecord>(8);
        let (sink, mut frames) = mpsc::unbounded::<Message>();
        let open = stream::pending::<Result<Message, axum::Error>>();

        let forward = tokio::spawn(forward_driver_updates(sink, open, tx.subscribe()));
        tx.send(driver_update()).unwrap();

        let frame = tokio::time::timeout(Duration::from_secs(1), frames.next())
            .await
            .unwrap()
            .unwrap();
        let Message::Text(text) = frame else {
            panic!("expected a text frame, got {frame:?}");
        };
        let record: LocationRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record.owner_id, "d-1");
        assert_eq!(record.status, Some(DriverStatus::Available));

        drop(frames);
        tx.send(driver_update()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), forward)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.receiver_count(), 0);
    }
}
