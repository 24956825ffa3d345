// WebSocket change feed: pushes table-change notifications to
// observer UIs, which refetch the affected table on receipt.

use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::db::{ChangeEvent, Database};

/// Serialize a change notification for the wire. The payload is the
/// minimal refetch hint: which table changed and how.
pub fn encode_change(event: &ChangeEvent) -> Message {
    let payload = serde_json::json!({
        "table": event.table,
        "action": event.action,
    });
    Message::text(payload.to_string())
}

/// Run the change-feed server on `127.0.0.1:{port}`. Each subscriber
/// gets its own broadcast receiver, so a slow client never stalls the
/// others.
pub async fn run(port: u16, db: Arc<Database>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    let local_addr = listener.local_addr()?;
    info!("Change feed listening on {local_addr}");

    loop {
        let (stream, addr) = listener.accept().await?;
        let changes = db.subscribe_changes();
        tokio::spawn(serve_subscriber(stream, changes, addr.to_string()));
    }
}

async fn serve_subscriber(
    stream: TcpStream,
    changes: broadcast::Receiver<ChangeEvent>,
    addr: String,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {addr}: {e}");
            return;
        }
    };
    info!("Subscriber connected from {addr}");

    let (write, mut read) = ws_stream.split();
    let pump = tokio::spawn(pump_changes(changes, write, addr.clone()));

    // Subscribers only listen; inbound frames are drained so close
    // frames and connection drops are noticed.
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                info!("Subscriber {addr} sent close frame");
                break;
            }
            Err(e) => {
                warn!("WebSocket error from {addr}: {e}");
                break;
            }
            _ => {}
        }
    }

    pump.abort();
    info!("Subscriber {addr} disconnected");
}

/// Forward change notifications into a message sink until either side
/// goes away. Generic over the sink type so it can be tested without
/// opening TCP ports.
pub async fn pump_changes<Si>(
    mut changes: broadcast::Receiver<ChangeEvent>,
    mut sink: Si,
    addr: String,
) where
    Si: Sink<Message> + Unpin,
{
    loop {
        match changes.recv().await {
            Ok(event) => {
                if sink.send(encode_change(&event)).await.is_err() {
                    info!("Subscriber {addr} went away");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // The client missed notifications; it will catch up on
                // its next refetch.
                warn!("Subscriber {addr} lagged, skipped {skipped} notifications");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
