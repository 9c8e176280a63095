//! WebSocket bridge between the in-process Channel and the background
//! process.
//!
//! Outbound messages are serialized to JSON text frames; inbound text
//! frames are parsed and published on the Channel. Malformed frames are
//! logged and dropped. When the socket fails the bridge ends, and every
//! later `Channel::send` surfaces [`ChannelError::Closed`] to its
//! caller.

use crate::channel::{Channel, Inbound, Outbound};
use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::panic::Location;

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// Connect to the background process and spawn the bridge task.
///
/// # Errors
///
/// Returns [`ChannelError::Connect`] if the WebSocket handshake fails.
pub async fn connect(
    url: &Url,
    channel: Channel,
    outbound_rx: mpsc::Receiver<Outbound>,
) -> Result<JoinHandle<()>, ChannelError> {
    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .map_err(|e| ChannelError::Connect {
            message: format!("WebSocket handshake with background process failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Bridge connected to background process at {url}");

    Ok(tokio::spawn(run(ws_stream, channel, outbound_rx)))
}

/// Pump both directions until either side goes away.
async fn run(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    channel: Channel,
    mut outbound_rx: mpsc::Receiver<Outbound>,
) {
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(message) = outbound else {
                    info!("Channel dropped, closing bridge");
                    break;
                };

                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to encode outbound message: {e}");
                        continue;
                    }
                };

                if let Err(e) = write.send(Message::Text(text.into())).await {
                    error!("Bridge send failed: {e}");
                    break;
                }
            }

            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Inbound>(&text) {
                            Ok(message) => channel.publish(message),
                            Err(e) => {
                                warn!("Dropping unrecognized frame from background process: {e}");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Background process closed the bridge");
                        break;
                    }
                    Some(Ok(_)) => {
                        warn!("Ignoring non-text frame from background process");
                    }
                    Some(Err(e)) => {
                        error!("Bridge read failed: {e}");
                        break;
                    }
                }
            }
        }
    }
}
