//! Background-task progress streams
//!
//! Long-running server jobs (registry rescans) report progress over a
//! websocket. The raw frames are decoded here into [`BgTaskEvent`]s and
//! forwarded through an mpsc channel; the stream ends after a terminal
//! event (done/failed/cancelled) or when the socket closes.

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use admiral_core::prelude::*;

/// A progress event from a server background task.
#[derive(Debug, Clone, PartialEq)]
pub enum BgTaskEvent {
    Updated { current: u64, total: u64 },
    Done,
    Failed { message: String },
    Cancelled,
}

impl BgTaskEvent {
    /// Terminal events end the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BgTaskEvent::Updated { .. })
    }
}

/// Wire frame shape for background-task events.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
enum BgTaskFrame {
    #[serde(rename = "bgtask_updated")]
    Updated {
        #[serde(default)]
        current_progress: u64,
        #[serde(default)]
        total_progress: u64,
    },
    #[serde(rename = "bgtask_done")]
    Done,
    #[serde(rename = "bgtask_failed")]
    Failed {
        #[serde(default)]
        message: String,
    },
    #[serde(rename = "bgtask_cancelled")]
    Cancelled,
}

impl From<BgTaskFrame> for BgTaskEvent {
    fn from(frame: BgTaskFrame) -> Self {
        match frame {
            BgTaskFrame::Updated {
                current_progress,
                total_progress,
            } => BgTaskEvent::Updated {
                current: current_progress,
                total: total_progress,
            },
            BgTaskFrame::Done => BgTaskEvent::Done,
            BgTaskFrame::Failed { message } => BgTaskEvent::Failed { message },
            BgTaskFrame::Cancelled => BgTaskEvent::Cancelled,
        }
    }
}

/// Receiving half of a background task's event stream.
pub struct BgTaskStream {
    rx: mpsc::Receiver<BgTaskEvent>,
}

impl BgTaskStream {
    /// Wrap an already-fed channel. Used by test fakes.
    pub fn from_receiver(rx: mpsc::Receiver<BgTaskEvent>) -> Self {
        Self { rx }
    }

    /// Next event; `None` once the task has finished and the channel drained.
    pub async fn recv(&mut self) -> Option<BgTaskEvent> {
        self.rx.recv().await
    }

    /// Connect to the websocket endpoint and spawn the frame reader.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let (socket, _) = connect_async(ws_url)
            .await
            .map_err(|e| Error::transport(format!("background task stream: {e}")))?;

        let (tx, rx) = mpsc::channel(32);
        let (_, mut read) = socket.split();

        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                let text = match frame {
                    Ok(WsMessage::Text(text)) => text,
                    Ok(WsMessage::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };
                let event = match serde_json::from_str::<BgTaskFrame>(text.as_str()) {
                    Ok(frame) => BgTaskEvent::from(frame),
                    Err(e) => {
                        warn!("unparseable background task frame: {e}");
                        continue;
                    }
                };
                let terminal = event.is_terminal();
                if tx.send(event).await.is_err() {
                    break;
                }
                if terminal {
                    break;
                }
            }
        });

        Ok(Self { rx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_decoding() {
        let event: BgTaskEvent = serde_json::from_str::<BgTaskFrame>(
            r#"{"kind": "bgtask_updated", "current_progress": 3, "total_progress": 10}"#,
        )
        .unwrap()
        .into();
        assert_eq!(
            event,
            BgTaskEvent::Updated {
                current: 3,
                total: 10
            }
        );

        let event: BgTaskEvent = serde_json::from_str::<BgTaskFrame>(r#"{"kind": "bgtask_done"}"#)
            .unwrap()
            .into();
        assert_eq!(event, BgTaskEvent::Done);

        let event: BgTaskEvent = serde_json::from_str::<BgTaskFrame>(
            r#"{"kind": "bgtask_failed", "message": "registry unreachable"}"#,
        )
        .unwrap()
        .into();
        assert_eq!(
            event,
            BgTaskEvent::Failed {
                message: "registry unreachable".to_string()
            }
        );
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!BgTaskEvent::Updated { current: 0, total: 1 }.is_terminal());
        assert!(BgTaskEvent::Done.is_terminal());
        assert!(BgTaskEvent::Cancelled.is_terminal());
    }

    #[tokio::test]
    async fn test_stream_from_receiver_drains() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(BgTaskEvent::Updated { current: 1, total: 2 })
            .await
            .unwrap();
        tx.send(BgTaskEvent::Done).await.unwrap();
        drop(tx);

        let mut stream = BgTaskStream::from_receiver(rx);
        assert_eq!(
            stream.recv().await,
            Some(BgTaskEvent::Updated { current: 1, total: 2 })
        );
        assert_eq!(stream.recv().await, Some(BgTaskEvent::Done));
        assert_eq!(stream.recv().await, None);
    }
}
