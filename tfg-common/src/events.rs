//! Gallery events and the broadcast bus that carries them
//!
//! Every connected reader receives full-list snapshots, never diffs. Bulk
//! replace progress travels on the same bus so admin pages can show it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::album::Album;

/// Which half of a bulk replace a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceStage {
    Deleting,
    Inserting,
    Finished,
    Failed,
}

/// Progress of the running (or last) bulk replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceProgress {
    pub stage: ReplaceStage,
    /// Albums processed in this stage so far
    pub done: usize,
    /// Albums this stage has to process
    pub total: usize,
    pub message: String,
}

impl ReplaceProgress {
    pub fn new(stage: ReplaceStage, done: usize, total: usize) -> Self {
        let message = match stage {
            ReplaceStage::Deleting => format!("正在清除舊資料 {} / {}", done, total),
            ReplaceStage::Inserting => format!("已上傳 {} / {}", done, total),
            ReplaceStage::Finished => format!("成功匯入 {} 筆資料！", done),
            ReplaceStage::Failed => format!("匯入失敗，已上傳 {} / {}", done, total),
        };
        Self {
            stage,
            done,
            total,
            message,
        }
    }
}

/// Gallery event types
///
/// Serialized with a `type` tag so the SSE layer can use it as event name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GalleryEvent {
    /// The collection changed; carries the complete current list
    AlbumsChanged {
        albums: Arc<Vec<Album>>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A bulk replace committed another batch (or ended)
    ReplaceProgress {
        #[serde(flatten)]
        progress: ReplaceProgress,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl GalleryEvent {
    pub fn albums_changed(albums: Arc<Vec<Album>>) -> Self {
        GalleryEvent::AlbumsChanged {
            albums,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn replace_progress(progress: ReplaceProgress) -> Self {
        GalleryEvent::ReplaceProgress {
            progress,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Event name used on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            GalleryEvent::AlbumsChanged { .. } => "AlbumsChanged",
            GalleryEvent::ReplaceProgress { .. } => "ReplaceProgress",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`: publishing never blocks, slow subscribers
/// lag and skip ahead rather than holding up writers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GalleryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: GalleryEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_messages() {
        assert_eq!(ReplaceProgress::new(ReplaceStage::Inserting, 500, 730).message, "已上傳 500 / 730");
        assert_eq!(ReplaceProgress::new(ReplaceStage::Finished, 12, 12).message, "成功匯入 12 筆資料！");
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = GalleryEvent::replace_progress(ReplaceProgress::new(ReplaceStage::Deleting, 0, 3));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ReplaceProgress");
        assert_eq!(json["stage"], "deleting");
        assert_eq!(json["total"], 3);
        assert_eq!(event.event_type(), "ReplaceProgress");
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscribers() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit_lossy(GalleryEvent::albums_changed(Arc::new(Vec::new())));
        match rx.recv().await.unwrap() {
            GalleryEvent::AlbumsChanged { albums, .. } => assert!(albums.is_empty()),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
