//! Live feed of album snapshots and replace progress over SSE
//!
//! Every `AlbumsChanged` event carries the complete list, so a page that
//! missed events only needs the next one to be current again.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::Serialize;
use tfg_common::events::GalleryEvent;
use tfg_common::seed::visible_albums;
use tfg_common::Album;
use tracing::{debug, info, warn};

use crate::AppState;

#[derive(Debug, Serialize)]
struct SnapshotPayload<'a> {
    albums: &'a [Album],
    seeded: bool,
    timestamp: DateTime<Utc>,
}

/// JSON body of an `AlbumsChanged` event; an empty snapshot goes out as seed data
fn snapshot_data(albums: &[Album], timestamp: DateTime<Utc>) -> serde_json::Result<String> {
    let (visible, seeded) = visible_albums(albums);
    serde_json::to_string(&SnapshotPayload {
        albums: &visible,
        seeded,
        timestamp,
    })
}

fn to_sse_event(event: &GalleryEvent) -> Result<Event, axum::Error> {
    let sse = Event::default().event(event.event_type());
    match event {
        GalleryEvent::AlbumsChanged { albums, timestamp } => {
            let data = snapshot_data(albums, *timestamp).map_err(axum::Error::new)?;
            Ok(sse.data(data))
        }
        GalleryEvent::ReplaceProgress { .. } => sse.json_data(event),
    }
}

/// GET /api/events
///
/// The first event is the snapshot current at connect time.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to gallery events");
    let mut subscription = state.sync.subscribe().await;

    let stream = async_stream::stream! {
        while let Some(event) = subscription.next().await {
            debug!("SSE: sending {}", event.event_type());
            match to_sse_event(&event) {
                Ok(sse) => {
                    yield Ok(sse);
                }
                Err(e) => {
                    warn!("Failed to encode {} event: {}", event.event_type(), e);
                }
            }
        }
        info!("SSE: gallery event stream ended");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
