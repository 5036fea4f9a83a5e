//! Serving over a real socket and stopping on request

use std::sync::Arc;
use std::time::Duration;

use tfg_common::gate::GateSecrets;
use tfg_common::store::MemoryAlbumStore;
use tfg_common::AlbumSync;
use tfg_gallery::server::{serve_until, StopReason};
use tfg_gallery::{build_router, AppState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[tokio::test]
async fn test_serves_until_stop_then_exits_cleanly() {
    let sync = Arc::new(AlbumSync::new(Arc::new(MemoryAlbumStore::new()), 500));
    let app = build_router(AppState::new(sync, GateSecrets::new("8888", "admin")));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_until(listener, app, async move {
        let _ = stop_rx.await;
        StopReason::Terminate
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains("\"status\":\"ok\""));

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[test]
fn test_stop_reason_display() {
    assert_eq!(StopReason::Interrupt.to_string(), "interrupt");
    assert_eq!(StopReason::Terminate.to_string(), "terminate signal");
}
