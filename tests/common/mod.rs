#![allow(dead_code)]

use std::{net::SocketAddr, path::Path, time::Duration};

use futures_util::{SinkExt, StreamExt};
use mode_relay::{hub, server};
use tokio::{
    net::{TcpListener, TcpStream},
    time::timeout,
};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Long enough for a frame that should arrive.
const EXPECT: Duration = Duration::from_secs(5);
/// How long to wait before deciding nothing is coming.
const QUIET: Duration = Duration::from_millis(300);

/// Serve `static_dir` and the realtime channel on an ephemeral port.
pub async fn start(static_dir: &Path) -> SocketAddr {
    let (hub, _hub_task) = hub::spawn();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(server::serve(
        listener,
        server::router(static_dir, hub),
        std::future::pending(),
    ));

    addr
}

pub fn public_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("public")
}

pub async fn connect(addr: SocketAddr) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    ws
}

pub async fn send(ws: &mut Ws, text: &str) {
    ws.send(Message::text(text.to_string())).await.unwrap();
}

pub async fn recv(ws: &mut Ws) -> String {
    match timeout(EXPECT, ws.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text.as_str().to_owned(),
        Ok(other) => panic!("expected a text frame, got {other:?}"),
        Err(_) => panic!("no frame within {EXPECT:?}"),
    }
}

pub async fn assert_silent(ws: &mut Ws) {
    if let Ok(frame) = timeout(QUIET, ws.next()).await {
        panic!("expected nothing, got {frame:?}");
    }
}
