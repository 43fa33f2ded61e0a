use std::{future::Future, path::Path};

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::{net::TcpListener, sync::mpsc};
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    hub::{self, HubHandle},
    model::{
        client::{ClientId, Frame},
        payload::Payload,
    },
    serial::{Discard, SerialConnection},
    util::select_host_address,
};

#[derive(Clone)]
struct AppState {
    hub: HubHandle,
}

/// `/ws` upgrades into the realtime channel; every other path is served
/// from `static_dir`, with `index.html` answering `/`.
pub fn router(static_dir: impl AsRef<Path>, hub: HubHandle) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(AppState { hub })
}

pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving HTTP")
}

/// Start the hub, the web server and the serial reader, and run until
/// Ctrl-C. Failing to bind or to open the serial device ends the process
/// with an error.
pub async fn run(config: Config) -> Result<()> {
    let addr = config.listen_addr()?;
    let (hub, _hub_task) = hub::spawn();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let local = listener.local_addr().context("reading the bound address")?;
    info!("listening on {}", local);

    match select_host_address() {
        Some(ip) => info!("Connect a browser to http://{}:{}", ip, local.port()),
        None => debug!("Found no routable IPv4 address to advertise"),
    }

    // A slow or hung open must not hold up the web server.
    let settings = config.serial();
    let opening = tokio::task::spawn_blocking(move || SerialConnection::open(&settings));

    let server = serve(listener, router(&config.static_dir, hub), shutdown_signal());
    tokio::pin!(server);

    tokio::select! {
        served = &mut server => return served,
        opened = opening => {
            let mut serial = opened
                .context("serial open task failed")?
                .context("opening the serial device")?;
            serial.subscribe(Discard);
            serial
                .spawn()
                .context("starting the serial reader thread")?;
        }
    }

    server.await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await
        }
    }
}

async fn websocket_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Register before answering the handshake, so any event sent after the
    // client sees the handshake complete is also delivered to it.
    let (id, outbound) = match state.hub.connect() {
        Ok(registered) => registered,
        Err(e) => {
            warn!("Refusing realtime connection: {}", e);
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    let on_failed = state.hub.clone();
    ws.on_failed_upgrade(move |e: axum::Error| {
        debug!("Client({}) upgrade failed: {}", id, e);
        if let Err(e) = on_failed.disconnect(id) {
            debug!("Client({}) not unregistered: {}", id, e);
        }
    })
    .on_upgrade(move |socket| handle_socket(socket, id, outbound, state.hub))
}

/// Pump one client's socket: outbound broadcasts to the socket, incoming
/// `mode` frames to the hub.
async fn handle_socket(
    mut socket: WebSocket,
    id: ClientId,
    mut outbound: mpsc::UnboundedReceiver<Frame>,
    hub: HubHandle,
) {
    debug!("Client({}) realtime channel open", id);

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                    debug!("Client({}) send failed", id);
                    break;
                }
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match Payload::decode(text.as_str()) {
                        Ok(payload) => {
                            if let Err(e) = hub.mode(id, payload) {
                                warn!("Client({}) mode event lost: {}", id, e);
                                break;
                            }
                        }
                        Err(e) => debug!("Client({}) frame ignored: {}", id, e),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Client({}) socket error: {}", id, e);
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = hub.disconnect(id) {
        debug!("Client({}) not unregistered: {}", id, e);
    }
    debug!("Client({}) realtime channel closed", id);
}
