//! Realtime hub
//!
//! Fans `mode` events out to every connected client. A single task owns the
//! client registry and consumes [`Propagated`] events one at a time, so a
//! broadcast never interleaves with another broadcast or with a registry
//! change, and no lock guards the registry.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, trace, warn};

use crate::error::HubClosed;
use crate::model::{
    client::{Client, ClientId, Delivery, Frame},
    payload::Payload,
    propagated::Propagated,
};

/// The connected-client registry and the fan-out over it.
#[derive(Debug, Default)]
pub struct Hub {
    clients: Vec<Client>,
}

impl Hub {
    pub fn new() -> Hub {
        Hub::default()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn connect(&mut self, client: Client) {
        debug!("Client({}) connected", client.id);
        self.clients.push(client);
        debug!("{} client(s) connected", self.clients.len());
    }

    /// Remove a client. Returns false if it was already gone.
    pub fn disconnect(&mut self, id: ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        let removed = self.clients.len() != before;
        if removed {
            debug!(
                "Client({}) disconnected, {} client(s) left",
                id,
                self.clients.len()
            );
        }
        removed
    }

    /// Send `("mode", payload)` to every registered client, the origin
    /// included. Clients whose connection has ended are dropped from the
    /// registry. Returns the number of clients the frame was queued for.
    pub fn broadcast_mode(&mut self, origin: ClientId, payload: &Payload) -> usize {
        info!("Mode changed to: {}", describe(payload));

        let frame: Frame = match payload.encode() {
            Ok(text) => Arc::from(text),
            Err(e) => {
                warn!("Client({}) mode event could not be encoded: {}", origin, e);
                return 0;
            }
        };

        let mut delivered = 0;
        self.clients.retain(|client| match client.deliver(&frame) {
            Delivery::Sent => {
                delivered += 1;
                true
            }
            Delivery::Gone => {
                debug!("Client({}) went away mid-broadcast", client.id);
                false
            }
        });

        delivered
    }

    pub fn handle(&mut self, event: Propagated) {
        trace!("Hub event from Client({})", event.client_id());

        match event {
            Propagated::Connected(client) => self.connect(client),
            Propagated::Mode(origin, payload) => {
                self.broadcast_mode(origin, &payload);
            }
            Propagated::Disconnected(id) => {
                self.disconnect(id);
            }
        }
    }
}

/// The connection tasks' way into the hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<Propagated>,
}

impl HubHandle {
    /// Register a new client. Broadcasts sent after this call reach it;
    /// earlier ones never do.
    pub fn connect(&self) -> Result<(ClientId, mpsc::UnboundedReceiver<Frame>), HubClosed> {
        let (client, rx) = Client::with_queue();
        let id = client.id;
        self.tx
            .send(Propagated::Connected(client))
            .map_err(|_| HubClosed)?;
        Ok((id, rx))
    }

    pub fn mode(&self, origin: ClientId, payload: Payload) -> Result<(), HubClosed> {
        self.tx
            .send(Propagated::Mode(origin, payload))
            .map_err(|_| HubClosed)
    }

    pub fn disconnect(&self, id: ClientId) -> Result<(), HubClosed> {
        self.tx
            .send(Propagated::Disconnected(id))
            .map_err(|_| HubClosed)
    }
}

/// Payload as a single escaped log token, whatever whitespace it carries.
fn describe(payload: &Payload) -> String {
    format!("{:?}", payload.as_json())
}

/// Start the hub task. It runs until every [`HubHandle`] is dropped.
pub fn spawn() -> (HubHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(Hub::new(), rx));
    (HubHandle { tx }, task)
}

async fn run(mut hub: Hub, mut rx: mpsc::UnboundedReceiver<Propagated>) {
    while let Some(event) = rx.recv().await {
        hub.handle(event);
    }
    debug!("Hub stopped with {} client(s) registered", hub.len());
}
