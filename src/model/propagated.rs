//! Events handed from connection tasks to the hub
//!
//! Every change to the client registry and every relayed event travels
//! through one FIFO queue as a `Propagated`, so the hub applies them in the
//! order they were sent.

use crate::model::{
    client::{Client, ClientId},
    payload::Payload,
};

#[derive(Debug)]
pub enum Propagated {
    /// A client completed the handshake and joins future broadcasts.
    Connected(Client),

    /// A client emitted a `mode` event.
    Mode(ClientId, Payload),

    /// A client's connection ended.
    Disconnected(ClientId),
}

impl Propagated {
    /// The client the event originates from.
    pub fn client_id(&self) -> ClientId {
        match self {
            Propagated::Connected(c) => c.id,
            Propagated::Mode(id, _) | Propagated::Disconnected(id) => *id,
        }
    }
}
