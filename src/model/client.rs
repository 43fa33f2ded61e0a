use std::fmt;
use std::ops::Deref;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::mpsc;

/// An encoded text frame shared by every recipient of one broadcast.
pub type Frame = Arc<str>;

/// One connected browser peer, as held by the hub.
///
/// The socket itself lives in the connection task; the hub only keeps the
/// sending half of that task's outbound queue. The queue is unbounded: a
/// connected peer receives every frame, however far behind it falls.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    outbound: mpsc::UnboundedSender<Frame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl Deref for ClientId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of handing one frame to one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The connection task has ended.
    Gone,
}

impl Client {
    pub fn new(outbound: mpsc::UnboundedSender<Frame>) -> Client {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
        let next_id = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
        Client {
            id: ClientId(next_id),
            outbound,
        }
    }

    /// Create a client together with the receiving end of its queue.
    pub fn with_queue() -> (Client, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Client::new(tx), rx)
    }

    pub fn deliver(&self, frame: &Frame) -> Delivery {
        match self.outbound.send(Arc::clone(frame)) {
            Ok(()) => Delivery::Sent,
            Err(_) => Delivery::Gone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let (a, _rx_a) = Client::with_queue();
        let (b, _rx_b) = Client::with_queue();
        assert_ne!(a.id, b.id);
        assert!(*b.id > *a.id);
    }

    #[test]
    fn unread_frames_pile_up_instead_of_being_dropped() {
        let (client, mut rx) = Client::with_queue();

        for i in 0..5000 {
            let frame: Frame = Arc::from(format!(r#"["mode",{i}]"#));
            assert_eq!(client.deliver(&frame), Delivery::Sent);
        }
        for i in 0..5000 {
            assert_eq!(rx.try_recv().unwrap().as_ref(), format!(r#"["mode",{i}]"#));
        }
    }

    #[test]
    fn delivery_to_a_closed_queue_reports_gone() {
        let (client, rx) = Client::with_queue();
        drop(rx);

        let frame: Frame = Arc::from(r#"["mode",1]"#);
        assert_eq!(client.deliver(&frame), Delivery::Gone);
    }
}
