//! Error types shared by the hub, the serial reader and the wire codec.

use thiserror::Error;

/// Failures of the serial device.
#[derive(Debug, Error)]
pub enum SerialError {
    /// The device could not be opened (missing, busy, or not a tty).
    #[error("failed to open serial device {device} at {baud_rate} baud")]
    Open {
        device: String,
        baud_rate: u32,
        #[source]
        source: serialport::Error,
    },

    /// A read failed after the device was opened.
    #[error("serial read failed")]
    Read(#[source] std::io::Error),
}

/// A realtime text frame that cannot be relayed.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not an [event, payload] array")]
    Malformed(#[from] serde_json::Error),

    #[error("unhandled event {0:?}")]
    UnknownEvent(String),
}

/// The hub task is no longer running.
#[derive(Debug, Error)]
#[error("realtime hub has shut down")]
pub struct HubClosed;
