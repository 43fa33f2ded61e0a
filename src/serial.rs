//! Serial reader
//!
//! Holds the one serial connection of the process and passes every chunk of
//! bytes it reads to a subscribed [`ChunkHandler`]. The default handler
//! discards the bytes.

use std::{
    io::{ErrorKind, Read},
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::{debug, error, info, trace};

use crate::{config::SerialSettings, error::SerialError};

/// How long a read waits for bytes before reporting a timeout.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

const READ_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialState {
    Unopened,
    Opening,
    Open,
    /// At least one chunk has arrived.
    Receiving,
}

/// A contiguous block of bytes read from the device.
#[derive(Debug, Clone)]
pub struct SerialChunk {
    pub data: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

impl SerialChunk {
    pub fn new(data: &[u8]) -> SerialChunk {
        SerialChunk {
            data: data.to_vec(),
            received_at: Utc::now(),
        }
    }
}

/// Receives the chunks read from the serial device.
pub trait ChunkHandler: Send {
    fn on_data(&mut self, chunk: &SerialChunk);
}

impl<F> ChunkHandler for F
where
    F: FnMut(&SerialChunk) + Send,
{
    fn on_data(&mut self, chunk: &SerialChunk) {
        self(chunk)
    }
}

/// Drops every chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl ChunkHandler for Discard {
    fn on_data(&mut self, chunk: &SerialChunk) {
        trace!(
            "Discarding {} serial byte(s) received at {}",
            chunk.data.len(),
            chunk.received_at.to_rfc3339()
        );
    }
}

pub struct SerialConnection {
    device: String,
    baud_rate: u32,
    port: Box<dyn Read + Send>,
    state: SerialState,
    handler: Box<dyn ChunkHandler>,
}

impl SerialConnection {
    /// Open the device at 8N1 without flow control.
    pub fn open(settings: &SerialSettings) -> Result<SerialConnection, SerialError> {
        debug!(
            "Serial {}: {:?} -> {:?}",
            settings.device,
            SerialState::Unopened,
            SerialState::Opening
        );

        let port = serialport::new(&settings.device, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| SerialError::Open {
                device: settings.device.clone(),
                baud_rate: settings.baud_rate,
                source,
            })?;

        info!(
            "Serial port opened: {} at {} baud",
            settings.device, settings.baud_rate
        );

        Ok(SerialConnection::from_reader(settings, Box::new(port)))
    }

    /// Wrap an already open byte source.
    pub fn from_reader(
        settings: &SerialSettings,
        port: Box<dyn Read + Send>,
    ) -> SerialConnection {
        SerialConnection {
            device: settings.device.clone(),
            baud_rate: settings.baud_rate,
            port,
            state: SerialState::Open,
            handler: Box::new(Discard),
        }
    }

    /// Replace the handler chunks are passed to.
    pub fn subscribe(&mut self, handler: impl ChunkHandler + 'static) {
        self.handler = Box::new(handler);
    }

    pub fn state(&self) -> SerialState {
        self.state
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Read until the source ends or fails. Timeouts only mean no data yet.
    pub fn run(&mut self) -> Result<(), SerialError> {
        let mut buf = vec![0; READ_BUFFER_SIZE];

        loop {
            match self.port.read(&mut buf) {
                Ok(0) => {
                    debug!("Serial {}: end of stream", self.device);
                    return Ok(());
                }
                Ok(n) => {
                    if self.state != SerialState::Receiving {
                        debug!(
                            "Serial {}: {:?} -> {:?}",
                            self.device,
                            self.state,
                            SerialState::Receiving
                        );
                        self.state = SerialState::Receiving;
                    }
                    self.handler.on_data(&SerialChunk::new(&buf[..n]));
                }
                Err(e) => match e.kind() {
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => {}
                    _ => return Err(SerialError::Read(e)),
                },
            }
        }
    }

    /// Move the connection onto its own reader thread.
    pub fn spawn(mut self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || {
                debug!(
                    "Serial {}: reading at {} baud",
                    self.device(),
                    self.baud_rate()
                );
                if let Err(e) = self.run() {
                    error!(
                        "Serial {} at {} baud stopped: {}",
                        self.device(),
                        self.baud_rate(),
                        e
                    );
                }
            })
    }
}
