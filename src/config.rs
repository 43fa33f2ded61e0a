use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/cu.usbmodem14201";
pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_PORT: u16 = 3000;

/// Relay `mode` events between browser clients and hold a serial device open.
#[derive(Debug, Clone, Parser)]
#[command(name = "mode-relay", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "MODE_RELAY_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port serving both the static files and the realtime channel.
    #[arg(long, env = "MODE_RELAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory served as the static front-end.
    #[arg(long, env = "MODE_RELAY_STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Serial device to open.
    #[arg(long, env = "MODE_RELAY_SERIAL_DEVICE", default_value = DEFAULT_SERIAL_DEVICE)]
    pub serial_device: String,

    /// Baud rate of the serial device.
    #[arg(long, env = "MODE_RELAY_BAUD_RATE", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,
}

/// Where and how fast to open the serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub device: String,
    pub baud_rate: u32,
}

impl Config {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid bind address {:?}", self.bind))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn serial(&self) -> SerialSettings {
        SerialSettings {
            device: self.serial_device.clone(),
            baud_rate: self.baud_rate,
        }
    }
}
