pub mod config;
pub mod error;
pub mod hub;
pub mod model;
pub mod serial;
pub mod server;
pub mod util;
