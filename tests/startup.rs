use std::time::Duration;

use clap::Parser;
use mode_relay::{config::Config, server};
use tokio::time::timeout;

#[tokio::test]
async fn missing_serial_device_is_a_startup_error() {
    let config = Config::try_parse_from([
        "mode-relay",
        "--bind",
        "127.0.0.1",
        "--port",
        "0",
        "--serial-device",
        "/dev/mode-relay-missing-device",
    ])
    .unwrap();

    let result = timeout(Duration::from_secs(10), server::run(config))
        .await
        .expect("run kept serving after the serial open failed");

    let err = result.expect_err("run succeeded without a serial device");
    let message = format!("{err:#}");
    assert!(message.contains("opening the serial device"), "{message}");
    assert!(message.contains("/dev/mode-relay-missing-device"), "{message}");
}

#[tokio::test]
async fn invalid_bind_address_is_a_startup_error() {
    let config = Config::try_parse_from(["mode-relay", "--bind", "localhost:3000"]).unwrap();

    let result = timeout(Duration::from_secs(10), server::run(config))
        .await
        .expect("run did not return");

    assert!(result.is_err());
}
