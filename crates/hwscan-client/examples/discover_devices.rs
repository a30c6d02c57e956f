//! Scan a controller for lights and contact closures.
//!
//! Usage:
//!   cargo run -p hwscan-client --example discover_devices -- 192.168.1.50 "lutron, integration"

use hwscan_client::{CancelToken, DiscoveryEngine, LogProgress, ProgressSink};
use hwscan_core::AddressRange;
use hwscan_link::{HomeworksTcpLink, TcpLinkConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let mut config = TcpLinkConfig::new(host);
    if let Some(login) = args.next() {
        config = config.with_login(login);
    }
    let link = HomeworksTcpLink::connect(config).await?;

    // Only the first processor's first link; the full space takes days.
    let range = AddressRange::parse("[01:01:00:00]", "[01:01:00:99]")?;
    let mut progress = LogProgress::every_percent(10);
    let report = DiscoveryEngine::new()
        .run(
            &range,
            &link,
            Some(&mut progress as &mut dyn ProgressSink),
            &CancelToken::never(),
        )
        .await?;

    if report.catalog.is_empty() {
        println!("No devices found.");
    } else {
        for device in report.catalog.iter() {
            println!("{} {:<4} {}", device.address, device.device_type, device.name);
        }
        println!("\nDiscovered {} device(s).", report.catalog.len());
    }

    Ok(())
}
