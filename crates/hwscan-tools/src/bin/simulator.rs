use clap::Parser;
use hwscan_client::{DeviceTable, TcpSimulator};
use hwscan_core::{Address, DeviceType};
use hwscan_tools::parse_address;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(name = "hwscan-simulator")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,
    #[arg(long, default_value_t = 23)]
    port: u16,
    /// Require this login before accepting requests.
    #[arg(long)]
    login: Option<String>,
    /// Address of a simulated dimmer; repeatable.
    #[arg(long, value_parser = parse_address)]
    light: Vec<Address>,
    /// Address of a simulated contact-closure output; repeatable.
    #[arg(long, value_parser = parse_address)]
    cco: Vec<Address>,
    /// Address of a simulated contact-closure input; repeatable.
    #[arg(long, value_parser = parse_address)]
    cci: Vec<Address>,
    #[arg(long, default_value_t = 0)]
    response_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut devices = DeviceTable::new();
    for (addresses, device_type) in [
        (&args.light, DeviceType::Light),
        (&args.cco, DeviceType::ContactClosureOutput),
        (&args.cci, DeviceType::ContactClosureInput),
    ] {
        for address in addresses {
            devices.insert(*address, device_type);
        }
    }

    let listener = TcpListener::bind((args.bind.as_str(), args.port)).await?;
    println!(
        "Simulated controller on {} ({} light, {} CCO, {} CCI). Ctrl+C to stop.",
        listener.local_addr()?,
        args.light.len(),
        args.cco.len(),
        args.cci.len()
    );

    let mut simulator = TcpSimulator::new(devices)
        .with_response_delay(Duration::from_millis(args.response_delay_ms));
    if let Some(login) = args.login {
        simulator = simulator.with_login(login);
    }
    simulator.serve(listener).await?;
    Ok(())
}
