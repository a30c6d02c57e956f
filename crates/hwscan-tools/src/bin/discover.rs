use clap::Parser;
use hwscan_client::{
    cancellation, DiscoveryConfig, DiscoveryEngine, DiscoveryError, DiscoveryReport, ProgressSink,
};
use hwscan_core::range::{DEFAULT_END, DEFAULT_START};
use hwscan_core::AddressRange;
use hwscan_link::{HomeworksTcpLink, TcpLinkConfig};
use hwscan_tools::ProbeKindArg;
use std::io::Write;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "hwscan-discover")]
struct Args {
    /// Controller host name or IP address.
    host: String,
    #[arg(long, default_value_t = 23)]
    port: u16,
    /// Answer to the controller's login prompt, e.g. "lutron, integration".
    #[arg(long)]
    login: Option<String>,
    #[arg(long, default_value = DEFAULT_START)]
    start: String,
    #[arg(long, default_value = DEFAULT_END)]
    end: String,
    /// How long to wait for each probe's reply.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
    /// Probe kinds to send; all of them by default.
    #[arg(long, value_enum, value_delimiter = ',')]
    kinds: Vec<ProbeKindArg>,
    #[arg(long)]
    json: bool,
    /// Print dimmer and switch configuration records for every device found.
    #[arg(long)]
    config_records: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let range = AddressRange::parse(&args.start, &args.end)?;

    let mut config = DiscoveryConfig::default()
        .with_probe_timeout(Duration::from_millis(args.timeout_ms))
        .with_poll_interval(Duration::from_millis(args.poll_ms));
    if !args.kinds.is_empty() {
        config = config.with_probe_kinds(args.kinds.iter().map(|k| k.into_probe_kind()));
    }

    let mut link_config = TcpLinkConfig::new(args.host).with_port(args.port);
    if let Some(login) = args.login {
        link_config = link_config.with_login(login);
    }
    let link = HomeworksTcpLink::connect(link_config).await?;

    let (cancel, token) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut progress = |done: u64, total: u64| {
        eprint!("\rprobed {done}/{total}");
        let _ = std::io::stderr().flush();
    };
    let result = DiscoveryEngine::with_config(config)
        .run(
            &range,
            &link,
            Some(&mut progress as &mut dyn ProgressSink),
            &token,
        )
        .await;
    eprintln!();

    let (mut report, failure) = match result {
        Ok(report) => (report, None),
        Err(DiscoveryError::ConnectionLost { source, partial }) => {
            (*partial, Some(format!("connection lost: {source}")))
        }
        Err(err) => return Err(err.into()),
    };
    if report.cancelled {
        eprintln!("scan cancelled after {} address(es)", report.addresses_scanned);
    }

    if args.config_records {
        report.catalog.select_all();
        println!(
            "{}",
            serde_json::to_string_pretty(&report.catalog.config_records())?
        );
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    match failure {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}

fn print_table(report: &DiscoveryReport) {
    for device in report.catalog.iter() {
        println!("{}  {:<4} {}", device.address, device.device_type, device.name);
    }
    for ambiguity in &report.ambiguities {
        println!(
            "{}  also answered {:?}; kept {}",
            ambiguity.address, ambiguity.discarded, ambiguity.kept
        );
    }
    println!(
        "\n{} device(s) in {} address(es).",
        report.catalog.len(),
        report.addresses_scanned
    );
}
