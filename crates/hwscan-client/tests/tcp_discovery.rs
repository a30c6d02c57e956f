use hwscan_client::{
    cancellation, CancelToken, DeviceTable, DiscoveryConfig, DiscoveryEngine, DiscoveryError,
    ProgressSink, TcpSimulator,
};
use hwscan_core::{Address, AddressRange, DeviceType};
use hwscan_link::{Controller, HomeworksTcpLink, LinkError, TcpLinkConfig};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

fn addr(text: &str) -> Address {
    Address::parse(text).unwrap()
}

fn fast_engine() -> DiscoveryEngine {
    DiscoveryEngine::with_config(
        DiscoveryConfig::default()
            .with_probe_timeout(Duration::from_millis(100))
            .with_poll_interval(Duration::from_millis(10)),
    )
}

async fn start_simulator(simulator: TcpSimulator) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(simulator.serve(listener));
    port
}

#[tokio::test]
async fn discovers_devices_over_tcp() {
    let _ = env_logger::builder().is_test(true).try_init();
    let devices = DeviceTable::new()
        .with_device(addr("[01:01:00:01]"), DeviceType::Light)
        .with_device(addr("[01:01:00:03]"), DeviceType::ContactClosureInput)
        .with_device(addr("[01:01:00:04]"), DeviceType::ContactClosureOutput);
    let port = start_simulator(TcpSimulator::new(devices).with_login("lutron, integration")).await;

    let link = HomeworksTcpLink::connect(
        TcpLinkConfig::new("127.0.0.1")
            .with_port(port)
            .with_login("lutron, integration"),
    )
    .await
    .unwrap();

    let mut reports = Vec::new();
    let mut sink = |done: u64, total: u64| reports.push((done, total));
    let range = AddressRange::parse("[01:01:00:00]", "[01:01:00:04]").unwrap();
    let mut report = fast_engine()
        .run(
            &range,
            &link,
            Some(&mut sink as &mut dyn ProgressSink),
            &CancelToken::never(),
        )
        .await
        .unwrap();

    let found: Vec<_> = report
        .catalog
        .iter()
        .map(|d| (d.address.to_string(), d.device_type))
        .collect();
    assert_eq!(
        found,
        [
            ("[01:01:00:01]".to_string(), DeviceType::Light),
            ("[01:01:00:03]".to_string(), DeviceType::ContactClosureInput),
            ("[01:01:00:04]".to_string(), DeviceType::ContactClosureOutput),
        ]
    );
    assert_eq!(reports.len(), 5);
    assert_eq!(reports.last(), Some(&(15, 15)));

    report.catalog.select_all();
    let records = report.catalog.config_records();
    assert_eq!(records.dimmers.len(), 1);
    assert_eq!(records.dimmers[0].name, "Discovered Light 1");
    assert_eq!(records.switches.len(), 2);
}

#[tokio::test]
async fn cancelled_scan_keeps_partial_results() {
    let devices = DeviceTable::new().with_device(addr("[02:01]"), DeviceType::Light);
    let port = start_simulator(TcpSimulator::new(devices)).await;
    let link = HomeworksTcpLink::connect(TcpLinkConfig::new("127.0.0.1").with_port(port))
        .await
        .unwrap();

    let (handle, token) = cancellation();
    let mut sink = |done: u64, _: u64| {
        if done >= 6 {
            handle.cancel();
        }
    };
    let range = AddressRange::parse("[02:00]", "[02:99]").unwrap();
    let report = fast_engine()
        .run(&range, &link, Some(&mut sink as &mut dyn ProgressSink), &token)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.addresses_scanned, 2);
    assert!(report.catalog.contains(&addr("[02:01]")));
}

#[tokio::test]
async fn dropped_connection_is_reported_with_partial_catalog() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line == "RDL, [03:01]" {
                write.write_all(b"DL, [03:01], 100\r\n").await.unwrap();
            }
            if line == "RDL, [03:02]" {
                // Hang up in the middle of the scan.
                return;
            }
        }
    });

    let link = HomeworksTcpLink::connect(TcpLinkConfig::new("127.0.0.1").with_port(port))
        .await
        .unwrap();
    let range = AddressRange::parse("[03:01]", "[03:09]").unwrap();
    let err = fast_engine()
        .run(&range, &link, None, &CancelToken::never())
        .await
        .unwrap_err();

    let DiscoveryError::ConnectionLost { source, partial } = err else {
        panic!("expected connection loss, got {err:?}");
    };
    assert!(matches!(source, LinkError::Closed));
    assert!(partial.catalog.contains(&addr("[03:01]")));
    assert!(link.is_closed());
}

#[tokio::test]
async fn rejected_login_fails_the_scan() {
    let devices = DeviceTable::new().with_device(addr("[04:01]"), DeviceType::Light);
    let port = start_simulator(TcpSimulator::new(devices).with_login("lutron, integration")).await;
    let link = HomeworksTcpLink::connect(
        TcpLinkConfig::new("127.0.0.1")
            .with_port(port)
            .with_login("wrong, password"),
    )
    .await
    .unwrap();

    let range = AddressRange::parse("[04:00]", "[04:99]").unwrap();
    let err = fast_engine()
        .run(&range, &link, None, &CancelToken::never())
        .await
        .unwrap_err();

    match err {
        DiscoveryError::RegistrationFailed(LinkError::LoginRejected) => {}
        DiscoveryError::ConnectionLost {
            source: LinkError::LoginRejected,
            partial,
        } => assert!(partial.catalog.is_empty()),
        other => panic!("expected a login failure, got {other:?}"),
    }
}
