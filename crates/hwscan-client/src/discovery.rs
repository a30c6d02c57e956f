//! Address-range discovery over a controller connection.
//!
//! [`DiscoveryEngine::run`] walks an [`AddressRange`] and, for every address,
//! issues one state request per configured [`ProbeKind`]. Replies arrive
//! asynchronously through the controller's message callback and are matched
//! by the [`ResponseCorrelator`]. A probe that sees no matching reply before
//! its deadline means no such device; it is not an error.

use crate::correlator::{PendingResponse, ResponseCorrelator};
use crate::{CancelToken, DiscoveredDevice, DiscoveryCatalog, DiscoveryError, ProgressSink};
use hwscan_core::{Address, AddressRange, DeviceType, ProbeKind};
use hwscan_link::{CallbackId, Controller, LinkError, MessageCallback};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Probe timing and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    probe_kinds: Vec<ProbeKind>,
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl DiscoveryConfig {
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Restricts the scan to `kinds`.
    ///
    /// Probes always run in [`ProbeKind::ALL`] order whatever order is given
    /// here; duplicates are ignored. With an empty list a run returns an empty
    /// report without touching the controller.
    pub fn with_probe_kinds(mut self, kinds: impl IntoIterator<Item = ProbeKind>) -> Self {
        let mut kinds: Vec<_> = kinds.into_iter().collect();
        kinds.sort_by_key(|k| k.order());
        kinds.dedup();
        self.probe_kinds = kinds;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn probe_kinds(&self) -> &[ProbeKind] {
        &self.probe_kinds
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// The effective poll interval, between 1 ms and the probe timeout.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
            .min(self.probe_timeout)
            .max(Duration::from_millis(1))
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_kinds: ProbeKind::ALL.to_vec(),
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// More than one probe kind answered at one address.
///
/// The first kind in probe order is kept in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ambiguity {
    pub address: Address,
    pub kept: ProbeKind,
    pub discarded: Vec<ProbeKind>,
}

/// Outcome of a discovery run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveryReport {
    pub catalog: DiscoveryCatalog,
    pub ambiguities: Vec<Ambiguity>,
    pub addresses_scanned: u64,
    pub probes_completed: u64,
    pub probes_total: u64,
    pub cancelled: bool,
}

/// Scans address ranges for devices.
///
/// One engine runs at most one scan at a time; starting a second concurrent
/// run fails with [`DiscoveryError::AlreadyRunning`].
#[derive(Debug, Default)]
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    running: AtomicBool,
}

impl DiscoveryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Validates `start` and `end` and scans the range between them.
    pub async fn discover<C: Controller>(
        &self,
        controller: &C,
        start: &str,
        end: &str,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let range = AddressRange::parse(start, end)?;
        self.run(&range, controller, None, &CancelToken::never())
            .await
    }

    /// Scans `range`, probing each address with every configured kind.
    ///
    /// `progress` is called once per address with cumulative probe counts.
    /// `cancel` is checked before each address; a cancelled run returns what it
    /// found so far. If the connection drops, the partial report is returned
    /// inside [`DiscoveryError::ConnectionLost`]. The message callback is
    /// removed from `controller` on every exit path.
    pub async fn run<C: Controller>(
        &self,
        range: &AddressRange,
        controller: &C,
        mut progress: Option<&mut dyn ProgressSink>,
        cancel: &CancelToken,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let _running = RunGuard::acquire(&self.running)?;

        let kinds = self.config.probe_kinds();
        if kinds.is_empty() {
            log::warn!("discovery skipped: no probe kinds configured");
            return Ok(DiscoveryReport::default());
        }

        let correlator = Arc::new(ResponseCorrelator::new());
        let _subscription = Subscription::register(controller, correlator.callback())
            .map_err(DiscoveryError::RegistrationFailed)?;

        let mut report = DiscoveryReport {
            probes_total: range.len() * kinds.len() as u64,
            ..DiscoveryReport::default()
        };
        let mut names = NameAllocator::default();
        log::info!(
            "discovery started: {} to {} ({} probes)",
            range.start(),
            range.end(),
            report.probes_total
        );

        for address in range {
            if cancel.is_cancelled() {
                log::info!("discovery cancelled before {address}");
                report.cancelled = true;
                break;
            }

            let mut kept: Option<ProbeKind> = None;
            let mut discarded = Vec::new();
            for &kind in kinds {
                let answered = match self.probe(controller, &correlator, address, kind).await {
                    Ok(answer) => answer.is_some(),
                    Err(source) => {
                        log::warn!("connection lost while probing {address} ({kind}): {source}");
                        record_ambiguity(&mut report, address, kept, discarded);
                        return Err(DiscoveryError::ConnectionLost {
                            source,
                            partial: Box::new(report),
                        });
                    }
                };
                if !answered {
                    continue;
                }
                if kept.is_none() {
                    let device_type = kind.device_type();
                    let device = DiscoveredDevice::new(address, device_type, names.next(device_type));
                    log::debug!("found {} at {address}", device.device_type);
                    report.catalog.insert(device);
                    kept = Some(kind);
                } else {
                    discarded.push(kind);
                }
            }
            record_ambiguity(&mut report, address, kept, discarded);

            report.addresses_scanned += 1;
            report.probes_completed += kinds.len() as u64;
            if let Some(sink) = progress.as_mut() {
                sink.report(report.probes_completed, report.probes_total);
            }
        }

        log::info!(
            "discovery finished: {} device(s) in {} address(es)",
            report.catalog.len(),
            report.addresses_scanned
        );
        Ok(report)
    }

    /// One request/response cycle: clear, send, wait.
    async fn probe<C: Controller>(
        &self,
        controller: &C,
        correlator: &ResponseCorrelator,
        address: Address,
        kind: ProbeKind,
    ) -> Result<Option<PendingResponse>, LinkError> {
        // A reply left over from an earlier probe at this address must not
        // satisfy this one.
        correlator.clear(address);
        let mut changes = correlator.subscribe();

        match kind {
            ProbeKind::Dimmer => controller.send_dimmer_level_request(address).await?,
            ProbeKind::ContactClosureOutput => {
                controller
                    .send_contact_closure_output_state_request(address)
                    .await?
            }
            ProbeKind::ContactClosureInput => {
                controller
                    .send_contact_closure_input_state_request(address)
                    .await?
            }
        }

        let expected = kind.expected_message();
        let deadline = Instant::now() + self.config.probe_timeout();
        let poll_interval = self.config.poll_interval();
        loop {
            changes.borrow_and_update();
            if let Some(response) = correlator.lookup_observed_by(address, expected, deadline) {
                return Ok(Some(response));
            }
            if controller.is_closed() {
                return Err(controller.closed_error());
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let _ = timeout(poll_interval.min(deadline - now), changes.changed()).await;
        }
    }
}

fn record_ambiguity(
    report: &mut DiscoveryReport,
    address: Address,
    kept: Option<ProbeKind>,
    discarded: Vec<ProbeKind>,
) {
    let Some(kept) = kept else {
        return;
    };
    if discarded.is_empty() {
        return;
    }
    log::warn!("{address} answered several probes; keeping {kept}, discarding {discarded:?}");
    report.ambiguities.push(Ambiguity {
        address,
        kept,
        discarded,
    });
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, DiscoveryError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DiscoveryError::AlreadyRunning)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps a message callback registered for its own lifetime.
struct Subscription<'a, C: Controller> {
    controller: &'a C,
    id: CallbackId,
}

impl<'a, C: Controller> Subscription<'a, C> {
    fn register(controller: &'a C, callback: MessageCallback) -> Result<Self, LinkError> {
        let id = controller.register_message_callback(callback)?;
        Ok(Self { controller, id })
    }
}

impl<C: Controller> Drop for Subscription<'_, C> {
    fn drop(&mut self) {
        if !self.controller.unregister_message_callback(self.id) {
            log::debug!("discovery callback was already unregistered");
        }
    }
}

/// Hands out `Discovered <Type> <n>` names, numbered per type.
#[derive(Default)]
struct NameAllocator {
    lights: usize,
    outputs: usize,
    inputs: usize,
}

impl NameAllocator {
    fn next(&mut self, device_type: DeviceType) -> String {
        let counter = match device_type {
            DeviceType::Light => &mut self.lights,
            DeviceType::ContactClosureOutput => &mut self.outputs,
            DeviceType::ContactClosureInput => &mut self.inputs,
        };
        *counter += 1;
        format!("Discovered {} {}", device_type.label(), counter)
    }
}

#[cfg(test)]
mod tests {
    use super::{DiscoveryConfig, DiscoveryEngine, NameAllocator};
    use crate::simulator::SimulatedController;
    use crate::{cancellation, CancelToken, DiscoveryError, NoProgress, ProgressSink};
    use hwscan_core::protocol::{Message, Request};
    use hwscan_core::{Address, AddressRange, DeviceType, ProbeKind};
    use hwscan_link::{Controller, LinkError};
    use std::sync::Arc;
    use std::time::Duration;

    fn addr(text: &str) -> Address {
        Address::parse(text).unwrap()
    }

    fn range(start: &str, end: &str) -> AddressRange {
        AddressRange::parse(start, end).unwrap()
    }

    fn sample_controller() -> SimulatedController {
        SimulatedController::new()
            .with_device(addr("[00:00:00:00]"), DeviceType::Light)
            .with_device(addr("[00:00:00:02]"), DeviceType::ContactClosureOutput)
            .with_device(addr("[00:00:00:03]"), DeviceType::ContactClosureInput)
            .with_response_delay(Duration::from_millis(20))
    }

    #[test]
    fn config_orders_and_dedups_kinds() {
        let config = DiscoveryConfig::default().with_probe_kinds([
            ProbeKind::ContactClosureInput,
            ProbeKind::Dimmer,
            ProbeKind::ContactClosureInput,
        ]);
        assert_eq!(
            config.probe_kinds(),
            &[ProbeKind::Dimmer, ProbeKind::ContactClosureInput]
        );
        let clamped = config
            .with_probe_timeout(Duration::from_millis(50))
            .with_poll_interval(Duration::from_secs(1));
        assert_eq!(clamped.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn names_are_numbered_per_type() {
        let mut names = NameAllocator::default();
        assert_eq!(names.next(DeviceType::Light), "Discovered Light 1");
        assert_eq!(names.next(DeviceType::ContactClosureOutput), "Discovered CCO 1");
        assert_eq!(names.next(DeviceType::Light), "Discovered Light 2");
        assert_eq!(names.next(DeviceType::ContactClosureInput), "Discovered CCI 1");
    }

    #[tokio::test(start_paused = true)]
    async fn finds_each_device_type() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let report = engine
            .run(
                &range("[00:00:00:00]", "[00:00:00:04]"),
                &controller,
                None,
                &CancelToken::never(),
            )
            .await
            .unwrap();

        let found: Vec<_> = report
            .catalog
            .iter()
            .map(|d| (d.address.to_string(), d.device_type, d.name.clone(), d.selected))
            .collect();
        assert_eq!(
            found,
            [
                ("[00:00:00:00]".to_string(), DeviceType::Light, "Discovered Light 1".to_string(), false),
                ("[00:00:00:02]".to_string(), DeviceType::ContactClosureOutput, "Discovered CCO 1".to_string(), false),
                ("[00:00:00:03]".to_string(), DeviceType::ContactClosureInput, "Discovered CCI 1".to_string(), false),
            ]
        );
        assert_eq!(report.addresses_scanned, 5);
        assert_eq!(report.probes_completed, 15);
        assert_eq!(report.probes_total, 15);
        assert!(!report.cancelled);
        assert!(report.ambiguities.is_empty());
        assert_eq!(controller.callback_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn probes_in_fixed_order_per_address() {
        let controller = SimulatedController::new();
        let engine = DiscoveryEngine::with_config(
            DiscoveryConfig::default().with_probe_timeout(Duration::from_millis(30)),
        );
        engine
            .run(
                &range("[05:00]", "[05:01]"),
                &controller,
                Some(&mut NoProgress as &mut dyn ProgressSink),
                &CancelToken::never(),
            )
            .await
            .unwrap();

        let a = addr("[05:00]");
        let b = addr("[05:01]");
        assert_eq!(
            controller.sent_requests(),
            [
                Request::DimmerLevel(a),
                Request::ContactClosureOutputState(a),
                Request::ContactClosureInputState(a),
                Request::DimmerLevel(b),
                Request::ContactClosureOutputState(b),
                Request::ContactClosureInputState(b),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn progress_reports_once_per_address() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let mut seen = Vec::new();
        let mut sink = |done: u64, total: u64| seen.push((done, total));
        engine
            .run(
                &range("[00:00:00:00]", "[00:00:00:03]"),
                &controller,
                Some(&mut sink as &mut dyn ProgressSink),
                &CancelToken::never(),
            )
            .await
            .unwrap();
        assert_eq!(seen, [(3, 12), (6, 12), (9, 12), (12, 12)]);
    }

    #[tokio::test(start_paused = true)]
    async fn reversed_range_sends_nothing() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let mut calls = 0;
        let mut sink = |_: u64, _: u64| calls += 1;
        let report = engine
            .run(
                &range("[00:00:00:09]", "[00:00:00:01]"),
                &controller,
                Some(&mut sink as &mut dyn ProgressSink),
                &CancelToken::never(),
            )
            .await
            .unwrap();
        assert!(report.catalog.is_empty());
        assert_eq!(report.probes_total, 0);
        assert!(controller.sent_requests().is_empty());
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_counts_as_absent() {
        let controller = SimulatedController::new()
            .with_device(addr("[01]"), DeviceType::Light)
            .with_response_delay(Duration::from_millis(800));
        let engine = DiscoveryEngine::new();
        let report = engine
            .run(&range("[01]", "[01]"), &controller, None, &CancelToken::never())
            .await
            .unwrap();
        assert!(report.catalog.is_empty());
        assert_eq!(report.probes_completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_first_kind_when_several_answer() {
        let a = addr("[02:02]");
        let controller = SimulatedController::new()
            .with_device(a, DeviceType::ContactClosureInput)
            .with_device(a, DeviceType::Light);
        let engine = DiscoveryEngine::new();
        let report = engine
            .run(&range("[02:02]", "[02:02]"), &controller, None, &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(report.catalog.get(&a).unwrap().device_type, DeviceType::Light);
        assert_eq!(report.ambiguities.len(), 1);
        assert_eq!(report.ambiguities[0].kept, ProbeKind::Dimmer);
        assert_eq!(
            report.ambiguities[0].discarded,
            [ProbeKind::ContactClosureInput]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_reply_does_not_satisfy_next_probe() {
        let a = addr("[03:03]");
        let controller = SimulatedController::new();
        let engine = DiscoveryEngine::with_config(
            DiscoveryConfig::default()
                .with_probe_kinds([ProbeKind::Dimmer, ProbeKind::ContactClosureOutput]),
        );
        // Arrives while the dimmer probe is still waiting.
        let stray = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            controller.inject(Message::ContactClosureOutputState {
                address: a,
                closed: true,
            });
        };
        let bounds = range("[03:03]", "[03:03]");
        let cancel = CancelToken::never();
        let (report, ()) = tokio::join!(engine.run(&bounds, &controller, None, &cancel), stray);
        assert!(report.unwrap().catalog.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_traffic_is_ignored() {
        let a = addr("[04:04]");
        let controller = SimulatedController::new()
            .with_device(a, DeviceType::ContactClosureOutput)
            .with_chatter(Message::Button {
                event: hwscan_core::protocol::ButtonEvent::Pressed,
                address: a,
                button: 1,
            });
        let engine = DiscoveryEngine::new();
        let report = engine
            .run(&range("[04:04]", "[04:04]"), &controller, None, &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(
            report.catalog.get(&a).map(|d| d.device_type),
            Some(DeviceType::ContactClosureOutput)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_between_addresses() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let (handle, token) = cancellation();
        let mut sink = |done: u64, _total: u64| {
            // Two addresses fully processed.
            if done == 6 {
                handle.cancel();
            }
        };
        let report = engine
            .run(
                &range("[00:00:00:00]", "[00:00:00:09]"),
                &controller,
                Some(&mut sink as &mut dyn ProgressSink),
                &token,
            )
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.addresses_scanned, 2);
        assert_eq!(report.probes_completed, 6);
        let found: Vec<_> = report.catalog.addresses().collect();
        assert_eq!(found, [addr("[00:00:00:00]")]);
        assert_eq!(controller.sent_requests().len(), 6);
        assert_eq!(controller.callback_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn connection_loss_returns_partial_catalog() {
        let controller = sample_controller().disconnect_after(7);
        let engine = DiscoveryEngine::new();
        let err = engine
            .run(
                &range("[00:00:00:00]", "[00:00:00:09]"),
                &controller,
                None,
                &CancelToken::never(),
            )
            .await
            .unwrap_err();

        let DiscoveryError::ConnectionLost { source, partial } = err else {
            panic!("expected connection loss");
        };
        assert!(matches!(source, LinkError::Closed));
        let found: Vec<_> = partial.catalog.addresses().collect();
        assert_eq!(found, [addr("[00:00:00:00]")]);
        assert_eq!(partial.addresses_scanned, 2);
        assert_eq!(controller.callback_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_report_keeps_ambiguity_at_lost_address() {
        let a = addr("[07:07]");
        let controller = SimulatedController::new()
            .with_device(a, DeviceType::Light)
            .with_device(a, DeviceType::ContactClosureOutput)
            .disconnect_after(2);
        let engine = DiscoveryEngine::new();
        let err = engine
            .run(&range("[07:07]", "[07:09]"), &controller, None, &CancelToken::never())
            .await
            .unwrap_err();

        let partial = err.partial_report().unwrap();
        assert_eq!(partial.catalog.get(&a).unwrap().device_type, DeviceType::Light);
        assert_eq!(partial.addresses_scanned, 0);
        assert_eq!(partial.ambiguities.len(), 1);
        assert_eq!(partial.ambiguities[0].kept, ProbeKind::Dimmer);
        assert_eq!(
            partial.ambiguities[0].discarded,
            [ProbeKind::ContactClosureOutput]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_kind_list_scans_nothing() {
        let controller = sample_controller();
        let config = DiscoveryConfig::default().with_probe_kinds(Vec::new());
        let engine = DiscoveryEngine::with_config(config);
        let mut calls = 0;
        let mut sink = |_: u64, _: u64| calls += 1;
        let report = engine
            .run(
                &AddressRange::default(),
                &controller,
                Some(&mut sink as &mut dyn ProgressSink),
                &CancelToken::never(),
            )
            .await
            .unwrap();

        assert!(report.catalog.is_empty());
        assert_eq!(report.probes_total, 0);
        assert_eq!(report.addresses_scanned, 0);
        assert!(controller.sent_requests().is_empty());
        assert_eq!(controller.callback_count(), 0);
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn link_closing_mid_wait_is_fatal() {
        let controller = Arc::new(SimulatedController::new());
        let engine = DiscoveryEngine::new();
        let closer = {
            let controller = controller.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                controller.disconnect();
            }
        };
        let bounds = range("[06:00]", "[06:09]");
        let cancel = CancelToken::never();
        let (result, ()) = tokio::join!(
            engine.run(&bounds, controller.as_ref(), None, &cancel),
            closer
        );
        let err = result.unwrap_err();
        assert!(matches!(err, DiscoveryError::ConnectionLost { .. }));
        assert_eq!(err.partial_report().unwrap().addresses_scanned, 0);
        assert_eq!(controller.callback_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn registration_failure_is_reported_before_probing() {
        let controller = SimulatedController::new().with_registration_limit(0);
        let engine = DiscoveryEngine::new();
        let err = engine
            .run(&range("[01]", "[05]"), &controller, None, &CancelToken::never())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::RegistrationFailed(LinkError::RegistrationRejected)
        ));
        assert!(controller.sent_requests().is_empty());
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_runs_are_rejected() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let cancel = CancelToken::never();
        let wide = range("[00:00:00:00]", "[00:00:00:03]");
        let narrow = range("[00:00:00:00]", "[00:00:00:00]");
        let (first, second) = tokio::join!(
            engine.run(&wide, &controller, None, &cancel),
            engine.run(&narrow, &controller, None, &cancel),
        );
        assert_eq!(first.unwrap().catalog.len(), 3);
        assert!(matches!(second, Err(DiscoveryError::AlreadyRunning)));
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_runs_are_identical() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let bounds = range("[00:00:00:00]", "[00:00:00:05]");
        let first = engine
            .run(&bounds, &controller, None, &CancelToken::never())
            .await
            .unwrap();
        let second = engine
            .run(&bounds, &controller, None, &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(first, second);

        let elsewhere = engine
            .run(&range("[00:00:00:03]", "[00:00:00:04]"), &controller, None, &CancelToken::never())
            .await
            .unwrap();
        let found: Vec<_> = elsewhere.catalog.addresses().collect();
        assert_eq!(found, [addr("[00:00:00:03]")]);
        assert_eq!(
            elsewhere.catalog.get(&addr("[00:00:00:03]")).unwrap().name,
            "Discovered CCI 1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn discover_validates_bounds_first() {
        let controller = sample_controller();
        let engine = DiscoveryEngine::new();
        let err = engine
            .discover(&controller, "[00:00:00:00]", "00:00:00:05")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidAddressFormat(_)));
        assert!(controller.sent_requests().is_empty());
        assert_eq!(controller.callback_count(), 0);

        let report = engine
            .discover(&controller, "[00:00:00:00]", "[00:00:00:02]")
            .await
            .unwrap();
        assert_eq!(report.catalog.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn controller_send_helpers_issue_typed_requests() {
        let controller = SimulatedController::new();
        let a = addr("[08]");
        controller.send_dimmer_level_request(a).await.unwrap();
        controller
            .send_contact_closure_input_state_request(a)
            .await
            .unwrap();
        assert_eq!(
            controller.sent_requests(),
            [Request::DimmerLevel(a), Request::ContactClosureInputState(a)]
        );
    }
}
