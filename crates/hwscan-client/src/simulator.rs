//! Simulated controllers for testing and development without hardware.
//!
//! [`SimulatedController`] implements [`Controller`] in process and answers
//! probes from a [`DeviceTable`]. [`TcpSimulator`] serves the same table over
//! the controller's TCP line protocol.

use hwscan_core::protocol::{Message, Request, LINE_TERMINATOR, LOGIN_PROMPT};
use hwscan_core::{Address, DeviceType};
use hwscan_link::{CallbackId, CallbackRegistry, Controller, LinkError, MessageCallback};
use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Devices present on a simulated controller.
///
/// An address may hold more than one device type, which makes it answer
/// several probe kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTable {
    devices: BTreeMap<Address, Vec<DeviceType>>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, address: Address, device_type: DeviceType) -> Self {
        self.insert(address, device_type);
        self
    }

    pub fn insert(&mut self, address: Address, device_type: DeviceType) {
        let types = self.devices.entry(address).or_default();
        if !types.contains(&device_type) {
            types.push(device_type);
        }
    }

    pub fn device_types(&self, address: &Address) -> &[DeviceType] {
        self.devices.get(address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// The controller's answer to `request`, if a matching device exists.
    pub fn reply(&self, request: &Request) -> Option<Message> {
        let address = request.address();
        let wanted = request.probe_kind().device_type();
        if !self.device_types(&address).contains(&wanted) {
            return None;
        }
        Some(match wanted {
            DeviceType::Light => Message::DimmerLevel { address, level: 0 },
            DeviceType::ContactClosureOutput => Message::ContactClosureOutputState {
                address,
                closed: false,
            },
            DeviceType::ContactClosureInput => Message::ContactClosureInputState {
                address,
                closed: false,
            },
        })
    }
}

/// An in-process controller backed by a [`DeviceTable`].
///
/// Replies are delivered to registered callbacks, immediately or after the
/// configured response delay on a spawned task. Every request is recorded.
pub struct SimulatedController {
    devices: DeviceTable,
    callbacks: Arc<CallbackRegistry>,
    response_delay: Duration,
    chatter: Vec<Message>,
    disconnect_after: Option<usize>,
    sent: Mutex<Vec<Request>>,
    closed: Arc<AtomicBool>,
}

impl SimulatedController {
    pub fn new() -> Self {
        Self::with_devices(DeviceTable::new())
    }

    pub fn with_devices(devices: DeviceTable) -> Self {
        Self {
            devices,
            callbacks: Arc::new(CallbackRegistry::new()),
            response_delay: Duration::ZERO,
            chatter: Vec::new(),
            disconnect_after: None,
            sent: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_device(mut self, address: Address, device_type: DeviceType) -> Self {
        self.devices.insert(address, device_type);
        self
    }

    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Unrelated traffic emitted ahead of every reply.
    pub fn with_chatter(mut self, message: Message) -> Self {
        self.chatter.push(message);
        self
    }

    /// Rejects callback registrations beyond `limit` live subscribers.
    pub fn with_registration_limit(mut self, limit: usize) -> Self {
        self.callbacks = Arc::new(CallbackRegistry::with_limit(limit));
        self
    }

    /// Closes the link once `requests` requests have been accepted.
    pub fn disconnect_after(mut self, requests: usize) -> Self {
        self.disconnect_after = Some(requests);
        self
    }

    pub fn devices(&self) -> &DeviceTable {
        &self.devices
    }

    pub fn disconnect(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Delivers `message` to every registered callback as if the controller
    /// had sent it.
    pub fn inject(&self, message: Message) {
        self.callbacks.dispatch(&message);
    }

    pub fn sent_requests(&self) -> Vec<Request> {
        self.sent().clone()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    fn sent(&self) -> MutexGuard<'_, Vec<Request>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, message: Message) {
        if self.response_delay.is_zero() {
            self.callbacks.dispatch(&message);
            return;
        }
        let callbacks = self.callbacks.clone();
        let closed = self.closed.clone();
        let delay = self.response_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !closed.load(Ordering::Acquire) {
                callbacks.dispatch(&message);
            }
        });
    }
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedController")
            .field("devices", &self.devices.len())
            .field("response_delay", &self.response_delay)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Controller for SimulatedController {
    async fn send(&self, request: Request) -> Result<(), LinkError> {
        if self.is_closed() {
            return Err(LinkError::Closed);
        }
        let accepted = {
            let mut sent = self.sent();
            sent.push(request);
            sent.len()
        };
        for message in &self.chatter {
            self.deliver(message.clone());
        }
        if let Some(reply) = self.devices.reply(&request) {
            self.deliver(reply);
        }
        if self.disconnect_after.is_some_and(|limit| accepted >= limit) {
            log::debug!("simulated controller disconnecting after {accepted} requests");
            self.disconnect();
        }
        Ok(())
    }

    fn register_message_callback(
        &self,
        callback: MessageCallback,
    ) -> Result<CallbackId, LinkError> {
        if self.is_closed() {
            return Err(LinkError::Closed);
        }
        self.callbacks.register(callback)
    }

    fn unregister_message_callback(&self, id: CallbackId) -> bool {
        self.callbacks.unregister(id)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Serves a [`DeviceTable`] over the controller's TCP line protocol.
#[derive(Debug, Clone)]
pub struct TcpSimulator {
    devices: Arc<DeviceTable>,
    login: Option<String>,
    response_delay: Duration,
}

impl TcpSimulator {
    pub fn new(devices: DeviceTable) -> Self {
        Self {
            devices: Arc::new(devices),
            login: None,
            response_delay: Duration::ZERO,
        }
    }

    /// Requires clients to answer a login prompt with `login`.
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Accepts connections until the listener fails.
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        loop {
            let (socket, peer) = listener.accept().await?;
            log::info!("simulator: client connected from {peer}");
            let session = self.clone();
            tokio::spawn(async move {
                if let Err(err) = session.handle_connection(socket).await {
                    log::debug!("simulator: connection from {peer} ended: {err}");
                }
            });
        }
    }

    async fn handle_connection(&self, socket: TcpStream) -> io::Result<()> {
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();

        if let Some(expected) = &self.login {
            loop {
                write.write_all(format!("{LOGIN_PROMPT} ").as_bytes()).await?;
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                if line.trim() == expected {
                    write
                        .write_all(format!("login successful{LINE_TERMINATOR}").as_bytes())
                        .await?;
                    break;
                }
                write
                    .write_all(format!("login incorrect{LINE_TERMINATOR}").as_bytes())
                    .await?;
            }
        }

        while let Some(line) = lines.next_line().await? {
            let Ok(request) = Request::decode(&line) else {
                log::trace!("simulator: ignoring {line:?}");
                continue;
            };
            if let Some(reply) = self.devices.reply(&request) {
                if !self.response_delay.is_zero() {
                    tokio::time::sleep(self.response_delay).await;
                }
                write
                    .write_all(format!("{reply}{LINE_TERMINATOR}").as_bytes())
                    .await?;
            }
        }
        Ok(())
    }
}
