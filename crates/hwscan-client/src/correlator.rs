//! Latest-response table fed by the controller's message callback.
//!
//! The controller protocol has no transaction identifier, so a reply can only
//! be matched to a request by its address and message type. The table keeps
//! one slot per address and every probe-answer message overwrites it; readers
//! filter by the type they expect. Callers must keep at most one probe
//! outstanding per address and clear the slot before each request.

use hwscan_core::protocol::Message;
use hwscan_core::{Address, MessageType};
use hwscan_link::MessageCallback;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::Instant;

/// The most recent probe answer seen for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResponse {
    pub address: Address,
    pub message_type: MessageType,
    pub message: Message,
    pub observed_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCorrelator {
    table: Mutex<HashMap<Address, PendingResponse>>,
    generation: watch::Sender<u64>,
}

impl ResponseCorrelator {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            table: Mutex::new(HashMap::new()),
            generation,
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Address, PendingResponse>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `message` if it answers a probe; other traffic is ignored.
    pub fn on_message(&self, message: &Message) {
        let message_type = message.message_type();
        if message_type.probe_kind().is_none() {
            return;
        }
        let Some(address) = message.address() else {
            return;
        };
        let response = PendingResponse {
            address,
            message_type,
            message: message.clone(),
            observed_at: Instant::now(),
        };
        self.table().insert(address, response);
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    /// A callback suitable for [`Controller::register_message_callback`].
    ///
    /// [`Controller::register_message_callback`]: hwscan_link::Controller::register_message_callback
    pub fn callback(self: &Arc<Self>) -> MessageCallback {
        let correlator = Arc::clone(self);
        Arc::new(move |message: &Message| correlator.on_message(message))
    }

    /// The stored response for `address` if it has the expected type.
    pub fn lookup(&self, address: Address, expected: MessageType) -> Option<PendingResponse> {
        self.table()
            .get(&address)
            .filter(|r| r.message_type == expected)
            .cloned()
    }

    /// Like [`lookup`](Self::lookup), ignoring responses observed after `deadline`.
    pub fn lookup_observed_by(
        &self,
        address: Address,
        expected: MessageType,
        deadline: Instant,
    ) -> Option<PendingResponse> {
        self.lookup(address, expected)
            .filter(|r| r.observed_at <= deadline)
    }

    /// Forgets whatever was stored for `address`.
    pub fn clear(&self, address: Address) -> Option<PendingResponse> {
        self.table().remove(&address)
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A receiver that is marked changed on every recorded response.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

impl Default for ResponseCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
