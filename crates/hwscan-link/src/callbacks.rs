use crate::{CallbackId, LinkError, MessageCallback};
use hwscan_core::protocol::Message;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Subscriber table shared between a connection handle and its receive task.
pub struct CallbackRegistry {
    entries: Mutex<Vec<(CallbackId, MessageCallback)>>,
    next_id: AtomicU64,
    limit: Option<usize>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            limit: None,
        }
    }

    /// A registry that rejects registrations beyond `limit` live subscribers.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(CallbackId, MessageCallback)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, callback: MessageCallback) -> Result<CallbackId, LinkError> {
        let mut entries = self.entries();
        if self.limit.is_some_and(|limit| entries.len() >= limit) {
            return Err(LinkError::RegistrationRejected);
        }
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        entries.push((id, callback));
        Ok(id)
    }

    pub fn unregister(&self, id: CallbackId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `message` to every subscriber.
    ///
    /// The table lock is released before callbacks run, so a callback may
    /// register or unregister subscribers.
    pub fn dispatch(&self, message: &Message) {
        let snapshot: Vec<MessageCallback> =
            self.entries().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in snapshot {
            callback(message);
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("subscribers", &self.len())
            .field("limit", &self.limit)
            .finish()
    }
}
