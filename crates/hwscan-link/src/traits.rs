use hwscan_core::protocol::{Message, Request};
use hwscan_core::Address;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur on a controller connection.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed")]
    Closed,
    #[error("connection timed out")]
    Timeout,
    #[error("message callback registration rejected")]
    RegistrationRejected,
    #[error("controller rejected the login")]
    LoginRejected,
}

/// Handler invoked for every decoded inbound message.
///
/// Callbacks run on the connection's receive task and must not block.
pub type MessageCallback = Arc<dyn Fn(&Message) + Send + Sync>;

/// Token returned by [`Controller::register_message_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub(crate) u64);

/// A connection to a lighting controller.
///
/// Requests are fire-and-forget: `send` returns once the line is queued and
/// replies arrive later, unordered, through registered callbacks. Implementors
/// include [`HomeworksTcpLink`](crate::HomeworksTcpLink) for the controller's
/// TCP terminal interface.
pub trait Controller: Send + Sync {
    /// Queues `request` for transmission.
    async fn send(&self, request: Request) -> Result<(), LinkError>;

    /// Subscribes `callback` to inbound messages.
    fn register_message_callback(&self, callback: MessageCallback)
        -> Result<CallbackId, LinkError>;

    /// Removes a subscription. Returns `false` if `id` was not registered.
    fn unregister_message_callback(&self, id: CallbackId) -> bool;

    /// Whether the connection has been lost.
    fn is_closed(&self) -> bool;

    /// Why the connection is closed. Only meaningful once `is_closed` is true.
    fn closed_error(&self) -> LinkError {
        LinkError::Closed
    }

    async fn send_dimmer_level_request(&self, address: Address) -> Result<(), LinkError> {
        self.send(Request::DimmerLevel(address)).await
    }

    async fn send_contact_closure_output_state_request(
        &self,
        address: Address,
    ) -> Result<(), LinkError> {
        self.send(Request::ContactClosureOutputState(address)).await
    }

    async fn send_contact_closure_input_state_request(
        &self,
        address: Address,
    ) -> Result<(), LinkError> {
        self.send(Request::ContactClosureInputState(address)).await
    }
}
