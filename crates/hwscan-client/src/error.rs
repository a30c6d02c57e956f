use crate::DiscoveryReport;
use hwscan_core::AddressError;
use hwscan_link::LinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid address: {0}")]
    InvalidAddressFormat(#[from] AddressError),
    #[error("message callback registration failed: {0}")]
    RegistrationFailed(#[source] LinkError),
    #[error("a discovery run is already in progress")]
    AlreadyRunning,
    #[error("connection lost during discovery: {source}")]
    ConnectionLost {
        #[source]
        source: LinkError,
        /// Everything found before the connection dropped.
        partial: Box<DiscoveryReport>,
    },
}

impl DiscoveryError {
    /// The partial result carried by [`DiscoveryError::ConnectionLost`].
    pub fn partial_report(&self) -> Option<&DiscoveryReport> {
        match self {
            Self::ConnectionLost { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
