//! Discovery of devices attached to a HomeWorks-style lighting controller.
//!
//! The [`DiscoveryEngine`] walks a range of bracketed addresses and asks the
//! controller, one address and one device kind at a time, for the state of a
//! dimmer, a contact-closure output, or a contact-closure input. Addresses
//! that answer are collected into a [`DiscoveryCatalog`].
//!
//! ```no_run
//! use hwscan_client::DiscoveryEngine;
//! use hwscan_link::{HomeworksTcpLink, TcpLinkConfig};
//!
//! # async fn scan() -> Result<(), Box<dyn std::error::Error>> {
//! let link = HomeworksTcpLink::connect(TcpLinkConfig::new("192.168.1.50")).await?;
//! let report = DiscoveryEngine::new()
//!     .discover(&link, "[01:01:00:01]", "[01:01:00:20]")
//!     .await?;
//! for device in report.catalog.iter() {
//!     println!("{} {} {}", device.address, device.device_type, device.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! - **`serde`**: serialization for catalogs, reports, and config records.

pub mod cancel;
pub mod catalog;
pub mod correlator;
pub mod discovery;
pub mod error;
pub mod progress;
pub mod simulator;

pub use cancel::{cancellation, CancelHandle, CancelToken};
pub use catalog::{
    ConfigRecords, DimmerRecord, DiscoveredDevice, DiscoveryCatalog, SwitchRecord,
    DEFAULT_FADE_RATE,
};
pub use correlator::{PendingResponse, ResponseCorrelator};
pub use discovery::{Ambiguity, DiscoveryConfig, DiscoveryEngine, DiscoveryReport};
pub use error::DiscoveryError;
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use simulator::{DeviceTable, SimulatedController, TcpSimulator};
