//! Controller addressing and line protocol in pure Rust.
//!
//! `hwscan-core` provides the I/O-free building blocks of the hwscan crate
//! family: the bracketed device [`Address`], the lazy [`AddressRange`]
//! enumerator, probe and device classifications, and the ASCII line codec
//! spoken by HomeWorks-style lighting controllers.
//!
//! # Feature flags
//!
//! - **`serde`**: derives `Serialize`/`Deserialize` on core types. Addresses
//!   serialize as their canonical text form.

/// Bracketed device addresses.
pub mod address;
/// Error types for address parsing and line decoding.
pub mod error;
/// Probe kinds, device types, and inbound message types.
pub mod probe;
/// Request encoding, inbound message decoding, and line framing.
pub mod protocol;
/// Ordered enumeration of the address space between two bounds.
pub mod range;

pub use address::Address;
pub use error::{AddressError, DecodeError};
pub use probe::{DeviceType, MessageType, ProbeKind};
pub use range::{AddressIter, AddressRange};
