#![allow(async_fn_in_trait)]

pub mod callbacks;
pub mod tcp;
pub mod traits;

pub use callbacks::CallbackRegistry;
pub use tcp::{HomeworksTcpLink, TcpLinkConfig};
pub use traits::{CallbackId, Controller, LinkError, MessageCallback};
