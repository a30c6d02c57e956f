pub mod framer;
pub mod message;
pub mod request;

pub use framer::{is_login_prompt, LineFramer};
pub use message::{ButtonEvent, Message};
pub use request::{Request, SessionCommand};

/// Terminator appended to every outbound line.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Default TCP port of the controller's terminal interface.
pub const DEFAULT_PORT: u16 = 23;

/// Prompt the controller prints when it expects credentials.
pub const LOGIN_PROMPT: &str = "LOGIN:";

/// Splits a line into trimmed comma-separated fields.
pub(crate) fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim)
}
