use super::fields;
use crate::{Address, DecodeError, ProbeKind};
use core::fmt;

pub const VERB_REQUEST_DIMMER_LEVEL: &str = "RDL";
pub const VERB_REQUEST_CCO_STATE: &str = "RCCO";
pub const VERB_REQUEST_CCI_STATE: &str = "RCCI";

/// A fire-and-forget state request addressed to one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    DimmerLevel(Address),
    ContactClosureOutputState(Address),
    ContactClosureInputState(Address),
}

impl Request {
    /// The request that tests for `kind` at `address`.
    pub const fn probe(kind: ProbeKind, address: Address) -> Self {
        match kind {
            ProbeKind::Dimmer => Self::DimmerLevel(address),
            ProbeKind::ContactClosureOutput => Self::ContactClosureOutputState(address),
            ProbeKind::ContactClosureInput => Self::ContactClosureInputState(address),
        }
    }

    pub const fn address(&self) -> Address {
        match self {
            Self::DimmerLevel(a)
            | Self::ContactClosureOutputState(a)
            | Self::ContactClosureInputState(a) => *a,
        }
    }

    pub const fn probe_kind(&self) -> ProbeKind {
        match self {
            Self::DimmerLevel(_) => ProbeKind::Dimmer,
            Self::ContactClosureOutputState(_) => ProbeKind::ContactClosureOutput,
            Self::ContactClosureInputState(_) => ProbeKind::ContactClosureInput,
        }
    }

    const fn verb(&self) -> &'static str {
        match self {
            Self::DimmerLevel(_) => VERB_REQUEST_DIMMER_LEVEL,
            Self::ContactClosureOutputState(_) => VERB_REQUEST_CCO_STATE,
            Self::ContactClosureInputState(_) => VERB_REQUEST_CCI_STATE,
        }
    }

    /// Decodes a request line, as a controller would receive it.
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut parts = fields(line);
        let verb = parts.next().filter(|v| !v.is_empty()).ok_or(DecodeError::EmptyLine)?;
        let address = Address::parse_lenient(parts.next().ok_or(DecodeError::MissingField)?)?;
        if verb.eq_ignore_ascii_case(VERB_REQUEST_DIMMER_LEVEL) {
            Ok(Self::DimmerLevel(address))
        } else if verb.eq_ignore_ascii_case(VERB_REQUEST_CCO_STATE) {
            Ok(Self::ContactClosureOutputState(address))
        } else if verb.eq_ignore_ascii_case(VERB_REQUEST_CCI_STATE) {
            Ok(Self::ContactClosureInputState(address))
        } else {
            Err(DecodeError::InvalidValue)
        }
    }
}

/// Writes the request line without its terminator.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.verb(), self.address())
    }
}

/// Session-level commands sent once after connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCommand {
    PromptOff,
    DimmerLevelMonitor,
    KeypadButtonMonitor,
    GrafikEyeMonitor,
    KeypadLedMonitor,
}

impl SessionCommand {
    /// Commands that make the controller report state changes unprompted.
    pub const MONITORING: [SessionCommand; 4] = [
        SessionCommand::PromptOff,
        SessionCommand::DimmerLevelMonitor,
        SessionCommand::KeypadButtonMonitor,
        SessionCommand::GrafikEyeMonitor,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PromptOff => "PROMPTOFF",
            Self::DimmerLevelMonitor => "DLMON",
            Self::KeypadButtonMonitor => "KBMON",
            Self::GrafikEyeMonitor => "GSMON",
            Self::KeypadLedMonitor => "KLMON",
        }
    }
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
