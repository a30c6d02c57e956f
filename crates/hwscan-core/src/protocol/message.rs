use super::fields;
use crate::{Address, DecodeError, MessageType};
use core::fmt;

/// Keypad button transitions reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonEvent {
    Pressed,
    Released,
    Hold,
    DoubleTap,
}

/// A decoded inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// `DL, <addr>, <level>`: dimmer output level in percent.
    DimmerLevel { address: Address, level: u8 },
    /// `CCO, <addr>, <state>`
    ContactClosureOutputState { address: Address, closed: bool },
    /// `CCI, <addr>, <state>`
    ContactClosureInputState { address: Address, closed: bool },
    /// `KBP` / `KBR` / `KBH` / `KBDT, <addr>, <button>`
    Button {
        event: ButtonEvent,
        address: Address,
        button: u8,
    },
    /// `KLS, <addr>, <led states>`
    KeypadLedStates { address: Address, states: String },
    /// Anything this codec does not model, kept verbatim.
    Other(String),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::DimmerLevel { .. } => MessageType::DimmerLevel,
            Self::ContactClosureOutputState { .. } => MessageType::ContactClosureOutputState,
            Self::ContactClosureInputState { .. } => MessageType::ContactClosureInputState,
            Self::Button { event, .. } => match event {
                ButtonEvent::Pressed => MessageType::ButtonPressed,
                ButtonEvent::Released => MessageType::ButtonReleased,
                ButtonEvent::Hold => MessageType::ButtonHold,
                ButtonEvent::DoubleTap => MessageType::ButtonDoubleTap,
            },
            Self::KeypadLedStates { .. } => MessageType::KeypadLedStates,
            Self::Other(_) => MessageType::Other,
        }
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            Self::DimmerLevel { address, .. }
            | Self::ContactClosureOutputState { address, .. }
            | Self::ContactClosureInputState { address, .. }
            | Self::Button { address, .. }
            | Self::KeypadLedStates { address, .. } => Some(*address),
            Self::Other(_) => None,
        }
    }

    /// Decodes one line received from the controller.
    ///
    /// Lines with an unknown verb decode to [`Message::Other`]. A known verb
    /// with missing or malformed fields is an error.
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DecodeError::EmptyLine);
        }

        let mut parts = fields(line);
        let verb = parts.next().unwrap_or_default().to_ascii_uppercase();
        let button_event = match verb.as_str() {
            "KBP" => Some(ButtonEvent::Pressed),
            "KBR" => Some(ButtonEvent::Released),
            "KBH" => Some(ButtonEvent::Hold),
            "KBDT" => Some(ButtonEvent::DoubleTap),
            _ => None,
        };
        let known = button_event.is_some()
            || matches!(verb.as_str(), "DL" | "CCO" | "CCI" | "KLS");
        if !known {
            return Ok(Self::Other(line.to_string()));
        }

        let address = Address::parse_lenient(parts.next().ok_or(DecodeError::MissingField)?)?;
        let value = parts.next().ok_or(DecodeError::MissingField)?;

        if let Some(event) = button_event {
            let button = value.parse().map_err(|_| DecodeError::InvalidValue)?;
            return Ok(Self::Button {
                event,
                address,
                button,
            });
        }

        match verb.as_str() {
            "DL" => Ok(Self::DimmerLevel {
                address,
                level: decode_level(value)?,
            }),
            "CCO" => Ok(Self::ContactClosureOutputState {
                address,
                closed: decode_closed(value)?,
            }),
            "CCI" => Ok(Self::ContactClosureInputState {
                address,
                closed: decode_closed(value)?,
            }),
            _ => Ok(Self::KeypadLedStates {
                address,
                states: value.to_string(),
            }),
        }
    }
}

fn decode_level(value: &str) -> Result<u8, DecodeError> {
    let level: f32 = value.parse().map_err(|_| DecodeError::InvalidValue)?;
    if !(0.0..=100.0).contains(&level) {
        return Err(DecodeError::InvalidValue);
    }
    Ok(level.round() as u8)
}

fn decode_closed(value: &str) -> Result<bool, DecodeError> {
    match value.to_ascii_uppercase().as_str() {
        "1" | "CLOSED" | "CLOSE" | "ON" => Ok(true),
        "0" | "OPEN" | "OFF" => Ok(false),
        _ => Err(DecodeError::InvalidValue),
    }
}

/// Writes the line a controller would send for this message.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimmerLevel { address, level } => write!(f, "DL, {address}, {level}"),
            Self::ContactClosureOutputState { address, closed } => {
                write!(f, "CCO, {address}, {}", u8::from(*closed))
            }
            Self::ContactClosureInputState { address, closed } => {
                write!(f, "CCI, {address}, {}", u8::from(*closed))
            }
            Self::Button {
                event,
                address,
                button,
            } => {
                let verb = match event {
                    ButtonEvent::Pressed => "KBP",
                    ButtonEvent::Released => "KBR",
                    ButtonEvent::Hold => "KBH",
                    ButtonEvent::DoubleTap => "KBDT",
                };
                write!(f, "{verb}, {address}, {button}")
            }
            Self::KeypadLedStates { address, states } => write!(f, "KLS, {address}, {states}"),
            Self::Other(line) => f.write_str(line),
        }
    }
}
