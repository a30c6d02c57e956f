use core::fmt;

/// A capability test issued against one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbeKind {
    Dimmer,
    ContactClosureOutput,
    ContactClosureInput,
}

impl ProbeKind {
    /// Every probe kind in the order a scan issues them.
    pub const ALL: [ProbeKind; 3] = [
        ProbeKind::Dimmer,
        ProbeKind::ContactClosureOutput,
        ProbeKind::ContactClosureInput,
    ];

    /// The inbound message type that answers this probe.
    pub const fn expected_message(self) -> MessageType {
        match self {
            Self::Dimmer => MessageType::DimmerLevel,
            Self::ContactClosureOutput => MessageType::ContactClosureOutputState,
            Self::ContactClosureInput => MessageType::ContactClosureInputState,
        }
    }

    /// The device type a successful probe identifies.
    pub const fn device_type(self) -> DeviceType {
        match self {
            Self::Dimmer => DeviceType::Light,
            Self::ContactClosureOutput => DeviceType::ContactClosureOutput,
            Self::ContactClosureInput => DeviceType::ContactClosureInput,
        }
    }

    /// Position in [`ProbeKind::ALL`].
    pub const fn order(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dimmer => "dimmer",
            Self::ContactClosureOutput => "contact-closure-output",
            Self::ContactClosureInput => "contact-closure-input",
        })
    }
}

/// Kind of device found at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DeviceType {
    Light,
    #[cfg_attr(feature = "serde", serde(rename = "cco"))]
    ContactClosureOutput,
    #[cfg_attr(feature = "serde", serde(rename = "cci"))]
    ContactClosureInput,
}

impl DeviceType {
    /// Short identifier used in persisted configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::ContactClosureOutput => "cco",
            Self::ContactClosureInput => "cci",
        }
    }

    /// Human-readable label used in generated device names.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::ContactClosureOutput => "CCO",
            Self::ContactClosureInput => "CCI",
        }
    }

    pub const fn probe_kind(self) -> ProbeKind {
        match self {
            Self::Light => ProbeKind::Dimmer,
            Self::ContactClosureOutput => ProbeKind::ContactClosureOutput,
            Self::ContactClosureInput => ProbeKind::ContactClosureInput,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Type tag of an inbound controller message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    DimmerLevel,
    ContactClosureOutputState,
    ContactClosureInputState,
    ButtonPressed,
    ButtonReleased,
    ButtonHold,
    ButtonDoubleTap,
    KeypadLedStates,
    Other,
}

impl MessageType {
    /// The probe this message answers, if any.
    pub const fn probe_kind(self) -> Option<ProbeKind> {
        match self {
            Self::DimmerLevel => Some(ProbeKind::Dimmer),
            Self::ContactClosureOutputState => Some(ProbeKind::ContactClosureOutput),
            Self::ContactClosureInputState => Some(ProbeKind::ContactClosureInput),
            _ => None,
        }
    }
}
