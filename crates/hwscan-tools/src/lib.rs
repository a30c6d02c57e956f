use clap::ValueEnum;
use hwscan_core::{Address, ProbeKind};

/// CLI-friendly enum for selecting probe kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeKindArg {
    /// Dimmer level request (`RDL`).
    Dimmer,
    /// Contact-closure output state request (`RCCO`).
    #[value(name = "cco")]
    ContactClosureOutput,
    /// Contact-closure input state request (`RCCI`).
    #[value(name = "cci")]
    ContactClosureInput,
}

impl ProbeKindArg {
    pub const fn into_probe_kind(self) -> ProbeKind {
        match self {
            Self::Dimmer => ProbeKind::Dimmer,
            Self::ContactClosureOutput => ProbeKind::ContactClosureOutput,
            Self::ContactClosureInput => ProbeKind::ContactClosureInput,
        }
    }
}

/// Clap value parser for bracketed addresses such as `[01:04:00:12]`.
pub fn parse_address(text: &str) -> Result<Address, String> {
    Address::parse(text).map_err(|err| format!("{err}: {text:?}"))
}
