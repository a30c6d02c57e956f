use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    Empty,
    MissingBrackets,
    NoComponents,
    TooManyComponents,
    InvalidComponent,
    MismatchedDepth { start: u8, end: u8 },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty address"),
            Self::MissingBrackets => f.write_str("address must be enclosed in brackets"),
            Self::NoComponents => f.write_str("address has no components"),
            Self::TooManyComponents => f.write_str("address has more than 4 components"),
            Self::InvalidComponent => {
                f.write_str("address components must be two decimal digits")
            }
            Self::MismatchedDepth { start, end } => write!(
                f,
                "range bounds have different depths ({start} and {end} components)"
            ),
        }
    }
}

impl std::error::Error for AddressError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    EmptyLine,
    MissingField,
    InvalidAddress(AddressError),
    InvalidValue,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLine => f.write_str("empty line"),
            Self::MissingField => f.write_str("missing field"),
            Self::InvalidAddress(err) => write!(f, "invalid address: {err}"),
            Self::InvalidValue => f.write_str("invalid value"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<AddressError> for DecodeError {
    fn from(err: AddressError) -> Self {
        Self::InvalidAddress(err)
    }
}
