use crate::AddressError;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

/// Maximum number of components in an address.
pub const MAX_DEPTH: usize = 4;

/// Exclusive upper bound of a single address component.
pub const COMPONENT_RADIX: u32 = 100;

/// A device address such as `[01:04:00:12]`.
///
/// Addresses hold 1 to 4 components in the range `00..=99`, most significant
/// first. Equality, hashing, and ordering use the normalized component tuple,
/// so `[1:4]` read leniently from the wire equals `[01:04]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    depth: u8,
    // Unused trailing slots are always zero.
    components: [u8; MAX_DEPTH],
}

impl Address {
    /// `[00:00:00:00]`, the lowest four-component address.
    pub const FULL_MIN: Self = Self {
        depth: MAX_DEPTH as u8,
        components: [0; MAX_DEPTH],
    };

    /// `[99:99:99:99]`, the highest four-component address.
    pub const FULL_MAX: Self = Self {
        depth: MAX_DEPTH as u8,
        components: [99; MAX_DEPTH],
    };

    /// Builds an address from its components.
    pub fn new(components: &[u8]) -> Result<Self, AddressError> {
        if components.is_empty() {
            return Err(AddressError::NoComponents);
        }
        if components.len() > MAX_DEPTH {
            return Err(AddressError::TooManyComponents);
        }
        if components.iter().any(|&c| u32::from(c) >= COMPONENT_RADIX) {
            return Err(AddressError::InvalidComponent);
        }
        let mut out = [0u8; MAX_DEPTH];
        out[..components.len()].copy_from_slice(components);
        Ok(Self {
            depth: components.len() as u8,
            components: out,
        })
    }

    /// Parses the canonical form: brackets around 1 to 4 colon-separated
    /// components of exactly two ASCII digits.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        parse_with(text, |component| {
            let bytes = component.as_bytes();
            if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
                return None;
            }
            Some((bytes[0] - b'0') * 10 + (bytes[1] - b'0'))
        })
    }

    /// Parses an address as controllers print it, tolerating one-digit
    /// components and whitespace around the brackets and separators.
    pub fn parse_lenient(text: &str) -> Result<Self, AddressError> {
        parse_with(text.trim(), |component| {
            let component = component.trim();
            let bytes = component.as_bytes();
            if bytes.is_empty() || bytes.len() > 2 || !bytes.iter().all(u8::is_ascii_digit) {
                return None;
            }
            component.parse::<u8>().ok()
        })
    }

    pub const fn depth(&self) -> usize {
        self.depth as usize
    }

    pub fn components(&self) -> &[u8] {
        &self.components[..self.depth as usize]
    }

    /// The address read as a base-100 number.
    pub fn value(&self) -> u32 {
        self.components()
            .iter()
            .fold(0u32, |acc, &c| acc * COMPONENT_RADIX + u32::from(c))
    }

    /// Inverse of [`Address::value`] for a given depth.
    ///
    /// Returns `None` when `value` does not fit in `depth` components.
    pub fn from_value(depth: usize, value: u32) -> Option<Self> {
        if depth == 0 || depth > MAX_DEPTH || u64::from(value) >= capacity(depth) {
            return None;
        }
        let mut components = [0u8; MAX_DEPTH];
        let mut rest = value;
        for slot in components[..depth].iter_mut().rev() {
            *slot = (rest % COMPONENT_RADIX) as u8;
            rest /= COMPONENT_RADIX;
        }
        Some(Self {
            depth: depth as u8,
            components,
        })
    }

    /// The lowest address of the given depth, `[00:...:00]`.
    pub fn min_of_depth(depth: usize) -> Option<Self> {
        Self::from_value(depth, 0)
    }

    /// The highest address of the given depth, `[99:...:99]`.
    pub fn max_of_depth(depth: usize) -> Option<Self> {
        let top = capacity(depth).checked_sub(1)?;
        Self::from_value(depth, u32::try_from(top).ok()?)
    }
}

/// Number of distinct addresses with `depth` components.
pub(crate) fn capacity(depth: usize) -> u64 {
    u64::from(COMPONENT_RADIX).pow(depth as u32)
}

fn parse_with(text: &str, component: impl Fn(&str) -> Option<u8>) -> Result<Address, AddressError> {
    if text.is_empty() {
        return Err(AddressError::Empty);
    }
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(AddressError::MissingBrackets)?;
    if inner.trim().is_empty() {
        return Err(AddressError::NoComponents);
    }

    let mut components = [0u8; MAX_DEPTH];
    let mut depth = 0usize;
    for part in inner.split(':') {
        if depth == MAX_DEPTH {
            return Err(AddressError::TooManyComponents);
        }
        components[depth] = component(part).ok_or(AddressError::InvalidComponent)?;
        depth += 1;
    }

    Ok(Address {
        depth: depth as u8,
        components,
    })
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(other.components())
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, c) in self.components().iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{c:02}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Address::parse(&text).map_err(serde::de::Error::custom)
    }
}
