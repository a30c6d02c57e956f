use crate::{Address, AddressError};
use core::iter::FusedIterator;

/// Default lower scan bound offered to users.
pub const DEFAULT_START: &str = "[00:00:00:00]";
/// Default upper scan bound offered to users.
pub const DEFAULT_END: &str = "[99:99:99:99]";

/// The inclusive span of addresses between two bounds of equal depth.
///
/// A range is a pure value: iterating it performs no I/O and can be repeated
/// any number of times with the same result. Addresses are produced in
/// ascending order, least significant component counting fastest. A range
/// whose start sorts after its end is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: Address,
    end: Address,
}

impl AddressRange {
    pub fn new(start: Address, end: Address) -> Result<Self, AddressError> {
        if start.depth() != end.depth() {
            return Err(AddressError::MismatchedDepth {
                start: start.depth() as u8,
                end: end.depth() as u8,
            });
        }
        Ok(Self { start, end })
    }

    /// Validates both bounds in canonical form and builds the range.
    pub fn parse(start: &str, end: &str) -> Result<Self, AddressError> {
        Self::new(Address::parse(start)?, Address::parse(end)?)
    }

    pub const fn start(&self) -> Address {
        self.start
    }

    pub const fn end(&self) -> Address {
        self.end
    }

    /// Number of addresses the range yields.
    pub fn len(&self) -> u64 {
        let (start, end) = (self.start.value(), self.end.value());
        if start > end {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, address: &Address) -> bool {
        address.depth() == self.start.depth() && self.start <= *address && *address <= self.end
    }

    pub fn iter(&self) -> AddressIter {
        let next = self.start.value();
        let end = self.end.value();
        AddressIter {
            depth: self.start.depth(),
            next,
            end,
            done: next > end,
        }
    }
}

impl Default for AddressRange {
    fn default() -> Self {
        Self {
            start: Address::FULL_MIN,
            end: Address::FULL_MAX,
        }
    }
}

impl IntoIterator for &AddressRange {
    type Item = Address;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AddressRange {
    type Item = Address;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`AddressRange`].
#[derive(Debug, Clone)]
pub struct AddressIter {
    depth: usize,
    next: u32,
    end: u32,
    done: bool,
}

impl Iterator for AddressIter {
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = Address::from_value(self.depth, self.next)?;
        if self.next == self.end {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.done {
            0
        } else {
            (self.end - self.next) as usize + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AddressIter {}

impl FusedIterator for AddressIter {}

#[cfg(test)]
mod tests {
    use super::{AddressRange, DEFAULT_END, DEFAULT_START};
    use crate::{Address, AddressError};
    use proptest::prelude::*;

    fn texts(range: &AddressRange) -> Vec<String> {
        range.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn enumerates_small_range_in_order() {
        let range = AddressRange::parse("[00:00:00:00]", "[00:00:00:02]").unwrap();
        assert_eq!(
            texts(&range),
            ["[00:00:00:00]", "[00:00:00:01]", "[00:00:00:02]"]
        );
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn carries_into_higher_components() {
        let range = AddressRange::parse("[01:98]", "[02:01]").unwrap();
        assert_eq!(texts(&range), ["[01:98]", "[01:99]", "[02:00]", "[02:01]"]);
    }

    #[test]
    fn reversed_bounds_yield_nothing() {
        let range = AddressRange::parse("[00:00:00:05]", "[00:00:00:01]").unwrap();
        assert!(range.is_empty());
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn single_address_range() {
        let range = AddressRange::parse("[42]", "[42]").unwrap();
        assert_eq!(texts(&range), ["[42]"]);
    }

    #[test]
    fn range_is_restartable() {
        let range = AddressRange::parse("[03:00]", "[03:10]").unwrap();
        let first: Vec<_> = range.iter().collect();
        let second: Vec<_> = (&range).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_bounds_before_enumerating() {
        assert_eq!(
            AddressRange::parse("[00:00]", "[00:00:01]"),
            Err(AddressError::MismatchedDepth { start: 2, end: 3 })
        );
        assert_eq!(
            AddressRange::parse("00:00", "[00:01]"),
            Err(AddressError::MissingBrackets)
        );
    }

    #[test]
    fn default_range_spans_full_depth() {
        let range = AddressRange::default();
        assert_eq!(range, AddressRange::parse(DEFAULT_START, DEFAULT_END).unwrap());
        assert_eq!(range.len(), 100_000_000);
        assert_eq!(range.iter().len(), 100_000_000);
        assert_eq!(range.iter().next(), Some(Address::parse(DEFAULT_START).unwrap()));
    }

    #[test]
    fn contains_respects_depth() {
        let range = AddressRange::parse("[01:00]", "[01:50]").unwrap();
        assert!(range.contains(&Address::parse("[01:20]").unwrap()));
        assert!(!range.contains(&Address::parse("[01:51]").unwrap()));
        assert!(!range.contains(&Address::parse("[01]").unwrap()));
    }

    proptest! {
        #[test]
        fn len_matches_iteration(a in 0u32..10_000, b in 0u32..10_000) {
            let start = Address::from_value(2, a).unwrap();
            let end = Address::from_value(2, b).unwrap();
            let range = AddressRange::new(start, end).unwrap();
            let items: Vec<_> = range.iter().collect();
            prop_assert_eq!(items.len() as u64, range.len());
            prop_assert!(items.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
