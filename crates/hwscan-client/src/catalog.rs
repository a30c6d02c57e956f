use hwscan_core::{Address, DeviceType};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Fade rate, in seconds, given to lights added from a discovery run.
pub const DEFAULT_FADE_RATE: f32 = 1.0;

/// A device that answered a probe.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveredDevice {
    pub address: Address,
    pub device_type: DeviceType,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub selected: bool,
}

impl DiscoveredDevice {
    pub fn new(address: Address, device_type: DeviceType, name: impl Into<String>) -> Self {
        Self {
            address,
            device_type,
            name: name.into(),
            selected: false,
        }
    }
}

/// Devices found by one discovery run, keyed and ordered by address.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DiscoveryCatalog {
    devices: BTreeMap<Address, DiscoveredDevice>,
}

impl DiscoveryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device, returning the entry it replaced.
    pub fn insert(&mut self, device: DiscoveredDevice) -> Option<DiscoveredDevice> {
        self.devices.insert(device.address, device)
    }

    pub fn get(&self, address: &Address) -> Option<&DiscoveredDevice> {
        self.devices.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.devices.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredDevice> {
        self.devices.values()
    }

    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.devices.keys().copied()
    }

    /// Marks a device for import. Returns `false` if `address` is unknown.
    pub fn select(&mut self, address: &Address, selected: bool) -> bool {
        match self.devices.get_mut(address) {
            Some(device) => {
                device.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        for device in self.devices.values_mut() {
            device.selected = true;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &DiscoveredDevice> {
        self.devices.values().filter(|d| d.selected)
    }

    /// Configuration records for the selected devices.
    ///
    /// Lights become dimmer records with [`DEFAULT_FADE_RATE`]; contact-closure
    /// outputs and inputs become switch records.
    pub fn config_records(&self) -> ConfigRecords {
        let mut records = ConfigRecords::default();
        for device in self.selected() {
            match device.device_type {
                DeviceType::Light => records.dimmers.push(DimmerRecord {
                    addr: device.address,
                    name: device.name.clone(),
                    rate: DEFAULT_FADE_RATE,
                }),
                DeviceType::ContactClosureOutput | DeviceType::ContactClosureInput => {
                    records.switches.push(SwitchRecord {
                        addr: device.address,
                        name: device.name.clone(),
                    })
                }
            }
        }
        records
    }
}

impl IntoIterator for DiscoveryCatalog {
    type Item = DiscoveredDevice;
    type IntoIter = btree_map::IntoValues<Address, DiscoveredDevice>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_values()
    }
}

/// A light entry for the controller configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimmerRecord {
    pub addr: Address,
    pub name: String,
    pub rate: f32,
}

/// A switch entry for the controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchRecord {
    pub addr: Address,
    pub name: String,
}

/// Records ready to be merged into the persisted controller configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigRecords {
    pub dimmers: Vec<DimmerRecord>,
    pub switches: Vec<SwitchRecord>,
}
