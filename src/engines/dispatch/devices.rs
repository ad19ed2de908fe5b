use crate::config::DeviceConfig;
use crate::error::SearchError;
use crate::types::Device;
use log::warn;

pub const VISIBLE_DEVICES_VAR: &str = "CUDA_VISIBLE_DEVICES";

/// Reports the accelerators a run may use.
pub trait DeviceEnumerator {
    fn devices(&self) -> Vec<Device>;
}

impl DeviceEnumerator for Vec<Device> {
    fn devices(&self) -> Vec<Device> {
        self.clone()
    }
}

/// Devices from explicit config ids, falling back to `CUDA_VISIBLE_DEVICES`.
pub struct ConfiguredDevices {
    config: DeviceConfig,
}

impl ConfiguredDevices {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

impl DeviceEnumerator for ConfiguredDevices {
    fn devices(&self) -> Vec<Device> {
        match &self.config.ids {
            Some(ids) => ids.iter().copied().map(Device).collect(),
            None => std::env::var(VISIBLE_DEVICES_VAR)
                .map(|value| parse_visible_devices(&value))
                .unwrap_or_default(),
        }
    }
}

/// Parse a `CUDA_VISIBLE_DEVICES` list. Entries that are not plain indices
/// (UUIDs, `-1`) cannot be pinned by index and are skipped.
pub fn parse_visible_devices(value: &str) -> Vec<Device> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<usize>() {
            Ok(id) => Some(Device(id)),
            Err(_) => {
                warn!("Ignoring non-index device entry '{}'", entry);
                None
            }
        })
        .collect()
}

/// Enumerate devices, failing the run if there are none.
pub fn require_devices<D: DeviceEnumerator + ?Sized>(
    enumerator: &D,
) -> Result<Vec<Device>, SearchError> {
    let devices = enumerator.devices();
    if devices.is_empty() {
        return Err(SearchError::NoDevices);
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_index_lists() {
        assert_eq!(
            parse_visible_devices("0, 2,3"),
            vec![Device(0), Device(2), Device(3)]
        );
        assert_eq!(parse_visible_devices(""), Vec::<Device>::new());
        assert_eq!(parse_visible_devices("GPU-8a1b,1"), vec![Device(1)]);
    }

    #[test]
    fn explicit_ids_win() {
        let devices = ConfiguredDevices::new(DeviceConfig {
            ids: Some(vec![4, 5]),
        });
        assert_eq!(devices.devices(), vec![Device(4), Device(5)]);
    }

    #[test]
    fn zero_devices_is_fatal() {
        let none = ConfiguredDevices::new(DeviceConfig { ids: Some(vec![]) });
        assert!(matches!(require_devices(&none), Err(SearchError::NoDevices)));
    }
}
