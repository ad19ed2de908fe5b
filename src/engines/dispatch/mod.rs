pub mod devices;
pub mod dispatcher;

pub use devices::{require_devices, ConfiguredDevices, DeviceEnumerator};
pub use dispatcher::Dispatcher;
