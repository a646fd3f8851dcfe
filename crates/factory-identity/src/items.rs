//! Factory items written to the provisioning store.

use crate::certificate::CommonName;
use crate::profile::DeviceProfile;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Well-known factory item names understood by the device client.
pub mod names {
    pub const USE_BOOTSTRAP: &str = "mbed.UseBootstrap";
    pub const ENDPOINT_NAME: &str = "mbed.EndpointName";
    pub const BOOTSTRAP_DEVICE_CERT: &str = "mbed.BootstrapDeviceCert";
    pub const BOOTSTRAP_SERVER_CA_CERT: &str = "mbed.BootstrapServerCACert";
    pub const BOOTSTRAP_SERVER_URI: &str = "mbed.BootstrapServerURI";
    pub const FIRST_TO_CLAIM: &str = "mbed.FirstToClaim";
    pub const MANUFACTURER: &str = "mbed.Manufacturer";
    pub const MODEL_NUMBER: &str = "mbed.ModelNumber";
    pub const SERIAL_NUMBER: &str = "mbed.SerialNumber";
    pub const DEVICE_TYPE: &str = "mbed.DeviceType";
    pub const HARDWARE_VERSION: &str = "mbed.HardwareVersion";
    pub const MEMORY_TOTAL_KB: &str = "mbed.MemoryTotalKB";
}

/// How the provisioning store classifies an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Opaque configuration value.
    Config,
    /// X.509 certificate, DER.
    Certificate,
}

/// The value of a factory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    /// 32-bit scalar, stored little-endian.
    Scalar(u32),
    /// String, stored without terminator.
    Text(String),
    /// DER certificate.
    Certificate(Vec<u8>),
}

impl ItemValue {
    /// Returns the store classification of this value.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Scalar(_) | Self::Text(_) => ItemKind::Config,
            Self::Certificate(_) => ItemKind::Certificate,
        }
    }

    /// Returns the bytes written to the store.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Scalar(v) => Cow::Owned(v.to_le_bytes().to_vec()),
            Self::Text(s) => Cow::Borrowed(s.as_bytes()),
            Self::Certificate(der) => Cow::Borrowed(der),
        }
    }
}

/// One named entry of the factory item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryItem {
    pub name: &'static str,
    pub value: ItemValue,
}

impl FactoryItem {
    pub fn new(name: &'static str, value: ItemValue) -> Self {
        Self { name, value }
    }

    pub fn kind(&self) -> ItemKind {
        self.value.kind()
    }
}

/// Builds the ordered factory item table for one device.
///
/// The CN is used both as the endpoint name and the serial number.
pub fn factory_items(
    profile: &DeviceProfile,
    common_name: &CommonName,
    device_cert: &[u8],
) -> Vec<FactoryItem> {
    use names::*;

    vec![
        // Device general info
        FactoryItem::new(USE_BOOTSTRAP, ItemValue::Scalar(profile.use_bootstrap.into())),
        FactoryItem::new(ENDPOINT_NAME, ItemValue::Text(common_name.to_string())),
        // Bootstrap configuration
        FactoryItem::new(
            BOOTSTRAP_DEVICE_CERT,
            ItemValue::Certificate(device_cert.to_vec()),
        ),
        FactoryItem::new(
            BOOTSTRAP_SERVER_CA_CERT,
            ItemValue::Certificate(profile.bootstrap_ca.clone()),
        ),
        FactoryItem::new(
            BOOTSTRAP_SERVER_URI,
            ItemValue::Text(profile.bootstrap_server_uri.clone()),
        ),
        FactoryItem::new(FIRST_TO_CLAIM, ItemValue::Scalar(profile.first_to_claim.into())),
        // Device metadata
        FactoryItem::new(MANUFACTURER, ItemValue::Text(profile.manufacturer.clone())),
        FactoryItem::new(MODEL_NUMBER, ItemValue::Text(profile.model_number.clone())),
        FactoryItem::new(SERIAL_NUMBER, ItemValue::Text(common_name.to_string())),
        FactoryItem::new(DEVICE_TYPE, ItemValue::Text(profile.device_type.clone())),
        FactoryItem::new(
            HARDWARE_VERSION,
            ItemValue::Text(profile.hardware_version.clone()),
        ),
        FactoryItem::new(MEMORY_TOTAL_KB, ItemValue::Scalar(profile.memory_total_kb)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn table() -> Vec<FactoryItem> {
        let cn = CommonName::new("device123").unwrap();
        factory_items(&DeviceProfile::default(), &cn, &[0x30, 0x00])
    }

    #[test]
    fn test_table_names_unique() {
        let items = table();
        let names: HashSet<_> = items.iter().map(|i| i.name).collect();
        assert_eq!(items.len(), 12);
        assert_eq!(names.len(), items.len());
    }

    #[test]
    fn test_cn_used_twice() {
        let items = table();
        for name in [names::ENDPOINT_NAME, names::SERIAL_NUMBER] {
            let item = items.iter().find(|i| i.name == name).unwrap();
            assert_eq!(item.value, ItemValue::Text("device123".to_string()));
        }
    }

    #[test]
    fn test_kinds() {
        let items = table();
        let certs: Vec<_> = items
            .iter()
            .filter(|i| i.kind() == ItemKind::Certificate)
            .map(|i| i.name)
            .collect();
        assert_eq!(
            certs,
            vec![names::BOOTSTRAP_DEVICE_CERT, names::BOOTSTRAP_SERVER_CA_CERT]
        );
    }

    #[test]
    fn test_scalar_encoding() {
        assert_eq!(ItemValue::Scalar(1).to_bytes().as_ref(), &[1, 0, 0, 0]);
        assert_eq!(ItemValue::Scalar(1024).to_bytes().as_ref(), &[0, 4, 0, 0]);
        assert_eq!(ItemValue::Text("PSOC64".into()).to_bytes().as_ref(), b"PSOC64");
    }
}
