//! Static per-product device metadata.
//!
//! The default profile describes the CY8CKIT-064B0S2-4343W evaluation kit
//! bootstrapping against the public bootstrap server.

/// Bootstrap server URI for the default profile.
pub const DEFAULT_BOOTSTRAP_SERVER_URI: &str = "coaps://bootstrap.us-east-1.mbedcloud.com:5684";

/// Bootstrap server root CA certificate (DER), `CN=ARM Bootstrap CA`.
pub const DEFAULT_BOOTSTRAP_CA: &[u8] = &[
    0x30, 0x82, 0x02, 0x1f, 0x30, 0x82, 0x01, 0xc5, 0xa0, 0x03, 0x02, 0x01,
    0x02, 0x02, 0x10, 0x3c, 0x63, 0x38, 0x70, 0x08, 0xd3, 0xc9, 0x8a, 0x4c,
    0x72, 0x1f, 0x8f, 0x45, 0xeb, 0xd8, 0xf3, 0x30, 0x0a, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x04, 0x03, 0x02, 0x30, 0x67, 0x31, 0x0b, 0x30,
    0x09, 0x06, 0x03, 0x55, 0x04, 0x06, 0x13, 0x02, 0x47, 0x42, 0x31, 0x17,
    0x30, 0x15, 0x06, 0x03, 0x55, 0x04, 0x08, 0x13, 0x0e, 0x43, 0x61, 0x6d,
    0x62, 0x72, 0x69, 0x64, 0x67, 0x65, 0x73, 0x68, 0x69, 0x72, 0x65, 0x31,
    0x12, 0x30, 0x10, 0x06, 0x03, 0x55, 0x04, 0x07, 0x13, 0x09, 0x43, 0x61,
    0x6d, 0x62, 0x72, 0x69, 0x64, 0x67, 0x65, 0x31, 0x10, 0x30, 0x0e, 0x06,
    0x03, 0x55, 0x04, 0x0a, 0x13, 0x07, 0x41, 0x52, 0x4d, 0x20, 0x4c, 0x74,
    0x64, 0x31, 0x19, 0x30, 0x17, 0x06, 0x03, 0x55, 0x04, 0x03, 0x13, 0x10,
    0x41, 0x52, 0x4d, 0x20, 0x42, 0x6f, 0x6f, 0x74, 0x73, 0x74, 0x72, 0x61,
    0x70, 0x20, 0x43, 0x41, 0x30, 0x20, 0x17, 0x0d, 0x31, 0x37, 0x30, 0x34,
    0x30, 0x33, 0x31, 0x34, 0x30, 0x33, 0x33, 0x36, 0x5a, 0x18, 0x0f, 0x32,
    0x30, 0x35, 0x32, 0x30, 0x34, 0x30, 0x33, 0x31, 0x34, 0x31, 0x33, 0x33,
    0x36, 0x5a, 0x30, 0x67, 0x31, 0x0b, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04,
    0x06, 0x13, 0x02, 0x47, 0x42, 0x31, 0x17, 0x30, 0x15, 0x06, 0x03, 0x55,
    0x04, 0x08, 0x13, 0x0e, 0x43, 0x61, 0x6d, 0x62, 0x72, 0x69, 0x64, 0x67,
    0x65, 0x73, 0x68, 0x69, 0x72, 0x65, 0x31, 0x12, 0x30, 0x10, 0x06, 0x03,
    0x55, 0x04, 0x07, 0x13, 0x09, 0x43, 0x61, 0x6d, 0x62, 0x72, 0x69, 0x64,
    0x67, 0x65, 0x31, 0x10, 0x30, 0x0e, 0x06, 0x03, 0x55, 0x04, 0x0a, 0x13,
    0x07, 0x41, 0x52, 0x4d, 0x20, 0x4c, 0x74, 0x64, 0x31, 0x19, 0x30, 0x17,
    0x06, 0x03, 0x55, 0x04, 0x03, 0x13, 0x10, 0x41, 0x52, 0x4d, 0x20, 0x42,
    0x6f, 0x6f, 0x74, 0x73, 0x74, 0x72, 0x61, 0x70, 0x20, 0x43, 0x41, 0x30,
    0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01,
    0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42,
    0x00, 0x04, 0x3b, 0xd3, 0xfe, 0xb0, 0xd9, 0xa4, 0x72, 0xe1, 0x11, 0x11,
    0x59, 0xba, 0x06, 0x2d, 0xf8, 0x26, 0xd5, 0x65, 0x98, 0xaa, 0xcf, 0x2a,
    0x5f, 0xc6, 0x87, 0xa5, 0x6b, 0x0e, 0x30, 0x15, 0xe8, 0x12, 0x16, 0x49,
    0x90, 0xe3, 0xf9, 0x3e, 0xf9, 0x3d, 0xde, 0xf5, 0x5a, 0x1f, 0x03, 0x44,
    0xbb, 0x81, 0x7a, 0xc9, 0x71, 0x6d, 0x6c, 0xc2, 0x42, 0x3b, 0x55, 0xdb,
    0x86, 0xad, 0x2c, 0xc0, 0xcf, 0xe4, 0xa3, 0x51, 0x30, 0x4f, 0x30, 0x0b,
    0x06, 0x03, 0x55, 0x1d, 0x0f, 0x04, 0x04, 0x03, 0x02, 0x01, 0x86, 0x30,
    0x0f, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0xff, 0x04, 0x05, 0x30,
    0x03, 0x01, 0x01, 0xff, 0x30, 0x1d, 0x06, 0x03, 0x55, 0x1d, 0x0e, 0x04,
    0x16, 0x04, 0x14, 0x84, 0xc0, 0xf5, 0x82, 0xe9, 0x5d, 0xa5, 0xe0, 0xaa,
    0x74, 0x6f, 0xf7, 0x81, 0x8f, 0x4b, 0xe8, 0x9e, 0xde, 0x5d, 0x80, 0x30,
    0x10, 0x06, 0x09, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x15, 0x01,
    0x04, 0x03, 0x02, 0x01, 0x00, 0x30, 0x0a, 0x06, 0x08, 0x2a, 0x86, 0x48,
    0xce, 0x3d, 0x04, 0x03, 0x02, 0x03, 0x48, 0x00, 0x30, 0x45, 0x02, 0x20,
    0x19, 0x24, 0x0b, 0xc4, 0xac, 0x9d, 0x2b, 0x15, 0xf8, 0xc3, 0x0c, 0x0b,
    0xf6, 0xac, 0xb3, 0xa1, 0xeb, 0x83, 0xfe, 0x1c, 0x4a, 0x96, 0x44, 0xc6,
    0xa0, 0xbb, 0x56, 0x5c, 0x84, 0x13, 0xc9, 0x0f, 0x02, 0x21, 0x00, 0xbd,
    0x89, 0x1c, 0x54, 0x98, 0xa5, 0xd0, 0x98, 0xc7, 0x0c, 0x08, 0x2f, 0xd9,
    0x1b, 0xb8, 0x7e, 0xbf, 0x84, 0x3a, 0xfb, 0x8a, 0x43, 0x1a, 0x8e, 0xac,
    0xdc, 0xa8, 0x66, 0x3d, 0xe3, 0xf9, 0xdc,
];

/// Metadata and trust material written to every device of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Connect through the bootstrap server.
    pub use_bootstrap: bool,
    /// Bootstrap server URI.
    pub bootstrap_server_uri: String,
    /// Bootstrap server root CA certificate, DER.
    pub bootstrap_ca: Vec<u8>,
    /// Allow the first account that registers the enrollment ID to claim the device.
    pub first_to_claim: bool,
    pub manufacturer: String,
    pub model_number: String,
    pub device_type: String,
    pub hardware_version: String,
    /// Total device memory in KiB.
    pub memory_total_kb: u32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            use_bootstrap: true,
            bootstrap_server_uri: DEFAULT_BOOTSTRAP_SERVER_URI.to_string(),
            bootstrap_ca: DEFAULT_BOOTSTRAP_CA.to_vec(),
            first_to_claim: true,
            manufacturer: "Cypress".to_string(),
            model_number: "CY8CKIT-064B0S2-4343W".to_string(),
            device_type: "PSOC64".to_string(),
            hardware_version: "Rev 08".to_string(),
            memory_total_kb: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::extract_common_name;

    #[test]
    fn test_default_ca_is_a_certificate() {
        assert_eq!(DEFAULT_BOOTSTRAP_CA.len(), 547);
        let cn = extract_common_name(DEFAULT_BOOTSTRAP_CA).unwrap();
        assert_eq!(cn.as_str(), "ARM Bootstrap CA");
    }

    #[test]
    fn test_default_profile() {
        let profile = DeviceProfile::default();
        assert!(profile.use_bootstrap);
        assert!(profile.first_to_claim);
        assert_eq!(profile.memory_total_kb, 1024);
        assert!(profile.bootstrap_server_uri.starts_with("coaps://"));
    }
}
