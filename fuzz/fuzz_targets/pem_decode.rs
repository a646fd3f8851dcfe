#![no_main]

use factory_identity::{pem_to_der, DEVICE_CERT_MAX_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut out = [0u8; DEVICE_CERT_MAX_LEN];
    if let Ok(len) = pem_to_der(data, &mut out) {
        assert!(len <= out.len());
    }
});
