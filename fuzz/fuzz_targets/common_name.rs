#![no_main]

use factory_identity::certificate::CN_MAX_LEN;
use factory_identity::extract_common_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cn) = extract_common_name(data) {
        assert!(!cn.is_empty() && cn.len() <= CN_MAX_LEN);
    }
});
