#![no_main]

use factory_identity::EnrollmentId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(id) = s.parse::<EnrollmentId>() {
            assert_eq!(id.to_string().parse::<EnrollmentId>().ok(), Some(id));
        }
    }
});
