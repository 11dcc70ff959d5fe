#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(schema) = jsonguard::parse(data) {
        let _ = jsonguard::validator_for(&schema);
    }
});
