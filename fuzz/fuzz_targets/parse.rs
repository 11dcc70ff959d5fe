#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = jsonguard::parse(data) {
        // Display renders valid JSON that parses back to an equal value
        let reparsed = jsonguard::parse_str(&value.to_string()).expect("Rendered JSON is valid");
        assert_eq!(value, reparsed);
    }
});
