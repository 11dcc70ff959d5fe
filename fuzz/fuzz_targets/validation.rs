#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&[u8], &[u8])| {
    let (schema, instance) = data;
    let (Ok(schema), Ok(instance)) = (jsonguard::parse(schema), jsonguard::parse(instance)) else {
        return;
    };
    if let Ok(validator) = jsonguard::validator_for(&schema) {
        let result = validator.validate(&instance);
        assert_eq!(result.is_valid(), validator.is_valid(&instance));
    }
});
