#![no_main]

use libfuzzer_sys::fuzz_target;

use shrike_model::{MethodRef, Proto, TypeDescriptor};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(ty) = TypeDescriptor::parse(text) {
        // Accepted descriptors must round-trip exactly.
        assert_eq!(ty.descriptor(), text);
    }
    if let Ok(proto) = Proto::parse(text) {
        assert_eq!(proto.descriptor(), text);
    }
    if let Ok(method) = MethodRef::parse_smali(text) {
        assert_eq!(method.to_smali(), text);
    }
});
