#![no_main]

use format_core::{decode, PropertyId, Schema, ValueType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // A small schema spanning every declared width, so some fuzz inputs
    // frame as real records. Decoding must never panic either way.
    let mut schema = Schema::new();
    let _ = schema.register(PropertyId::from_u32(0x0000_0000), ValueType::Version);
    let _ = schema.register(PropertyId::from_u32(0x0000_0001), ValueType::Bool);
    let _ = schema.register(PropertyId::from_u32(0x0100_0000), ValueType::Bool);
    let _ = schema.register(PropertyId::from_u32(0x0102_0100), ValueType::U32);
    let _ = schema.register(PropertyId::from_u32(0x0201_0000), ValueType::Address);

    let supported_major = data[0];
    let _ = decode(&data[1..], &schema, supported_major);
});
