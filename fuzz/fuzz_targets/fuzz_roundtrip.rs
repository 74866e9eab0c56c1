#![no_main]

use libfuzzer_sys::fuzz_target;
use octoword::{decode, Encoder};

fuzz_target!(|data: &[u8]| {
    let mut bytes = Vec::new();
    let mut expected: Vec<Option<u64>> = Vec::new();
    {
        let mut enc = Encoder::new(|w: u64| bytes.extend_from_slice(&w.to_ne_bytes()));

        // Bytes are interpreted as (op, value) records: op selects skip,
        // a repeat of the previous value, or a fresh value built from the
        // next 8 bytes with an op-derived right shift to vary bit widths.
        let mut prev = 0u64;
        for chunk in data.chunks(9) {
            if chunk.len() < 9 {
                break;
            }
            let op = chunk[0];
            match op % 8 {
                0 => {
                    enc.skip();
                    expected.push(None);
                }
                1 => {
                    if enc.append(prev).is_ok() {
                        expected.push(Some(prev));
                    }
                }
                _ => {
                    let raw = u64::from_le_bytes(chunk[1..9].try_into().unwrap());
                    let value = raw >> (op % 64);
                    // Unstorable values must fail cleanly and leave no trace.
                    if enc.append(value).is_ok() {
                        expected.push(Some(value));
                        prev = value;
                    }
                }
            }
        }
        enc.flush();
    }

    // Property 1: every word carries at least one logical value
    assert!(bytes.len() / 8 <= expected.len().max(1), "word budget exceeded");

    // Property 2: decode(encode(S)) == S
    let decoded = decode::<u64>(&bytes);
    assert_eq!(decoded, expected, "roundtrip mismatch");
});
