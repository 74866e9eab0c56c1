#![no_main]

use libfuzzer_sys::fuzz_target;
use octoword::{decode, Encoder};

fuzz_target!(|data: &[u8]| {
    let mut bytes = Vec::new();
    let mut expected: Vec<Option<u128>> = Vec::new();
    {
        let mut enc = Encoder::new(|w: u64| bytes.extend_from_slice(&w.to_ne_bytes()));

        // Records of (op, 16 value bytes); the op-derived shift pushes
        // payloads across the whole 128-bit range.
        for chunk in data.chunks(17) {
            if chunk.len() < 17 {
                break;
            }
            let op = chunk[0];
            if op % 8 == 0 {
                enc.skip();
                expected.push(None);
                continue;
            }
            let raw = u128::from_le_bytes(chunk[1..17].try_into().unwrap());
            let value = (raw >> (op % 96)) << (op % 5 * 25);
            if enc.append(value).is_ok() {
                expected.push(Some(value));
            }
        }
        enc.flush();
    }

    let decoded = decode::<u128>(&bytes);
    assert_eq!(decoded, expected, "roundtrip mismatch");
});
