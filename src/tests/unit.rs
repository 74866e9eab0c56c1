use crate::constants::{
    COUNT_BITS, DATA_BITS, MAX_SELECTOR, MIN_DATA_BITS, MIN_SELECTOR, NUM_FAMILIES, SLOT_COUNT,
    VALUE_BITS,
};
use crate::{decode, encode, AppendError, Decoder, Encoder, Value};

fn to_words(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(8)
        .map(|c| u64::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

fn encode_ok<V: Value>(entries: &[Option<V>]) -> Vec<u8> {
    encode(entries.iter().copied()).unwrap()
}

#[test]
fn test_table_geometry() {
    // Every layout must pack as many slots as the data bits allow: one more
    // slot of the same width must overflow the word.
    for family in 0..NUM_FAMILIES {
        for selector in MIN_SELECTOR[family]..=MAX_SELECTOR[family] {
            let slots = u32::from(SLOT_COUNT[family][selector]);
            let bits = u32::from(VALUE_BITS[family][selector]) + u32::from(COUNT_BITS[family]);
            let data = u32::from(DATA_BITS[family]);
            assert!(slots >= 1, "family {family} selector {selector} has no slots");
            assert!(
                slots * bits <= data,
                "family {family} selector {selector} overflows the word"
            );
            assert!(
                (slots + 1) * bits > data,
                "family {family} selector {selector} leaves room for another slot"
            );
            assert!(u32::from(VALUE_BITS[family][selector]) >= u32::from(MIN_DATA_BITS[family]));
        }
    }
}

#[test]
fn test_one_word_small_values() {
    let bytes = encode_ok(&[1u64, 2, 3, 4, 5, 6, 7].map(Some));
    // Selector 8 (seven 8-bit slots), extension nibble 0, slots from bit 8.
    assert_eq!(to_words(&bytes), vec![0x0706_0504_0302_0108]);
    assert_eq!(
        decode::<u64>(&bytes),
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)]
    );
}

#[test]
fn test_empty() {
    assert!(encode_ok::<u64>(&[]).is_empty());
    assert!(decode::<u64>(&[]).is_empty());
}

#[test]
fn test_rle_from_stream_start() {
    // A run may open the stream; the implicit prior value is zero.
    for (zeros, expected_words) in [
        (120usize, vec![0x0F]),
        (240, vec![0x1F]),
        (360, vec![0x2F]),
        (1920, vec![0xFF]),
        (2040, vec![0xFF, 0x0F]),
    ] {
        let bytes = encode_ok(&vec![Some(0u64); zeros]);
        assert_eq!(to_words(&bytes), expected_words, "{zeros} zeros");
        assert_eq!(decode::<u64>(&bytes), vec![Some(0u64); zeros]);
    }
}

#[test]
fn test_run_below_rle_threshold() {
    // 119 repeats never form a run word; they pack as plain slots.
    let bytes = encode_ok(&vec![Some(0u64); 119]);
    let words = to_words(&bytes);
    assert_eq!(words.len(), 5);
    assert!(words.iter().all(|w| w & 0xF != 0xF));
    assert_eq!(decode::<u64>(&bytes), vec![Some(0u64); 119]);
}

#[test]
fn test_skips_only() {
    let bytes = encode_ok::<u64>(&[None, None, None]);
    // Selector 12: three all-ones 20-bit slots.
    assert_eq!(to_words(&bytes), vec![0xFFFF_FFFF_FFFF_FFFC]);
    assert_eq!(decode::<u64>(&bytes), vec![None, None, None]);

    let bytes = encode_ok::<u64>(&vec![None; 60]);
    assert_eq!(to_words(&bytes), vec![0xFFFF_FFFF_FFFF_FFF1]);
    assert_eq!(decode::<u64>(&bytes), vec![None; 60]);
}

#[test]
fn test_trailing_zero_selector() {
    let bytes = encode_ok(&[Some(1u64 << 30); 3]);
    // Selector 8 extension 5: three 18-bit slots, each a 14-bit payload of
    // 4 over a zero count of 7 (28 zeros at 4 per count).
    let slot = (4u64 << 4) | 7;
    let expected = 8 | (5 << 4) | (slot << 8) | (slot << 26) | (slot << 44);
    assert_eq!(to_words(&bytes), vec![expected]);
    assert_eq!(decode::<u64>(&bytes), vec![Some(1u64 << 30); 3]);
}

#[test]
fn test_all_ones_values_never_read_as_missing() {
    // 7 in a 3-bit slot would collide with the missing marker; the cost
    // model widens it to 4 bits instead.
    let bytes = encode_ok(&vec![Some(7u64); 60]);
    assert_eq!(to_words(&bytes).len(), 4);
    assert_eq!(decode::<u64>(&bytes), vec![Some(7u64); 60]);

    for v in [1u64, 3, 15, 255, (1 << 59) - 1] {
        let bytes = encode_ok(&[Some(v)]);
        assert_eq!(decode::<u64>(&bytes), vec![Some(v)], "value {v}");
    }
}

#[test]
fn test_reserved_and_too_wide() {
    let mut words = Vec::new();
    let mut enc = Encoder::new(|w: u64| words.push(w));
    assert_eq!(enc.append(u64::MAX), Err(AppendError::ReservedValue));
    // 60 ones: too wide for the plain layouts once widened, no trailing
    // zeros for the extended ones.
    assert_eq!(
        enc.append((1u64 << 60) - 1),
        Err(AppendError::ValueTooWide { bits: 60 })
    );
    assert_eq!(enc.append(u64::MAX - 1), Err(AppendError::ValueTooWide { bits: 64 }));
    // Failed appends leave no trace.
    assert_eq!(enc.pending_len(), 0);
    enc.append(5).unwrap();
    enc.flush();
    drop(enc);
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_ne_bytes()).collect();
    assert_eq!(decode::<u64>(&bytes), vec![Some(5)]);
}

#[test]
fn test_wide_u64_roundtrip() {
    let entries: Vec<Option<u64>> = vec![
        Some(1 << 59),
        Some((1 << 59) - 1),
        Some(1 << 63),
        Some(0),
        Some(1),
        None,
        Some(u32::MAX as u64),
    ];
    let bytes = encode_ok(&entries);
    assert_eq!(decode::<u64>(&bytes), entries);
}

#[test]
fn test_power_of_two_edges() {
    for k in 1..64u32 {
        for v in [1u64 << k, (1u64 << k) - 1] {
            let mut bytes = Vec::new();
            let accepted;
            {
                let mut enc =
                    Encoder::new(|w: u64| bytes.extend_from_slice(&w.to_ne_bytes()));
                accepted = enc.append(v).is_ok();
                enc.flush();
            }
            if accepted {
                assert_eq!(decode::<u64>(&bytes), vec![Some(v)], "value {v}");
            } else {
                assert!(bytes.is_empty(), "rejected value {v} left output behind");
            }
        }
    }
}

#[test]
fn test_u128_roundtrip() {
    let entries: Vec<Option<u128>> = vec![
        Some(1 << 100),
        Some(1 << 125),
        Some(3 << 90),
        Some(0),
        Some(42),
        None,
        Some(0xFFFF << 80),
    ];
    let bytes = encode_ok(&entries);
    assert_eq!(decode::<u128>(&bytes), entries);
}

#[test]
fn test_u128_rejections() {
    let mut enc = Encoder::new(|_w: u64| {});
    assert_eq!(enc.append(u128::MAX), Err(AppendError::ReservedValue));
    // 101 meaningful bits, no trailing zeros to strip.
    assert_eq!(
        enc.append((1u128 << 100) + 1),
        Err(AppendError::ValueTooWide { bits: 101 })
    );
}

#[test]
fn test_rle_after_mixed_prefix() {
    let mut entries: Vec<Option<u64>> = vec![Some(7), None];
    entries.extend(std::iter::repeat(Some(7u64)).take(200));
    let bytes = encode_ok(&entries);
    let words = to_words(&bytes);
    // Prefix word of 15 slots, one run word for 120 repeats, then the
    // remaining 67 in plain words.
    assert_eq!(words.len(), 7);
    assert_eq!(words[1], 0x0F);
    assert_eq!(decode::<u64>(&bytes), entries);
}

#[test]
fn test_rle_resumes_after_flush() {
    let mut bytes = Vec::new();
    {
        let mut enc = Encoder::new(|w: u64| bytes.extend_from_slice(&w.to_ne_bytes()));
        enc.append(5u64).unwrap();
        enc.flush();
        for _ in 0..120 {
            enc.append(5u64).unwrap();
        }
        enc.flush();
    }
    let words = to_words(&bytes);
    assert_eq!(words.len(), 2);
    assert_eq!(words[1], 0x0F);
    assert_eq!(decode::<u64>(&bytes), vec![Some(5u64); 121]);
}

#[test]
fn test_skip_breaks_run() {
    let mut entries: Vec<Option<u64>> = vec![Some(0); 150];
    entries.push(None);
    entries.extend(vec![Some(0u64); 10]);
    let bytes = encode_ok(&entries);
    let words = to_words(&bytes);
    // 120 of the run survive as a run word; the rest requeues as slots.
    assert_eq!(words[0], 0x0F);
    assert_eq!(decode::<u64>(&bytes), entries);
}

#[test]
fn test_run_beats_alternation() {
    let constant = encode_ok(&vec![Some(5u64); 300]);
    let alternating: Vec<Option<u64>> =
        (0..300).map(|i| Some(if i % 2 == 0 { 5u64 } else { 6 })).collect();
    let alternating = encode_ok(&alternating);
    assert!(constant.len() < alternating.len());
    assert_eq!(to_words(&constant).len(), 4);
}

#[test]
fn test_determinism() {
    let entries: Vec<Option<u64>> = (0..500)
        .map(|i| match i % 7 {
            0 => None,
            1 => Some(0),
            2 => Some(1u64 << (i % 50)),
            _ => Some(i as u64 * 31),
        })
        .collect();
    let a = encode_ok(&entries);
    let b = encode_ok(&entries);
    assert_eq!(a, b);
    assert_eq!(decode::<u64>(&a), entries);
}

#[test]
fn test_pending_len() {
    let mut enc = Encoder::new(|_w: u64| {});
    enc.append(9u64).unwrap();
    enc.append(10u64).unwrap();
    enc.skip();
    assert_eq!(enc.pending_len(), 3);
    enc.flush();
    assert_eq!(enc.pending_len(), 0);

    let mut enc = Encoder::new(|_w: u64| {});
    for _ in 0..240 {
        enc.append(0u64).unwrap();
    }
    assert_eq!(enc.pending_len(), 240);
    enc.flush();
    assert_eq!(enc.pending_len(), 0);
}

#[test]
fn test_block_size_and_advance() {
    let mut entries: Vec<Option<u64>> = vec![Some(0); 240];
    entries.push(Some(5));
    let bytes = encode_ok(&entries);
    let dec = Decoder::<u64>::new(&bytes);
    assert_eq!(dec.word_count(), 2);

    let mut iter = dec.iter();
    assert_eq!(iter.block_size(), 240);
    iter.advance_block();
    assert_eq!(iter.block_size(), 1);
    assert_eq!(iter.next(), Some(Some(5)));
    assert_eq!(iter.next(), None);
}

#[test]
fn test_iterator_equality() {
    let bytes = encode_ok(&[1u64, 2, 3].map(Some));
    let dec = Decoder::<u64>::new(&bytes);
    let mut a = dec.iter();
    let mut b = dec.iter();
    assert_eq!(a, b);
    a.next();
    assert_ne!(a, b);
    b.next();
    assert_eq!(a, b);
}

#[test]
fn test_malformed_input() {
    // Reserved selector ends the stream.
    assert!(decode::<u64>(&0u64.to_ne_bytes()).is_empty());
    // Partial trailing word is ignored.
    assert!(decode::<u64>(&[0xAB; 7]).is_empty());
    let mut bytes = encode_ok(&[1u64, 2, 3].map(Some));
    let valid = decode::<u64>(&bytes);
    bytes.extend_from_slice(&0u64.to_ne_bytes());
    assert_eq!(decode::<u64>(&bytes), valid);
    // Out-of-range extension on selector 7 ends the stream.
    let bad = 7u64 | (0xA << 4);
    assert!(decode::<u64>(&bad.to_ne_bytes()).is_empty());
}

#[test]
fn test_value_trait_facts() {
    assert_eq!(0u64.used_bits(), 0);
    assert_eq!(1u64.used_bits(), 1);
    assert_eq!((1u64 << 63).used_bits(), 64);
    assert_eq!(Value::trailing_zeros(0u64), 0);
    assert_eq!(Value::trailing_zeros(96u64), 5);
    assert!(7u64.is_all_ones());
    assert!(u64::MAX.is_all_ones());
    assert!(!6u64.is_all_ones());
    assert!(!0u64.is_all_ones());
    assert_eq!(u128::from_u64(7).shl(100).used_bits(), 103);
}
