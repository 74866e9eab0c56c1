#![no_main]

use libfuzzer_sys::fuzz_target;
use octoword::Decoder;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode without panicking and terminate; run
    // words bound the per-word yield at 1920.
    let decoder = Decoder::<u64>::new(data);
    let count = decoder.iter().count();
    assert!(count <= decoder.word_count() * 1920);

    // Block navigation must stay in bounds too.
    let mut iter = decoder.iter();
    let mut hops = 0;
    while iter.next().is_some() {
        iter.advance_block();
        hops += 1;
        assert!(hops <= decoder.word_count() + 1);
    }

    let wide = Decoder::<u128>::new(data);
    let _ = wide.iter().count();
});
