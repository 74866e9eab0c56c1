//! Encoder building chains of 64-bit Simple-8b words.

use std::collections::VecDeque;

use crate::constants::{
    BASE, COUNT_BITS, COUNT_MULTIPLIER, DATA_BITS, EXTENSION_BITS, MAX_DATA_BITS, MAX_SELECTOR,
    MAX_TRAILING_ZEROS, MIN_DATA_BITS, MIN_SELECTOR, NUM_FAMILIES, RLE_MAX_COUNT, RLE_MULTIPLIER,
    RLE_SELECTOR, SELECTOR_BITS, SEVEN, SLOT_COUNT, VALUE_BITS,
};
use crate::error::AppendError;
use crate::value::Value;

/// A queued element with its storage cost under every selector family.
///
/// Costs are computed once on insert: for each family, the payload bits
/// left after stripping the trailing zeros that family would store, and the
/// stripped trailing-zero count itself. `value` is `None` for a missing
/// marker, which costs nothing but occupies a slot.
#[derive(Debug, Clone, Copy)]
struct PendingValue<V> {
    value: Option<V>,
    bit_count: [u8; NUM_FAMILIES],
    trailing_zeros: [u8; NUM_FAMILIES],
}

impl<V: Value> PendingValue<V> {
    const SKIP: Self = Self {
        value: None,
        bit_count: [0; NUM_FAMILIES],
        trailing_zeros: [0; NUM_FAMILIES],
    };

    fn new(value: V) -> Result<Self, AppendError> {
        if value == V::MAX {
            return Err(AppendError::ReservedValue);
        }
        let used = value.used_bits();
        let zeros = value.trailing_zeros();
        let mut bit_count = [0; NUM_FAMILIES];
        let mut trailing_zeros = [0; NUM_FAMILIES];
        let mut storable = false;
        for family in 0..NUM_FAMILIES {
            let (bits, stored) = cost_under(value, used, zeros, family);
            bit_count[family] = bits;
            trailing_zeros[family] = stored;
            storable = storable || bits <= MAX_DATA_BITS[family];
        }
        if !storable {
            return Err(AppendError::ValueTooWide { bits: used });
        }
        Ok(Self {
            value: Some(value),
            bit_count,
            trailing_zeros,
        })
    }
}

/// Storage cost of `value` under one family: (payload bits, stored zeros).
///
/// When both the payload and the zero-count field would read back as all
/// ones, the cost is one bit wider so the resulting slot can never collide
/// with the missing marker.
fn cost_under<V: Value>(value: V, used: u32, zeros: u32, family: usize) -> (u8, u8) {
    let stored = if family == BASE {
        0
    } else {
        let mult = u32::from(COUNT_MULTIPLIER[family]);
        (zeros / mult * mult).min(u32::from(MAX_TRAILING_ZEROS[family]))
    };
    let mut bits = used - stored;
    let field_mask = (1u32 << COUNT_BITS[family]) - 1;
    let field = if family == BASE {
        0
    } else {
        stored / u32::from(COUNT_MULTIPLIER[family])
    };
    if field == field_mask && value.shr(stored).is_all_ones() {
        bits += 1;
    }
    (bits as u8, stored as u8)
}

/// Packs non-negative integers and missing markers into 64-bit Simple-8b
/// words, delivered through a caller-supplied sink in machine-native byte
/// order.
///
/// Values wait in a bounded queue until they can no longer share a single
/// word, at which point the largest full word is written. Repeats of the
/// last committed value that line up with a word boundary are absorbed into
/// a run and written as run-length words. Call [`flush`](Encoder::flush) to
/// drain the queue; the encoder stays usable afterwards.
pub struct Encoder<V: Value, W: FnMut(u64)> {
    write: W,
    /// Values waiting for a full word
    pending: VecDeque<PendingValue<V>>,
    /// Repeats absorbed into the active run, not yet written
    rle_count: u32,
    /// Last value committed to a word; seed for run continuation
    last_in_prev_word: PendingValue<V>,
    /// Max payload bit count across `pending`, per family
    curr_max_bit_len: [u8; NUM_FAMILIES],
    /// Families not yet ruled out for the word being assembled
    selector_possible: [bool; NUM_FAMILIES],
    /// Most recent family that admitted the whole queue
    last_valid_family: usize,
}

impl<V: Value, W: FnMut(u64)> Encoder<V, W> {
    /// Create an encoder writing words through `write`
    ///
    /// The sink is called synchronously from [`append`](Encoder::append),
    /// [`skip`](Encoder::skip) and [`flush`](Encoder::flush) and must not
    /// re-enter the encoder.
    pub fn new(write: W) -> Self {
        Encoder {
            write,
            pending: VecDeque::new(),
            rle_count: 0,
            // A run at the very start of a stream repeats an implicit zero.
            last_in_prev_word: PendingValue {
                value: Some(V::default()),
                bit_count: [0; NUM_FAMILIES],
                trailing_zeros: [0; NUM_FAMILIES],
            },
            curr_max_bit_len: MIN_DATA_BITS,
            selector_possible: [true; NUM_FAMILIES],
            last_valid_family: BASE,
        }
    }

    /// Append a value to the chain
    ///
    /// A value equal to the last committed one, arriving on a word
    /// boundary, extends the active run instead of the queue.
    ///
    /// # Errors
    /// [`AppendError::ReservedValue`] for the all-ones value and
    /// [`AppendError::ValueTooWide`] when no selector family can store the
    /// value. The encoder is unchanged on error.
    pub fn append(&mut self, value: V) -> Result<(), AppendError> {
        if self.rle_possible() && self.last_in_prev_word.value == Some(value) {
            self.rle_count += 1;
            return Ok(());
        }
        let pending = PendingValue::new(value)?;
        self.handle_rle_termination();
        self.append_pending(pending, true);
        Ok(())
    }

    /// Append a missing-value marker
    ///
    /// Occupies one slot, written as all ones. Ends any active run.
    pub fn skip(&mut self) {
        self.handle_rle_termination();
        self.append_pending(PendingValue::SKIP, false);
    }

    /// Write out everything buffered
    ///
    /// The final word may use a wider slot layout than its values need when
    /// the queue cannot fill a word exactly. The encoder stays usable; a
    /// following value equal to the last committed one resumes run-length
    /// encoding.
    pub fn flush(&mut self) {
        self.handle_rle_termination();
        while !self.pending.is_empty() {
            let word = self.encode_largest_possible_word(self.last_valid_family);
            (self.write)(word);
        }
    }

    /// Number of values buffered and not yet written
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len() + self.rle_count as usize
    }

    /// Runs may only start or continue on a word boundary
    fn rle_possible(&self) -> bool {
        self.rle_count > 0 || self.pending.is_empty()
    }

    /// End the active run: write full run words, then requeue the
    /// remainder (fewer than 120 repeats) as plain values.
    fn handle_rle_termination(&mut self) {
        if self.rle_count == 0 {
            return;
        }
        self.append_rle_words();
        let residual = self.rle_count;
        self.rle_count = 0;
        let seed = self.last_in_prev_word;
        for _ in 0..residual {
            self.append_pending(seed, false);
        }
    }

    /// Write run words in descending multiples of 120
    fn append_rle_words(&mut self) {
        let max_run = RLE_MAX_COUNT * RLE_MULTIPLIER;
        while self.rle_count >= max_run {
            (self.write)(rle_word(RLE_MAX_COUNT));
            self.rle_count -= max_run;
        }
        if self.rle_count >= RLE_MULTIPLIER {
            let count = self.rle_count / RLE_MULTIPLIER;
            (self.write)(rle_word(count));
            self.rle_count -= count * RLE_MULTIPLIER;
        }
    }

    /// Queue one element, writing words until it fits the one being
    /// assembled. With `try_rle`, an element that lands on a fresh word
    /// boundary and equals the last committed value opens a run instead.
    fn append_pending(&mut self, value: PendingValue<V>, try_rle: bool) {
        while !self.fits_current_word(&value) {
            let word = self.encode_largest_possible_word(self.last_valid_family);
            (self.write)(word);
            if try_rle
                && self.pending.is_empty()
                && value.value.is_some()
                && value.value == self.last_in_prev_word.value
            {
                self.rle_count = 1;
                return;
            }
        }
        for family in 0..NUM_FAMILIES {
            self.curr_max_bit_len[family] =
                self.curr_max_bit_len[family].max(value.bit_count[family]);
        }
        self.pending.push_back(value);
    }

    /// Family-by-family fit test, lowest family first. The first family
    /// that can hold the queue plus `value` in one word wins; families
    /// that cannot are ruled out until the next word boundary.
    fn fits_current_word(&mut self, value: &PendingValue<V>) -> bool {
        let slots = self.pending.len() as u64 + 1;
        for family in 0..NUM_FAMILIES {
            if !self.selector_possible[family] {
                continue;
            }
            let width = u64::from(self.curr_max_bit_len[family].max(value.bit_count[family]))
                + u64::from(COUNT_BITS[family]);
            if slots * width <= u64::from(DATA_BITS[family]) {
                self.last_valid_family = family;
                return true;
            }
            self.selector_possible[family] = false;
        }
        false
    }

    /// Pack the longest queue prefix that fills one word under `family`
    /// and rebuild the cost envelopes from the carry-over. The last packed
    /// value becomes the run-continuation seed.
    fn encode_largest_possible_word(&mut self, family: usize) -> u64 {
        let needed = self.curr_max_bit_len[family];
        let mut selector = MIN_SELECTOR[family];
        while selector < MAX_SELECTOR[family] {
            if usize::from(SLOT_COUNT[family][selector]) <= self.pending.len()
                && VALUE_BITS[family][selector] >= needed
            {
                break;
            }
            selector += 1;
        }
        let word = self.pack_word(family, selector);

        self.curr_max_bit_len = MIN_DATA_BITS;
        self.selector_possible = [true; NUM_FAMILIES];
        for value in &self.pending {
            for f in 0..NUM_FAMILIES {
                self.curr_max_bit_len[f] = self.curr_max_bit_len[f].max(value.bit_count[f]);
            }
        }
        word
    }

    /// Assemble one word from the front of the queue, slot 0 just above
    /// the selector (and extension, where present).
    fn pack_word(&mut self, family: usize, selector: usize) -> u64 {
        let slots = usize::from(SLOT_COUNT[family][selector]);
        let count_bits = u32::from(COUNT_BITS[family]);
        let slot_bits = u32::from(VALUE_BITS[family][selector]) + count_bits;
        let slot_mask = (1u64 << slot_bits) - 1;

        let (mut word, mut shift) = match (family, selector) {
            (BASE, 7 | 8) => (selector as u64, SELECTOR_BITS + EXTENSION_BITS),
            (BASE, _) => (selector as u64, SELECTOR_BITS),
            (SEVEN, _) => (
                7 | ((selector as u64) << SELECTOR_BITS),
                SELECTOR_BITS + EXTENSION_BITS,
            ),
            _ => (
                8 | ((selector as u64) << SELECTOR_BITS),
                SELECTOR_BITS + EXTENSION_BITS,
            ),
        };

        for _ in 0..slots {
            let pending = self
                .pending
                .pop_front()
                .expect("selector slot count never exceeds the queue");
            let slot = match pending.value {
                None => slot_mask,
                Some(v) if family == BASE => v.as_u64(),
                Some(v) => {
                    let zeros = u32::from(pending.trailing_zeros[family]);
                    let field = u64::from(zeros / u32::from(COUNT_MULTIPLIER[family]));
                    (v.shr(zeros).as_u64() << count_bits) | field
                }
            };
            word |= slot << shift;
            shift += slot_bits;
            self.last_in_prev_word = pending;
        }
        word
    }
}

/// Run word carrying `count` repeats of 120 values
fn rle_word(count: u32) -> u64 {
    (u64::from(count - 1) << SELECTOR_BITS) | RLE_SELECTOR as u64
}
