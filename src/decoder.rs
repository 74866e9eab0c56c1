//! Decoding of packed Simple-8b word chains.

use std::marker::PhantomData;

use crate::constants::{
    BASE, COUNT_BITS, COUNT_MULTIPLIER, EIGHT_LARGE, EIGHT_SMALL, EXTENSION_BITS, RLE_MULTIPLIER,
    RLE_SELECTOR, SELECTOR_BITS, SELECTOR_MASK, SEVEN, SLOT_COUNT, VALUE_BITS,
};
use crate::value::Value;

/// Read-only view over a packed buffer
///
/// Borrows the caller's bytes for its lifetime; trailing bytes beyond the
/// last whole 8-byte word are ignored. Words are read in machine-native
/// byte order, matching what [`Encoder`](crate::Encoder) hands its sink.
pub struct Decoder<'a, V: Value> {
    buf: &'a [u8],
    _marker: PhantomData<V>,
}

impl<'a, V: Value> Decoder<'a, V> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Decoder {
            buf,
            _marker: PhantomData,
        }
    }

    /// Iterator over the decoded values
    #[must_use]
    pub fn iter(&self) -> Iter<'a, V> {
        Iter::new(self.buf)
    }

    /// Number of whole words in the buffer
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.buf.len() / 8
    }
}

impl<'a, V: Value> IntoIterator for &Decoder<'a, V> {
    type Item = Option<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

/// Forward iterator yielding `Some(value)` or `None` for missing entries
///
/// Steps slot by slot within a word and word by word across the buffer
/// without allocating. Run-length words re-emit the previously yielded
/// value. A word no producer emits (selector 0, extension out of range)
/// ends iteration.
#[derive(Debug, Clone)]
pub struct Iter<'a, V: Value> {
    buf: &'a [u8],
    /// Byte offset of the next word to load
    pos: usize,
    end: usize,
    /// Current word in native endian
    current: u64,
    /// Row into the layout tables; `RLE_SELECTOR` for run words
    selector: usize,
    family: usize,
    slot_bits: u32,
    slot_mask: u64,
    /// Bit position of the next slot; past 64 forces a word load
    shift: u32,
    count_bits: u32,
    count_mask: u64,
    count_multiplier: u32,
    /// Values left to re-emit from the current run word
    rle_remaining: u32,
    /// Most recently yielded value, repeated by run words
    last: Option<V>,
}

impl<'a, V: Value> Iter<'a, V> {
    fn new(buf: &'a [u8]) -> Self {
        let end = buf.len() - buf.len() % 8;
        let mut iter = Iter {
            buf,
            pos: 0,
            end,
            current: 0,
            selector: 0,
            family: BASE,
            slot_bits: 1,
            slot_mask: 0,
            shift: 64,
            count_bits: 0,
            count_mask: 0,
            count_multiplier: 0,
            rle_remaining: 0,
            last: Some(V::default()),
        };
        iter.load_block();
        iter
    }

    /// Total logical value count of the word the iterator is positioned on
    #[must_use]
    pub fn block_size(&self) -> u32 {
        if self.selector == RLE_SELECTOR {
            let count = ((self.current >> SELECTOR_BITS) & SELECTOR_MASK) as u32 + 1;
            count * RLE_MULTIPLIER
        } else {
            u32::from(SLOT_COUNT[self.family][self.selector])
        }
    }

    /// Skip the rest of the current word; the next step yields the first
    /// value of the following one.
    pub fn advance_block(&mut self) {
        self.rle_remaining = 0;
        self.load_block();
    }

    /// Load the word at `pos` and its slot geometry. Returns false at the
    /// end of the buffer or on a malformed word.
    fn load_block(&mut self) -> bool {
        if self.pos + 8 > self.end {
            return self.terminate();
        }
        let bytes: [u8; 8] = self.buf[self.pos..self.pos + 8].try_into().unwrap();
        self.current = u64::from_ne_bytes(bytes);
        self.pos += 8;

        let selector = (self.current & SELECTOR_MASK) as usize;
        if selector == RLE_SELECTOR {
            let count = ((self.current >> SELECTOR_BITS) & SELECTOR_MASK) as u32 + 1;
            self.selector = selector;
            self.rle_remaining = count * RLE_MULTIPLIER;
            // Force a word load once the run drains.
            self.shift = 64;
            self.slot_bits = 1;
            return true;
        }

        let extension = ((self.current >> SELECTOR_BITS) & SELECTOR_MASK) as usize;
        let (family, row, overhead) = match selector {
            0 => return self.terminate(),
            7 if extension != 0 => (SEVEN, extension, SELECTOR_BITS + EXTENSION_BITS),
            8 if extension >= 8 => (EIGHT_LARGE, extension, SELECTOR_BITS + EXTENSION_BITS),
            8 if extension != 0 => (EIGHT_SMALL, extension, SELECTOR_BITS + EXTENSION_BITS),
            7 | 8 => (BASE, selector, SELECTOR_BITS + EXTENSION_BITS),
            _ => (BASE, selector, SELECTOR_BITS),
        };
        let value_bits = u32::from(VALUE_BITS[family][row]);
        if value_bits == 0 {
            return self.terminate();
        }

        self.family = family;
        self.selector = row;
        self.count_bits = u32::from(COUNT_BITS[family]);
        self.count_mask = (1u64 << self.count_bits) - 1;
        self.count_multiplier = u32::from(COUNT_MULTIPLIER[family]);
        self.slot_bits = value_bits + self.count_bits;
        self.slot_mask = (1u64 << self.slot_bits) - 1;
        self.shift = overhead;
        self.rle_remaining = 0;
        true
    }

    fn terminate(&mut self) -> bool {
        self.pos = self.end;
        self.shift = 64;
        self.slot_bits = 1;
        false
    }

    fn decode_slot(&self, slot: u64) -> Option<V> {
        if slot == self.slot_mask {
            return None;
        }
        if self.family == BASE {
            return Some(V::from_u64(slot));
        }
        let zeros = (slot & self.count_mask) as u32 * self.count_multiplier;
        Some(V::from_u64(slot >> self.count_bits).shl(zeros))
    }
}

impl<'a, V: Value> Iterator for Iter<'a, V> {
    type Item = Option<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rle_remaining > 0 {
                self.rle_remaining -= 1;
                return Some(self.last);
            }
            if self.shift + self.slot_bits <= 64 {
                let slot = (self.current >> self.shift) & self.slot_mask;
                self.shift += self.slot_bits;
                let value = self.decode_slot(slot);
                self.last = value;
                return Some(value);
            }
            if self.pos >= self.end || !self.load_block() {
                return None;
            }
        }
    }
}

impl<'a, V: Value> PartialEq for Iter<'a, V> {
    /// Position equality: same buffer, same word, same slot, same point in
    /// the current run.
    fn eq(&self, other: &Self) -> bool {
        self.buf.as_ptr() == other.buf.as_ptr()
            && self.pos == other.pos
            && self.shift == other.shift
            && self.rle_remaining == other.rle_remaining
    }
}

impl<'a, V: Value> Eq for Iter<'a, V> {}
