//! Selector layout tables shared by the encoder and decoder.
//!
//! Every 64-bit word reserves its low nibble for a selector. Selectors 1-14
//! name a fixed (bits-per-slot, slots-per-word) layout, selector 15 marks a
//! run-length word and selector 0 is reserved:
//!
//! Selector value:     1   2   3   4   5   6   7   8   9  10  11  12  13  14
//! Slots per word:    60  30  20  15  12  10   8   7   6   5   4   3   2   1
//! Bits per slot:      1   2   3   4   5   6   7   8  10  12  15  20  30  60
//! Unused bits:        0   0   0   0   0   0   4   4   0   0   0   0   0   0
//!
//! Selectors 7 and 8 leave four data bits unused, so for those two the next
//! nibble (bits 4..8) always carries an extension value and slots start at
//! bit 8. Extension 0 keeps the plain layout above; a non-zero extension
//! switches the word to one of three families where each slot stores a
//! trailing-zero count next to the value payload:
//!
//! Selector 7, extension:     1   2   3   4   5   6   7   8   9
//! Slots per word:            9   8   7   6   5   4   3   2   1
//! Value bits per slot:       2   3   4   5   7  10  14  24  52
//! Zero-count bits per slot:  4 (count × 1 zeros, up to 15)
//!
//! Selector 8, extension:     1   2   3   4   5   6   7
//! Slots per word:            7   6   5   4   3   2   1
//! Value bits per slot:       4   5   7  10  14  24  52
//! Zero-count bits per slot:  4 (count × 4 zeros, up to 60)
//!
//! Selector 8, extension:     8   9  10  11  12  13
//! Slots per word:            6   5   4   3   2   1
//! Value bits per slot:       4   6   9  13  23  51
//! Zero-count bits per slot:  5 (count × 4 zeros, up to 124)
//!
//! A run-length word (selector 15) stores `runs_of_120 - 1` in the
//! extension nibble and repeats the last value of the preceding word 120 to
//! 1920 times. The remaining 56 bits are zero.

/// Number of cost families the encoder tracks
pub(crate) const NUM_FAMILIES: usize = 4;

/// Plain slots, no trailing-zero field
pub(crate) const BASE: usize = 0;
/// Extended selector 7: 4 zero-count bits, one zero per count
pub(crate) const SEVEN: usize = 1;
/// Extended selector 8, extensions 1-7: 4 zero-count bits, four zeros per count
pub(crate) const EIGHT_SMALL: usize = 2;
/// Extended selector 8, extensions 8-13: 5 zero-count bits, four zeros per count
pub(crate) const EIGHT_LARGE: usize = 3;

pub(crate) const SELECTOR_BITS: u32 = 4;
pub(crate) const EXTENSION_BITS: u32 = 4;
pub(crate) const SELECTOR_MASK: u64 = 0xF;

/// Selector value of run-length words
pub(crate) const RLE_SELECTOR: usize = 15;
/// Run lengths are multiples of this
pub(crate) const RLE_MULTIPLIER: u32 = 120;
/// Largest multiple one run word can carry
pub(crate) const RLE_MAX_COUNT: u32 = 16;

/// Slot width floor per family; `curr_max_bit_len` never drops below these
pub(crate) const MIN_DATA_BITS: [u8; NUM_FAMILIES] = [1, 2, 4, 4];

/// Widest storable payload per family
pub(crate) const MAX_DATA_BITS: [u8; NUM_FAMILIES] = [60, 52, 52, 51];

/// Data bits available per word (64 minus selector and extension nibbles)
pub(crate) const DATA_BITS: [u8; NUM_FAMILIES] = [60, 56, 56, 56];

/// Width of the per-slot zero-count field
pub(crate) const COUNT_BITS: [u8; NUM_FAMILIES] = [0, 4, 4, 5];

/// Zeros represented by one unit of the zero-count field
pub(crate) const COUNT_MULTIPLIER: [u8; NUM_FAMILIES] = [0, 1, 4, 4];

/// Largest trailing-zero count the zero-count field can express
pub(crate) const MAX_TRAILING_ZEROS: [u8; NUM_FAMILIES] = [0, 15, 60, 124];

/// First (highest slot count) selector per family
pub(crate) const MIN_SELECTOR: [usize; NUM_FAMILIES] = [1, 1, 1, 8];

/// Last (single slot) selector per family
pub(crate) const MAX_SELECTOR: [usize; NUM_FAMILIES] = [14, 9, 7, 13];

/// Value payload bits per slot, indexed by family then selector (extension
/// value for the extended families). Zero entries are invalid layouts.
pub(crate) const VALUE_BITS: [[u8; 16]; NUM_FAMILIES] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 12, 15, 20, 30, 60, 0],
    [0, 2, 3, 4, 5, 7, 10, 14, 24, 52, 0, 0, 0, 0, 0, 0],
    [0, 4, 5, 7, 10, 14, 24, 52, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 4, 6, 9, 13, 23, 51, 0, 0],
];

/// Slots per word, indexed like [`VALUE_BITS`]
pub(crate) const SLOT_COUNT: [[u8; 16]; NUM_FAMILIES] = [
    [0, 60, 30, 20, 15, 12, 10, 8, 7, 6, 5, 4, 3, 2, 1, 0],
    [0, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 0, 0, 0, 0],
    [0, 7, 6, 5, 4, 3, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 6, 5, 4, 3, 2, 1, 0, 0],
];
