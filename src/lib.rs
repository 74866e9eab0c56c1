//! `octoword` - Simple-8b integer compression
//!
//! Packs a stream of non-negative integers (with optional missing-value
//! markers) into 64-bit words. Each word's low nibble selects one of
//! fourteen fixed slot layouts, three extended layouts that trade slot
//! width for stored trailing-zero counts, or a run-length marker covering
//! up to 1920 repeats in a single word.
//!
//! # Features
//! - **Dense packing**: 1 to 60 values per 64-bit word
//! - **Trailing-zero compression**: values like `1 << 30` store a 4-5 bit
//!   zero count instead of the zeros themselves
//! - **Run-length words**: constant runs of 120+ collapse to one word each
//! - **Missing values**: skips cost one all-ones slot
//! - **64- and 128-bit elements** behind a sealed [`Value`] trait
//!
//! # Example
//! ```
//! use octoword::{decode, Encoder};
//!
//! let mut bytes = Vec::new();
//! let mut enc = Encoder::new(|word: u64| bytes.extend_from_slice(&word.to_ne_bytes()));
//! for v in [3u64, 17, 9, 9, 9] {
//!     enc.append(v).unwrap();
//! }
//! enc.skip();
//! enc.flush();
//! drop(enc);
//!
//! let values = decode::<u64>(&bytes);
//! assert_eq!(
//!     values,
//!     vec![Some(3), Some(17), Some(9), Some(9), Some(9), None]
//! );
//! ```
//!
//! # Word layout
//!
//! Selector in bits 0..4. Plain layouts pack fixed-width slots from bit 4
//! (selectors 7 and 8, which carry an extension nibble, from bit 8). Run
//! words (selector 15) hold their repeat count in the extension nibble and
//! repeat the last value of the preceding word. Signed data should be
//! zig-zag encoded by the caller first; the all-ones value of the element
//! type is reserved for the missing marker.
//!
//! Words reach the caller-supplied sink in machine-native byte order;
//! persisting them across machines of different endianness is the caller's
//! concern.

#![allow(clippy::cast_possible_truncation)]

mod constants;
mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{Decoder, Iter};
pub use encoder::Encoder;
pub use error::AppendError;
pub use value::Value;

/// Decode a packed buffer into a vector of present/missing values
///
/// Convenience wrapper over [`Decoder`]; trailing bytes beyond the last
/// whole word are ignored.
#[must_use]
pub fn decode<V: Value>(bytes: &[u8]) -> Vec<Option<V>> {
    Decoder::new(bytes).iter().collect()
}

/// Encode a sequence of present/missing values into packed bytes
///
/// Convenience wrapper over [`Encoder`] with a `Vec<u8>` sink; the stream
/// is flushed before returning.
///
/// # Errors
/// Returns the first [`AppendError`] hit; bytes produced so far are
/// discarded.
pub fn encode<V, I>(values: I) -> Result<Vec<u8>, AppendError>
where
    V: Value,
    I: IntoIterator<Item = Option<V>>,
{
    let mut bytes = Vec::new();
    {
        let mut enc = Encoder::new(|word: u64| bytes.extend_from_slice(&word.to_ne_bytes()));
        for value in values {
            match value {
                Some(v) => enc.append(v)?,
                None => enc.skip(),
            }
        }
        enc.flush();
    }
    Ok(bytes)
}
