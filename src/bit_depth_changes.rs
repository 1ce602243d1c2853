//! Changing the bit depth of a single color channel.
//!
//! Bitfield pixels can give each channel any width from 1 to 32 bits, but
//! every pixel format in this crate uses 8 bits per channel. Going to 8 bits:
//!
//! * Narrower channels use their bit pattern as the top bits of the result
//!   and then repeat it down into the lower bits, so the maximum value stays
//!   the maximum value (`0b11111` becomes `0b11111111`).
//! * Wider channels just keep their top 8 bits.
//!
//! Going from 8 bits back to some other width is the inverse: narrower widths
//! keep the top bits, and wider widths repeat the byte down as far as needed.

use bitfrob::u8_replicate_bits;

/// Makes a `bits` wide channel value into an 8-bit value.
///
/// Bits of `value` above `bits` should be 0. A `bits` of 0 gives 0.
///
/// ## Panics
/// * If `bits` is more than 32.
#[inline]
#[must_use]
#[track_caller]
pub fn channel_to_u8(value: u32, bits: u32) -> u8 {
  match bits {
    0 => 0,
    1..=7 => u8_replicate_bits(bits, value as u8),
    8 => value as u8,
    9..=32 => (value >> (bits - 8)) as u8,
    _ => panic!("illegal channel depth: {bits}"),
  }
}

/// Makes an 8-bit value into a `bits` wide channel value.
///
/// This is the inverse of [channel_to_u8] for every value that `bits` can
/// represent exactly.
///
/// ## Panics
/// * If `bits` is more than 32.
#[inline]
#[must_use]
#[track_caller]
pub fn channel_from_u8(c: u8, bits: u32) -> u32 {
  match bits {
    0 => 0,
    1..=8 => u32::from(c) >> (8 - bits),
    9..=32 => {
      let mut wide = 0_u64;
      let mut filled = 0;
      while filled < bits {
        wide = (wide << 8) | u64::from(c);
        filled += 8;
      }
      (wide >> (filled - bits)) as u32
    }
    _ => panic!("illegal channel depth: {bits}"),
  }
}

#[test]
fn test_channel_to_u8() {
  assert_eq!(channel_to_u8(0b11111, 5), 0xFF);
  assert_eq!(channel_to_u8(0, 5), 0);
  assert_eq!(channel_to_u8(0b10000, 5), 0b1000_0100);
  assert_eq!(channel_to_u8(1, 1), 0xFF);
  assert_eq!(channel_to_u8(0xAB, 8), 0xAB);
  assert_eq!(channel_to_u8(0x3FF, 10), 0xFF);
  assert_eq!(channel_to_u8(0x200, 10), 0x80);
  assert_eq!(channel_to_u8(123, 0), 0);
}

#[test]
fn test_channel_from_u8_inverts() {
  for bits in 8..=32 {
    for c in [0_u8, 1, 0x7F, 0x80, 0xAA, 0xFF] {
      assert_eq!(channel_to_u8(channel_from_u8(c, bits), bits), c, "failed bits:{}", bits);
    }
  }
  for bits in 1..8 {
    for v in 0..(1_u32 << bits) {
      let c = channel_to_u8(v, bits);
      assert_eq!(channel_from_u8(c, bits), v, "failed bits:{}", bits);
    }
  }
  assert_eq!(channel_from_u8(0xFF, 32), u32::MAX);
}
