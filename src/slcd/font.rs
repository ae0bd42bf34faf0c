//! Glyphs of the STM32L-Discovery segment display
//!
//! ```text
//!              A
//!          ---------    _
//!         |\   |J  /|  |_| COL
//!        F| H  |  K |B
//!         |  \ | /  |   _
//!         --G-- --M-+  |_| COL
//!         |   /| \  |
//!        E|  Q |  N |C
//!         | /  |P  \|   _
//!          ---------   |_| DP
//!              D
//! ```
//!
//! Each glyph is 16 bits wide. The value is split into four nibbles, most significant first, one
//! per COM line; [`segment_nibbles`] does the split.

/// Added to a glyph to light the decimal point after the cell.
pub const DP: u16 = 0x0002;
/// Added to a glyph to light the colon after the cell.
pub const COLON: u16 = 0x0020;

// space ! " # $ % & ' ( ) * + , - . /
const PUNCT1: [u16; 16] = [
    0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, //
    0x0000, 0x0000, 0xa0dd, 0x0000, 0x0000, 0xa000, 0x0000, 0x00c0,
];

// 0-9
const DIGITS: [u16; 10] = [
    0x5f00, 0x4200, 0xf500, 0x6700, 0xea00, 0xaf00, 0xbf00, 0x4600, //
    0xff00, 0xef00,
];

// A-Z, also used for a-z
const LETTERS: [u16; 26] = [
    0xfe00, 0x6714, 0x1d00, 0x4714, 0x9d00, 0x9c00, 0x3f00, 0xfa00, // A-H
    0x0014, 0x5300, 0x9841, 0x1900, 0x5a48, 0x5a09, 0x5f00, 0xfc00, // I-P
    0x5f01, 0xfc01, 0xaf00, 0x0414, 0x5b00, 0x18c0, 0x5a81, 0x00c9, // Q-X
    0x0058, 0x05c0, // Y-Z
];

/// Maps an ASCII character to its glyph.
///
/// Characters without a glyph (control characters, most punctuation, DEL and 8-bit values) map
/// to a blank cell.
pub fn glyph(ch: u8) -> u16 {
    match ch {
        b' '..=b'/' => PUNCT1[(ch - b' ') as usize],
        b'0'..=b'9' => DIGITS[(ch - b'0') as usize],
        b'A'..=b'Z' => LETTERS[(ch - b'A') as usize],
        b'a'..=b'z' => LETTERS[(ch - b'a') as usize],
        _ => 0x0000,
    }
}

/// Splits a glyph into the four values written to COM0..COM3.
pub fn segment_nibbles(bits: u16) -> [u8; 4] {
    let mut segments = [0u8; 4];
    for (com, segment) in segments.iter_mut().enumerate() {
        *segment = ((bits >> (12 - 4 * com)) & 0x0f) as u8;
    }
    segments
}

/// Where the nibble of one COM line lands in the low display RAM word for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    /// Bits kept from the current RAM value
    pub mask: u32,
    /// Bits to merge in
    pub bits: u32,
}

/// Computes the RAM patch for cell `pos` on line `com` showing `nibble`.
///
/// Returns `None` for positions past the last cell. The wiring of the glass is irregular: the
/// fifth cell drops one segment on COM2 and COM3, and the sixth cell routes its two high bits
/// crosswise.
pub fn patch(pos: usize, com: usize, nibble: u8) -> Option<Patch> {
    let s = u32::from(nibble & 0x0f);
    let (mask, bits) = match pos {
        0 => (0xcfff_fffc, (s & 0x0c) << 26 | (s & 0x03)),
        1 => (
            0xf3ff_ff03,
            (s & 0x0c) << 24 | (s & 0x02) << 6 | (s & 0x01) << 2,
        ),
        2 => (0xfcff_fcff, (s & 0x0c) << 22 | (s & 0x03) << 8),
        3 => (0xffcf_f3ff, (s & 0x0c) << 18 | (s & 0x03) << 10),
        4 if com < 2 => (0xfff3_cfff, (s & 0x0c) << 16 | (s & 0x03) << 12),
        4 => (0xfff3_efff, (s & 0x0c) << 16 | (s & 0x01) << 12),
        5 => (
            0xfffc_3fff,
            (s & 0x04) << 15 | (s & 0x08) << 13 | (s & 0x03) << 14,
        ),
        _ => return None,
    };
    Some(Patch { mask, bits })
}
