//! Legacy attribute words and their SGR encoding.
//!
//! A console attribute is a 16-bit word: 4 bits of foreground, 4 bits of
//! background (both in BGR+intensity bit order), the lead/trail half markers
//! of a wide glyph, and a reverse-video flag. Terminals expect colors in RGB
//! order, so both nibbles go through a transposing table.

use std::fmt::Write as _;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CellAttributes: u16 {
        const FOREGROUND_BLUE      = 0x0001;
        const FOREGROUND_GREEN     = 0x0002;
        const FOREGROUND_RED       = 0x0004;
        const FOREGROUND_INTENSITY = 0x0008;
        const BACKGROUND_BLUE      = 0x0010;
        const BACKGROUND_GREEN     = 0x0020;
        const BACKGROUND_RED       = 0x0040;
        const BACKGROUND_INTENSITY = 0x0080;
        /// Left half of a double-width glyph.
        const LEADING_BYTE  = 0x0100;
        /// Right half of a double-width glyph.
        const TRAILING_BYTE = 0x0200;
        const REVERSE_VIDEO = 0x4000;

        const _ = !0;
    }
}

const COLOR_MASK: u16 = 0x00FF;
const RENDITION_MASK: u16 = COLOR_MASK | CellAttributes::REVERSE_VIDEO.bits();

/// Foreground-nibble to SGR code. Background codes are these plus 10.
const SGR_LUT: [u8; 16] = [30, 34, 32, 36, 31, 35, 33, 37, 90, 94, 92, 96, 91, 95, 93, 97];

impl CellAttributes {
    /// Light grey on black: conventionally "default colors".
    pub const DEFAULT: Self = Self::from_bits_retain(0x0007);

    pub fn foreground(self) -> u8 {
        (self.bits() & 0x0F) as u8
    }

    pub fn background(self) -> u8 {
        ((self.bits() >> 4) & 0x0F) as u8
    }

    /// Whether this cell is either half of a wide glyph.
    pub fn is_wide_half(self) -> bool {
        self.intersects(Self::LEADING_BYTE | Self::TRAILING_BYTE)
    }

    /// Only the bits that change the SGR output.
    pub fn rendition(self) -> Self {
        Self::from_bits_retain(self.bits() & RENDITION_MASK)
    }
}

/// Whether `cp` is a C0 control or a single-unit C1 introducer (DEL included).
pub fn is_control_character(cp: u32) -> bool {
    cp <= 0x1F || (0x7F..=0x9F).contains(&cp)
}

/// SGR parameters `(reverse, fg, bg)` for an attribute word.
pub fn sgr_params(attributes: CellAttributes) -> (u8, u8, u8) {
    let rv = if attributes.contains(CellAttributes::REVERSE_VIDEO) {
        7
    } else {
        27
    };
    if attributes.bits() & COLOR_MASK == CellAttributes::DEFAULT.bits() {
        return (rv, 39, 49);
    }
    let fg = SGR_LUT[attributes.foreground() as usize];
    let bg = SGR_LUT[attributes.background() as usize] + 10;
    (rv, fg, bg)
}

/// Append `ESC[{rv};{fg};{bg}m` for `attributes` to `out`.
pub fn format_attributes(out: &mut String, attributes: CellAttributes) {
    let (rv, fg, bg) = sgr_params(attributes);
    // Writing to a String cannot fail.
    let _ = write!(out, "\x1b[{rv};{fg};{bg}m");
}
