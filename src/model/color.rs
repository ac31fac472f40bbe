use std::fmt;

use serde::{Deserialize, Serialize};

/// Paper color packed as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperColor(u32);

impl PaperColor {
    pub const BLUE: PaperColor = PaperColor(0x0000FF);
    pub const NAVY: PaperColor = PaperColor(0x000097);

    /// Keep only the low 24 bits of `packed`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_packed(packed: i64) -> Self {
        Self((packed & 0x00FF_FFFF) as u32)
    }

    /// Build from three channels, each masked to its low byte.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_channels(r: i64, g: i64, b: i64) -> Self {
        Self((((r & 0xFF) << 16) | ((g & 0xFF) << 8) | (b & 0xFF)) as u32)
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn channels(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }
}

impl fmt::Display for PaperColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_value_is_masked_to_24_bits() {
        assert_eq!(PaperColor::from_packed(0x1FF_0000).packed(), 0xFF_0000);
        assert_eq!(PaperColor::from_packed(-1).packed(), 0xFF_FFFF);
    }

    #[test]
    fn channels_are_masked_not_rejected() {
        assert_eq!(PaperColor::from_channels(256, 255, 300), PaperColor::rgb(0, 255, 44));
        assert_eq!(PaperColor::from_channels(1, 2, 3).channels(), [1, 2, 3]);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(PaperColor::NAVY.to_string(), "#000097");
    }
}
