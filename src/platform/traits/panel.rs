//! Channel indicator panel
//!
//! Five red/green LED pairs show the selected channel and error conditions.
//! The panel is written as one register image; how the image reaches the
//! LEDs (shift register, GPIO expander) is the board's business.

use bitflags::bitflags;

bitflags! {
    /// Register image for the five red/green channel indicators
    ///
    /// Each channel occupies a bit pair; channel 0 sits in the top pair,
    /// matching the physical left-to-right order of the slots.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LedImage: u16 {
        const ALL_GREEN = 0b01_0101_0101;
        const ALL_RED   = 0b10_1010_1010;
    }
}

impl LedImage {
    /// Steady green on one channel (selected, settled)
    ///
    /// The park pseudo-channel has no dedicated indicator; out-of-range
    /// indices yield an empty image.
    pub fn solid(channel: u8) -> Self {
        if channel >= 5 {
            return Self::empty();
        }
        Self::from_bits_retain(1u16 << (2 * (4 - u16::from(channel))))
    }

    /// Red on one channel (error, filament still engaged)
    pub fn signal(channel: u8) -> Self {
        if channel >= 5 {
            return Self::empty();
        }
        Self::from_bits_retain(2u16 << (2 * (4 - u16::from(channel))))
    }

    /// Both LEDs of the rightmost slot, used for the park position blink
    pub fn park() -> Self {
        Self::from_bits_retain(0b11)
    }
}

/// Indicator panel interface
pub trait LedPanelInterface {
    /// Replace the displayed image
    fn apply(&mut self, image: LedImage);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_maps_channel_to_bit_pair() {
        assert_eq!(LedImage::solid(0).bits(), 1 << 8);
        assert_eq!(LedImage::solid(4).bits(), 1 << 0);
    }

    #[test]
    fn signal_uses_second_bit_of_pair() {
        assert_eq!(LedImage::signal(0).bits(), 2 << 8);
        assert_eq!(LedImage::signal(3).bits(), 2 << 2);
    }

    #[test]
    fn park_index_has_no_indicator() {
        assert_eq!(LedImage::solid(5), LedImage::empty());
        assert_eq!(LedImage::signal(7), LedImage::empty());
    }

    #[test]
    fn images_union() {
        let both = LedImage::solid(0) | LedImage::signal(1);
        assert!(both.contains(LedImage::solid(0)));
        assert!(both.contains(LedImage::signal(1)));
    }
}
