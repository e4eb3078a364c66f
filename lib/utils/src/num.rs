//! Numeric Utilities
use core::ops::{Add, Rem, Sub};

/// A trait for aligning numerical values.
///
/// Provides methods to align values up or down to the nearest multiple of a given alignment.
pub trait AlignableTo {
    /// Aligns the value up to the nearest multiple of `align`.
    fn align_up(self, align: Self) -> Self;

    /// Aligns the value down to the nearest multiple of `align`.
    fn align_down(self, align: Self) -> Self;
}

impl<T> AlignableTo for T
where
    T: Copy + Rem<Output = T> + Add<Output = T> + PartialEq<T> + Default + Sub<Output = T>,
{
    fn align_up(self, align: Self) -> Self {
        let rem = self % align;
        if rem == T::default() { self } else { self + (align - rem) }
    }
    fn align_down(self, align: Self) -> Self {
        self - (self % align)
    }
}

/// Build a 32-bit mask with only `bit` set.
///
/// Bit indices past 31 wrap modulo the register width; no range check is made.
#[inline(always)]
pub const fn bit32(bit: u8) -> u32 {
    1u32.wrapping_shl(bit as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_to_word() {
        assert_eq!(13usize.align_up(4), 16);
        assert_eq!(16usize.align_up(4), 16);
        assert_eq!(13usize.align_down(4), 12);
        assert_eq!(0usize.align_up(4), 0);
    }

    #[test]
    fn single_bit_masks() {
        assert_eq!(bit32(0), 0x1);
        assert_eq!(bit32(2), 0x4);
        assert_eq!(bit32(31), 0x8000_0000);
    }
}
