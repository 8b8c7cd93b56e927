use std::fmt;
use std::ops::{Index, IndexMut};

/// A 4-bit unsigned integer (nibble), used for register selectors and
/// the sprite row count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub struct u4(u8);

impl u4 {
    /// Creates a new `u4` from a `u8`.
    ///
    /// Panics if the value is greater than 0x0F.
    pub const fn new(value: u8) -> Self {
        assert!(value <= 0x0F, "u4 value must be in range 0x0-0xF");
        Self(value)
    }

    /// Creates a `u4` by keeping only the low 4 bits of `value`.
    pub const fn truncate(value: u8) -> Self {
        Self(value & 0x0F)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u4> for u8 {
    fn from(v: u4) -> u8 {
        v.0
    }
}

impl From<u4> for u16 {
    fn from(v: u4) -> u16 {
        v.0 as u16
    }
}

impl From<u4> for usize {
    fn from(v: u4) -> usize {
        v.0 as usize
    }
}

impl fmt::Display for u4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

impl<T> Index<u4> for [T; 16] {
    type Output = T;

    fn index(&self, index: u4) -> &Self::Output {
        &self[index.0 as usize]
    }
}

impl<T> IndexMut<u4> for [T; 16] {
    fn index_mut(&mut self, index: u4) -> &mut Self::Output {
        &mut self[index.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::u4;

    #[test]
    fn truncate_masks_high_bits() {
        assert_eq!(u4::truncate(0xAB).value(), 0x0B);
        assert_eq!(u4::truncate(0x07).value(), 0x07);
    }

    #[test]
    fn indexes_fixed_arrays() {
        let mut regs = [0u8; 16];
        regs[u4::new(0xF)] = 42;
        assert_eq!(regs[u4::new(0xF)], 42);
    }
}
