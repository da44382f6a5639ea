// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// This crate contains useful utility functions that can be used throughout the codebase.

/// This trait exists to allow us to decode and encode big-endian values held in byte
/// buffers, which is the byte order the host side of the serial interface uses. Every
/// access is bounds checked, so an out of range access returns `None` or `false` rather
/// than panicking.
pub trait BigEndianBytes {

    /// This function should return the big-endian 16-bit value at the given offset.
    fn read_be_u16(&self, offset: usize) -> Option<u16>;

    /// This function should return the big-endian 32-bit value at the given offset.
    fn read_be_u32(&self, offset: usize) -> Option<u32>;

    /// This function should store a 16-bit value at the given offset in big-endian
    /// order, returning whether the value fitted.
    fn write_be_u16(&mut self, offset: usize, value: u16) -> bool;

    /// This function should store a 32-bit value at the given offset in big-endian
    /// order, returning whether the value fitted.
    fn write_be_u32(&mut self, offset: usize, value: u32) -> bool;
}

impl BigEndianBytes for [u8] {

    /// Reads two bytes as a big-endian `u16`.
    #[inline(always)]
    fn read_be_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.get(offset..offset.checked_add(2)?)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads four bytes as a big-endian `u32`.
    #[inline(always)]
    fn read_be_u32(&self, offset: usize) -> Option<u32> {
        let bytes = self.get(offset..offset.checked_add(4)?)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Writes a `u16` as two big-endian bytes.
    #[inline(always)]
    fn write_be_u16(&mut self, offset: usize, value: u16) -> bool {
        match offset.checked_add(2).and_then(|end| self.get_mut(offset..end)) {
            Some(bytes) => {
                bytes.copy_from_slice(&value.to_be_bytes());
                true
            },
            None => false,
        }
    }

    /// Writes a `u32` as four big-endian bytes.
    #[inline(always)]
    fn write_be_u32(&mut self, offset: usize, value: u32) -> bool {
        match offset.checked_add(4).and_then(|end| self.get_mut(offset..end)) {
            Some(bytes) => {
                bytes.copy_from_slice(&value.to_be_bytes());
                true
            },
            None => false,
        }
    }
}

/// Converts a normalised analog reading in the range -1.0 to 1.0 into the signed byte
/// range used on the wire, in the same way the host input layer scales it.
#[inline(always)]
pub fn scale_axis(value: f32) -> i8 {
    (value.clamp(-1.0, 1.0) * 127.0) as i8
}

/// Re-exported stdlib `min` function, to keep all our utility functions together
/// here in the same place.
pub use std::cmp::min;
