//! Memory mapped register access
//!
//! Drivers in this crate talk to their peripheral through the [`Registers`] trait, addressing
//! each register by its byte offset from the peripheral base. [`Mmio`] is the implementation
//! used on the target; it performs volatile accesses and can route single bit writes through the
//! Cortex-M bit-band alias region.

use core::ptr;

/// Word sized register block addressed by byte offset.
pub trait Registers {
    /// Reads the 32-bit register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Writes `value` to the 32-bit register at `offset`.
    fn write(&mut self, offset: usize, value: u32);

    /// Read-modify-write of the register at `offset`.
    #[inline]
    fn modify<F: FnOnce(u32) -> u32>(&mut self, offset: usize, f: F) {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Sets a single bit of the register at `offset`.
    ///
    /// The default implementation is a plain read-modify-write. Implementations backed by a
    /// bit-band capable bus override this with a single aliased store.
    #[inline]
    fn set_bit(&mut self, offset: usize, bit: u8) {
        self.modify(offset, |r| r | (1 << bit));
    }
}

/// Cortex-M peripheral bit-banding.
///
/// "The processor memory map includes two bit-band regions. These occupy the lowest 1MB of the
/// SRAM and Peripheral memory regions respectively. These bit-band regions map each word in an
/// alias region of memory to a bit in a bit-band region of memory."
///
/// Only the peripheral region is handled here.
pub mod bitband {
    /// Start of the peripheral bit-band region.
    pub const PERIPH_BASE: usize = 0x4000_0000;
    /// Start of the peripheral bit-band alias region.
    pub const PERIPH_BB_BASE: usize = 0x4200_0000;
    /// Size of the bit-band region.
    pub const REGION_SIZE: usize = 0x0010_0000;

    /// Returns true if `addr` lies inside the aliased peripheral megabyte.
    pub const fn contains(addr: usize) -> bool {
        addr >= PERIPH_BASE && addr < PERIPH_BASE + REGION_SIZE
    }

    /// bit_word_addr = bit_band_base + (byte_offset x 32) + (bit_number x 4)
    pub const fn alias(addr: usize, bit: u8) -> usize {
        PERIPH_BB_BASE + ((addr - PERIPH_BASE) << 5) + ((bit as usize) << 2)
    }
}

/// Volatile register block at a fixed address.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
    bitband: bool,
}

impl Mmio {
    /// Creates a register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a peripheral register block that stays mapped for the
    /// lifetime of the returned value, and no other code may access that block concurrently.
    pub const unsafe fn new(base: usize) -> Self {
        Mmio {
            base,
            bitband: false,
        }
    }

    /// Routes [`Registers::set_bit`] through the bit-band alias region.
    ///
    /// Returns `None` if the block is not inside the bit-band capable peripheral region.
    pub fn with_bitband(self) -> Option<Self> {
        if bitband::contains(self.base) {
            Some(Mmio {
                bitband: true,
                ..self
            })
        } else {
            None
        }
    }

    /// Base address of this block.
    pub fn base(&self) -> usize {
        self.base
    }
}

impl Registers for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        unsafe { ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u32) {
        unsafe { ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    #[inline(always)]
    fn set_bit(&mut self, offset: usize, bit: u8) {
        if self.bitband {
            let alias = bitband::alias(self.base + offset, bit);
            unsafe { ptr::write_volatile(alias as *mut u32, 1) }
        } else {
            self.modify(offset, |r| r | (1 << bit));
        }
    }
}

impl<R: Registers> Registers for &mut R {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }

    fn set_bit(&mut self, offset: usize, bit: u8) {
        (**self).set_bit(offset, bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitband_alias_of_lcd_status() {
        // LCD_SR.UDR on the STM32L1: 0x4000_2408 bit 2
        assert_eq!(bitband::alias(0x4000_2408, 2), 0x4204_8108);
        // LCD_CR.LCDEN: 0x4000_2400 bit 0
        assert_eq!(bitband::alias(0x4000_2400, 0), 0x4204_8000);
    }

    #[test]
    fn bitband_region_bounds() {
        assert!(bitband::contains(0x4000_0000));
        assert!(bitband::contains(0x400f_fffc));
        assert!(!bitband::contains(0x4010_0000));
        assert!(!bitband::contains(0x1700_0000));
    }

    #[test]
    fn mmio_over_plain_memory() {
        let mut words = [0u32; 4];
        let mut regs = unsafe { Mmio::new(words.as_mut_ptr() as usize) };
        regs.write(4, 0xdead_beef);
        regs.set_bit(8, 3);
        regs.modify(4, |r| r & 0xffff);
        assert_eq!(regs.read(4), 0xbeef);
        assert_eq!(regs.read(8), 0x8);
        assert!(regs.with_bitband().is_none());
        assert_eq!(words, [0, 0xbeef, 0x8, 0]);
    }
}
