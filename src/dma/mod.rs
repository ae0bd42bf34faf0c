//! LPC31xx Direct Memory Access controller
//!
//! Register map of the DMA controller found in the APB4 domain of the LPC31xx family. The
//! controller has 12 channels. Each channel owns a register block with source and destination
//! addresses, transfer length, configuration, enable and a transfer counter; an alternate block
//! holding a second source/destination/length/configuration set supports companion transfers.
//! A handful of global registers control the alternate enables and the shared interrupt line.
//!
//! Addresses are given as offsets from the DMA base and as `const fn`s taking the (virtual) base
//! address, since the block is mapped wherever the MMU puts APB4.
//!
//! [`Dma`] wraps a [`Registers`](crate::register::Registers) block with LPC31-specific accessors
//! built on top of these definitions.

mod channel;

pub use channel::{Channel, ChannelConfig, Dma, Event, Transfer, TransferSize};

/// Physical base of the APB4 domain.
pub const APB4_PADDR: u32 = 0x1700_0000;
/// Offset of the DMA block inside APB4.
pub const APB4_DMA_OFFSET: u32 = 0x0000;
/// Physical base of the DMA block.
pub const DMA_PBASE: u32 = APB4_PADDR + APB4_DMA_OFFSET;

/// Number of DMA channels.
pub const NCHANNELS: usize = 12;

// DMA channel offsets (with respect to the DMA register base)

/// Offset of the register block of channel `n`.
pub const fn chan_offset(n: usize) -> usize {
    n * 0x020
}

/// Offset of the alternate register block of channel `n`.
pub const fn chan_alt_offset(n: usize) -> usize {
    0x200 + n * 0x010
}

// DMA channel register offsets (with respect to the channel register base)

/// Source address register of DMA channel
pub const CHAN_SRCADDR_OFFSET: usize = 0x000;
/// Destination address register of DMA channel
pub const CHAN_DESTADDR_OFFSET: usize = 0x004;
/// Transfer length register for DMA channel
pub const CHAN_XFERLEN_OFFSET: usize = 0x008;
/// Configuration register for DMA channel
pub const CHAN_CONFIG_OFFSET: usize = 0x00c;
/// Enable register for DMA channel (not present in the alternate block)
pub const CHAN_ENABLE_OFFSET: usize = 0x010;
/// Transfer counter register for DMA channel (not present in the alternate block)
pub const CHAN_XFERCOUNT_OFFSET: usize = 0x01c;

// DMA global register offsets (with respect to the DMA register base)

/// Alternative enable register
pub const ALTENABLE_OFFSET: usize = 0x400;
/// IRQ status clear register
pub const IRQSTATUSCLR_OFFSET: usize = 0x404;
/// IRQ mask register
pub const IRQMASK_OFFSET: usize = 0x408;
/// Test FIFO response status register
pub const TESTSTATUS_OFFSET: usize = 0x40c;
/// Software interrupt register
pub const SOFTINT_OFFSET: usize = 0x410;

/// Base address of channel `n` for a DMA block mapped at `vbase`.
pub const fn chan_vbase(vbase: u32, n: usize) -> u32 {
    vbase + chan_offset(n) as u32
}

/// Base address of the alternate block of channel `n` for a DMA block mapped at `vbase`.
pub const fn chan_alt_vbase(vbase: u32, n: usize) -> u32 {
    vbase + chan_alt_offset(n) as u32
}

/// Source address register of channel `n`.
pub const fn chan_srcaddr(vbase: u32, n: usize) -> u32 {
    chan_vbase(vbase, n) + CHAN_SRCADDR_OFFSET as u32
}

/// Destination address register of channel `n`.
pub const fn chan_destaddr(vbase: u32, n: usize) -> u32 {
    chan_vbase(vbase, n) + CHAN_DESTADDR_OFFSET as u32
}

/// Transfer length register of channel `n`.
pub const fn chan_xferlen(vbase: u32, n: usize) -> u32 {
    chan_vbase(vbase, n) + CHAN_XFERLEN_OFFSET as u32
}

/// Configuration register of channel `n`.
pub const fn chan_config(vbase: u32, n: usize) -> u32 {
    chan_vbase(vbase, n) + CHAN_CONFIG_OFFSET as u32
}

/// Enable register of channel `n`.
pub const fn chan_enable(vbase: u32, n: usize) -> u32 {
    chan_vbase(vbase, n) + CHAN_ENABLE_OFFSET as u32
}

/// Transfer counter register of channel `n`.
pub const fn chan_xfercount(vbase: u32, n: usize) -> u32 {
    chan_vbase(vbase, n) + CHAN_XFERCOUNT_OFFSET as u32
}

/// Alternate source address register of channel `n`.
pub const fn chan_alt_srcaddr(vbase: u32, n: usize) -> u32 {
    chan_alt_vbase(vbase, n) + CHAN_SRCADDR_OFFSET as u32
}

/// Alternate destination address register of channel `n`.
pub const fn chan_alt_destaddr(vbase: u32, n: usize) -> u32 {
    chan_alt_vbase(vbase, n) + CHAN_DESTADDR_OFFSET as u32
}

/// Alternate transfer length register of channel `n`.
pub const fn chan_alt_xferlen(vbase: u32, n: usize) -> u32 {
    chan_alt_vbase(vbase, n) + CHAN_XFERLEN_OFFSET as u32
}

/// Alternate configuration register of channel `n`.
pub const fn chan_alt_config(vbase: u32, n: usize) -> u32 {
    chan_alt_vbase(vbase, n) + CHAN_CONFIG_OFFSET as u32
}

/// ALT_ENABLE register.
pub const fn altenable(vbase: u32) -> u32 {
    vbase + ALTENABLE_OFFSET as u32
}

/// IRQ_STATUS_CLR register.
pub const fn irqstatusclr(vbase: u32) -> u32 {
    vbase + IRQSTATUSCLR_OFFSET as u32
}

/// IRQ_MASK register.
pub const fn irqmask(vbase: u32) -> u32 {
    vbase + IRQMASK_OFFSET as u32
}

/// TEST_FIFO_RESP_STATUS register.
pub const fn teststatus(vbase: u32) -> u32 {
    vbase + TESTSTATUS_OFFSET as u32
}

/// SOFT_INT register.
pub const fn softint(vbase: u32) -> u32 {
    vbase + SOFTINT_OFFSET as u32
}

// DMA channel register bit definitions

/// TRANSFER_LENGTH bits 0-20: transfer length
pub const XFRLEN_SHIFT: u32 = 0;
pub const XFRLEN_MASK: u32 = 0x001f_ffff << XFRLEN_SHIFT;

/// CONFIGURATION bit 18: enable circular buffer
pub const CONFIG_CIRC: u32 = 1 << 18;
/// CONFIGURATION bit 17: enable companion channel
pub const CONFIG_COMPCHENABLE: u32 = 1 << 17;
/// CONFIGURATION bits 13-15: companion channel number
pub const CONFIG_COMPCHNR_SHIFT: u32 = 13;
pub const CONFIG_COMPCHNR_MASK: u32 = 7 << CONFIG_COMPCHNR_SHIFT;
/// CONFIGURATION bit 12: invert endian-ness
pub const CONFIG_INVENDIAN: u32 = 1 << 12;
/// CONFIGURATION bits 10-11: transfer size
pub const CONFIG_XFERSIZE_SHIFT: u32 = 10;
pub const CONFIG_XFERSIZE_MASK: u32 = 3 << CONFIG_XFERSIZE_SHIFT;
pub const CONFIG_XFERSIZE_WORDS: u32 = 0 << CONFIG_XFERSIZE_SHIFT;
pub const CONFIG_XFERSIZE_HWORDS: u32 = 1 << CONFIG_XFERSIZE_SHIFT;
pub const CONFIG_XFERSIZE_BYTES: u32 = 2 << CONFIG_XFERSIZE_SHIFT;
pub const CONFIG_XFERSIZE_BURSTS: u32 = 3 << CONFIG_XFERSIZE_SHIFT;
/// CONFIGURATION bits 5-9: read slave enable
pub const CONFIG_RDSLAVENR_SHIFT: u32 = 5;
pub const CONFIG_RDSLAVENR_MASK: u32 = 31 << CONFIG_RDSLAVENR_SHIFT;
/// CONFIGURATION bits 0-4: write slave enable
pub const CONFIG_WRSLAVENR_SHIFT: u32 = 0;
pub const CONFIG_WRSLAVENR_MASK: u32 = 31 << CONFIG_WRSLAVENR_SHIFT;

/// ENABLE bit 0
pub const ENABLE_BIT: u32 = 1 << 0;

/// TRANSFER_COUNTER bits 0-20: transfer count
pub const XFRCOUNT_SHIFT: u32 = 0;
pub const XFRCOUNT_MASK: u32 = 0x001f_ffff << XFRCOUNT_SHIFT;

// DMA global register bit definitions

/// ALT_ENABLE bit enabling the alternate set of channel `n`.
pub const fn altenable_chan(n: usize) -> u32 {
    1 << n
}

/// SOFT_INT bit 0: enable soft interrupt
pub const SOFTINT_ENABLE: u32 = 1 << 0;

bitflags::bitflags! {
    /// Bits of IRQ_STATUS_CLR and IRQ_MASK.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u32 {
        const FINISHED0 = 1 << 0;
        const HALFWAY0 = 1 << 1;
        const FINISHED1 = 1 << 2;
        const HALFWAY1 = 1 << 3;
        const FINISHED2 = 1 << 4;
        const HALFWAY2 = 1 << 5;
        const FINISHED3 = 1 << 6;
        const HALFWAY3 = 1 << 7;
        const FINISHED4 = 1 << 8;
        const HALFWAY4 = 1 << 9;
        const FINISHED5 = 1 << 10;
        const HALFWAY5 = 1 << 11;
        const FINISHED6 = 1 << 12;
        const HALFWAY6 = 1 << 13;
        const FINISHED7 = 1 << 14;
        const HALFWAY7 = 1 << 15;
        const FINISHED8 = 1 << 16;
        const HALFWAY8 = 1 << 17;
        const FINISHED9 = 1 << 18;
        const HALFWAY9 = 1 << 19;
        const FINISHED10 = 1 << 20;
        const HALFWAY10 = 1 << 21;
        const FINISHED11 = 1 << 22;
        const HALFWAY11 = 1 << 23;
        /// Soft interrupt, scatter gather
        const SOFT_INT = 1 << 30;
        /// DMA abort
        const DMA_ABORT = 1 << 31;
    }
}

impl IrqFlags {
    /// Channel `n` finished.
    pub const fn finished(n: usize) -> Self {
        Self::from_bits_retain(1 << (2 * n))
    }

    /// Channel `n` more than half finished.
    pub const fn halfway(n: usize) -> Self {
        Self::from_bits_retain(1 << (2 * n + 1))
    }
}

/// DMA error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Transfer length does not fit the 21-bit length field
    LengthTooLarge,
    /// Channel number outside 0..12
    InvalidChannel,
    /// Slave number does not fit its 5-bit field
    InvalidSlave,
}
