use super::*;
use crate::register::Registers;

macro_rules! per_channel {
    ( $($n:literal),* ) => { paste::paste! {
        /// DMA channel
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum Channel {
            $(
                [<Ch $n>] = $n,
            )+
        }

        impl Channel {
            /// All channels in register order.
            pub const ALL: [Channel; NCHANNELS] = [$(Channel::[<Ch $n>]),+];

            /// Returns the channel with the given number.
            pub fn new(n: usize) -> Result<Self, Error> {
                match n {
                    $(
                        $n => Ok(Channel::[<Ch $n>]),
                    )+
                    _ => Err(Error::InvalidChannel),
                }
            }
        }
    }};
}

per_channel!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11);

impl Channel {
    /// Numerical index of the channel (0..12).
    pub const fn index(self) -> usize {
        self as usize
    }

    fn reg(self, offset: usize) -> usize {
        chan_offset(self.index()) + offset
    }

    fn alt_reg(self, offset: usize) -> usize {
        chan_alt_offset(self.index()) + offset
    }
}

/// Unit moved by a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferSize {
    Words = 0,
    HalfWords = 1,
    Bytes = 2,
    Bursts = 3,
}

impl TransferSize {
    fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => TransferSize::Words,
            1 => TransferSize::HalfWords,
            2 => TransferSize::Bytes,
            _ => TransferSize::Bursts,
        }
    }
}

/// Contents of a channel CONFIGURATION register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Restart from the programmed addresses when the length is exhausted
    pub circular: bool,
    /// Companion channel started when this one finishes
    pub companion: Option<Channel>,
    /// Swap byte order while transferring
    pub invert_endian: bool,
    pub size: TransferSize,
    /// Flow control slave for reads, 0 for memory
    pub read_slave: u8,
    /// Flow control slave for writes, 0 for memory
    pub write_slave: u8,
}

impl Default for ChannelConfig {
    /// Memory to memory word transfer without companion.
    fn default() -> Self {
        ChannelConfig {
            circular: false,
            companion: None,
            invert_endian: false,
            size: TransferSize::Words,
            read_slave: 0,
            write_slave: 0,
        }
    }
}

impl ChannelConfig {
    /// Packs the configuration into its register value.
    pub fn bits(&self) -> Result<u32, Error> {
        if u32::from(self.read_slave) > CONFIG_RDSLAVENR_MASK >> CONFIG_RDSLAVENR_SHIFT
            || u32::from(self.write_slave) > CONFIG_WRSLAVENR_MASK >> CONFIG_WRSLAVENR_SHIFT
        {
            return Err(Error::InvalidSlave);
        }

        let mut bits = (self.size as u32) << CONFIG_XFERSIZE_SHIFT
            | u32::from(self.read_slave) << CONFIG_RDSLAVENR_SHIFT
            | u32::from(self.write_slave) << CONFIG_WRSLAVENR_SHIFT;
        if self.circular {
            bits |= CONFIG_CIRC;
        }
        if self.invert_endian {
            bits |= CONFIG_INVENDIAN;
        }
        if let Some(companion) = self.companion {
            // the companion field is only 3 bits wide
            if companion.index() > 7 {
                return Err(Error::InvalidChannel);
            }
            bits |= CONFIG_COMPCHENABLE
                | ((companion.index() as u32) << CONFIG_COMPCHNR_SHIFT) & CONFIG_COMPCHNR_MASK;
        }
        Ok(bits)
    }

    /// Unpacks a register value.
    pub fn from_bits(bits: u32) -> Self {
        let companion = if bits & CONFIG_COMPCHENABLE != 0 {
            Channel::new(((bits & CONFIG_COMPCHNR_MASK) >> CONFIG_COMPCHNR_SHIFT) as usize).ok()
        } else {
            None
        };
        ChannelConfig {
            circular: bits & CONFIG_CIRC != 0,
            companion,
            invert_endian: bits & CONFIG_INVENDIAN != 0,
            size: TransferSize::from_bits((bits & CONFIG_XFERSIZE_MASK) >> CONFIG_XFERSIZE_SHIFT),
            read_slave: ((bits & CONFIG_RDSLAVENR_MASK) >> CONFIG_RDSLAVENR_SHIFT) as u8,
            write_slave: ((bits & CONFIG_WRSLAVENR_MASK) >> CONFIG_WRSLAVENR_SHIFT) as u8,
        }
    }
}

/// Register set describing one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub src: u32,
    pub dst: u32,
    /// Raw TRANSFER_LENGTH value
    pub len: u32,
    pub config: ChannelConfig,
}

/// Transfer events reported through the shared DMA interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The channel transferred its full length
    Finished,
    /// The channel is more than half way through
    HalfWay,
}

impl Event {
    fn flag(self, ch: Channel) -> IrqFlags {
        match self {
            Event::Finished => IrqFlags::finished(ch.index()),
            Event::HalfWay => IrqFlags::halfway(ch.index()),
        }
    }
}

/// LPC31xx DMA controller
pub struct Dma<R> {
    regs: R,
}

impl<R: Registers> Dma<R> {
    /// Takes over the DMA register block.
    pub fn new(regs: R) -> Self {
        Dma { regs }
    }

    /// Releases the register block
    pub fn free(self) -> R {
        self.regs
    }

    /// Programs source, destination, length and configuration of `ch`.
    ///
    /// The channel is disabled first and left disabled; call [`Dma::enable`] to start it.
    pub fn configure(&mut self, ch: Channel, transfer: &Transfer) -> Result<(), Error> {
        let config = transfer.config.bits()?;
        check_len(transfer.len)?;
        trace!("dma: configure {} len {=u32}", ch, transfer.len);

        self.disable(ch);
        self.regs.write(ch.reg(CHAN_SRCADDR_OFFSET), transfer.src);
        self.regs.write(ch.reg(CHAN_DESTADDR_OFFSET), transfer.dst);
        self.regs.write(ch.reg(CHAN_XFERLEN_OFFSET), transfer.len);
        self.regs.write(ch.reg(CHAN_CONFIG_OFFSET), config);
        Ok(())
    }

    /// Programs the alternate register set of `ch`.
    pub fn configure_alt(&mut self, ch: Channel, transfer: &Transfer) -> Result<(), Error> {
        let config = transfer.config.bits()?;
        check_len(transfer.len)?;

        self.regs.write(ch.alt_reg(CHAN_SRCADDR_OFFSET), transfer.src);
        self.regs.write(ch.alt_reg(CHAN_DESTADDR_OFFSET), transfer.dst);
        self.regs.write(ch.alt_reg(CHAN_XFERLEN_OFFSET), transfer.len);
        self.regs.write(ch.alt_reg(CHAN_CONFIG_OFFSET), config);
        Ok(())
    }

    /// Writes the source address of `ch`.
    pub fn set_source(&mut self, ch: Channel, addr: u32) {
        self.regs.write(ch.reg(CHAN_SRCADDR_OFFSET), addr);
    }

    /// Writes the destination address of `ch`.
    pub fn set_destination(&mut self, ch: Channel, addr: u32) {
        self.regs.write(ch.reg(CHAN_DESTADDR_OFFSET), addr);
    }

    /// Writes the raw transfer length of `ch`.
    pub fn set_length(&mut self, ch: Channel, len: u32) -> Result<(), Error> {
        check_len(len)?;
        self.regs.write(ch.reg(CHAN_XFERLEN_OFFSET), len);
        Ok(())
    }

    /// Writes the configuration register of `ch`.
    pub fn set_config(&mut self, ch: Channel, config: &ChannelConfig) -> Result<(), Error> {
        let bits = config.bits()?;
        self.regs.write(ch.reg(CHAN_CONFIG_OFFSET), bits);
        Ok(())
    }

    /// Reads back the configuration of `ch`.
    pub fn config(&self, ch: Channel) -> ChannelConfig {
        ChannelConfig::from_bits(self.regs.read(ch.reg(CHAN_CONFIG_OFFSET)))
    }

    /// Starts `ch`.
    pub fn enable(&mut self, ch: Channel) {
        self.regs.write(ch.reg(CHAN_ENABLE_OFFSET), ENABLE_BIT);
    }

    /// Stops `ch`.
    pub fn disable(&mut self, ch: Channel) {
        self.regs.write(ch.reg(CHAN_ENABLE_OFFSET), 0);
    }

    pub fn is_enabled(&self, ch: Channel) -> bool {
        self.regs.read(ch.reg(CHAN_ENABLE_OFFSET)) & ENABLE_BIT != 0
    }

    /// Number of transfers done so far by `ch`.
    pub fn transfer_count(&self, ch: Channel) -> u32 {
        (self.regs.read(ch.reg(CHAN_XFERCOUNT_OFFSET)) & XFRCOUNT_MASK) >> XFRCOUNT_SHIFT
    }

    /// Enables the alternate register set of `ch`.
    pub fn enable_alt(&mut self, ch: Channel) {
        self.regs
            .modify(ALTENABLE_OFFSET, |r| r | altenable_chan(ch.index()));
    }

    /// Disables the alternate register set of `ch`.
    pub fn disable_alt(&mut self, ch: Channel) {
        self.regs
            .modify(ALTENABLE_OFFSET, |r| r & !altenable_chan(ch.index()));
    }

    /// Unmasks the interrupt for `event` on `ch`.
    pub fn listen(&mut self, ch: Channel, event: Event) {
        let flag = event.flag(ch).bits();
        self.regs.modify(IRQMASK_OFFSET, |r| r & !flag);
    }

    /// Masks the interrupt for `event` on `ch`.
    pub fn unlisten(&mut self, ch: Channel, event: Event) {
        let flag = event.flag(ch).bits();
        self.regs.modify(IRQMASK_OFFSET, |r| r | flag);
    }

    /// Currently masked interrupt sources.
    pub fn masked(&self) -> IrqFlags {
        IrqFlags::from_bits_retain(self.regs.read(IRQMASK_OFFSET))
    }

    /// Pending interrupt sources.
    pub fn status(&self) -> IrqFlags {
        IrqFlags::from_bits_retain(self.regs.read(IRQSTATUSCLR_OFFSET))
    }

    /// Clears the given pending interrupt sources.
    pub fn clear(&mut self, flags: IrqFlags) {
        self.regs.write(IRQSTATUSCLR_OFFSET, flags.bits());
    }

    /// Check if `event` is pending for this channel
    /// and clear the corresponding pending bit
    pub fn check_irq(&mut self, ch: Channel, event: Event) -> bool {
        let flag = event.flag(ch);
        if self.status().contains(flag) {
            self.clear(flag);
            true
        } else {
            false
        }
    }

    /// Enables or disables the scatter gather soft interrupt.
    pub fn set_soft_interrupt(&mut self, enable: bool) {
        self.regs
            .write(SOFTINT_OFFSET, if enable { SOFTINT_ENABLE } else { 0 });
    }

    /// Raw TEST_FIFO_RESP_STATUS value.
    pub fn test_status(&self) -> u32 {
        self.regs.read(TESTSTATUS_OFFSET)
    }
}

fn check_len(len: u32) -> Result<(), Error> {
    if len & !XFRLEN_MASK != 0 {
        Err(Error::LengthTooLarge)
    } else {
        Ok(())
    }
}
