/*!
  # Segment LCD of the STM32L-Discovery

  Character driver for the 6-cell, 14-segment glass of the STM32L-Discovery board, driven by the
  LCD controller of the STM32L1. Text written to the driver is shown starting at the cursor,
  which advances after each character and stops at the last cell. A `.` or `:` following a
  character lights the decimal point or colon after that cell instead of taking a cell of its
  own.

  Cursor motion and erasure are requested with escape sequences, see [`codec`]. A few control
  characters are understood as well:

  | byte | effect |
  |------|--------|
  | `\x08` (BS) | delete the character before the cursor |
  | `\r` (CR) | cursor home |
  | `\x7f` (DEL) | delete the character at the cursor |

  Other control characters and bytes above `0x7f` are ignored.

  ## Initialisation example
  ```rust,ignore
    let regs = unsafe { Mmio::new(slcd::regs::LCD_BASE) }.with_bitband().unwrap();
    let mut lcd = Slcd::new(regs, slcd::Config::default(), &mut delay)?;

    lcd.write(b"12:34.5");
    lcd.action(SlcdCode::Home, 0);
    ```
*/

pub mod board;
pub mod codec;
mod config;
pub mod font;
pub mod regs;

pub use codec::{Decoded, Decoder, SlcdCode};
pub use config::{
    Bias, BlinkFrequency, BlinkMode, Config, Duty, Prescaler, VoltageSource, MAX_CONTRAST,
};

use core::cell::RefCell;
use core::convert::Infallible;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::register::Registers;
use config::blink_bits;
use regs::*;

/// Number of character cells
pub const NCHARS: usize = 6;
/// Number of bar segments
pub const NBARS: usize = 4;

const BS: u8 = 0x08;
const CR_CHAR: u8 = b'\r';
const DEL: u8 = 0x7f;

/// Status poll interval during initialization
const POLL_US: u32 = 10;

/// LCD error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The controller did not report ready in time
    Timeout,
    /// Clock divider outside 16..=31
    DividerOutOfRange,
    /// Contrast above [`MAX_CONTRAST`]
    ContrastOutOfRange,
    /// Dead time or pulse-on duration does not fit its field
    FieldOutOfRange,
    /// Bar index outside 0..4
    InvalidBar,
    /// A display is already registered
    AlreadyRegistered,
}

/// Mark shown after a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoration {
    None,
    /// Decimal point
    Dp,
    Colon,
}

impl Decoration {
    fn segments(self) -> u16 {
        match self {
            Decoration::None => 0,
            Decoration::Dp => font::DP,
            Decoration::Colon => font::COLON,
        }
    }

    fn suffix(self) -> Option<u8> {
        match self {
            Decoration::None => None,
            Decoration::Dp => Some(b'.'),
            Decoration::Colon => Some(b':'),
        }
    }
}

bitflags::bitflags! {
    /// Readiness events
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PollEvents: u16 {
        /// Display content can be read back
        const IN = 0x0001;
        /// The display accepts more text
        const OUT = 0x0004;
    }
}

/// Segment LCD driver
pub struct Slcd<R: Registers> {
    regs: R,
    curpos: usize,
    buffer: [u8; NCHARS],
    options: [Decoration; NCHARS],
    bar: [u8; 2],
    decoder: Decoder,
    /// Cell whose character may still take a trailing '.' or ':'
    held: Option<usize>,
    contrast: u8,
    blink_frequency: BlinkFrequency,
}

impl<R: Registers> Slcd<R> {
    /// Initializes the LCD controller and clears the display.
    ///
    /// The LCD clock must already be running and the pins of [`board::PINS`] routed to the
    /// controller. Every wait for the controller is bounded by [`Config::timeout_us`].
    pub fn new<D: DelayNs>(mut regs: R, config: Config, delay: &mut D) -> Result<Self, Error> {
        config.validate()?;

        regs.modify(FCR, |r| {
            r & !(FCR_PS_MASK | FCR_DIV_MASK) | config.fcr_clock()
        });
        wait_status(&regs, SR_FCRSF, delay, config.timeout_us)?;

        regs.modify(CR, |r| {
            let r = r & !(CR_DUTY_MASK | CR_BIAS_MASK | CR_VSEL | CR_MUX_SEG) | config.cr_drive();
            if config.mux_segment {
                r | CR_MUX_SEG
            } else {
                r
            }
        });

        regs.modify(FCR, |r| {
            r & !(FCR_CC_MASK | FCR_DEAD_MASK | FCR_PON_MASK)
                | u32::from(config.contrast) << FCR_CC_SHIFT
                | u32::from(config.dead_time) << FCR_DEAD_SHIFT
                | u32::from(config.pulse_on) << FCR_PON_SHIFT
        });
        wait_status(&regs, SR_FCRSF, delay, config.timeout_us)?;

        regs.set_bit(CR, CR_LCDEN_BIT);
        wait_status(&regs, SR_ENS | SR_RDY, delay, config.timeout_us)?;

        regs.modify(FCR, |r| {
            r & !(FCR_BLINK_MASK | FCR_BLINKF_MASK) | config.fcr_blink()
        });
        wait_status(&regs, SR_FCRSF, delay, config.timeout_us)?;

        debug!("slcd: enabled, contrast {}", config.contrast);

        let mut slcd = Slcd {
            regs,
            curpos: 0,
            buffer: [b' '; NCHARS],
            options: [Decoration::None; NCHARS],
            bar: [0; 2],
            decoder: Decoder::new(),
            held: None,
            contrast: config.contrast,
            blink_frequency: config.blink_frequency,
        };
        slcd.clear();
        Ok(slcd)
    }

    /// Releases the register block.
    pub fn free(self) -> R {
        self.regs
    }

    /// Blanks every segment, including the bars, and homes the cursor.
    ///
    /// A partially received escape sequence is dropped.
    pub fn clear(&mut self) {
        self.wait_update();
        for n in 0..NRAM {
            self.regs.write(raml(n), 0);
            self.regs.write(ramh(n), 0);
        }
        self.regs.set_bit(SR, SR_UDR_BIT);

        self.buffer = [b' '; NCHARS];
        self.options = [Decoration::None; NCHARS];
        self.bar = [0; 2];
        self.curpos = 0;
        self.held = None;
        self.decoder.reset();
    }

    /// Shows `buf`, interpreting escape sequences and control characters.
    ///
    /// The buffer is a complete stream: an escape sequence left unfinished at its end is shown as
    /// text. Always consumes the whole buffer.
    pub fn write(&mut self, buf: &[u8]) -> usize {
        let mut input = buf.iter().copied();
        while let Some(decoded) = self.decoder.decode(&mut input) {
            self.apply(decoded);
        }
        self.end_stream();
        buf.len()
    }

    /// Performs `code` `count` times. A count of 0 is taken as 1 by the actions that use it.
    pub fn action(&mut self, code: SlcdCode, count: u8) {
        trace!("slcd: action {} count {}", code, count);

        self.held = None;
        let count = usize::from(count.max(1));
        match code {
            SlcdCode::BackDel => {
                for _ in 0..count {
                    if self.curpos == 0 {
                        break;
                    }
                    self.curpos -= 1;
                    self.delete_at_cursor();
                }
            }
            SlcdCode::FwdDel => {
                for _ in 0..count {
                    self.delete_at_cursor();
                }
            }
            SlcdCode::Erase => {
                let end = (self.curpos + count).min(NCHARS);
                self.erase(self.curpos, end);
            }
            SlcdCode::Clear => {
                self.curpos = 0;
                self.erase(0, NCHARS);
            }
            SlcdCode::EraseEol => self.erase(self.curpos, NCHARS),
            SlcdCode::Home => self.curpos = 0,
            SlcdCode::End => self.curpos = NCHARS - 1,
            SlcdCode::Left => self.curpos = self.curpos.saturating_sub(count),
            SlcdCode::Right => self.curpos = (self.curpos + count).min(NCHARS - 1),
            SlcdCode::BlinkStart => self.set_blink(BlinkMode::AllSegments, self.blink_frequency),
            SlcdCode::BlinkOff => self.set_blink(BlinkMode::Disabled, self.blink_frequency),
            // single line, and blinking is all or nothing
            SlcdCode::Up
            | SlcdCode::Down
            | SlcdCode::PageUp
            | SlcdCode::PageDown
            | SlcdCode::BlinkEnd => {}
        }
    }

    /// Copies the display content into `buf`, each cell followed by its '.' or ':' if lit.
    ///
    /// Returns the number of bytes written; the content is truncated to the buffer.
    pub fn read(&self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        for (slot, byte) in buf.iter_mut().zip(self.content()) {
            *slot = byte;
            n += 1;
        }
        n
    }

    /// The display is always readable and writable.
    pub fn poll(&self, events: PollEvents) -> PollEvents {
        events & (PollEvents::IN | PollEvents::OUT)
    }

    /// Display content as text, see [`Slcd::read`].
    pub fn text(&self) -> String<{ 2 * NCHARS }> {
        let mut text = String::new();
        for byte in self.content() {
            // cells only ever hold printable ASCII
            let _ = text.push(char::from(byte));
        }
        text
    }

    /// Cursor position, 0 for the first cell.
    pub fn cursor(&self) -> usize {
        self.curpos
    }

    /// Current contrast level.
    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Sets the contrast level.
    ///
    /// Levels above [`MAX_CONTRAST`] are clamped, the maximum is applied and
    /// [`Error::ContrastOutOfRange`] is returned.
    pub fn set_contrast(&mut self, level: u8) -> Result<(), Error> {
        let clamped = level.min(MAX_CONTRAST);
        self.regs.modify(FCR, |r| {
            r & !FCR_CC_MASK | u32::from(clamped) << FCR_CC_SHIFT
        });
        self.wait_fcr_sync();
        self.contrast = clamped;

        if level > MAX_CONTRAST {
            Err(Error::ContrastOutOfRange)
        } else {
            Ok(())
        }
    }

    /// Switches bar segment `index` (0..4) on or off.
    pub fn set_bar(&mut self, index: usize, on: bool) -> Result<(), Error> {
        // BAR0 and BAR2 live on COM3, BAR1 and BAR3 on COM2
        let (word, bit) = match index {
            0 => (1, 0x08),
            1 => (0, 0x08),
            2 => (1, 0x02),
            3 => (0, 0x02),
            _ => return Err(Error::InvalidBar),
        };
        if on {
            self.bar[word] |= bit;
        } else {
            self.bar[word] &= !bit;
        }

        self.wait_update();
        let bar = self.bar;
        self.regs
            .modify(raml(2), |r| r & 0xffff_5fff | u32::from(bar[0]) << 12);
        self.regs
            .modify(raml(3), |r| r & 0xffff_5fff | u32::from(bar[1]) << 12);
        self.regs.set_bit(SR, SR_UDR_BIT);
        Ok(())
    }

    /// Programs the blink mode and frequency.
    pub fn set_blink(&mut self, mode: BlinkMode, frequency: BlinkFrequency) {
        self.regs.modify(FCR, |r| {
            r & !(FCR_BLINK_MASK | FCR_BLINKF_MASK) | blink_bits(mode, frequency)
        });
        self.wait_fcr_sync();
        self.blink_frequency = frequency;
    }

    fn content(&self) -> impl Iterator<Item = u8> + '_ {
        self.buffer
            .iter()
            .zip(self.options.iter())
            .flat_map(|(&ch, decoration)| core::iter::once(ch).chain(decoration.suffix()))
    }

    /// Feeds one byte of an unbounded stream.
    fn feed(&mut self, byte: u8) {
        let mut input = core::iter::once(byte);
        while let Some(decoded) = self.decoder.decode(&mut input) {
            self.apply(decoded);
        }
    }

    /// Shows whatever is left of an unfinished escape sequence and closes the last character,
    /// so a '.' or ':' arriving later takes a cell of its own.
    fn end_stream(&mut self) {
        while let Some(decoded) = self.decoder.finish() {
            self.apply(decoded);
        }
        self.held = None;
    }

    fn apply(&mut self, decoded: Decoded) {
        match decoded {
            Decoded::Action(code, count) => self.action(code, count),
            Decoded::Char(ch) => self.input(ch),
        }
    }

    fn input(&mut self, ch: u8) {
        match ch {
            b'.' | b':' => {
                let decoration = if ch == b'.' {
                    Decoration::Dp
                } else {
                    Decoration::Colon
                };
                match self.held.take() {
                    Some(pos) => self.writech(self.buffer[pos], pos, decoration),
                    None => {
                        self.appendch(b' ', decoration);
                    }
                }
            }
            b' '..=b'~' => {
                let pos = self.appendch(ch, Decoration::None);
                self.held = Some(pos);
            }
            BS => self.action(SlcdCode::BackDel, 1),
            CR_CHAR => self.action(SlcdCode::Home, 0),
            DEL => self.action(SlcdCode::FwdDel, 1),
            _ => self.held = None,
        }
    }

    /// Writes at the cursor and advances it unless it is on the last cell. Returns the cell
    /// written.
    fn appendch(&mut self, ch: u8, decoration: Decoration) -> usize {
        let pos = self.curpos;
        self.writech(ch, pos, decoration);
        if self.curpos < NCHARS - 1 {
            self.curpos += 1;
        }
        pos
    }

    fn delete_at_cursor(&mut self) {
        for pos in self.curpos + 1..NCHARS {
            self.writech(self.buffer[pos], pos - 1, self.options[pos]);
        }
        self.writech(b' ', NCHARS - 1, Decoration::None);
    }

    fn erase(&mut self, start: usize, end: usize) {
        for pos in start..end {
            self.writech(b' ', pos, Decoration::None);
        }
    }

    fn writech(&mut self, ch: u8, pos: usize, decoration: Decoration) {
        self.buffer[pos] = ch;
        self.options[pos] = decoration;
        let segments = font::glyph(ch) | decoration.segments();
        self.writemem(pos, font::segment_nibbles(segments));
    }

    /// Patches the COM0..COM3 RAM words of cell `pos` and requests a display update.
    fn writemem(&mut self, pos: usize, nibbles: [u8; 4]) {
        self.wait_update();
        for (com, &nibble) in nibbles.iter().enumerate() {
            if let Some(patch) = font::patch(pos, com, nibble) {
                self.regs
                    .modify(raml(com), |r| r & patch.mask | patch.bits);
            }
        }
        self.regs.set_bit(SR, SR_UDR_BIT);
    }

    fn update_done(&self) -> nb::Result<(), Infallible> {
        if self.regs.read(SR) & SR_UDR != 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    fn fcr_synced(&self) -> nb::Result<(), Infallible> {
        if self.regs.read(SR) & SR_FCRSF == 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Waits until the previous update request has been served.
    fn wait_update(&self) {
        let _ = nb::block!(self.update_done());
    }

    fn wait_fcr_sync(&self) {
        let _ = nb::block!(self.fcr_synced());
    }
}

/// Polls SR until every bit of `flags` is set.
fn wait_status<R: Registers, D: DelayNs>(
    regs: &R,
    flags: u32,
    delay: &mut D,
    timeout_us: u32,
) -> Result<(), Error> {
    let mut waited = 0;
    while regs.read(SR) & flags != flags {
        if waited >= timeout_us {
            debug!("slcd: timeout waiting for SR {=u32:#x}", flags);
            return Err(Error::Timeout);
        }
        delay.delay_us(POLL_US);
        waited += POLL_US;
    }
    Ok(())
}

impl<R: Registers> embedded_hal_nb::serial::ErrorType for Slcd<R> {
    type Error = Infallible;
}

impl<R: Registers> embedded_hal_nb::serial::Write<u8> for Slcd<R> {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.feed(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.end_stream();
        Ok(())
    }
}

impl<R: Registers> embedded_hal_zero::serial::Write<u8> for Slcd<R> {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.feed(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.end_stream();
        Ok(())
    }
}

/// Text sink. Escape sequences may span several `write_str` calls.
impl<R: Registers> core::fmt::Write for Slcd<R> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            self.feed(byte);
        }
        Ok(())
    }
}

/// Holder of the one display of the board
///
/// ```
/// # use slcd_dma_hal::{register::Mmio, slcd::SlcdCell};
/// static LCD: SlcdCell<Mmio> = SlcdCell::new();
/// ```
pub struct SlcdCell<R: Registers> {
    inner: Mutex<RefCell<Option<Slcd<R>>>>,
}

impl<R: Registers> SlcdCell<R> {
    /// Creates an empty cell.
    pub const fn new() -> Self {
        SlcdCell {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Makes `slcd` the registered display.
    ///
    /// Fails with [`Error::AlreadyRegistered`] if a display is registered already; `slcd` is
    /// dropped in that case.
    pub fn register(&self, slcd: Slcd<R>) -> Result<(), Error> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.is_some() {
                return Err(Error::AlreadyRegistered);
            }
            *inner = Some(slcd);
            Ok(())
        })
    }

    /// Runs `f` on the registered display, if any.
    pub fn with<T, F: FnOnce(&mut Slcd<R>) -> T>(&self, f: F) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Unregisters the display.
    pub fn take(&self) -> Option<Slcd<R>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }
}

impl<R: Registers> Default for SlcdCell<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Register block whose status register never reports anything.
    struct Stuck([u32; 24]);

    impl Registers for Stuck {
        fn read(&self, offset: usize) -> u32 {
            self.0[offset / 4]
        }

        fn write(&mut self, offset: usize, value: u32) {
            if offset != SR {
                self.0[offset / 4] = value;
            }
        }
    }

    #[test]
    fn init_times_out_without_clock() {
        let config = Config::default().timeout_us(1000);
        let result = Slcd::new(Stuck([0; 24]), config, &mut NoDelay);
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[test]
    fn init_rejects_bad_divider() {
        let config = Config::default().divider(40);
        let result = Slcd::new(Stuck([0; 24]), config, &mut NoDelay);
        assert!(matches!(result, Err(Error::DividerOutOfRange)));
    }

    #[test]
    fn decorations() {
        assert_eq!(Decoration::Dp.segments(), 0x0002);
        assert_eq!(Decoration::Colon.suffix(), Some(b':'));
        assert_eq!(Decoration::None.suffix(), None);
    }

    #[test]
    fn poll_reports_ready() {
        let all = PollEvents::IN | PollEvents::OUT;
        assert_eq!(all.bits(), 0x0005);
    }
}
