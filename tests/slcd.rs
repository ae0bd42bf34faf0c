use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use slcd_dma_hal::register::Registers;
use slcd_dma_hal::slcd::regs::*;
use slcd_dma_hal::slcd::{
    codec, Config, Error, PollEvents, Slcd, SlcdCell, SlcdCode,
};

/// LCD controller model: always enabled and synchronized, update requests complete at once.
#[derive(Default)]
struct FakeLcd {
    words: [u32; 24],
    updates: usize,
}

impl FakeLcd {
    fn ram(&self, com: usize) -> u32 {
        self.words[raml(com) / 4]
    }
}

impl Registers for FakeLcd {
    fn read(&self, offset: usize) -> u32 {
        if offset == SR {
            SR_ENS | SR_RDY | SR_FCRSF
        } else {
            self.words[offset / 4]
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.words[offset / 4] = value;
    }

    fn set_bit(&mut self, offset: usize, bit: u8) {
        if offset == SR && bit == SR_UDR_BIT {
            self.updates += 1;
        } else {
            self.words[offset / 4] |= 1 << bit;
        }
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn lcd() -> Slcd<FakeLcd> {
    Slcd::new(FakeLcd::default(), Config::default(), &mut NoDelay).unwrap()
}

fn shown(text: &str) -> Slcd<FakeLcd> {
    let mut lcd = lcd();
    assert_eq!(lcd.write(text.as_bytes()), text.len());
    lcd
}

#[test]
fn init_programs_controller() {
    let regs = lcd().free();

    let cr = regs.words[CR / 4];
    assert_eq!(cr & CR_DUTY_MASK, 3 << CR_DUTY_SHIFT);
    assert_eq!(cr & CR_BIAS_MASK, 2 << CR_BIAS_SHIFT);
    assert_ne!(cr & CR_MUX_SEG, 0);
    assert_eq!(cr & CR_VSEL, 0);
    assert_eq!(cr & 1, 1, "LCDEN");

    let fcr = regs.words[FCR / 4];
    assert_eq!(fcr & FCR_PS_MASK, 0);
    assert_eq!(fcr & FCR_DIV_MASK, 15 << FCR_DIV_SHIFT);
    assert_eq!(fcr & FCR_CC_MASK, 4 << FCR_CC_SHIFT);
    assert_eq!(fcr & FCR_PON_MASK, 4 << FCR_PON_SHIFT);
    assert_eq!(fcr & FCR_DEAD_MASK, 0);
    assert_eq!(fcr & FCR_BLINK_MASK, 0);
    assert_eq!(fcr & FCR_BLINKF_MASK, 2 << FCR_BLINKF_SHIFT);

    // cleared once
    assert_eq!(regs.updates, 1);
    for n in 0..NRAM {
        assert_eq!(regs.ram(n), 0);
    }
}

#[test]
fn digit_in_first_cell() {
    let lcd = shown("1");
    assert_eq!(lcd.cursor(), 1);

    let regs = lcd.free();
    assert_eq!(regs.ram(0), 0x1000_0000);
    assert_eq!(regs.ram(1), 0x0000_0002);
    assert_eq!(regs.ram(2), 0);
    assert_eq!(regs.ram(3), 0);
    assert_eq!(regs.updates, 2);
}

#[test]
fn trailing_dot_and_colon_decorate_previous_cell() {
    let lcd = shown("1.2:");
    assert_eq!(lcd.text(), "1.2:    ");
    assert_eq!(lcd.cursor(), 2);

    let regs = lcd.free();
    // decimal point of the first cell on COM3, colon of the second on COM2
    assert_eq!(regs.ram(3) & 0x3, 0x2);
    assert_eq!(regs.ram(2), 0x80);
}

#[test]
fn leading_dot_decorates_a_space() {
    let lcd = shown(".5");
    assert_eq!(lcd.text(), " .5    ");
    assert_eq!(lcd.cursor(), 2);
}

#[test]
fn second_dot_takes_its_own_cell() {
    let lcd = shown("1..");
    assert_eq!(lcd.text(), "1. .    ");
}

#[test]
fn cursor_stops_at_last_cell() {
    let lcd = shown("ABCDEFGH");
    assert_eq!(lcd.text(), "ABCDEH");
    assert_eq!(lcd.cursor(), 5);
}

#[test]
fn lower_case_is_shown_as_upper_case_glyph() {
    let upper = shown("Hello").free();
    let lower = shown("hELLO").free();
    for com in 0..4 {
        assert_eq!(upper.ram(com), lower.ram(com));
    }
}

#[test]
fn backspace_deletes_before_cursor() {
    let lcd = shown("ABC\x08");
    assert_eq!(lcd.text(), "AB    ");
    assert_eq!(lcd.cursor(), 2);

    let lcd = shown("\x08");
    assert_eq!(lcd.text(), "      ");
    assert_eq!(lcd.cursor(), 0);
}

#[test]
fn delete_shifts_remaining_cells_left() {
    let lcd = shown("A1.B\r\x7f");
    assert_eq!(lcd.text(), "1.B    ");
    assert_eq!(lcd.cursor(), 0);
}

#[test]
fn ignored_control_characters_end_decoration() {
    let lcd = shown("7\n.");
    assert_eq!(lcd.text(), "7 .    ");
}

#[test]
fn erase_from_cursor() {
    let mut lcd = shown("ABCDEF");
    lcd.action(SlcdCode::Home, 0);
    lcd.action(SlcdCode::Right, 1);
    lcd.action(SlcdCode::Erase, 2);
    assert_eq!(lcd.text(), "A  DEF");
    assert_eq!(lcd.cursor(), 1);

    lcd.action(SlcdCode::End, 0);
    lcd.action(SlcdCode::Erase, 0x10);
    assert_eq!(lcd.text(), "A  DE ");
}

#[test]
fn erase_to_end_of_line() {
    let mut lcd = shown("ABCDEF");
    lcd.action(SlcdCode::Home, 0);
    lcd.action(SlcdCode::Right, 2);
    lcd.action(SlcdCode::EraseEol, 0);
    assert_eq!(lcd.text(), "AB    ");
    assert_eq!(lcd.cursor(), 2);
}

#[test]
fn clear_sequence_homes_cursor() {
    let lcd = shown("AB\x1b[D");
    assert_eq!(lcd.text(), "      ");
    assert_eq!(lcd.cursor(), 0);
}

#[test]
fn cursor_motion_is_clamped() {
    let mut lcd = shown("AB");
    lcd.action(SlcdCode::Left, 5);
    assert_eq!(lcd.cursor(), 0);
    lcd.action(SlcdCode::Right, 0x20);
    assert_eq!(lcd.cursor(), 5);
    lcd.action(SlcdCode::Left, 0);
    assert_eq!(lcd.cursor(), 4);

    for code in [SlcdCode::Up, SlcdCode::Down, SlcdCode::PageUp, SlcdCode::PageDown] {
        lcd.action(code, 3);
    }
    assert_eq!(lcd.cursor(), 4);
    assert_eq!(lcd.text(), "AB    ");
}

#[test]
fn escape_sequences_inside_text() {
    let mut text = b"12".to_vec();
    text.extend_from_slice(&codec::encode(SlcdCode::Left, 2));
    text.push(b'3');

    let mut lcd = lcd();
    lcd.write(&text);
    assert_eq!(lcd.text(), "32    ");
    assert_eq!(lcd.cursor(), 1);
}

#[test]
fn unfinished_escape_at_end_of_write_is_text() {
    let lcd = shown("A\x1b[");
    assert_eq!(lcd.text(), "A[    ");
}

#[test]
fn read_back_content() {
    let lcd = shown("12:3.4");

    let mut buf = [0u8; 16];
    let n = lcd.read(&mut buf);
    assert_eq!(&buf[..n], b"12:3.4  ");

    let mut short = [0u8; 4];
    assert_eq!(lcd.read(&mut short), 4);
    assert_eq!(&short, b"12:3");
}

#[test]
fn always_ready() {
    let lcd = lcd();
    assert_eq!(lcd.poll(PollEvents::all()), PollEvents::IN | PollEvents::OUT);
    assert_eq!(lcd.poll(PollEvents::OUT), PollEvents::OUT);
    assert_eq!(lcd.poll(PollEvents::empty()), PollEvents::empty());
}

#[test]
fn serial_stream_spans_writes() {
    use embedded_hal_nb::serial::Write;

    let mut lcd = lcd();
    for &byte in b"AB\x1b[0" {
        nb::block!(Write::write(&mut lcd, byte)).unwrap();
    }
    assert_eq!(lcd.text(), "AB    ");
    for &byte in b"2A7" {
        nb::block!(Write::write(&mut lcd, byte)).unwrap();
    }
    assert_eq!(lcd.text(), "7     ");

    // held character still takes a trailing dot
    nb::block!(Write::write(&mut lcd, b'.')).unwrap();
    assert_eq!(lcd.text(), "7.     ");

    nb::block!(Write::write(&mut lcd, 0x1b)).unwrap();
    nb::block!(Write::write(&mut lcd, b'[')).unwrap();
    assert_eq!(lcd.text(), "7.     ");
    nb::block!(Write::flush(&mut lcd)).unwrap();
    assert_eq!(lcd.text(), "7.[    ");
}

#[test]
fn serial_zero_writes_bytes() {
    use embedded_hal_zero::serial::Write;

    let mut lcd = lcd();
    for &byte in b"OK" {
        nb::block!(Write::write(&mut lcd, byte)).unwrap();
    }
    nb::block!(Write::flush(&mut lcd)).unwrap();
    assert_eq!(lcd.text(), "OK    ");
}

#[test]
fn formatted_text() {
    let mut lcd = lcd();
    write!(lcd, "{}.{}", 1, 5).unwrap();
    assert_eq!(lcd.text(), "1.5    ");

    write!(lcd, "\x1b[F{:02}:{:02}", 12, 34).unwrap();
    assert_eq!(lcd.text(), "12:34  ");
}

#[test]
fn contrast_is_clamped() {
    let mut lcd = lcd();
    assert_eq!(lcd.contrast(), 4);
    assert_eq!(lcd.set_contrast(2), Ok(()));
    assert_eq!(lcd.contrast(), 2);
    assert_eq!(lcd.set_contrast(9), Err(Error::ContrastOutOfRange));
    assert_eq!(lcd.contrast(), 7);

    let regs = lcd.free();
    assert_eq!(regs.words[FCR / 4] & FCR_CC_MASK, 7 << FCR_CC_SHIFT);
}

#[test]
fn bar_segments() {
    let mut lcd = lcd();
    assert_eq!(lcd.set_bar(0, true), Ok(()));
    assert_eq!(lcd.set_bar(3, true), Ok(()));
    assert_eq!(lcd.set_bar(4, true), Err(Error::InvalidBar));
    // bars survive text in the fifth cell
    lcd.write(b"\x1b[04IM");

    let regs = lcd.free();
    assert_eq!(regs.ram(3) & 0xa000, 0x8000);
    assert_eq!(regs.ram(2) & 0xa000, 0x2000);
}

#[test]
fn bar_off() {
    let mut lcd = lcd();
    lcd.set_bar(1, true).unwrap();
    lcd.set_bar(1, false).unwrap();
    let regs = lcd.free();
    assert_eq!(regs.ram(2), 0);
    assert_eq!(regs.ram(3), 0);
}

#[test]
fn blink_start_and_off() {
    let mut lcd = shown("\x1b[N");
    lcd.write(b"\x1b[O");
    let regs = lcd.free();
    assert_eq!(regs.words[FCR / 4] & FCR_BLINK_MASK, 3 << FCR_BLINK_SHIFT);

    let lcd = shown("\x1b[N\x1b[P");
    let regs = lcd.free();
    assert_eq!(regs.words[FCR / 4] & FCR_BLINK_MASK, 0);
    assert_eq!(regs.words[FCR / 4] & FCR_BLINKF_MASK, 2 << FCR_BLINKF_SHIFT);
}

#[test]
fn each_character_requests_one_update() {
    let mut lcd = shown("AB");
    lcd.action(SlcdCode::Home, 0);
    assert_eq!(lcd.free().updates, 3);
}

#[test]
fn clear_blanks_everything() {
    let mut lcd = shown("AB");
    lcd.set_bar(2, true).unwrap();
    lcd.clear();
    assert_eq!(lcd.text(), "      ");
    assert_eq!(lcd.cursor(), 0);

    let regs = lcd.free();
    for n in 0..NRAM {
        assert_eq!(regs.ram(n), 0);
        assert_eq!(regs.words[ramh(n) / 4], 0);
    }
}

#[test]
fn one_registered_display() {
    let cell: SlcdCell<FakeLcd> = SlcdCell::new();
    assert_eq!(cell.with(|lcd| lcd.cursor()), None);

    assert_eq!(cell.register(lcd()), Ok(()));
    assert_eq!(cell.register(lcd()), Err(Error::AlreadyRegistered));
    assert_eq!(cell.with(|lcd| lcd.write(b"HI")), Some(2));

    let lcd = cell.take().unwrap();
    assert_eq!(lcd.text(), "HI    ");
    assert!(cell.take().is_none());
}

#[test]
fn each_write_closes_its_last_character() {
    let mut lcd = shown("1");
    lcd.write(b".");
    assert_eq!(lcd.text(), "1 .    ");
    assert_eq!(lcd.cursor(), 2);
}

#[test]
fn serial_flush_closes_last_character() {
    use embedded_hal_nb::serial::Write;

    let mut lcd = lcd();
    nb::block!(Write::write(&mut lcd, b'7')).unwrap();
    nb::block!(Write::flush(&mut lcd)).unwrap();
    nb::block!(Write::write(&mut lcd, b'.')).unwrap();
    assert_eq!(lcd.text(), "7 .    ");
}

#[test]
fn clear_drops_partial_escape() {
    use embedded_hal_nb::serial::Write;

    let mut lcd = lcd();
    nb::block!(Write::write(&mut lcd, 0x1b)).unwrap();
    nb::block!(Write::write(&mut lcd, b'[')).unwrap();
    lcd.clear();
    nb::block!(Write::write(&mut lcd, b'F')).unwrap();
    assert_eq!(lcd.text(), "F     ");
    assert_eq!(lcd.cursor(), 1);
}
