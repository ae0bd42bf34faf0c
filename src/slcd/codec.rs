//! Escape codes for segment LCD actions
//!
//! Ordinary bytes go to the display as they are. Cursor motion and erasure are requested
//! in-band with a short escape sequence:
//!
//! ```text
//! ESC '[' <code>            action without count
//! ESC '[' <hex> <hex> <code>  action with a count of 0x00..=0xff
//! ```
//!
//! `<code>` is an upper case letter, `'A'` for [`SlcdCode::BackDel`] through `'P'` for
//! [`SlcdCode::BlinkOff`]. The count is written with lower case hex digits so it can never be
//! confused with a code. A sequence that breaks this grammar is handed back as ordinary
//! characters.

use heapless::{Deque, Vec};

/// Escape character starting a sequence.
pub const ESC: u8 = 0x1b;
/// Second byte of every sequence.
pub const COMMAND: u8 = b'[';

/// Actions that can be requested through an escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SlcdCode {
    /// Backspace (backward delete) N characters
    BackDel = 1,
    /// Delete (forward delete) N characters moving text
    FwdDel,
    /// Erase N characters from the cursor position
    Erase,
    /// Home the cursor and erase the entire display
    Clear,
    /// Erase from the cursor position to the end of line
    EraseEol,
    /// Cursor home
    Home,
    /// Cursor end
    End,
    /// Cursor left by N characters
    Left,
    /// Cursor right by N characters
    Right,
    /// Cursor up by N lines
    Up,
    /// Cursor down by N lines
    Down,
    /// Cursor up by N pages
    PageUp,
    /// Cursor down by N pages
    PageDown,
    /// Start blinking with current cursor position
    BlinkStart,
    /// End blinking after the current cursor position
    BlinkEnd,
    /// Turn blinking off
    BlinkOff,
}

impl SlcdCode {
    const ALL: [SlcdCode; 16] = [
        SlcdCode::BackDel,
        SlcdCode::FwdDel,
        SlcdCode::Erase,
        SlcdCode::Clear,
        SlcdCode::EraseEol,
        SlcdCode::Home,
        SlcdCode::End,
        SlcdCode::Left,
        SlcdCode::Right,
        SlcdCode::Up,
        SlcdCode::Down,
        SlcdCode::PageUp,
        SlcdCode::PageDown,
        SlcdCode::BlinkStart,
        SlcdCode::BlinkEnd,
        SlcdCode::BlinkOff,
    ];

    /// Letter identifying this action in an escape sequence.
    pub fn letter(self) -> u8 {
        b'A' + (self as u8 - 1)
    }

    /// Action identified by `letter`, if any.
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'A'..=b'P' => Some(Self::ALL[(letter - b'A') as usize]),
            _ => None,
        }
    }
}

/// One decoded unit of the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// A byte to be shown (or interpreted as a control character)
    Char(u8),
    /// An action with its count, 0 if none was given
    Action(SlcdCode, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Escape,
    Command,
    Count(u8),
    Counted(u8),
}

/// Streaming escape sequence decoder
///
/// The decoder pulls bytes from an iterator and keeps partial sequences across calls, so input
/// may arrive split at any point.
#[derive(Debug)]
pub struct Decoder {
    state: State,
    pending: Vec<u8, 4>,
    replay: Deque<u8, 4>,
    lookahead: Option<u8>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub const fn new() -> Self {
        Decoder {
            state: State::Normal,
            pending: Vec::new(),
            replay: Deque::new(),
            lookahead: None,
        }
    }

    /// Returns true if a partial sequence is buffered.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty() || !self.replay.is_empty() || self.lookahead.is_some()
    }

    /// Decodes the next unit from `input`.
    ///
    /// Returns `None` once `input` is exhausted. An incomplete sequence at that point stays
    /// buffered for the next call; use [`Decoder::finish`] at the end of the stream.
    pub fn decode<I: Iterator<Item = u8>>(&mut self, input: &mut I) -> Option<Decoded> {
        loop {
            if let Some(byte) = self.replay.pop_front() {
                return Some(Decoded::Char(byte));
            }

            let byte = match self.lookahead.take() {
                Some(byte) => byte,
                None => input.next()?,
            };

            if let Some(decoded) = self.step(byte) {
                return Some(decoded);
            }
        }
    }

    /// Flushes the decoder at the end of the stream.
    ///
    /// Bytes of an unfinished sequence come back as ordinary characters. Call repeatedly until
    /// it returns `None`.
    pub fn finish(&mut self) -> Option<Decoded> {
        if self.replay.is_empty() && self.lookahead.is_none() {
            self.reject();
        }
        self.decode(&mut core::iter::empty())
    }

    /// Returns to the initial state, dropping anything buffered.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn step(&mut self, byte: u8) -> Option<Decoded> {
        match self.state {
            State::Normal => {
                if byte == ESC {
                    self.push(byte, State::Escape);
                    None
                } else {
                    Some(Decoded::Char(byte))
                }
            }
            State::Escape if byte == COMMAND => {
                self.push(byte, State::Command);
                None
            }
            State::Command => {
                if let Some(code) = SlcdCode::from_letter(byte) {
                    self.accept();
                    Some(Decoded::Action(code, 0))
                } else if let Some(digit) = hex_digit(byte) {
                    self.push(byte, State::Count(digit));
                    None
                } else {
                    self.retry(byte)
                }
            }
            State::Count(high) => match hex_digit(byte) {
                Some(low) => {
                    self.push(byte, State::Counted(high << 4 | low));
                    None
                }
                None => self.retry(byte),
            },
            State::Counted(count) => match SlcdCode::from_letter(byte) {
                Some(code) => {
                    self.accept();
                    Some(Decoded::Action(code, count))
                }
                None => self.retry(byte),
            },
            State::Escape => self.retry(byte),
        }
    }

    fn push(&mut self, byte: u8, next: State) {
        // a sequence never holds more than ESC, '[' and two digits
        let _ = self.pending.push(byte);
        self.state = next;
    }

    fn accept(&mut self) {
        self.pending.clear();
        self.state = State::Normal;
    }

    fn reject(&mut self) {
        for &byte in self.pending.iter() {
            let _ = self.replay.push_back(byte);
        }
        self.accept();
    }

    /// Gives up on the current sequence and examines `byte` again once the buffered bytes have
    /// been handed back.
    fn retry(&mut self, byte: u8) -> Option<Decoded> {
        self.reject();
        self.lookahead = Some(byte);
        None
    }
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Builds the escape sequence requesting `code`.
///
/// A `count` of zero produces the short form.
pub fn encode(code: SlcdCode, count: u8) -> Vec<u8, 5> {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut seq = Vec::new();
    let _ = seq.push(ESC);
    let _ = seq.push(COMMAND);
    if count > 0 {
        let _ = seq.push(HEX[(count >> 4) as usize]);
        let _ = seq.push(HEX[(count & 0x0f) as usize]);
    }
    let _ = seq.push(code.letter());
    seq
}
