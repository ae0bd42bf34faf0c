//! STM32L-Discovery LCD wiring
//!
//! The glass is driven by four COM lines and 24 segment lines, all routed to the LCD controller
//! through alternate function 11. This crate does not own the GPIO block; hand each pin of
//! [`PINS`] to the port driver of your choice, for example with [`configure_pins`].

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
}

/// Function of a pin on the glass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Com(u8),
    Seg(u8),
}

/// One pin routed to the LCD controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pub port: Port,
    pub pin: u8,
    pub line: Line,
}

/// Alternate function selecting the LCD controller
pub const LCD_AF: u8 = 11;

const fn com(port: Port, pin: u8, n: u8) -> Pin {
    Pin {
        port,
        pin,
        line: Line::Com(n),
    }
}

const fn seg(port: Port, pin: u8, n: u8) -> Pin {
    Pin {
        port,
        pin,
        line: Line::Seg(n),
    }
}

/// Every pin of the glass, COM lines first.
pub const PINS: [Pin; 28] = [
    com(Port::A, 8, 0),
    com(Port::A, 9, 1),
    com(Port::A, 10, 2),
    com(Port::B, 9, 3),
    seg(Port::A, 1, 0),
    seg(Port::A, 2, 1),
    seg(Port::A, 3, 2),
    seg(Port::B, 3, 3),
    seg(Port::B, 4, 4),
    seg(Port::B, 5, 5),
    seg(Port::B, 10, 6),
    seg(Port::B, 11, 7),
    seg(Port::B, 12, 8),
    seg(Port::B, 13, 9),
    seg(Port::B, 14, 10),
    seg(Port::B, 15, 11),
    seg(Port::A, 15, 12),
    seg(Port::B, 8, 13),
    seg(Port::C, 0, 14),
    seg(Port::C, 1, 15),
    seg(Port::C, 2, 16),
    seg(Port::C, 3, 17),
    seg(Port::C, 6, 18),
    seg(Port::C, 7, 19),
    seg(Port::C, 8, 20),
    seg(Port::C, 9, 21),
    seg(Port::C, 10, 22),
    seg(Port::C, 11, 23),
];

/// Calls `f` with the port, pin number and alternate function of every LCD pin.
pub fn configure_pins<F: FnMut(Port, u8, u8)>(mut f: F) {
    for pin in PINS.iter() {
        f(pin.port, pin.pin, LCD_AF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_line_once() {
        let coms = PINS.iter().filter(|p| matches!(p.line, Line::Com(_))).count();
        assert_eq!(coms, 4);
        for n in 0..24 {
            assert_eq!(PINS.iter().filter(|p| p.line == Line::Seg(n)).count(), 1);
        }
    }

    #[test]
    fn no_pin_used_twice() {
        for (i, a) in PINS.iter().enumerate() {
            for b in PINS[i + 1..].iter() {
                assert!(!(a.port == b.port && a.pin == b.pin), "{:?}", a);
            }
        }
    }

    #[test]
    fn configure_visits_all_pins() {
        let mut n = 0;
        configure_pins(|_, _, af| {
            assert_eq!(af, LCD_AF);
            n += 1;
        });
        assert_eq!(n, PINS.len());
    }
}
