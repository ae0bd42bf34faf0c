//! # Board support for the STM32L-Discovery segment LCD and the LPC31xx DMA controller
//!
//! [`slcd`] drives the 6-cell segment display of the STM32L-Discovery through the on-chip LCD
//! controller of the STM32L1 and implements the [`embedded-hal`] serial write traits, so it can
//! be used wherever a text sink is expected. [`dma`] is the register map of the LPC31xx DMA
//! controller with thin per-channel accessors.
//!
//! Both talk to their peripheral through [`register::Registers`], so they run against memory
//! mapped hardware ([`register::Mmio`]) as well as against a register model in host tests.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//!
//! # Usage
//!
//!
//! ## Showing text
//!
//! ```rust,ignore
//! use core::fmt::Write;
//! use slcd_dma_hal::prelude::*;
//! use slcd_dma_hal::register::Mmio;
//! use slcd_dma_hal::slcd::{self, Slcd};
//!
//! // The LCD controller sits in the bit-band capable peripheral region
//! let regs = unsafe { Mmio::new(slcd::regs::LCD_BASE) }.with_bitband().unwrap();
//! let mut lcd = Slcd::new(regs, slcd::Config::default(), &mut delay)?;
//!
//! write!(lcd, "{:02}:{:02}", hours, minutes)?;
//! ```
//!
//! Enable the `defmt` feature to trace initialization and display actions.
//!

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

pub mod dma;
pub mod register;
pub mod slcd;

/// HAL crate prelude
pub mod prelude {
    pub use crate::register::Registers as _slcd_dma_hal_register_Registers;
    pub use embedded_hal_nb::serial::Write as _embedded_hal_nb_serial_Write;
    pub use embedded_time::rate::Extensions;
}
