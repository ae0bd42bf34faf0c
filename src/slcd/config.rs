//! LCD controller configuration

use embedded_time::rate::{Extensions, Hertz};

use super::regs::*;
use super::Error;

/// Clock prescaler, ck_ps = LCDCLK / 2^PS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div1 = 0,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
    Div256,
    Div512,
    Div1024,
    Div2048,
    Div4096,
    Div8192,
    Div16384,
    Div32768,
}

/// Number of COM lines driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duty {
    Static = 0,
    OneHalf = 1,
    OneThird = 2,
    OneQuarter = 3,
    OneEighth = 4,
}

impl Duty {
    /// Number of commons multiplexed for this duty.
    pub fn commons(self) -> u32 {
        match self {
            Duty::Static => 1,
            Duty::OneHalf => 2,
            Duty::OneThird => 3,
            Duty::OneQuarter => 4,
            Duty::OneEighth => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bias {
    OneQuarter = 0,
    OneHalf = 1,
    OneThird = 2,
}

/// Source of V_LCD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageSource {
    /// Internal step-up converter
    Internal,
    /// External VLCD pin
    External,
}

/// Which segments blink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkMode {
    Disabled = 0,
    /// SEG0 on COM0
    Seg0Com0 = 1,
    /// SEG0 on all commons
    Seg0AllCom = 2,
    /// Every segment
    AllSegments = 3,
}

/// Blink frequency as a divider of ck_div
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkFrequency {
    Div8 = 0,
    Div16,
    Div32,
    Div64,
    Div128,
    Div256,
    Div512,
    Div1024,
}

/// LCD controller configuration
///
/// The default reproduces the setup of the STM32L-Discovery glass: 1/4 duty, 1/3 bias, internal
/// voltage source and a frame rate of about 264 Hz from the 32.768 kHz LSE.
///
/// ```
/// use slcd_dma_hal::slcd::{Config, Bias};
///
/// let config = Config::default().contrast(6).bias(Bias::OneThird);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub prescaler: Prescaler,
    /// Clock divider, 16..=31
    pub divider: u8,
    pub duty: Duty,
    pub bias: Bias,
    pub voltage: VoltageSource,
    /// Contrast level, 0..=7
    pub contrast: u8,
    /// Dead time in phase periods, 0..=7
    pub dead_time: u8,
    /// Pulse-on duration in ck_ps pulses, 0..=7
    pub pulse_on: u8,
    /// Remap SEG[31:28] to SEG[43:40]
    pub mux_segment: bool,
    pub blink: BlinkMode,
    pub blink_frequency: BlinkFrequency,
    /// Upper bound of every hardware wait during initialization, in microseconds
    pub timeout_us: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            prescaler: Prescaler::Div1,
            divider: 31,
            duty: Duty::OneQuarter,
            bias: Bias::OneThird,
            voltage: VoltageSource::Internal,
            contrast: 4,
            dead_time: 0,
            pulse_on: 4,
            mux_segment: true,
            blink: BlinkMode::Disabled,
            blink_frequency: BlinkFrequency::Div32,
            timeout_us: 100_000,
        }
    }
}

impl Config {
    pub fn prescaler(mut self, prescaler: Prescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub fn divider(mut self, divider: u8) -> Self {
        self.divider = divider;
        self
    }

    pub fn duty(mut self, duty: Duty) -> Self {
        self.duty = duty;
        self
    }

    pub fn bias(mut self, bias: Bias) -> Self {
        self.bias = bias;
        self
    }

    pub fn voltage(mut self, voltage: VoltageSource) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn dead_time(mut self, dead_time: u8) -> Self {
        self.dead_time = dead_time;
        self
    }

    pub fn pulse_on(mut self, pulse_on: u8) -> Self {
        self.pulse_on = pulse_on;
        self
    }

    pub fn mux_segment(mut self, mux_segment: bool) -> Self {
        self.mux_segment = mux_segment;
        self
    }

    pub fn blink(mut self, mode: BlinkMode, frequency: BlinkFrequency) -> Self {
        self.blink = mode;
        self.blink_frequency = frequency;
        self
    }

    pub fn timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Checks that every field fits its register.
    pub fn validate(&self) -> Result<(), Error> {
        if !(16..=31).contains(&self.divider) {
            return Err(Error::DividerOutOfRange);
        }
        if self.contrast > MAX_CONTRAST {
            return Err(Error::ContrastOutOfRange);
        }
        if self.dead_time > 7 || self.pulse_on > 7 {
            return Err(Error::FieldOutOfRange);
        }
        Ok(())
    }

    /// Frame frequency produced from the LCD clock `lcdclk`.
    ///
    /// f_frame = LCDCLK / (2^PS * DIV) * duty
    ///
    /// Fails like [`Config::validate`] if a field is out of range.
    pub fn frame_rate(&self, lcdclk: impl Into<Hertz>) -> Result<Hertz, Error> {
        self.validate()?;
        let lcdclk: Hertz = lcdclk.into();
        let ck_div = lcdclk.0 / (1u32 << self.prescaler as u32) / u32::from(self.divider);
        Ok((ck_div / self.duty.commons()).Hz())
    }

    /// FCR prescaler and divider fields.
    pub(crate) fn fcr_clock(&self) -> u32 {
        (self.prescaler as u32) << FCR_PS_SHIFT
            | (u32::from(self.divider) - 16) << FCR_DIV_SHIFT
    }

    /// CR duty, bias and voltage source fields.
    pub(crate) fn cr_drive(&self) -> u32 {
        let mut bits = (self.duty as u32) << CR_DUTY_SHIFT | (self.bias as u32) << CR_BIAS_SHIFT;
        if self.voltage == VoltageSource::External {
            bits |= CR_VSEL;
        }
        bits
    }

    /// FCR blink fields.
    pub(crate) fn fcr_blink(&self) -> u32 {
        blink_bits(self.blink, self.blink_frequency)
    }
}

pub(crate) fn blink_bits(mode: BlinkMode, frequency: BlinkFrequency) -> u32 {
    (mode as u32) << FCR_BLINK_SHIFT | (frequency as u32) << FCR_BLINKF_SHIFT
}

/// Highest contrast level
pub const MAX_CONTRAST: u8 = 7;
