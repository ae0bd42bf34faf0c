//! STM32L1 LCD controller registers

/// Base address of the LCD controller
pub const LCD_BASE: usize = 0x4000_2400;

/// Control register
pub const CR: usize = 0x00;
/// Frame control register
pub const FCR: usize = 0x04;
/// Status register
pub const SR: usize = 0x08;
/// Clear register
pub const CLR: usize = 0x0c;

/// Number of COM lines backed by display RAM
pub const NRAM: usize = 8;

/// Low word of the display RAM for COM `n`.
pub const fn raml(n: usize) -> usize {
    0x14 + 8 * n
}

/// High word of the display RAM for COM `n`.
pub const fn ramh(n: usize) -> usize {
    0x18 + 8 * n
}

// CR

pub const CR_LCDEN_BIT: u8 = 0;
pub const CR_VSEL: u32 = 1 << 1;
pub const CR_DUTY_SHIFT: u32 = 2;
pub const CR_DUTY_MASK: u32 = 7 << CR_DUTY_SHIFT;
pub const CR_BIAS_SHIFT: u32 = 5;
pub const CR_BIAS_MASK: u32 = 3 << CR_BIAS_SHIFT;
pub const CR_MUX_SEG: u32 = 1 << 7;

// FCR

pub const FCR_HD: u32 = 1 << 0;
pub const FCR_SOFIE: u32 = 1 << 1;
pub const FCR_UDDIE: u32 = 1 << 3;
pub const FCR_PON_SHIFT: u32 = 4;
pub const FCR_PON_MASK: u32 = 7 << FCR_PON_SHIFT;
pub const FCR_DEAD_SHIFT: u32 = 7;
pub const FCR_DEAD_MASK: u32 = 7 << FCR_DEAD_SHIFT;
pub const FCR_CC_SHIFT: u32 = 10;
pub const FCR_CC_MASK: u32 = 7 << FCR_CC_SHIFT;
pub const FCR_BLINKF_SHIFT: u32 = 13;
pub const FCR_BLINKF_MASK: u32 = 7 << FCR_BLINKF_SHIFT;
pub const FCR_BLINK_SHIFT: u32 = 16;
pub const FCR_BLINK_MASK: u32 = 3 << FCR_BLINK_SHIFT;
pub const FCR_DIV_SHIFT: u32 = 18;
pub const FCR_DIV_MASK: u32 = 15 << FCR_DIV_SHIFT;
pub const FCR_PS_SHIFT: u32 = 22;
pub const FCR_PS_MASK: u32 = 15 << FCR_PS_SHIFT;

// SR

pub const SR_ENS: u32 = 1 << 0;
pub const SR_SOF: u32 = 1 << 1;
pub const SR_UDR_BIT: u8 = 2;
pub const SR_UDR: u32 = 1 << SR_UDR_BIT;
pub const SR_UDD: u32 = 1 << 3;
pub const SR_RDY: u32 = 1 << 4;
pub const SR_FCRSF: u32 = 1 << 5;

// CLR

pub const CLR_SOFC: u32 = 1 << 1;
pub const CLR_UDDC: u32 = 1 << 3;
