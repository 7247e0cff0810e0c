//! GPIO / peripheral pin assignments for the TEC rig controller board.
//!
//! Single source of truth: `main.rs` takes its pins from here rather than
//! hard-coding numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// 1-wire bus (DS18B20 probes, 4.7 kΩ pull-up to 3V3)
// ---------------------------------------------------------------------------

/// Shared data line of every temperature probe.
pub const ONE_WIRE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// I²C bus (PCF8574 LCD backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode clock; the PCF8574 tops out at 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// 7-bit address of the LCD backpack (A0–A2 open).
pub const LCD_I2C_ADDR: u8 = 0x27;
