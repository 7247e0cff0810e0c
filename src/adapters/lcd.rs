//! HD44780 character LCD behind a PCF8574 I2C backpack.
//!
//! Implements [`CharDisplay`] over any `embedded-hal` 1.0 [`I2c`] bus and
//! [`DelayNs`] provider, so the same driver runs on the ESP-IDF I2C driver
//! and on a recording mock in tests.
//!
//! ```text
//!  PCF8574 bit:  7   6   5   4   3    2   1   0
//!                D7  D6  D5  D4  BL   EN  RW  RS
//! ```
//!
//! The controller runs in 4-bit mode: every byte goes out as two nibbles,
//! each latched by an EN high→low pulse.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::app::ports::CharDisplay;

// ── Backpack bits ─────────────────────────────────────────────

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

// ── HD44780 commands ──────────────────────────────────────────

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row on 20x4 / 16x2 modules.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

pub struct Pcf8574Lcd<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    cols: u8,
    rows: u8,
    /// I2C writes that failed since boot.
    errors: u32,
}

impl<I: I2c, D: DelayNs> Pcf8574Lcd<I, D> {
    pub fn new(i2c: I, delay: D, address: u8, cols: u8, rows: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            cols,
            rows,
            errors: 0,
        }
    }

    /// Power-on initialisation by instruction (HD44780 datasheet, fig. 24).
    pub fn init(&mut self) {
        self.delay.delay_ms(50);
        self.write_nibble(0x30, 0);
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0);
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0);
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0);

        self.command(CMD_FUNCTION_4BIT_2LINE);
        self.command(CMD_DISPLAY_ON);
        self.clear();
        self.command(CMD_ENTRY_MODE_INC);
        debug!("LCD: {}x{} at 0x{:02X} initialised", self.cols, self.rows, self.address);
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u8) {
        self.send(cmd, 0);
    }

    fn send(&mut self, value: u8, mode: u8) {
        self.write_nibble(value & 0xF0, mode);
        self.write_nibble(value << 4, mode);
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) {
        let byte = (nibble & 0xF0) | mode | BACKLIGHT;
        self.expander_write(byte | EN);
        self.delay.delay_us(1);
        self.expander_write(byte & !EN);
        self.delay.delay_us(50);
    }

    fn expander_write(&mut self, byte: u8) {
        if let Err(e) = self.i2c.write(self.address, &[byte]) {
            self.errors = self.errors.saturating_add(1);
            if self.errors == 1 {
                warn!("LCD: I2C write failed: {:?}", e);
            }
        }
    }
}

impl<I: I2c, D: DelayNs> CharDisplay for Pcf8574Lcd<I, D> {
    fn clear(&mut self) {
        self.command(CMD_CLEAR);
        self.delay.delay_ms(2);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let row = row.min(self.rows.saturating_sub(1)).min(3);
        let col = col.min(self.cols.saturating_sub(1));
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[usize::from(row)] + col));
    }

    fn print(&mut self, text: &str) {
        for c in text.chars() {
            let code = if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' };
            self.send(code, RS);
        }
    }
}
