//! Status renderer for the character LCD.
//!
//! ```text
//!   col 0                         cols-1
//!   ┌────────────────────────────────┐
//!   │HOT1: 25.00 C                  ?│  ← link glyph (top-right cell)
//!   │COLD1: 4.00 C                   │
//!   │HOT2: 30.25 C                   │
//!   │COLD2: -1.00 C                  │
//!   └────────────────────────────────┘
//! ```
//!
//! Row `i` always shows probe `i`; row 0 stops short of the glyph cell.
//! Lines are padded to the full width and written over the previous
//! content, so the periodic refresh never clears the screen.  Banners are the exception: they clear first.

use log::debug;

use crate::app::ports::CharDisplay;
use crate::config::RigConfig;
use crate::connectivity::ConnectivityState;
use crate::sensors::reading::{Batch, Label, MAX_PROBES};

/// Shown on row 0 when any probe faulted this cycle.
pub const PROBE_FAULT_BANNER: &str = "Temp Sensor Error!";

/// Startup banners.  Each fits a 20-column row.
pub const CONNECTING_BANNER: &str = "Connecting WiFi...";
pub const CONNECTED_BANNER: &str = "Connected to WiFi";
pub const LINK_TIMEOUT_BANNER: &str = "WiFi Timeout!";

/// Single-character link indicator for the top-right cell.
pub fn link_glyph(state: ConnectivityState) -> char {
    match state {
        ConnectivityState::Connected => ' ',
        ConnectivityState::Connecting => '?',
        ConnectivityState::Disconnected | ConnectivityState::Failed => '!',
    }
}

/// Pad `text` with spaces to exactly `width` characters, truncating if longer.
pub fn fit_line(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.extend(core::iter::repeat_n(' ', width - len));
    line
}

/// One probe row: `<label>: <value> C`, two decimals.
pub fn format_probe_line(label: &str, value: f32) -> String {
    format!("{}: {:.2} C", label, value)
}

pub struct StatusRenderer<D> {
    display: D,
    /// Screen label per probe, in declaration order.
    labels: heapless::Vec<Label, MAX_PROBES>,
    cols: u8,
    rows: u8,
}

impl<D: CharDisplay> StatusRenderer<D> {
    pub fn new(display: D, config: &RigConfig) -> Self {
        let labels = config
            .probes
            .iter()
            .map(|p| crate::sensors::reading::bounded(p.screen_label()))
            .collect();
        Self {
            display,
            labels,
            cols: config.lcd_cols,
            rows: config.lcd_rows,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Show one line per reading.  Readings beyond the row count are dropped.
    pub fn render(&mut self, batch: &Batch) {
        for (row, reading) in batch.iter().enumerate().take(usize::from(self.rows)) {
            let label = self
                .labels
                .get(row)
                .map_or(reading.name.as_str(), |l| l.as_str());
            let text = format_probe_line(label, reading.value);
            self.write_row(row as u8, &text);
        }
        if batch.len() > usize::from(self.rows) {
            debug!(
                "LCD: {} probes, {} rows; extra probes not shown",
                batch.len(),
                self.rows
            );
        }
    }

    /// Clear the screen and show `lines` from the top.
    pub fn render_banner(&mut self, lines: &[&str]) {
        self.display.clear();
        for (row, text) in lines.iter().enumerate().take(usize::from(self.rows)) {
            self.display.set_cursor(0, row as u8);
            let line: String = text.chars().take(usize::from(self.cols)).collect();
            self.display.print(&line);
        }
    }

    /// Fault banner on row 0, remaining rows blanked.
    pub fn render_probe_fault(&mut self) {
        self.write_row(0, PROBE_FAULT_BANNER);
        for row in 1..self.rows {
            self.write_row(row, "");
        }
    }

    pub fn render_link_indicator(&mut self, state: ConnectivityState) {
        let mut buf = [0u8; 4];
        let glyph = link_glyph(state).encode_utf8(&mut buf);
        self.display.set_cursor(self.cols - 1, 0);
        self.display.print(glyph);
    }

    /// Row 0 stops one cell short: the last cell belongs to the link glyph.
    fn write_row(&mut self, row: u8, text: &str) {
        let width = if row == 0 { self.cols - 1 } else { self.cols };
        let line = fit_line(text, usize::from(width));
        self.display.set_cursor(0, row);
        self.display.print(&line);
    }
}
