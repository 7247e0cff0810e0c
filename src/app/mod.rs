//! Application boundary: port traits and outbound events.
//!
//! The cycle logic never touches hardware directly.  All interaction with
//! the bus, display, radio and network happens through **port traits**
//! defined in [`ports`], keeping the core testable without peripherals.

pub mod events;
pub mod ports;
