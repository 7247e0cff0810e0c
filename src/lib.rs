//! TEC rig firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod render;
pub mod scheduler;
pub mod sensors;
pub mod telemetry;

// Host builds get the simulation backends; the real drivers are guarded by
// cfg attributes inside.
pub mod adapters;
