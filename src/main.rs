//! TEC Rig Firmware: main entry point
//!
//! Single-threaded acquisition loop: four DS18B20 probes on one 1-wire
//! bus, a 20x4 LCD, WiFi, and one JSON POST per healthy cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  DallasBus        Pcf8574Lcd     WifiAdapter    HttpAdapter    │
//! │  (TemperatureBus) (CharDisplay)  (WifiLink)     (HttpClient)   │
//! │  Esp32TimeAdapter LogEventSink                                 │
//! │  (Clock)          (EventSink)                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            CycleScheduler (pure logic)                 │    │
//! │  │  SensorReader · StatusRenderer · ConnectivityMonitor   │    │
//! │  │  TelemetryPublisher · cycle FSM                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Result, anyhow};
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::Ets;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use tecrig::adapters::http::HttpAdapter;
use tecrig::adapters::lcd::Pcf8574Lcd;
use tecrig::adapters::log_sink::LogEventSink;
use tecrig::adapters::onewire::DallasBus;
use tecrig::adapters::time::Esp32TimeAdapter;
use tecrig::adapters::wifi::WifiAdapter;
use tecrig::config::RigConfig;
use tecrig::error::ConfigError;
use tecrig::pins;
use tecrig::scheduler::{CycleScheduler, Peripherals as Ports};

// ── Build-time configuration ──────────────────────────────────

/// Apply credentials and endpoint baked in at build time.  A value too long
/// for its field is an error, never a silent cut.
fn apply_build_env(config: &mut RigConfig) -> Result<(), ConfigError> {
    if let Some(ssid) = option_env!("TECRIG_WIFI_SSID") {
        config.network.set_ssid(ssid)?;
    }
    if let Some(password) = option_env!("TECRIG_WIFI_PASS") {
        config.network.set_password(password)?;
    }
    if let Some(url) = option_env!("TECRIG_ENDPOINT") {
        config.network.set_endpoint_url(url)?;
    }
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TEC Rig v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = RigConfig::default();
    apply_build_env(&mut config).map_err(|e| anyhow!("build-time network settings: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {e}"))?;
    if config.network.ssid.is_empty() {
        warn!("no WiFi SSID built in (set TECRIG_WIFI_SSID); running display-only");
    }
    if config.network.endpoint_url.is_empty() {
        warn!("no endpoint built in (set TECRIG_ENDPOINT); publishing disabled");
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // SAFETY: the pins in `pins` are claimed nowhere else in the firmware.
    let (one_wire_pin, sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::ONE_WIRE_GPIO),
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };

    let mut bus = DallasBus::new(one_wire_pin)?;
    let found = bus.scan();
    for probe in &config.probes {
        if !found.contains(&probe.address) {
            warn!("configured probe {} ({}) not on the bus", probe.label, probe.address);
        }
    }

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut lcd = Pcf8574Lcd::new(i2c, Ets, pins::LCD_I2C_ADDR, config.lcd_cols, config.lcd_rows);
    lcd.init();

    let wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs)?;

    // ── 4. Scheduler ──────────────────────────────────────────
    let mut scheduler = CycleScheduler::new(
        &config,
        Ports {
            bus,
            display: lcd,
            link: wifi,
            http: HttpAdapter::new(),
            clock: Esp32TimeAdapter::new(),
            sink: LogEventSink::new(),
        },
    );

    let link = scheduler.start();
    info!("boot complete (link {:?}), entering cycle loop", link);
    scheduler.run()
}
