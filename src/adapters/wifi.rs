//! WiFi station-mode adapter.
//!
//! Implements [`WifiLink`], the hexagonal boundary for association.
//! Reconnect policy and timeouts live in
//! [`ConnectivityMonitor`](crate::connectivity::ConnectivityMonitor); this
//! adapter only starts association and reports whether it succeeded.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stub that associates after a fixed
//!   number of status polls.

use std::net::Ipv4Addr;

use log::{info, warn};

use crate::app::ports::WifiLink;
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, peripheral::Peripheral},
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// Simulation: `is_associated` turns true after this many polls.
    #[cfg(not(target_os = "espidf"))]
    sim_associate_after: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_up: bool,
    begun: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: impl Peripheral<P = Modem> + 'static,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        let wifi = EspWifi::new(modem, sysloop, Some(nvs))?;
        Ok(Self { wifi, begun: false })
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    /// Simulated station that associates on the fourth status poll.
    pub fn new() -> Self {
        Self::associating_after(3)
    }

    pub fn associating_after(polls: u32) -> Self {
        Self {
            sim_associate_after: Some(polls),
            sim_polls: 0,
            sim_up: false,
            begun: false,
        }
    }

    /// Simulated station whose access point never answers.
    pub fn unreachable() -> Self {
        Self {
            sim_associate_after: None,
            sim_polls: 0,
            sim_up: false,
            begun: false,
        }
    }

    /// Simulate the access point going away.
    pub fn drop_link(&mut self) {
        warn!("WiFi(sim): link dropped");
        self.sim_up = false;
        self.sim_associate_after = None;
    }
}

// ── Platform-specific ─────────────────────────────────────────

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|()| LinkError::InvalidSsid)?,
            password: password.try_into().map_err(|()| LinkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        if self.begun {
            // A previous attempt may still be pending in the driver.
            let _ = self.wifi.disconnect();
        }
        self.wifi.set_configuration(&config).map_err(|e| {
            warn!("WiFi(espidf): set_configuration failed: {e:?}");
            LinkError::Driver
        })?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|e| {
                warn!("WiFi(espidf): start failed: {e:?}");
                LinkError::Driver
            })?;
        }
        self.wifi.connect().map_err(|e| {
            warn!("WiFi(espidf): connect failed: {e:?}");
            LinkError::Driver
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, ssid: &str, _password: &str) -> Result<(), LinkError> {
        self.sim_polls = 0;
        self.sim_up = false;
        info!("WiFi(sim): associating with '{}'", ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_associated(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_associated(&mut self) -> bool {
        self.sim_polls += 1;
        if let Some(n) = self.sim_associate_after {
            if self.sim_polls > n {
                self.sim_up = true;
            }
        }
        self.sim_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_local_ip(&self) -> Option<Ipv4Addr> {
        self.sim_up.then(|| Ipv4Addr::new(192, 168, 4, 20))
    }
}

// ───────────────────────────────────────────────────────────────
// WifiLink
// ───────────────────────────────────────────────────────────────

impl WifiLink for WifiAdapter {
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        self.platform_begin(ssid, password)?;
        self.begun = true;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.begun && self.platform_is_associated()
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        if !self.begun {
            return None;
        }
        self.platform_local_ip()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
