//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                       |
//! |------------|----------------|-----------------------------------|
//! | `http`     | HttpClient     | ESP-IDF HTTP client / std TCP     |
//! | `lcd`      | CharDisplay    | HD44780 via PCF8574 on I2C        |
//! | `log_sink` | EventSink      | Serial log output                 |
//! | `onewire`  | TemperatureBus | DS18B20 probes on GPIO 1-wire     |
//! | `time`     | Clock          | ESP32 system timer / FreeRTOS     |
//! | `wifi`     | WifiLink       | ESP-IDF WiFi STA                  |

pub mod http;
pub mod lcd;
pub mod log_sink;
pub mod onewire;
pub mod time;
pub mod wifi;
