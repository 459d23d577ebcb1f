use std::time::Duration;

use serde::Deserialize;

/// Top-level server configuration, loaded from `gambit.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    pub limits: LimitsConfig,
    pub rooms: RoomsConfig,
    pub clock: ClockConfig,
    pub quad: QuadConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_root: "web".to_string(),
            limits: LimitsConfig::default(),
            rooms: RoomsConfig::default(),
            clock: ClockConfig::default(),
            quad: QuadConfig::default(),
        }
    }
}

/// Infrastructure limits (connection caps, buffer sizes, rate limits).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_ws_connections: usize,
    pub ws_rate_limit_per_sec: f64,
    pub player_message_buffer: usize,
    /// Inbound frames larger than this are dropped unread.
    pub max_message_bytes: usize,
    pub max_rooms: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_ws_connections: 200,
            ws_rate_limit_per_sec: 30.0,
            player_message_buffer: 256,
            max_message_bytes: gambit_core::protocol::MAX_MESSAGE_SIZE,
            max_rooms: 1000,
        }
    }
}

/// Room lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    /// A room with no connections for this long shuts its actor down.
    pub idle_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 900,
            cleanup_interval_secs: 60,
        }
    }
}

/// Time control defaults and bounds for `setTime`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub default_base_secs: u64,
    pub default_increment_secs: u64,
    pub max_base_secs: u64,
    pub max_increment_secs: u64,
    pub watchdog_interval_ms: u64,
    /// Delay between a timeout and the automatic board reset.
    pub auto_reset_secs: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            default_base_secs: 300,
            default_increment_secs: 0,
            max_base_secs: 3 * 60 * 60,
            max_increment_secs: 180,
            watchdog_interval_ms: 250,
            auto_reset_secs: 60,
        }
    }
}

impl ClockConfig {
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_interval_ms)
    }

    pub fn auto_reset_delay(&self) -> Duration {
        Duration::from_secs(self.auto_reset_secs)
    }
}

/// Four-player chess settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuadConfig {
    pub arrow_ttl_secs: u64,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self { arrow_ttl_secs: 10 }
    }
}

impl ServerConfig {
    /// Check invariants the rest of the server relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }

        if self.limits.max_ws_connections == 0 {
            return Err("limits.max_ws_connections must be > 0".to_string());
        }
        if self.limits.ws_rate_limit_per_sec <= 0.0 {
            return Err("limits.ws_rate_limit_per_sec must be > 0".to_string());
        }
        if self.limits.player_message_buffer == 0 {
            return Err("limits.player_message_buffer must be > 0".to_string());
        }
        if self.limits.max_message_bytes == 0 {
            return Err("limits.max_message_bytes must be > 0".to_string());
        }
        if self.limits.max_rooms == 0 {
            return Err("limits.max_rooms must be > 0".to_string());
        }

        if self.rooms.idle_timeout_secs == 0 {
            return Err("rooms.idle_timeout_secs must be > 0".to_string());
        }
        if self.rooms.cleanup_interval_secs == 0 {
            return Err("rooms.cleanup_interval_secs must be > 0".to_string());
        }

        if self.clock.watchdog_interval_ms == 0 {
            return Err("clock.watchdog_interval_ms must be > 0".to_string());
        }
        if self.clock.default_base_secs > self.clock.max_base_secs {
            return Err("clock.default_base_secs exceeds clock.max_base_secs".to_string());
        }
        if self.clock.default_increment_secs > self.clock.max_increment_secs {
            return Err(
                "clock.default_increment_secs exceeds clock.max_increment_secs".to_string(),
            );
        }
        Ok(())
    }

    /// Load config from `gambit.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("gambit.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from gambit.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse gambit.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No gambit.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("GAMBIT_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("GAMBIT_WEB_ROOT")
            && !root.is_empty()
        {
            config.web_root = root;
        }
        if let Ok(val) = std::env::var("GAMBIT_MAX_WS_CONNECTIONS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_ws_connections = n;
        }
        if let Ok(val) = std::env::var("GAMBIT_WS_RATE_LIMIT")
            && let Ok(n) = val.parse::<f64>()
        {
            config.limits.ws_rate_limit_per_sec = n;
        }
        if let Ok(val) = std::env::var("GAMBIT_DEFAULT_BASE_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.clock.default_base_secs = n;
        }
        if let Ok(val) = std::env::var("GAMBIT_DEFAULT_INCREMENT_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.clock.default_increment_secs = n;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.web_root, "web");
        assert_eq!(cfg.clock.default_base_secs, 300);
        assert_eq!(cfg.clock.watchdog_interval(), Duration::from_millis(250));
        assert_eq!(cfg.clock.auto_reset_delay(), Duration::from_secs(60));
        assert_eq!(cfg.quad.arrow_ttl_secs, 10);
    }

    #[test]
    fn validate_accepts_default_config() {
        assert_eq!(ServerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_invalid_addr() {
        let cfg = ServerConfig {
            listen_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("listen_addr"));
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut cfg = ServerConfig::default();
        cfg.limits.max_rooms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ServerConfig::default();
        cfg.clock.watchdog_interval_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_default_time_control_over_limit() {
        let mut cfg = ServerConfig::default();
        cfg.clock.default_base_secs = cfg.clock.max_base_secs + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"
web_root = "/var/www"
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.web_root, "/var/www");
        assert_eq!(cfg.limits.max_rooms, 1000);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
listen_addr = "0.0.0.0:3000"
web_root = "dist"

[limits]
max_ws_connections = 500
ws_rate_limit_per_sec = 10.0
player_message_buffer = 64
max_message_bytes = 2048
max_rooms = 20

[rooms]
idle_timeout_secs = 120
cleanup_interval_secs = 5

[clock]
default_base_secs = 180
default_increment_secs = 2
watchdog_interval_ms = 100
auto_reset_secs = 30

[quad]
arrow_ttl_secs = 4
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.limits.max_ws_connections, 500);
        assert!((cfg.limits.ws_rate_limit_per_sec - 10.0).abs() < f64::EPSILON);
        assert_eq!(cfg.limits.max_message_bytes, 2048);
        assert_eq!(cfg.rooms.idle_timeout_secs, 120);
        assert_eq!(cfg.clock.default_increment_secs, 2);
        assert_eq!(cfg.clock.max_base_secs, 10_800);
        assert_eq!(cfg.quad.arrow_ttl_secs, 4);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: ServerConfig = toml::from_str("[rooms]\nidle_timeout_secs = 10\n").unwrap();
        assert_eq!(cfg.rooms.idle_timeout_secs, 10);
        assert_eq!(cfg.rooms.cleanup_interval_secs, 60);
        assert_eq!(cfg.limits.player_message_buffer, 256);
        assert_eq!(cfg.clock.max_increment_secs, 180);
    }
}
