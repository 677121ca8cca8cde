//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `COORDINATOR_ADDR` — transaction coordinator base URL
///   (default: `"http://transcoorditor:8000"`)
/// - `CLIENT_ID` — how this service identifies itself to the
///   coordinator (default: `"paymentservice"`)
/// - `COMPENSATION_URI` — where the coordinator should deliver
///   reversals (default: `"http://paymentservice:8181/compensate"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub coordinator_addr: String,
    pub client_id: String,
    pub compensation_uri: String,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            coordinator_addr: std::env::var("COORDINATOR_ADDR")
                .unwrap_or_else(|_| "http://transcoorditor:8000".to_string()),
            client_id: std::env::var("CLIENT_ID").unwrap_or_else(|_| "paymentservice".to_string()),
            compensation_uri: std::env::var("COMPENSATION_URI")
                .unwrap_or_else(|_| "http://paymentservice:8181/compensate".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            coordinator_addr: "http://transcoorditor:8000".to_string(),
            client_id: "paymentservice".to_string(),
            compensation_uri: "http://paymentservice:8181/compensate".to_string(),
            log_level: "info".to_string(),
        }
    }
}
