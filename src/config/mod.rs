// Configuration module entry point
// Loads configuration from file and environment, holds shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, DocsConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Prefix of environment overrides, e.g. `APP_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "APP";

const DEFAULT_SERVER_NAME: &str = concat!("demo_endpoints/", env!("CARGO_PKG_VERSION"));

impl Config {
    /// Load configuration from the given file path (extension optional)
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", DEFAULT_SERVER_NAME)?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("docs.enabled", true)?
            .set_default("docs.openapi_path", "/openapi.json")?
            .set_default("docs.title", "Demo Endpoints")?
            .set_default("docs.version", env!("CARGO_PKG_VERSION"))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Per-connection time budget: the larger of the read and write timeouts
    pub fn connection_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: true,
                show_headers: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
            http: HttpConfig {
                server_name: DEFAULT_SERVER_NAME.to_string(),
                enable_cors: false,
                max_body_size: 1_048_576,
            },
            docs: DocsConfig {
                enabled: true,
                openapi_path: "/openapi.json".to_string(),
                title: "Demo Endpoints".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from("/nonexistent/demo_endpoints_config").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.http.max_body_size, 1_048_576);
        assert_eq!(config.docs.openapi_path, "/openapi.json");
        assert!(config.performance.max_connections.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir()
            .join(format!("demo_endpoints_cfg_{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\nworkers = 2\n\n[docs]\nenabled = false\n\n[performance]\nread_timeout = 5\nwrite_timeout = 40"
        )
        .unwrap();

        let config = Config::load_from(&path.to_string_lossy()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.workers, Some(2));
        assert!(!config.docs.enabled);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.connection_timeout().as_secs(), 40);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_socket_addr() {
        let mut config = Config::default();
        assert_eq!(config.get_socket_addr().unwrap().port(), 8080);
        config.server.host = "not an address".to_string();
        assert!(config.get_socket_addr().is_err());
    }
}
