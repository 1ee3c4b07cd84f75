use serde::Deserialize;

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL that share links are built from (e.g. `https://vault.example.com`).
    ///
    /// If not set, defaults to `http://localhost:{port}`.
    pub public_url: Option<String>,
    /// Largest accepted request body in bytes (default: 25 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Graceful shutdown timeout in seconds.
    ///
    /// The maximum time to wait for the sweeper to finish an in-progress
    /// sweep after the listener has stopped.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl ServerConfig {
    /// The resolved base URL for share links, without a trailing slash.
    pub fn public_url(&self) -> String {
        match self.public_url {
            Some(ref url) => url.trim_end_matches('/').to_owned(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            max_upload_bytes: default_max_upload_bytes(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_shutdown_timeout() -> u64 {
    30
}
