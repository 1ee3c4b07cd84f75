mod blob;
mod drops;
mod server;
mod store;
mod sweeper;
mod telemetry;

#[cfg(test)]
mod tests;

pub use blob::*;
pub use drops::*;
pub use server::*;
pub use store::*;
pub use sweeper::*;
pub use telemetry::*;

use serde::Deserialize;

/// Top-level configuration for the LinkVault server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct LinkVaultConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Drop store backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Blob store backend configuration.
    #[serde(default)]
    pub blob: BlobConfig,
    /// Drop creation limits and token lengths.
    #[serde(default)]
    pub drops: DropsConfig,
    /// Expiry sweeper configuration.
    #[serde(default)]
    pub sweeper: SweeperServerConfig,
    /// Log output configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
