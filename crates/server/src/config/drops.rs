use serde::Deserialize;

/// Drop creation limits and token lengths.
#[derive(Debug, Deserialize)]
pub struct DropsConfig {
    /// TTL applied when an upload does not specify one.
    #[serde(default = "default_ttl_minutes")]
    pub default_ttl_minutes: u32,
    /// Largest TTL an upload may request (default: 7 days).
    #[serde(default = "default_max_ttl_minutes")]
    pub max_ttl_minutes: u32,
    /// Insert attempts before an id collision is reported as an error.
    #[serde(default = "default_max_insert_attempts")]
    pub max_insert_attempts: u32,
    /// Length of public ids. Values below 8 are raised to 8.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
    /// Length of delete tokens. Values below 16 are raised to 16.
    #[serde(default = "default_delete_token_length")]
    pub delete_token_length: usize,
}

impl Default for DropsConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: default_ttl_minutes(),
            max_ttl_minutes: default_max_ttl_minutes(),
            max_insert_attempts: default_max_insert_attempts(),
            id_length: default_id_length(),
            delete_token_length: default_delete_token_length(),
        }
    }
}

fn default_ttl_minutes() -> u32 {
    10
}

fn default_max_ttl_minutes() -> u32 {
    7 * 24 * 60
}

fn default_max_insert_attempts() -> u32 {
    5
}

fn default_id_length() -> usize {
    8
}

fn default_delete_token_length() -> usize {
    16
}
