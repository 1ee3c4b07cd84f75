use super::*;

#[test]
fn empty_file_gives_defaults() {
    let config: LinkVaultConfig = toml::from_str("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
    assert_eq!(config.server.public_url(), "http://localhost:5000");
    assert_eq!(config.store.backend, "memory");
    assert!(config.store.ssl_mode.is_none());
    assert_eq!(config.blob.backend, "memory");
    assert_eq!(config.blob.path, "data/blobs");
    assert_eq!(config.drops.default_ttl_minutes, 10);
    assert_eq!(config.drops.max_ttl_minutes, 10_080);
    assert_eq!(config.drops.max_insert_attempts, 5);
    assert!(config.sweeper.enabled);
    assert_eq!(config.sweeper.interval_seconds, 3600);
    assert_eq!(config.telemetry.log_filter, "info");
}

#[test]
fn full_config_parses() {
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 8080
        public_url = "https://vault.example.com/"
        max_upload_bytes = 1048576

        [store]
        backend = "postgres"
        url = "postgres://vault:secret@db/linkvault"
        prefix = "lv_"
        pool_size = 20
        schema = "shares"
        ssl_mode = "verify-full"
        ssl_root_cert = "/etc/ssl/db-ca.pem"

        [blob]
        backend = "local"
        path = "/var/lib/linkvault"

        [drops]
        default_ttl_minutes = 60
        max_ttl_minutes = 1440
        id_length = 10

        [sweeper]
        interval_seconds = 300
        sweep_on_start = false

        [telemetry]
        log_filter = "debug"
        ansi = false
    "#;

    let config: LinkVaultConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.public_url(), "https://vault.example.com");
    assert_eq!(config.server.max_upload_bytes, 1_048_576);
    assert_eq!(config.store.backend, "postgres");
    assert_eq!(config.store.prefix.as_deref(), Some("lv_"));
    assert_eq!(config.store.pool_size, Some(20));
    assert_eq!(config.store.schema.as_deref(), Some("shares"));
    assert_eq!(config.store.ssl_mode.as_deref(), Some("verify-full"));
    assert_eq!(config.store.ssl_root_cert.as_deref(), Some("/etc/ssl/db-ca.pem"));
    assert_eq!(config.blob.backend, "local");
    assert_eq!(config.blob.path, "/var/lib/linkvault");
    assert_eq!(config.drops.default_ttl_minutes, 60);
    assert_eq!(config.drops.max_ttl_minutes, 1440);
    assert_eq!(config.drops.id_length, 10);
    assert_eq!(config.drops.delete_token_length, 16);
    assert!(config.sweeper.enabled);
    assert!(!config.telemetry.ansi);

    let sweeper = config.sweeper.to_sweeper_config();
    assert_eq!(sweeper.interval.as_secs(), 300);
    assert!(!sweeper.sweep_on_start);
}

#[test]
fn zero_sweep_interval_is_raised() {
    let config: SweeperServerConfig = toml::from_str("interval_seconds = 0").unwrap();
    assert_eq!(config.to_sweeper_config().interval.as_secs(), 1);
}

#[test]
fn unknown_field_types_are_rejected() {
    let result: Result<LinkVaultConfig, _> = toml::from_str("[server]\nport = \"eighty\"");
    assert!(result.is_err());
}
