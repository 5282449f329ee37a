use std::path::Path;

use hashcheck_core::config::{VerifyConfig, DEFAULT_CHUNK_SIZE};
use hashcheck_core::ConfigError;

#[test]
fn defaults_are_valid() {
    let cfg = VerifyConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(cfg.max_workers, 4);
    assert_eq!(cfg.progress_interval().as_millis(), 100);
    assert_eq!(cfg.full_buffer_limit, None);
}

#[test]
fn partial_toml_keeps_defaults() {
    let cfg = VerifyConfig::from_toml_str(
        Path::new("hashcheck.toml"),
        "max_workers = 2\nfull_buffer_limit = 1048576\n",
    )
    .unwrap();
    assert_eq!(cfg.max_workers, 2);
    assert_eq!(cfg.full_buffer_limit, Some(1 << 20));
    assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
}

#[test]
fn invalid_values_are_rejected() {
    let err = VerifyConfig::from_toml_str(Path::new("c.toml"), "chunk_size = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "chunk_size", .. }), "{err:?}");
    let err = VerifyConfig::from_toml_str(Path::new("c.toml"), "speed_samples = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "speed_samples", .. }), "{err:?}");
    let err =
        VerifyConfig::from_toml_str(Path::new("c.toml"), "max_workers = \"many\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
}

#[test]
fn config_file_round_trip() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("hashcheck.toml");
    let cfg =
        VerifyConfig { chunk_size: 65536, progress_interval_ms: 250, ..VerifyConfig::default() };
    std::fs::write(&path, toml_text(&cfg)).unwrap();
    assert_eq!(VerifyConfig::from_toml_file(&path).unwrap(), cfg);
    assert!(matches!(
        VerifyConfig::from_toml_file(&td.path().join("absent.toml")),
        Err(ConfigError::Read { .. })
    ));
}

fn toml_text(cfg: &VerifyConfig) -> String {
    format!(
        "chunk_size = {}\nprogress_interval_ms = {}\nmax_workers = {}\nspeed_samples = {}\n",
        cfg.chunk_size, cfg.progress_interval_ms, cfg.max_workers, cfg.speed_samples
    )
}
