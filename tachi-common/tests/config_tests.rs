//! Tests for bootstrap configuration loading
//!
//! Covers graceful degradation on a missing file, TOML parsing, and the
//! import version allowlist.

use std::io::Write;
use tachi_common::config::{ImportConfig, TomlConfig};
use tachi_common::ImportType;

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load(Some(&path)).expect("missing config must not be fatal");

    assert_eq!(config.port, 8080);
    assert_eq!(config.bind_address, "127.0.0.1");
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
    assert!(config.database_path.is_none());
    assert!(config.resolved_database_path().ends_with("tachi.db"));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
port = 9000
database_path = "/tmp/tachi-test.db"

[logging]
level = "debug"
file = "/tmp/tachi.log"

[import.supported_versions]
"file/eamusement-iidx-csv" = ["28", "29"]
"#
    )
    .unwrap();

    let config = TomlConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.port, 9000);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.resolved_database_path(),
        std::path::PathBuf::from("/tmp/tachi-test.db")
    );
    assert_eq!(
        config.import.allowed_versions(ImportType::FileEamusementIidxCsv),
        ["28".to_string(), "29".to_string()]
    );
    // A configured table replaces the defaults entirely
    assert!(config.import.allowed_versions(ImportType::IrFervidex).is_empty());
}

#[test]
fn test_default_allowlist() {
    let import = ImportConfig::default();

    assert_eq!(
        import.allowed_versions(ImportType::FileEamusementIidxCsv),
        ["26", "27", "28", "29"]
    );
    assert_eq!(
        import.allowed_versions(ImportType::FilePliIidxCsv),
        ["26", "27", "28", "29"]
    );
    assert_eq!(import.allowed_versions(ImportType::ApiArcIidx), ["27", "28", "29"]);
    // INFINITAS scores arrive through the hook
    assert_eq!(
        import.allowed_versions(ImportType::IrFervidex),
        ["27", "28", "29", "inf"]
    );
    assert!(import.allowed_versions(ImportType::ApiFloSdvx).is_empty());
}

#[test]
fn test_unknown_import_type_in_allowlist_is_rejected() {
    let err = TomlConfig::from_toml_str(
        r#"
[import.supported_versions]
"file/unknown" = ["1"]
"#,
    )
    .unwrap_err();

    assert!(err.to_string().contains("file/unknown"));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}
