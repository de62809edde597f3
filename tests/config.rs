use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use kira_target_profiler::config::{ConfigLoader, ResolvedConfig};
use kira_target_profiler::domain::SourceKind;
use kira_target_profiler::error::KiraError;

#[test]
fn load_config_from_explicit_path() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-tp.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "cache_ttl_secs": 120,
            "timeouts_ms": { "chembl": 30000, "encode": 5000 },
            "discovery": { "batch_size": 4 }
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.cache_ttl, Duration::from_secs(120));
    assert_eq!(
        resolved.source_timeouts.get(SourceKind::Chembl),
        Duration::from_secs(30)
    );
    assert_eq!(
        resolved.source_timeouts.get(SourceKind::Encode),
        Duration::from_secs(5)
    );
    assert_eq!(
        resolved.source_timeouts.get(SourceKind::Pubmed),
        Duration::from_secs(10)
    );
    assert_eq!(resolved.discovery.batch_size, 4);
    assert_eq!(resolved.discovery.target_timeout, Duration::from_secs(60));
}

#[test]
fn empty_object_resolves_to_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-tp.json");
    fs::write(&path, "{}").unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved, ResolvedConfig::default());
}

#[test]
fn missing_explicit_path_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigRead(_))
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-tp.json");
    fs::write(&path, "{ \"cache_ttl_secs\": \"soon\" }").unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigParse(_))
    );
}

#[test]
fn unknown_schema_version_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-tp.json");
    fs::write(&path, r#"{ "schema_version": 2 }"#).unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, KiraError::ConfigParse(message) if message.contains("schema_version"));
}
