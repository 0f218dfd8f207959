//! Integration tests for property sources and layered configuration.

use std::fs;
use std::path::Path;

use sysctx_core::error::ConfigError;
use sysctx_core::types::{CombinedConfiguration, ConfigSource, Configuration, Properties};
use tempfile::TempDir;

fn load(dir: &TempDir, name: &str, content: &str) -> ConfigSource {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    ConfigSource::new(&path, Properties::load(&path).unwrap())
}

#[test]
fn test_override_precedence_scenario() {
    let dir = TempDir::new().unwrap();
    let a = load(&dir, "a.cfg", "test=a\n");
    let b = load(&dir, "b.cfg", "test=b\nxyz=1\n");

    let config = Configuration::Combined(CombinedConfiguration::new(vec![a, b]));

    assert_eq!(config.get("test"), Some("a"));
    assert_eq!(config.get("xyz"), Some("1"));
    assert_eq!(config.len(), 2);
    assert_eq!(config.source_of("test"), Some(dir.path().join("a.cfg").as_path()));
    assert_eq!(config.sources().len(), 2);
}

#[test]
fn test_realistic_property_file() {
    let dir = TempDir::new().unwrap();
    let source = load(
        &dir,
        "sysconfig.cfg",
        "# Shop configuration\n\
         ! legacy comment style\n\
         db.url = jdbc:postgresql://localhost/shop\n\
         db.pool.size: 8\n\
         mail.enabled on\n\
         mail.recipients = ops@example.com, \\\n\
         \x20   dev@example.com\n\
         greeting = Gr\\u00fc\\u00dfe\n",
    );

    let config = Configuration::Source(source);

    assert_eq!(config.get("db.url"), Some("jdbc:postgresql://localhost/shop"));
    assert_eq!(config.get_parsed::<u32>("db.pool.size").unwrap(), Some(8));
    assert_eq!(config.get_bool("mail.enabled").unwrap(), Some(true));
    assert_eq!(
        config.get_list("mail.recipients"),
        vec!["ops@example.com", "dev@example.com"]
    );
    assert_eq!(config.get("greeting"), Some("Grüße"));
    assert_eq!(
        config.source_of("db.url"),
        Some(Path::new(&dir.path().join("sysconfig.cfg")))
    );
}

#[test]
fn test_invalid_value_reports_key() {
    let config = Configuration::Source(ConfigSource::in_memory(
        Properties::parse("port=eighty\n").unwrap(),
    ));

    let err = config.get_parsed::<u16>("port").unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { ref key, ref value, .. }
        if key == "port" && value == "eighty"));
    assert!(err.to_string().contains("port"));
}

#[test]
fn test_properties_serialize_as_flat_object() {
    let props = Properties::parse("b=2\na=1\n").unwrap();

    let json = serde_json::to_string(&props).unwrap();

    assert_eq!(json, r#"{"a":"1","b":"2"}"#);
}
