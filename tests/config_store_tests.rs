use pathclip::config::{Config, ConfigStore};
use pathclip::errors::PathClipError;
use pathclip::formatter::OutputFormat;
use pathclip::validator::DEFAULT_MAX_FILE_SIZE;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_missing_config_loads_defaults() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nested/config.json"));

    let config = store.load().unwrap();

    assert_eq!(config, Config::default());
    assert!(config.file_paths.is_empty());
    assert_eq!(config.output_format, OutputFormat::Plain);
    assert!(config.include_headers);
    assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
}

#[test]
fn test_save_creates_directories_and_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/deeper/config.json");
    let store = ConfigStore::new(&path);

    let mut config = Config::default();
    config.output_format = OutputFormat::Xml;
    config.include_headers = false;
    config.add_paths(&[PathBuf::from("/a.txt"), PathBuf::from("/b.txt")]);
    store.save(&config).unwrap();

    assert!(path.is_file());
    assert_eq!(store.load().unwrap(), config);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"filePaths\""));
    assert!(raw.contains("\"outputFormat\": \"xml\""));
    assert!(raw.contains("\"includeHeaders\": false"));
}

#[test]
fn test_save_replaces_previous_file() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));

    let mut config = Config::default();
    config.add_paths(&[PathBuf::from("/one")]);
    store.save(&config).unwrap();
    config.file_paths.clear();
    store.save(&config).unwrap();

    assert!(store.load().unwrap().file_paths.is_empty());
    let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1, "temporary files should not be left behind");
}

#[test]
fn test_partial_config_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "filePaths": ["/x.rs"], "outputFormat": "markdown" }"#).unwrap();

    let config = ConfigStore::new(&path).load().unwrap();

    assert_eq!(config.file_paths, vec![PathBuf::from("/x.rs")]);
    assert_eq!(config.output_format, OutputFormat::Markdown);
    assert!(config.include_headers);
    assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ConfigStore::new(&path).load(),
        Err(PathClipError::ConfigError(_))
    ));

    fs::write(&path, r#"{ "outputFormat": "json" }"#).unwrap();
    assert!(matches!(
        ConfigStore::new(&path).load(),
        Err(PathClipError::ConfigError(_))
    ));
}

#[test]
fn test_add_paths_skips_existing_entries() {
    let mut config = Config::default();
    let added = config.add_paths(&[
        PathBuf::from("/a"),
        PathBuf::from("/b"),
        PathBuf::from("/a"),
    ]);
    assert_eq!(added, vec![PathBuf::from("/a"), PathBuf::from("/b")]);

    let added = config.add_paths(&[PathBuf::from("/c"), PathBuf::from("/b")]);
    assert_eq!(added, vec![PathBuf::from("/c")]);
    assert_eq!(
        config.file_paths,
        vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
    );
}
