use std::fs;
use std::path::PathBuf;

use soccer_desk::config::{BackendType, Config, ConfigStore};
use soccer_desk::error::ApiError;

fn scratch(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("soccer_desk_config_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn missing_file_loads_defaults() {
    let dir = scratch("missing");
    let store = ConfigStore::at(dir.join("config.json"));
    let config = store.load();
    assert_eq!(config, Config::default());
    assert_eq!(config.backend_type, BackendType::Python);
    assert_eq!(config.api_base_url, "http://localhost:5000/api");
}

#[test]
fn save_then_load_round_trips_and_creates_dirs() {
    let dir = scratch("save");
    let path = dir.join("nested").join("config.json");
    let store = ConfigStore::at(&path);

    let saved = store
        .save(&Config {
            backend_type: BackendType::Csharp,
            api_base_url: "http://localhost:5001/api/".to_string(),
        })
        .expect("save succeeds");
    assert_eq!(saved.api_base_url, "http://localhost:5001/api");
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let raw = fs::read_to_string(&path).expect("readable");
    assert!(raw.contains("\"backendType\": \"csharp\""));
    assert!(raw.contains("\"apiBaseUrl\""));

    assert_eq!(store.load(), saved);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_url_is_not_written() {
    let dir = scratch("invalid");
    let path = dir.join("config.json");
    let store = ConfigStore::at(&path);
    let err = store
        .save(&Config {
            backend_type: BackendType::Python,
            api_base_url: "localhost:5000".to_string(),
        })
        .expect_err("scheme is required");
    assert!(matches!(err, ApiError::Config(_)));
    assert!(!path.exists());
}

#[test]
fn legacy_file_is_rewritten_in_canonical_layout() {
    let dir = scratch("legacy");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("config.json");
    fs::write(
        &path,
        r#"{"soccerApp.api.baseUrl": "http://10.1.1.1:8080", "soccerApp.api.backendType": "csharp"}"#,
    )
    .expect("write legacy");

    let store = ConfigStore::at(&path);
    let config = store.load();
    assert_eq!(config.backend_type, BackendType::Csharp);
    assert_eq!(config.api_base_url, "http://10.1.1.1:8080/api");

    store.save(&config).expect("save");
    let raw = fs::read_to_string(&path).expect("readable");
    assert!(!raw.contains("soccerApp"));
    assert_eq!(store.load(), config);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = scratch("corrupt");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("config.json");
    fs::write(&path, "{ not json").expect("write");
    assert_eq!(ConfigStore::at(&path).load(), Config::default());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn endpoints_follow_the_saved_base() {
    let config = Config {
        backend_type: BackendType::Python,
        api_base_url: "https://api.example.org/v2".to_string(),
    };
    let endpoints = config.endpoints();
    assert_eq!(endpoints.teams, "https://api.example.org/v2/teams");
    assert_eq!(endpoints.team(4), "https://api.example.org/v2/teams/4");
    assert_eq!(endpoints.players, "https://api.example.org/v2/players");
}
