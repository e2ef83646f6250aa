use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::reports::ReportKind;

const CONFIG_DIR: &str = "soccer_desk";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

const LEGACY_BASE_KEY: &str = "soccerApp.api.baseUrl";
const LEGACY_BACKEND_KEY: &str = "soccerApp.api.backendType";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Python,
    #[serde(alias = "c#", alias = "dotnet")]
    Csharp,
}

impl BackendType {
    pub fn label(self) -> &'static str {
        match self {
            BackendType::Python => "Python (Flask)",
            BackendType::Csharp => "C# (ASP.NET)",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            BackendType::Python => BackendType::Csharp,
            BackendType::Csharp => BackendType::Python,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "python" => Some(BackendType::Python),
            "csharp" | "c#" | "dotnet" => Some(BackendType::Csharp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, alias = "apiType")]
    pub backend_type: BackendType,
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_type: BackendType::Python,
            api_base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_base(&self.api_base_url)
    }

    /// `SOCCER_API_BASE_URL` and `SOCCER_BACKEND_TYPE` win over the file.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(opt_env)
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());
        if let Some(base) = lookup("SOCCER_API_BASE_URL")
            && let Ok(base) = validate_base_url(&base)
        {
            self.api_base_url = base;
        }
        if let Some(kind) = lookup("SOCCER_BACKEND_TYPE").and_then(|v| BackendType::parse(&v)) {
            self.backend_type = kind;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: String,
    pub teams: String,
    pub players: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/').to_string();
        Self {
            teams: format!("{base}/teams"),
            players: format!("{base}/players"),
            base,
        }
    }

    pub fn team(&self, id: u32) -> String {
        format!("{}/{id}", self.teams)
    }

    pub fn player(&self, id: u32) -> String {
        format!("{}/{id}", self.players)
    }

    pub fn report(&self, kind: ReportKind, team_id: u32) -> String {
        format!("{}/reports/{}?team_id={team_id}", self.base, kind.slug())
    }
}

/// Trimmed, slash-stripped http(s) URL or a `Config` error.
pub fn validate_base_url(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::Config(format!("invalid API base URL {trimmed:?}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Config(format!(
            "unsupported URL scheme {:?}",
            url.scheme()
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn from_env() -> Self {
        Self {
            path: config_path(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Config {
        let Some(path) = self.path.as_ref() else {
            return Config::default();
        };
        let Ok(raw) = fs::read_to_string(path) else {
            return Config::default();
        };
        parse_config_json(&raw).unwrap_or_default()
    }

    pub fn save(&self, config: &Config) -> ApiResult<Config> {
        let config = Config {
            backend_type: config.backend_type,
            api_base_url: validate_base_url(&config.api_base_url)?,
        };
        let Some(path) = self.path.as_ref() else {
            return Err(ApiError::Config("no config directory available".to_string()));
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| {
                ApiError::Config(format!("create {}: {err}", dir.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(&config)
            .map_err(|err| ApiError::Config(format!("serialize config: {err}")))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|err| ApiError::Config(format!("write {}: {err}", tmp.display())))?;
        fs::rename(&tmp, path)
            .map_err(|err| ApiError::Config(format!("swap {}: {err}", path.display())))?;
        Ok(config)
    }
}

pub fn parse_config_json(raw: &str) -> Option<Config> {
    let root: Value = serde_json::from_str(raw.trim()).ok()?;
    let obj = root.as_object()?;

    if let Some(base) = obj.get(LEGACY_BASE_KEY).and_then(Value::as_str) {
        let root_url = base.trim().trim_end_matches('/');
        let api_base_url = validate_base_url(&format!("{root_url}/api")).ok()?;
        let backend_type = obj
            .get(LEGACY_BACKEND_KEY)
            .and_then(Value::as_str)
            .and_then(BackendType::parse)
            .unwrap_or_default();
        return Some(Config {
            backend_type,
            api_base_url,
        });
    }

    let config: Config = serde_json::from_value(root).ok()?;
    let api_base_url = validate_base_url(&config.api_base_url).ok()?;
    Some(Config {
        api_base_url,
        ..config
    })
}

fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = opt_env("SOCCER_CONFIG_PATH") {
        return Some(PathBuf::from(explicit));
    }
    if let Some(base) = opt_env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(base).join(CONFIG_DIR).join(CONFIG_FILE));
    }
    let home = opt_env("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR)
            .join(CONFIG_FILE),
    )
}

fn opt_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
}

impl ConnectionStatus {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Never errors; the outcome is in the returned message.
pub fn test_connection(client: &Client, base_url: &str) -> ConnectionStatus {
    let base = match validate_base_url(base_url) {
        Ok(base) => base,
        Err(_) => return ConnectionStatus::failed("Invalid URL format"),
    };
    let url = Endpoints::from_base(&base).teams;
    let resp = match client.get(&url).send() {
        Ok(resp) => resp,
        Err(err) => return ConnectionStatus::failed(format!("Connection error: {err}")),
    };
    let status = resp.status();
    if !status.is_success() {
        return ConnectionStatus::failed(format!(
            "Connection failed: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        ));
    }
    let body = match resp.text() {
        Ok(body) => body,
        Err(err) => return ConnectionStatus::failed(format!("Connection error: {err}")),
    };
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Array(items)) => ConnectionStatus {
            success: true,
            message: format!("Connected successfully. Found {} teams.", items.len()),
        },
        _ => ConnectionStatus::failed("Connection failed: response is not a team list"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_strip_trailing_slashes() {
        let endpoints = Endpoints::from_base("http://host:5000/api//");
        assert_eq!(endpoints.teams, "http://host:5000/api/teams");
        assert_eq!(endpoints.player(3), "http://host:5000/api/players/3");
        assert_eq!(
            endpoints.report(ReportKind::InjuryReport, 9),
            "http://host:5000/api/reports/injury-report?team_id=9"
        );
    }

    #[test]
    fn legacy_api_type_key_is_accepted() {
        let config =
            parse_config_json(r#"{"apiType":"csharp","apiBaseUrl":"http://h:5001/api"}"#)
                .expect("legacy layout parses");
        assert_eq!(config.backend_type, BackendType::Csharp);
        assert_eq!(config.api_base_url, "http://h:5001/api");
    }

    #[test]
    fn split_keys_point_at_server_root() {
        let config = parse_config_json(
            r#"{"soccerApp.api.baseUrl":"http://h:5000/","soccerApp.api.backendType":"python"}"#,
        )
        .expect("split-key layout parses");
        assert_eq!(config.api_base_url, "http://h:5000/api");
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env = |key: &str| match key {
            "SOCCER_API_BASE_URL" => Some("http://remote:8080/api/".to_string()),
            "SOCCER_BACKEND_TYPE" => Some("dotnet".to_string()),
            _ => None,
        };
        let config = Config::default().with_overrides(env);
        assert_eq!(config.api_base_url, "http://remote:8080/api");
        assert_eq!(config.backend_type, BackendType::Csharp);
    }

    #[test]
    fn invalid_or_blank_overrides_are_ignored() {
        let env = |key: &str| match key {
            "SOCCER_API_BASE_URL" => Some("ftp://remote/api".to_string()),
            "SOCCER_BACKEND_TYPE" => Some("  ".to_string()),
            _ => None,
        };
        let config = Config::default().with_overrides(env);
        assert_eq!(config, Config::default());

        let unknown = Config::default().with_overrides(|key| {
            (key == "SOCCER_BACKEND_TYPE").then(|| "cobol".to_string())
        });
        assert_eq!(unknown.backend_type, BackendType::Python);
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        assert!(matches!(
            validate_base_url("ftp://h/api"),
            Err(ApiError::Config(_))
        ));
        assert!(validate_base_url("not a url").is_err());
    }
}
