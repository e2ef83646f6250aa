use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::{ApiError, ApiResult};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> ApiResult<&'static Client> {
    CLIENT.get_or_try_init(|| build_http_client(request_timeout()))
}

pub fn build_http_client(timeout: Duration) -> ApiResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ApiError::Config(format!("failed to build http client: {err}")))
}

fn request_timeout() -> Duration {
    timeout_from(std::env::var("SOCCER_HTTP_TIMEOUT_SECS").ok().as_deref())
}

fn timeout_from(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .clamp(1, 120);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_and_clamps() {
        assert_eq!(timeout_from(None), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(timeout_from(Some("abc")), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(timeout_from(Some(" 30 ")), Duration::from_secs(30));
        assert_eq!(timeout_from(Some("0")), Duration::from_secs(1));
        assert_eq!(timeout_from(Some("9000")), Duration::from_secs(120));
    }
}
