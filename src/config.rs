use std::net::IpAddr;
use std::path::PathBuf;

use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    /// Where accepted submissions are relayed. `None` is a valid deployment:
    /// submissions are accepted with a warning and never delivered.
    pub relay_url: Option<Url>,
    pub cors_origins: Vec<String>,
    pub recorder: Option<RecorderConfig>,
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub sheet_path: PathBuf,
    pub slack_webhook_url: Option<Url>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, which returns the raw value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        // Unset and blank values are both treated as absent.
        let env_optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = env_or("DELIGHTS_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid DELIGHTS_HOST: {e}"))?;

        let port: u16 = env_or("DELIGHTS_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid DELIGHTS_PORT: {e}"))?;

        let max_body_size: usize = env_or("DELIGHTS_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid DELIGHTS_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("DELIGHTS_LOG_LEVEL", "info");

        let relay_url = env_optional("DELIGHTS_RELAY_URL")
            .map(|raw| parse_http_url("DELIGHTS_RELAY_URL", &raw))
            .transpose()?;

        let cors_origins: Vec<String> = env_or("DELIGHTS_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let recorder = match env_optional("DELIGHTS_SHEET_PATH") {
            Some(path) => Some(RecorderConfig {
                sheet_path: PathBuf::from(path),
                slack_webhook_url: env_optional("DELIGHTS_SLACK_WEBHOOK_URL")
                    .map(|raw| parse_http_url("DELIGHTS_SLACK_WEBHOOK_URL", &raw))
                    .transpose()?,
            }),
            None => None,
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            log_level,
            relay_url,
            cors_origins,
            recorder,
        })
    }
}

fn parse_http_url(key: &str, raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("Invalid {key}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("Invalid {key}: unsupported scheme '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_body_size, 65536);
        assert_eq!(config.log_level, "info");
        assert!(config.relay_url.is_none());
        assert!(config.cors_origins.is_empty());
        assert!(config.recorder.is_none());
    }

    #[test]
    fn non_numeric_port_names_the_variable() {
        let err = load(&[("DELIGHTS_PORT", "eighty")]).unwrap_err();
        assert!(err.starts_with("Invalid DELIGHTS_PORT"), "{err}");
    }

    #[test]
    fn non_http_relay_url_names_the_variable() {
        let err = parse_http_url("DELIGHTS_RELAY_URL", "ftp://x").unwrap_err();
        assert_eq!(err, "Invalid DELIGHTS_RELAY_URL: unsupported scheme 'ftp'");

        let err = load(&[("DELIGHTS_RELAY_URL", "not a url")]).unwrap_err();
        assert!(err.starts_with("Invalid DELIGHTS_RELAY_URL"), "{err}");
    }

    #[test]
    fn blank_relay_url_is_unconfigured() {
        let config = load(&[("DELIGHTS_RELAY_URL", "   ")]).unwrap();
        assert!(config.relay_url.is_none());
    }

    #[test]
    fn recorder_and_origins_are_read() {
        let config = load(&[
            ("DELIGHTS_RELAY_URL", "https://script.example.com/exec"),
            ("DELIGHTS_CORS_ORIGINS", "https://a.example.com, ,https://b.example.com"),
            ("DELIGHTS_SHEET_PATH", "/tmp/delights.csv"),
            ("DELIGHTS_SLACK_WEBHOOK_URL", ""),
        ])
        .unwrap();

        assert_eq!(
            config.relay_url.map(|u| u.to_string()),
            Some("https://script.example.com/exec".to_string())
        );
        assert_eq!(config.cors_origins, vec!["https://a.example.com", "https://b.example.com"]);
        let recorder = config.recorder.unwrap();
        assert_eq!(recorder.sheet_path, PathBuf::from("/tmp/delights.csv"));
        assert!(recorder.slack_webhook_url.is_none());
    }
}
