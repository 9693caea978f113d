use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use vault_service::Timeouts;

#[derive(Parser)]
#[command(name = "vault", about = "Terminal client for the Secrets Vault service", version)]
pub struct Config {
    /// Backend base URL
    #[arg(long, env = "VAULT_SERVER_URL", default_value = "http://localhost:8080")]
    pub server_url: String,

    /// API key to log in with at startup
    #[arg(long, env = "VAULT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Rows per page in the list views
    #[arg(
        long,
        env = "VAULT_PAGE_SIZE",
        default_value = "20",
        value_parser = clap::value_parser!(u32).range(1..=500)
    )]
    pub page_size: u32,

    /// How long status messages stay up (seconds)
    #[arg(
        long,
        env = "VAULT_STATUS_SECS",
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(..=86_400)
    )]
    pub status_secs: u64,

    /// Timeout for auth and data requests (seconds)
    #[arg(
        long,
        env = "VAULT_REQUEST_TIMEOUT_SECS",
        default_value = "8",
        value_parser = clap::value_parser!(u64).range(1..=86_400)
    )]
    pub request_timeout_secs: u64,

    /// Timeout for the startup health probe (seconds)
    #[arg(
        long,
        env = "VAULT_HEALTH_TIMEOUT_SECS",
        default_value = "3",
        value_parser = clap::value_parser!(u64).range(1..=86_400)
    )]
    pub health_timeout_secs: u64,

    /// Append logs to this file. Nothing is logged when unset.
    #[arg(long, env = "VAULT_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn service_timeouts(&self) -> Timeouts {
        Timeouts {
            request: Duration::from_secs(self.request_timeout_secs),
            health: Duration::from_secs(self.health_timeout_secs),
        }
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_secs)
    }

    /// The startup key, if one was given and is not blank.
    pub fn startup_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_from_flags() {
        let config = Config::try_parse_from([
            "vault",
            "--server-url",
            "https://vault.example.com",
            "--page-size",
            "5",
            "--request-timeout-secs",
            "2",
            "--health-timeout-secs",
            "1",
            "--status-secs",
            "9",
            "--api-key",
            "  ",
            "--log-file",
            "/tmp/vault.log",
        ])
        .unwrap();
        assert_eq!(config.server_url, "https://vault.example.com");
        assert_eq!(config.page_size, 5);
        assert_eq!(
            config.service_timeouts(),
            Timeouts {
                request: Duration::from_secs(2),
                health: Duration::from_secs(1),
            }
        );
        assert_eq!(config.status_ttl(), Duration::from_secs(9));
        assert_eq!(config.startup_api_key(), None);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/vault.log")));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(Config::try_parse_from(["vault", "--page-size", "0"]).is_err());
    }

    #[test]
    fn durations_are_bounded() {
        let huge = u64::MAX.to_string();
        for flag in ["--status-secs", "--request-timeout-secs", "--health-timeout-secs"] {
            assert!(Config::try_parse_from(["vault", flag, huge.as_str()]).is_err(), "{flag}");
            assert!(Config::try_parse_from(["vault", flag, "86401"]).is_err(), "{flag}");
        }
        let config = Config::try_parse_from(["vault", "--status-secs", "86400"]).unwrap();
        assert_eq!(config.status_ttl(), Duration::from_secs(86_400));
        assert!(Config::try_parse_from(["vault", "--request-timeout-secs", "0"]).is_err());
    }

    #[test]
    fn startup_key_is_trimmed() {
        let config = Config::try_parse_from(["vault", "--api-key", " sk_live "]).unwrap();
        assert_eq!(config.startup_api_key(), Some("sk_live"));
    }
}
