use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the lead-capture service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub smtp: SmtpConfig,
    pub push: Option<PushConfig>,
    pub rate_limit: RateLimitConfig,
    pub journal_dir: PathBuf,
    pub send_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp-relay.brevo.com".to_string()),
            port: parse_number("SMTP_PORT", 587)?,
            user: env::var("SMTP_USER").unwrap_or_default(),
            pass: env::var("SMTP_PASS").unwrap_or_default(),
            from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@mapetitelaverie.fr".to_string()),
            from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Ma Petite Laverie".to_string()),
            recipients: recipient_list(&env::var("EMAIL_TO").unwrap_or_default()),
        };

        // Push alerts are opt-in: an empty or missing token disables the channel.
        let push = match env::var("PUSHOVER_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(PushConfig {
                token: token.trim().to_string(),
                user: env::var("PUSHOVER_USER").unwrap_or_default().trim().to_string(),
            }),
            _ => None,
        };

        let rate_limit = RateLimitConfig {
            enabled: parse_flag(&env::var("RATE_LIMIT_ENABLED").unwrap_or_else(|_| "true".to_string())),
            max_submissions: parse_number("RATE_LIMIT_MAX_SUBMISSIONS", 3)?,
            window: Duration::from_secs(parse_number("RATE_LIMIT_TIME_WINDOW", 3600)?),
        };

        let journal_dir =
            PathBuf::from(env::var("SUBMISSION_LOG_DIR").unwrap_or_else(|_| "logs".to_string()));

        let send_timeout = Duration::from_secs(parse_number("SEND_TIMEOUT_SECS", 5)?);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            smtp,
            push,
            rate_limit,
            journal_dir,
            send_timeout,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// SMTP relay settings shared by the internal alert and the confirmation email.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from_email: String,
    pub from_name: String,
    pub recipients: Vec<String>,
}

/// Pushover credential pair. Absent when the channel is unconfigured.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub token: String,
    pub user: String,
}

/// Sliding-window admission settings for the submission throttle.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_submissions: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_submissions: 3,
            window: Duration::from_secs(3600),
        }
    }
}

fn recipient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

fn parse_number<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_USER",
            "SMTP_PASS",
            "SMTP_FROM_EMAIL",
            "SMTP_FROM_NAME",
            "EMAIL_TO",
            "PUSHOVER_TOKEN",
            "PUSHOVER_USER",
            "RATE_LIMIT_ENABLED",
            "RATE_LIMIT_MAX_SUBMISSIONS",
            "RATE_LIMIT_TIME_WINDOW",
            "SUBMISSION_LOG_DIR",
            "SEND_TIMEOUT_SECS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.smtp.port, 587);
        assert!(config.smtp.recipients.is_empty());
        assert!(config.push.is_none());
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.max_submissions, 3);
        assert_eq!(config.rate_limit.window, Duration::from_secs(3600));
        assert_eq!(config.send_timeout, Duration::from_secs(5));
    }

    #[test]
    fn recipient_list_splits_and_trims() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EMAIL_TO", "a@mpl.fr, b@mpl.fr ,,c@mpl.fr");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.smtp.recipients, vec!["a@mpl.fr", "b@mpl.fr", "c@mpl.fr"]);
    }

    #[test]
    fn push_channel_enabled_by_token_presence() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PUSHOVER_TOKEN", "app-token");
        env::set_var("PUSHOVER_USER", "user-key");
        let config = AppConfig::load().expect("config loads");
        let push = config.push.expect("push channel configured");
        assert_eq!(push.token, "app-token");
        assert_eq!(push.user, "user-key");
    }

    #[test]
    fn rate_limit_flag_accepts_common_spellings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RATE_LIMIT_ENABLED", "off");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn malformed_window_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RATE_LIMIT_TIME_WINDOW", "one hour");
        let error = AppConfig::load().expect_err("window must be numeric");
        assert!(matches!(error, ConfigError::InvalidNumber { var } if var == "RATE_LIMIT_TIME_WINDOW"));
    }
}
