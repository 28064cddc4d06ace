//! Relay server configuration.
//!
//! Every parameter has a default and an environment variable override.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

/// Outbound mail settings. Only message composition happens in this crate;
/// these are carried for the mailer that delivers.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub admin_email: Option<String>,
    /// Named service such as `gmail`; unset means plain SMTP.
    pub service: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            admin_email: None,
            service: None,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            user: non_empty_var("EMAIL_USER"),
            password: non_empty_var("EMAIL_PASS"),
            admin_email: non_empty_var("ADMIN_EMAIL"),
            service: non_empty_var("EMAIL_SERVICE"),
            smtp_host: non_empty_var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: non_empty_var("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.smtp_port),
        }
    }

    /// Without credentials submissions are accepted and logged, not mailed.
    pub fn demo_mode(&self) -> bool {
        self.user.is_none() || self.password.is_none()
    }

    /// Address that receives form notifications; falls back to the sender.
    pub fn admin_address(&self) -> Option<&str> {
        self.admin_email.as_deref().or(self.user.as_deref())
    }
}

/// Per-IP request budget: `requests` per `window`, refilled evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub fn new(requests: u32, window: Duration) -> Self {
        Self { requests, window }
    }

    /// Burst size; at least one request always gets through.
    pub fn burst(&self) -> u32 {
        self.requests.max(1)
    }

    /// Time to earn back one request.
    pub fn replenish_period(&self) -> Duration {
        (self.window / self.burst()).max(Duration::from_millis(1))
    }

    fn from_env(requests_key: &str, window_key: &str, default: Self) -> Self {
        let requests = non_empty_var(requests_key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.requests);
        let window = non_empty_var(window_key)
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(default.window);
        Self { requests, window }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory the site is served from.
    pub static_dir: PathBuf,
    /// Allowed CORS origin (None = allow all).
    pub frontend_url: Option<String>,
    pub mail: MailConfig,
    /// Applies to every request.
    pub site_limit: RateLimit,
    /// Applies to contact submissions on top of the site limit.
    pub contact_limit: RateLimit,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("dist"),
            frontend_url: None,
            mail: MailConfig::default(),
            site_limit: RateLimit::new(100, Duration::from_secs(15 * 60)),
            contact_limit: RateLimit::new(5, Duration::from_secs(60 * 60)),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(host) = non_empty_var("HOST") {
            config.host = host;
        }

        if let Some(val) = non_empty_var("PORT") {
            match val.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!("PORT '{}' is not a port number, using {}", val, config.port),
            }
        }

        if let Some(dir) = non_empty_var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        config.frontend_url = non_empty_var("FRONTEND_URL");
        config.mail = MailConfig::from_env();
        config.site_limit =
            RateLimit::from_env("RATE_LIMIT_MAX", "RATE_LIMIT_WINDOW_SECS", config.site_limit);
        config.contact_limit = RateLimit::from_env(
            "CONTACT_LIMIT_MAX",
            "CONTACT_LIMIT_WINDOW_SECS",
            config.contact_limit,
        );
        config
    }

    pub fn demo_mode(&self) -> bool {
        self.mail.demo_mode()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Logs the effective configuration. Credentials are never printed.
    pub fn log(&self) {
        info!("Configuration:");
        info!("   Address: {}", self.bind_addr());
        info!("   Static dir: {}", self.static_dir.display());
        info!(
            "   CORS origin: {}",
            self.frontend_url.as_deref().unwrap_or("any")
        );
        info!(
            "   Rate limit: {} per {}s, contact {} per {}s",
            self.site_limit.requests,
            self.site_limit.window.as_secs(),
            self.contact_limit.requests,
            self.contact_limit.window.as_secs()
        );
        match (&self.mail.service, self.demo_mode()) {
            (_, true) => tracing::warn!("   Mail: demo mode (EMAIL_USER/EMAIL_PASS not set), messages are logged only"),
            (Some(service), false) => info!("   Mail: service {}", service),
            (None, false) => info!(
                "   Mail: SMTP {}:{}",
                self.mail.smtp_host, self.mail.smtp_port
            ),
        }
    }

    /// tower-http CORS layer for the configured origin.
    pub fn cors_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let layer = CorsLayer::new()
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]);

        match &self.frontend_url {
            None => layer.allow_origin(Any),
            Some(origin) => match origin.parse::<axum::http::HeaderValue>() {
                Ok(origin) => layer.allow_origin(origin),
                Err(_) => {
                    // Do not fall back to permissive on a bad value.
                    tracing::error!("CORS: invalid FRONTEND_URL '{}', rejecting cross-origin requests", origin);
                    layer.allow_origin(AllowOrigin::list(Vec::<axum::http::HeaderValue>::new()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_mode_needs_both_credentials() {
        let mut mail = MailConfig::default();
        assert!(mail.demo_mode());
        mail.user = Some("me@example.com".into());
        assert!(mail.demo_mode());
        mail.password = Some("secret".into());
        assert!(!mail.demo_mode());
        assert_eq!(mail.admin_address(), Some("me@example.com"));
        mail.admin_email = Some("admin@example.com".into());
        assert_eq!(mail.admin_address(), Some("admin@example.com"));
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.mail.smtp_port, 587);
        assert_eq!(config.contact_limit.burst(), 5);
        assert_eq!(config.contact_limit.replenish_period(), Duration::from_secs(720));
        assert_eq!(config.site_limit.replenish_period(), Duration::from_secs(9));
    }

    #[test]
    fn zero_budget_still_builds_a_quota() {
        let limit = RateLimit::new(0, Duration::ZERO);
        assert_eq!(limit.burst(), 1);
        assert_eq!(limit.replenish_period(), Duration::from_millis(1));
    }
}
