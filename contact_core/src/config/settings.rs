use config::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_CONTACT_TO: &str = "hello@example.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub contact: ContactConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub max_body_bytes: usize,
}

/// Outbound mail settings for the contact relay.
///
/// Host, user and password are optional here because a missing value is a
/// runtime outcome of the relay rather than a startup failure.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub to: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// A list in files; a comma-separated string in `APP__CORS__ALLOWED_ORIGINS`.
    #[serde(deserialize_with = "list_or_csv")]
    pub allowed_origins: Vec<String>,
    pub permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enable: bool,
    pub max_requests: usize,
    pub window_seconds: u64,
}

/// Fully resolved credentials for one SMTP connection.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub timeout_seconds: u64,
}

impl SmtpSettings {
    /// Port 465 is wrapped in TLS from the first byte; every other port
    /// connects in plain text and upgrades with STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for ContactConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "<redacted>"))
            .field("to", &self.to)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_pass: None,
            to: DEFAULT_CONTACT_TO.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            permissive: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enable: false,
            max_requests: 5,
            window_seconds: 60,
        }
    }
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ContactConfig {
    /// Reads `CONTACT_SMTP_HOST`, `CONTACT_SMTP_PORT`, `CONTACT_SMTP_USER`,
    /// `CONTACT_SMTP_PASS` and `CONTACT_TO` on top of `self`.
    pub fn overlay_env(&self) -> Result<Self, ConfigError> {
        self.overlay(None)
    }

    pub(crate) fn overlay(&self, vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let mut contact: ContactConfig = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(Environment::with_prefix("CONTACT").source(vars))
            .build()?
            .try_deserialize()?;

        if contact.to.is_empty() {
            contact.to = DEFAULT_CONTACT_TO.to_string();
        }

        Ok(contact)
    }

    /// `None` unless host, user and password are all present and non-empty.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: non_empty(&self.smtp_host)?.to_string(),
            port: self.smtp_port,
            user: non_empty(&self.smtp_user)?.to_string(),
            password: non_empty(&self.smtp_pass)?.to_string(),
            timeout_seconds: self.timeout_seconds,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.smtp_settings().is_some()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, None)
    }

    /// `vars` replaces the process environment for both the `APP__` and the
    /// `CONTACT_` sources when given.
    pub(crate) fn load_with(
        path: &Path,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Values stay strings until deserialization so secrets such as
        // `0123` are never reinterpreted as numbers.
        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .source(vars.clone()),
        );

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.contact = app_config.contact.overlay(vars)?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Message(
                "Max body size must be greater than 0".to_string(),
            ));
        }

        if self.contact.smtp_port == 0 {
            return Err(ConfigError::Message("SMTP port cannot be 0".to_string()));
        }

        if self.rate_limit.enable
            && (self.rate_limit.max_requests == 0 || self.rate_limit.window_seconds == 0)
        {
            return Err(ConfigError::Message(
                "Rate limit budget and window must be greater than 0".to_string(),
            ));
        }

        if !self.contact.is_configured() {
            tracing::warn!("SMTP host or credentials missing - contact submissions will be rejected");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.contact.smtp_port, 587);
        assert_eq!(config.contact.to, "hello@example.com");
        assert!(!config.rate_limit.enable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.contact.smtp_port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.rate_limit.enable = true;
        config.rate_limit.window_seconds = 0;
        assert!(config.validate().is_err());

        config.rate_limit.enable = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_address() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_contact_overlay_reads_prefixed_variables() {
        let contact = ContactConfig::default()
            .overlay(Some(vars(&[
                ("CONTACT_SMTP_HOST", "smtp.example.com"),
                ("CONTACT_SMTP_PORT", "465"),
                ("CONTACT_SMTP_USER", "me@example.com"),
                ("CONTACT_SMTP_PASS", "0123"),
                ("CONTACT_TO", "inbox@example.com"),
            ])))
            .unwrap();

        let settings = contact.smtp_settings().unwrap();
        assert_eq!(settings.host, "smtp.example.com");
        assert_eq!(settings.port, 465);
        assert_eq!(settings.user, "me@example.com");
        assert_eq!(settings.password, "0123");
        assert!(settings.implicit_tls());
        assert_eq!(contact.to, "inbox@example.com");
    }

    #[test]
    fn test_contact_overlay_defaults() {
        let contact = ContactConfig::default()
            .overlay(Some(vars(&[("CONTACT_SMTP_HOST", "smtp.example.com")])))
            .unwrap();

        assert_eq!(contact.smtp_port, 587);
        assert_eq!(contact.to, "hello@example.com");
        assert!(!contact.is_configured());
    }

    #[test]
    fn test_empty_recipient_falls_back() {
        let contact = ContactConfig::default()
            .overlay(Some(vars(&[("CONTACT_TO", "")])))
            .unwrap();
        assert_eq!(contact.to, "hello@example.com");
    }

    #[test]
    fn test_empty_credentials_count_as_missing() {
        let contact = ContactConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_user: Some("me@example.com".to_string()),
            smtp_pass: Some(String::new()),
            ..ContactConfig::default()
        };
        assert!(contact.smtp_settings().is_none());

        let contact = ContactConfig {
            smtp_pass: Some("secret".to_string()),
            ..contact
        };
        let settings = contact.smtp_settings().unwrap();
        assert!(!settings.implicit_tls());
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let contact = ContactConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_user: Some("me@example.com".to_string()),
            smtp_pass: Some("hunter2".to_string()),
            ..ContactConfig::default()
        };

        assert!(!format!("{:?}", contact).contains("hunter2"));
        assert!(!format!("{:?}", contact.smtp_settings().unwrap()).contains("hunter2"));
    }

    #[test]
    fn test_config_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8081\n\n[rate_limit]\nenable = true\nmax_requests = 3\nwindow_seconds = 30"
        )
        .unwrap();

        let config = AppConfig::load_from(&path).expect("Should load file configuration");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.rate_limit.enable);
        assert_eq!(config.rate_limit.max_requests, 3);
    }

    #[test]
    fn test_app_environment_keeps_strings_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with(
            &dir.path().join("absent.toml"),
            Some(vars(&[
                ("APP__SERVER__PORT", "8082"),
                ("APP__CONTACT__SMTP_HOST", "smtp.example.com"),
                ("APP__CONTACT__SMTP_USER", "me@example.com"),
                ("APP__CONTACT__SMTP_PASS", "0123"),
                ("APP__RATE_LIMIT__ENABLE", "true"),
                ("APP__CORS__ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ])),
        )
        .expect("Should load environment configuration");

        assert_eq!(config.server.port, 8082);
        assert_eq!(config.contact.smtp_pass.as_deref(), Some("0123"));
        assert_eq!(config.contact.smtp_settings().unwrap().password, "0123");
        assert!(config.rate_limit.enable);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_contact_variables_override_app_variables() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with(
            &dir.path().join("absent.toml"),
            Some(vars(&[
                ("APP__CONTACT__SMTP_PASS", "from-app"),
                ("CONTACT_SMTP_PASS", "007"),
            ])),
        )
        .unwrap();

        assert_eq!(config.contact.smtp_pass.as_deref(), Some("007"));
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml"))
            .expect("Should load default configuration");
        assert!(config.validate().is_ok());
        assert!(config.server.max_body_bytes > 0);
    }
}
