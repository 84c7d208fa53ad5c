use serde::{Deserialize, Serialize};

pub const BASE_URL: &str = "https://lknpd.nalog.ru/api/v1";
pub const PORTAL_URL: &str = "https://lknpd.nalog.ru";
pub const APP_VERSION: &str = "1.0.0";
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; rv:109.0) Gecko/20100101 Firefox/109.0 ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
);

/// Connection settings for [`crate::Client`]. Every field has a default, so a
/// partial config file or `ClientConfig::default()` is enough to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for relative request paths.
    pub base_url: String,
    /// Origin used to build the `referer` header the server checks.
    pub portal_url: String,
    /// Reported as `deviceInfo.appVersion` during login and refresh.
    pub app_version: String,
    pub user_agent: String,
    /// Account used when a request names none.
    pub default_inn: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            portal_url: PORTAL_URL.to_string(),
            app_version: APP_VERSION.to_string(),
            user_agent: USER_AGENT.to_string(),
            default_inn: None,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_portal_url(mut self, portal_url: impl Into<String>) -> Self {
        self.portal_url = portal_url.into();
        self
    }

    pub fn with_default_inn(mut self, inn: impl Into<String>) -> Self {
        self.default_inn = Some(inn.into());
        self
    }

    /// `referer` for a logical portal page; `None` means the portal root.
    pub fn referer(&self, page: Option<&str>) -> String {
        format!(
            "{}/{}",
            self.portal_url.trim_end_matches('/'),
            page.unwrap_or("").trim_start_matches('/')
        )
    }

    /// Absolute URLs pass through; anything else is appended to `base_url`.
    pub fn resolve_url(&self, path_or_url: &str) -> String {
        if is_absolute(path_or_url) {
            return path_or_url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path_or_url.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if !is_absolute(&self.base_url) {
            return Err("base_url must be a valid HTTP(S) URL".to_string());
        }
        if !is_absolute(&self.portal_url) {
            return Err("portal_url must be a valid HTTP(S) URL".to_string());
        }
        if self.default_inn.as_deref().is_some_and(str::is_empty) {
            return Err("default_inn must not be empty when set".to_string());
        }
        Ok(())
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referer_defaults_to_portal_root() {
        let config = ClientConfig::default();
        assert_eq!(config.referer(None), "https://lknpd.nalog.ru/");
        assert_eq!(config.referer(Some("Sales")), "https://lknpd.nalog.ru/Sales");
    }

    #[test]
    fn resolve_url_joins_relative_paths() {
        let config = ClientConfig::default();
        assert_eq!(
            config.resolve_url("/income"),
            "https://lknpd.nalog.ru/api/v1/income"
        );
        assert_eq!(
            config.resolve_url("https://example.org/x"),
            "https://example.org/x"
        );
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"default_inn": "111111111111"}"#).unwrap();
        assert_eq!(config.base_url, BASE_URL);
        assert_eq!(config.default_inn.as_deref(), Some("111111111111"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let config = ClientConfig::default().with_base_url("lknpd.nalog.ru");
        assert!(config.validate().is_err());
    }
}
