//! Settings shared by every request an `HttpApi` builds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::Agent;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = "Paradaux/FriendlyBot";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Defaults applied to every built request, plus the redirect policy for
/// the agent `HttpApi` creates when none is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpApiConfig {
    /// Per-request timeout. 0 means `DEFAULT_TIMEOUT_SECS`.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// Redirects followed per request. 0 disables following.
    pub max_redirects: u32,
    /// `Content-Type` attached to binary POST bodies. Unset by default, in
    /// which case only the plain-text defaults are sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_content_type: Option<String>,
}

impl Default for HttpApiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            binary_content_type: None,
        }
    }
}

impl HttpApiConfig {
    /// Defaults overridden by any `HTTP_API_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(secs) = parse_var(&lookup, "HTTP_API_TIMEOUT_SECS") {
            self.timeout_secs = secs;
        }
        if let Some(agent) = lookup("HTTP_API_USER_AGENT") {
            self.user_agent = agent;
        }
        if let Some(language) = lookup("HTTP_API_ACCEPT_LANGUAGE") {
            self.accept_language = language;
        }
        if let Some(max) = parse_var(&lookup, "HTTP_API_MAX_REDIRECTS") {
            self.max_redirects = max;
        }
        if let Some(content_type) = lookup("HTTP_API_BINARY_CONTENT_TYPE") {
            self.binary_content_type = Some(content_type);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Build the agent used when the caller does not bring their own.
    ///
    /// Non-2xx statuses come back as responses, not errors.
    pub fn agent(&self) -> Agent {
        Agent::config_builder()
            .max_redirects(self.max_redirects)
            .http_status_as_error(false)
            .build()
            .new_agent()
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = HttpApiConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.accept_language, "en-US,en;q=0.8");
        assert_eq!(config.user_agent, "Paradaux/FriendlyBot");
        assert_eq!(config.max_redirects, 10);
        assert!(config.binary_content_type.is_none());
    }

    #[test]
    fn overrides_apply() {
        let config = HttpApiConfig::default().with_overrides(lookup(&[
            ("HTTP_API_TIMEOUT_SECS", "5"),
            ("HTTP_API_USER_AGENT", "probe/2"),
            ("HTTP_API_MAX_REDIRECTS", "0"),
            ("HTTP_API_BINARY_CONTENT_TYPE", "application/octet-stream"),
        ]));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "probe/2");
        assert_eq!(config.accept_language, DEFAULT_ACCEPT_LANGUAGE);
        assert_eq!(config.max_redirects, 0);
        assert_eq!(config.binary_content_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn unparsable_override_is_ignored() {
        let config = HttpApiConfig::default()
            .with_overrides(lookup(&[("HTTP_API_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: HttpApiConfig =
            serde_json::from_str(r#"{"timeout_secs":2,"binary_content_type":"image/png"}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.binary_content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn zero_timeout_means_default() {
        let config = HttpApiConfig {
            timeout_secs: 0,
            ..HttpApiConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let config = HttpApiConfig::default().with_overrides(lookup(&[("HTTP_API_TIMEOUT_SECS", "0")]));
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn unset_content_type_is_not_serialized() {
        let json = serde_json::to_value(HttpApiConfig::default()).unwrap();
        assert!(json.get("binary_content_type").is_none());
        assert_eq!(json["timeout_secs"], 60);
    }
}
