use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "leads.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub organisation_id: Option<i64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".into(),
            api_token: None,
            request_timeout_secs: 15,
            organisation_id: None,
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat TOML file at `path`, then environment overrides.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url").and_then(toml_string) {
                settings.api_base_url = v;
            }
            if let Some(v) = file_cfg.get("api_token").and_then(toml_string) {
                settings.api_token = Some(v);
            }
            if let Some(v) = file_cfg
                .get("request_timeout_secs")
                .and_then(toml_string)
                .and_then(|v| v.parse().ok())
            {
                settings.request_timeout_secs = v;
            }
            if let Some(v) = file_cfg
                .get("organisation_id")
                .and_then(toml_string)
                .and_then(|v| v.parse().ok())
            {
                settings.organisation_id = Some(v);
            }
        }
    }

    if let Some(v) = env("LEADS_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("LEADS_API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = env("APP__API_TOKEN") {
        settings.api_token = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__ORGANISATION_ID") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.organisation_id = Some(parsed);
        }
    }

    settings
}

fn toml_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

pub fn normalize_base_url(raw_base_url: &str) -> anyhow::Result<String> {
    let trimmed = raw_base_url.trim().trim_end_matches('/');
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid api base url '{raw_base_url}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(anyhow!(
            "api base url must start with http:// or https://, got '{raw_base_url}'"
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings_from(Path::new("/nonexistent/leads.toml"), no_env);
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn file_values_then_env_overrides() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("leads_client_config_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join("leads.toml");
        fs::write(
            &path,
            "api_base_url = \"https://crm.example.com/api/\"\nrequest_timeout_secs = 30\norganisation_id = \"9\"\n",
        )
        .expect("write settings");

        let from_file = load_settings_from(&path, no_env);
        assert_eq!(from_file.api_base_url, "https://crm.example.com/api/");
        assert_eq!(from_file.request_timeout_secs, 30);
        assert_eq!(from_file.organisation_id, Some(9));
        assert_eq!(from_file.api_token, None);

        let overridden = load_settings_from(&path, |key| match key {
            "APP__API_BASE_URL" => Some("http://localhost:9000/api".to_string()),
            "LEADS_API_TOKEN" => Some("secret".to_string()),
            "APP__REQUEST_TIMEOUT_SECS" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(overridden.api_base_url, "http://localhost:9000/api");
        assert_eq!(overridden.api_token.as_deref(), Some("secret"));
        assert_eq!(overridden.request_timeout_secs, 30);

        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn normalizes_trailing_slashes() {
        assert_eq!(
            normalize_base_url(" https://crm.example.com/api// ").expect("url"),
            "https://crm.example.com/api"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(normalize_base_url("ftp://crm.example.com").is_err());
        assert!(normalize_base_url("crm.example.com").is_err());
    }
}
