use std::{collections::HashMap, fs, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "tally.toml";

// Lowest priority first; later names override earlier ones.
const STORE_URL_VARS: [&str; 3] = ["SUPABASE_URL", "STORE_URL", "APP__STORE_URL"];
const STORE_KEY_VARS: [&str; 3] = ["SUPABASE_ANON_KEY", "STORE_ANON_KEY", "APP__STORE_ANON_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSettings {
    pub store_url: String,
    pub store_key: String,
    pub request_timeout_ms: u64,
    pub save_notice_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_url: "http://127.0.0.1:54321".into(),
            store_key: "anon-dev-key".into(),
            request_timeout_ms: 10_000,
            save_notice_ms: 2_000,
        }
    }
}

impl StoreSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn save_notice_duration(&self) -> Duration {
        Duration::from_millis(self.save_notice_ms)
    }
}

/// Defaults, then `tally.toml` in the working directory, then environment.
pub fn load_settings() -> StoreSettings {
    let file_contents = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_with(file_contents.as_deref(), |name| std::env::var(name).ok())
}

pub fn load_settings_with(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> StoreSettings {
    let mut settings = StoreSettings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, &file_cfg),
            Err(err) => warn!("ignoring malformed {SETTINGS_FILE}: {err}"),
        }
    }

    let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    for name in STORE_URL_VARS {
        if let Some(v) = env(name) {
            settings.store_url = v;
        }
    }
    for name in STORE_KEY_VARS {
        if let Some(v) = env(name) {
            settings.store_key = v;
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_ms = parsed,
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_MS={v}: {err}"),
        }
    }
    if let Some(v) = env("APP__SAVE_NOTICE_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.save_notice_ms = parsed,
            Err(err) => warn!("ignoring APP__SAVE_NOTICE_MS={v}: {err}"),
        }
    }

    settings
}

fn apply_file_settings(settings: &mut StoreSettings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("store_url").and_then(toml::Value::as_str) {
        settings.store_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("store_key").and_then(toml::Value::as_str) {
        settings.store_key = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_ms")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg
        .get("save_notice_ms")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.save_notice_ms = v;
    }
}
