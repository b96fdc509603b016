// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use jobtrack_app::SenderProfile;
use jobtrack_app::templates::{DEFAULT_SENDER_BACKGROUND, DEFAULT_SENDER_NAME};
use jobtrack_store::{APP_NAME, SESSION_PATH_ENV, default_session_path};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";

pub const CONFIG_PATH_ENV: &str = "JOBTRACK_CONFIG_PATH";
pub const BACKEND_URL_ENV: &str = "JOBTRACK_BACKEND_URL";
pub const ANON_KEY_ENV: &str = "JOBTRACK_ANON_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub session: SessionSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: Backend::default(),
            ui: Ui::default(),
            messages: Messages::default(),
            log: Log::default(),
            session: SessionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            url: Some(DEFAULT_BACKEND_URL.to_owned()),
            anon_key: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_dashboard: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_dashboard: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Messages {
    pub sender_name: Option<String>,
    pub sender_background: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [backend], [ui], [messages], [log], and [session]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(url) = &self.backend.url
            && url.trim().is_empty()
        {
            bail!(
                "backend.url in {} must not be empty -- set [backend].url or {BACKEND_URL_ENV}",
                path.display()
            );
        }

        if let Some(timeout) = &self.backend.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "backend.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level {level:?} in {} is not a valid filter; use error, warn, info, debug, or trace",
                    path.display()
                )
            })?;
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!("log.file in {} must not be empty", path.display());
        }

        if let Some(session_path) = &self.session.path
            && session_path.trim().is_empty()
        {
            bail!("session.path in {} must not be empty", path.display());
        }

        Ok(())
    }

    /// `JOBTRACK_BACKEND_URL` wins over `[backend].url`.
    pub fn backend_url(&self) -> String {
        let configured = env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.backend.url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        configured.trim().trim_end_matches('/').to_owned()
    }

    pub fn anon_key(&self) -> Result<String> {
        env::var(ANON_KEY_ENV)
            .ok()
            .or_else(|| self.backend.anon_key.clone())
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!("missing backend anon key -- set [backend].anon_key or {ANON_KEY_ENV}")
            })
    }

    pub fn backend_timeout(&self) -> Result<Duration> {
        parse_duration(self.backend.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn show_dashboard(&self) -> bool {
        self.ui.show_dashboard.unwrap_or(true)
    }

    pub fn sender_profile(&self) -> SenderProfile {
        SenderProfile {
            name: self
                .messages
                .sender_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_owned()),
            background: self
                .messages
                .sender_background
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER_BACKGROUND.to_owned()),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("cannot resolve data directory; set [log].file"))?;
        Ok(data_root.join(APP_NAME).join("jobtrack.log"))
    }

    /// `JOBTRACK_SESSION_PATH`, then `[session].path`, then the data dir.
    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(path) = env::var_os(SESSION_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        match &self.session.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_session_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# jobtrack config\n# Place this file at: {}\n\nversion = 1\n\n[backend]\nurl = \"{}\"\n# Public anon key of the project (or set {}).\n# anon_key = \"...\"\ntimeout = \"{}\"\n\n[ui]\nshow_dashboard = true\n\n[messages]\nsender_name = \"{}\"\nsender_background = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/jobtrack/jobtrack.log)\n# file = \"/absolute/path/to/jobtrack.log\"\n\n[session]\n# Optional. Default is platform data dir (for example ~/.local/share/jobtrack/session.json)\n# path = \"/absolute/path/to/session.json\"\n",
            path.display(),
            DEFAULT_BACKEND_URL,
            ANON_KEY_ENV,
            DEFAULT_TIMEOUT,
            DEFAULT_SENDER_NAME,
            DEFAULT_SENDER_BACKGROUND,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{ANON_KEY_ENV, BACKEND_URL_ENV, CONFIG_PATH_ENV, Config, parse_duration};
    use anyhow::Result;
    use jobtrack_store::SESSION_PATH_ENV;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert!(config.show_dashboard());
        assert_eq!(config.backend_timeout()?, Duration::from_secs(10));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.sender_profile().name, "[Your Name]");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[backend]\nurl = \"http://localhost:54321\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[backend]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(BACKEND_URL_ENV);
            std::env::remove_var(ANON_KEY_ENV);
        }
        let (_temp, path) = write_config(
            "version = 1\n[backend]\nurl = \"https://demo.example.co/\"\nanon_key = \"public-key\"\ntimeout = \"2s\"\n[ui]\nshow_dashboard = false\n[messages]\nsender_name = \"Sam Rivera\"\n[log]\nlevel = \"debug\"\nfile = \"/tmp/jobtrack-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.backend_url(), "https://demo.example.co");
        assert_eq!(config.anon_key()?, "public-key");
        assert_eq!(config.backend_timeout()?, Duration::from_secs(2));
        assert!(!config.show_dashboard());
        let sender = config.sender_profile();
        assert_eq!(sender.name, "Sam Rivera");
        assert!(sender.background.contains("data analytics"));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/jobtrack-test.log"));
        Ok(())
    }

    #[test]
    fn env_overrides_backend_settings() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config(
            "version = 1\n[backend]\nurl = \"https://from-config.example\"\nanon_key = \"config-key\"\n",
        )?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(BACKEND_URL_ENV, "https://from-env.example");
            std::env::set_var(ANON_KEY_ENV, "env-key");
        }
        let config = Config::load(&path)?;
        let url = config.backend_url();
        let key = config.anon_key();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(BACKEND_URL_ENV);
            std::env::remove_var(ANON_KEY_ENV);
        }
        assert_eq!(url, "https://from-env.example");
        assert_eq!(key?, "env-key");
        Ok(())
    }

    #[test]
    fn missing_anon_key_names_both_sources() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(ANON_KEY_ENV);
        }
        let error = Config::default()
            .anon_key()
            .expect_err("missing key should fail");
        let message = error.to_string();
        assert!(message.contains("[backend].anon_key"));
        assert!(message.contains(ANON_KEY_ENV));
        Ok(())
    }

    #[test]
    fn session_path_prefers_env_then_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[session]\npath = \"/explicit/session.json\"\n")?;
        let config = Config::load(&path)?;

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(SESSION_PATH_ENV, "/from/env/session.json");
        }
        let from_env = config.session_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(SESSION_PATH_ENV);
        }
        assert_eq!(from_env, PathBuf::from("/from/env/session.json"));
        assert_eq!(
            config.session_path()?,
            PathBuf::from("/explicit/session.json")
        );
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[backend]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));

        let (_temp, path) = write_config("version = 1\n[backend]\nurl = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank url should fail");
        assert!(error.to_string().contains("[backend].url"));

        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"jobtrack=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad log level should fail");
        assert!(error.to_string().contains("not a valid filter"));
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        for section in ["[backend]", "[ui]", "[messages]", "[log]", "[session]"] {
            assert!(example.contains(section), "missing {section}");
        }
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert!(config.show_dashboard());
        assert_eq!(config.backend_url(), "http://localhost:54321");
        Ok(())
    }
}
