// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub const LOG_ENV: &str = "JOBTRACK_LOG";

/// Installs the global subscriber. The terminal UI owns stdout, so events
/// are appended to a plain-text file instead. Returns the file path.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_file()?;
    let file = open_log_file(&path)?;
    let directive = filter_directive(env::var(LOG_ENV).ok(), config.log_level());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}; check {LOG_ENV} or [log].level"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(path)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {} -- set [log].file to a writable path", path.display()))
}

/// `JOBTRACK_LOG` wins when set and non-blank.
fn filter_directive(from_env: Option<String>, configured: &str) -> String {
    match from_env {
        Some(value) if !value.trim().is_empty() => value.trim().to_owned(),
        _ => configured.to_owned(),
    }
}
