// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use jobtrack_app::SessionUser;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};

use crate::APP_NAME;

pub const SESSION_PATH_ENV: &str = "JOBTRACK_SESSION_PATH";

/// Tokens are treated as expired this long before the server says so.
const EXPIRY_SKEW: Duration = Duration::seconds(30);

/// Signed-in auth state as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: SessionUser,
}

impl Session {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now + EXPIRY_SKEW >= self.expires_at
    }

    /// Missing file means signed out.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error).with_context(|| format!("read session {}", path.display()));
            }
        };
        let session = serde_json::from_str(&raw).with_context(|| {
            format!(
                "parse session {} -- delete it or run `jobtrack --sign-out` and sign in again",
                path.display()
            )
        })?;
        Ok(Some(session))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create session directory {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(self).context("encode session")?;
        let mut file = private_file(path)
            .with_context(|| format!("open session {}", path.display()))?;
        // mode() only applies on create; an older file may still be loose.
        set_private_permissions(path)?;
        file.write_all(body.as_bytes())
            .with_context(|| format!("write session {}", path.display()))
    }

    pub fn remove(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error).with_context(|| format!("remove session {}", path.display())),
        }
    }
}

pub fn default_session_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(SESSION_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {SESSION_PATH_ENV} to a writable file path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("session.json"))
}

/// Opens `path` truncated for writing; a new file is created owner-only.
fn private_file(path: &Path) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn set_private_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = fs::metadata(path)
            .with_context(|| format!("stat {}", path.display()))?
            .permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions)
            .with_context(|| format!("set permissions on {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Session;
    use anyhow::Result;
    use jobtrack_app::{SessionUser, UserId};
    use time::Duration;
    use time::macros::datetime;

    fn session() -> Session {
        Session {
            access_token: "access".to_owned(),
            refresh_token: "refresh".to_owned(),
            expires_at: datetime!(2026-02-19 13:00:00 UTC),
            user: SessionUser {
                id: UserId::new("u1"),
                email: "jane@example.com".to_owned(),
            },
        }
    }

    #[test]
    fn expiry_includes_skew() {
        let session = session();
        assert!(!session.is_expired(session.expires_at - Duration::minutes(5)));
        assert!(session.is_expired(session.expires_at - Duration::seconds(10)));
        assert!(session.is_expired(session.expires_at + Duration::hours(1)));
    }

    #[test]
    fn save_load_remove_cycle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("session.json");

        assert_eq!(Session::load(&path)?, None);
        session().save(&path)?;
        assert_eq!(Session::load(&path)?, Some(session()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path)?.permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        Session::remove(&path)?;
        Session::remove(&path)?;
        assert_eq!(Session::load(&path)?, None);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn save_tightens_an_existing_loose_file() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        std::fs::write(&path, "stale tokens that were much longer than the new ones")?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;

        session().save(&path)?;
        let mode = std::fs::metadata(&path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(Session::load(&path)?, Some(session()));
        Ok(())
    }

    #[test]
    fn corrupt_session_error_is_actionable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json")?;
        let error = Session::load(&path).expect_err("corrupt file should fail");
        assert!(error.to_string().contains("--sign-out"));
        Ok(())
    }
}
