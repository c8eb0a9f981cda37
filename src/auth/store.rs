//! Session record storage.
//!
//! The upstream API authenticates with cookies (`auth`, `twoFactorAuth`).
//! They are persisted as a single JSON record in `~/.vrcwatch/session.json`
//! so a restart does not need a fresh login or a new one-time code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The session directory name.
const SESSION_DIR: &str = ".vrcwatch";

/// The session file name.
const SESSION_FILE: &str = "session.json";

/// Opaque session material: upstream cookies keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    /// Cookie name to cookie value.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    /// When this record was last written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionTokens {
    /// Create an empty token set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a token set from `name=value` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            saved_at: None,
        }
    }

    /// True when no cookie is held.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Look up a cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Merge raw `Set-Cookie` header values into the set.
    ///
    /// Later values replace earlier ones with the same name. A cookie set to
    /// an empty value is removed. Returns `true` if anything changed.
    pub fn merge_set_cookies(&mut self, set_cookies: &[String]) -> bool {
        let mut changed = false;
        for raw in set_cookies {
            let Some((name, value)) = parse_set_cookie(raw) else {
                continue;
            };
            if value.is_empty() {
                changed |= self.cookies.remove(&name).is_some();
            } else if self.cookies.get(&name) != Some(&value) {
                self.cookies.insert(name, value);
                changed = true;
            }
        }
        changed
    }

    /// Render the set as a `Cookie` request header value.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Extract `(name, value)` from a `Set-Cookie` header value, dropping attributes.
pub fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().trim_matches('"').to_string()))
}

/// Reads and writes the session record on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Path to the session file.
    path: PathBuf,
}

impl SessionStore {
    /// Create a store at the default location.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self {
            path: home.join(SESSION_DIR).join(SESSION_FILE),
        })
    }

    /// Create a store at an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session record.
    ///
    /// A missing or unreadable file is treated as "no session".
    pub fn load(&self) -> SessionTokens {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return SessionTokens::default(),
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                SessionTokens::default()
            }
        }
    }

    /// Overwrite the session record, creating the parent directory if needed.
    pub fn save(&self, tokens: &SessionTokens) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        restrict_permissions(&file)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, tokens)?;
        writer.flush()
    }

    /// Remove the session file. A missing file is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}
