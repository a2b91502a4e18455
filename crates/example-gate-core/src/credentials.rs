// crates/example-gate-core/src/credentials.rs
// ============================================================================
// Module: Credential Materializer
// Description: Transient INI credentials file for the JavaScript client.
// Purpose: Write API credentials for one run and remove them on every exit path.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The client library reads its credentials from an INI file with a single
//! `[api]` section. [`CredentialsFile`] writes that file when a run starts and
//! removes it when the guard is dropped, so success, error, and panic paths
//! all clean up. Parent directories the guard had to create are removed too,
//! provided they are empty by then.
//!
//! Security posture: the file holds an API key. It is created exclusively
//! (an existing file is never overwritten) and restricted to the owner on Unix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while writing or removing the credentials file.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// A credential value cannot be represented in the INI format.
    #[error("credential field `{0}` must be a non-empty single line")]
    InvalidField(&'static str),
    /// A credentials file already exists at the target path.
    #[error("credentials file already exists: {0}")]
    AlreadyExists(PathBuf),
    /// Filesystem error while writing or removing the file.
    #[error("credentials file io error at {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// API credentials exposed by the REST client under test.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Account email.
    pub email: String,
    /// API key.
    pub api_key: String,
    /// Client base URL, usually ending in `/api/`.
    pub base_url: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiCredentials {
    /// Returns the site URL: `base_url` without its trailing `/api/` segment.
    #[must_use]
    pub fn site(&self) -> &str {
        let base = self.base_url.trim();
        base.strip_suffix("/api/")
            .or_else(|| base.strip_suffix("/api"))
            .unwrap_or_else(|| base.trim_end_matches('/'))
    }

    /// Renders the INI document read by the JavaScript client.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::InvalidField`] when a value is empty or
    /// spans several lines.
    pub fn render(&self) -> Result<String, CredentialsError> {
        let email = single_line("email", &self.email)?;
        let key = single_line("key", &self.api_key)?;
        let site = single_line("site", self.site())?;
        Ok(format!("[api]\nemail={email}\nkey={key}\nsite={site}\n"))
    }
}

/// Rejects empty and multi-line INI values.
fn single_line<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CredentialsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(['\n', '\r']) {
        return Err(CredentialsError::InvalidField(field));
    }
    Ok(trimmed)
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Guard owning a materialized credentials file.
///
/// # Invariants
/// - While the guard lives, the file at `path` was created by this guard.
/// - The file is removed on drop unless [`CredentialsFile::remove`] already ran.
/// - `created_dirs` lists only directories this guard created, deepest first.
#[derive(Debug)]
pub struct CredentialsFile {
    /// Location of the written file.
    path: PathBuf,
    /// Parent directories created for the file, deepest first.
    created_dirs: Vec<PathBuf>,
    /// Whether the file has already been removed.
    removed: bool,
}

impl CredentialsFile {
    /// Writes `credentials` to `path` and returns the owning guard.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError`] when the file already exists, a value is
    /// invalid, or the write fails. A partially written file is removed.
    pub fn materialize(
        path: impl AsRef<Path>,
        credentials: &ApiCredentials,
    ) -> Result<Self, CredentialsError> {
        let path = path.as_ref().to_path_buf();
        let contents = credentials.render()?;
        let mut created_dirs = Vec::new();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            created_dirs = missing_ancestors(parent);
            if let Err(source) = fs::create_dir_all(parent) {
                let _ = remove_empty_dirs(&created_dirs);
                return Err(CredentialsError::Io {
                    path: parent.to_path_buf(),
                    source,
                });
            }
        }
        let mut file = open_exclusive(&path).map_err(|source| {
            let _ = remove_empty_dirs(&created_dirs);
            if source.kind() == io::ErrorKind::AlreadyExists {
                CredentialsError::AlreadyExists(path.clone())
            } else {
                CredentialsError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        // From here on the guard owns the file, so a failed write still cleans up.
        let guard = Self {
            path,
            created_dirs,
            removed: false,
        };
        file.write_all(contents.as_bytes()).and_then(|()| file.sync_all()).map_err(|source| {
            CredentialsError::Io {
                path: guard.path.clone(),
                source,
            }
        })?;
        Ok(guard)
    }

    /// Returns the path of the credentials file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now, reporting any error.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Io`] when removal fails for a reason other
    /// than the file already being gone.
    pub fn remove(mut self) -> Result<(), CredentialsError> {
        self.removed = true;
        remove_if_present(&self.path).map_err(|source| CredentialsError::Io {
            path: self.path.clone(),
            source,
        })?;
        remove_empty_dirs(&self.created_dirs).map_err(|(path, source)| CredentialsError::Io {
            path,
            source,
        })
    }
}

impl Drop for CredentialsFile {
    fn drop(&mut self) {
        if !self.removed && remove_if_present(&self.path).is_ok() {
            let _ = remove_empty_dirs(&self.created_dirs);
        }
    }
}

/// Opens a new file, failing if it exists; owner-only on Unix.
fn open_exclusive(path: &Path) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Lists the ancestors of `dir` (itself included) that do not exist yet,
/// deepest first.
fn missing_ancestors(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .take_while(|ancestor| !ancestor.exists())
        .map(Path::to_path_buf)
        .collect()
}

/// Removes created directories deepest first, stopping at the first one that
/// is no longer empty.
fn remove_empty_dirs(dirs: &[PathBuf]) -> Result<(), (PathBuf, io::Error)> {
    for dir in dirs {
        match fs::remove_dir(dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) if err.kind() == io::ErrorKind::DirectoryNotEmpty => return Ok(()),
            Err(err) => return Err((dir.clone(), err)),
        }
    }
    Ok(())
}

/// Removes a file, treating "not found" as success.
fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
