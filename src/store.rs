//! Core store type and builder.

use crate::diff::Diff;
use crate::error::{Error, Result};
use crate::persist::{backup_existing, encode_pretty, replace_file};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Top-level shape of the persisted document: string keys mapped to
/// arbitrary JSON values.
pub type Document = serde_json::Map<String, Value>;

/// Environment variable consulted for the document path when none is given.
pub const PATH_ENV: &str = "JSON_LEDGER_FILE";

/// Document path used when neither the caller nor the environment names one.
pub const DEFAULT_PATH: &str = "ledger.json";

/// Suffix appended to the document path to form the backup path.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Default cap on the number of changed keys a diff retains.
pub const DEFAULT_MAX_DIFF_ENTRIES: usize = 5;

/// Durable JSON document store with backup-before-write.
///
/// The whole document lives in a single pretty-printed JSON file: every read
/// loads it fresh from disk, and every write replaces it after copying the
/// previous version to a `.bak` sibling. Use [`open`](Self::open) for a quick
/// start or [`builder`](Self::builder) to pick the path and diff cap
/// explicitly.
///
/// Writes from concurrent tasks are serialized by an internal async lock, so
/// the store can be shared freely (e.g. in an `Arc`). Reads take no lock.
pub struct DocumentStore {
    path: PathBuf,
    backup_path: PathBuf,
    max_diff_entries: usize,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open a store at `path` with the default diff cap.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::builder().path(path).build()
    }

    /// Open a store at the path named by the `JSON_LEDGER_FILE` environment
    /// variable, falling back to `ledger.json` in the working directory.
    pub fn from_env() -> Self {
        Self::builder().build()
    }

    /// Start configuring a store. Call [`.build()`](DocumentStoreBuilder::build)
    /// when ready.
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::new()
    }

    // ---- reads ----

    /// Loads the current document from disk.
    ///
    /// Never fails: a file that is missing or unreadable, holds invalid JSON,
    /// or holds something other than an object at the top level reads as the
    /// empty document after an error-level log line. An empty file is simply
    /// an empty document.
    pub async fn read(&self) -> Document {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("failed to read {}: {}", self.path.display(), e);
                return Document::new();
            }
        };
        if bytes.is_empty() {
            return Document::new();
        }
        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("invalid JSON in {}: {}", self.path.display(), e);
                return Document::new();
            }
        };
        match value {
            Value::Object(doc) => doc,
            other => {
                tracing::error!(
                    "{} holds {} at the top level, expected an object",
                    self.path.display(),
                    value_kind(&other)
                );
                Document::new()
            }
        }
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the previous document version is copied to before each overwrite.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Cap on changed keys retained by [`diff`](Self::diff) and the change
    /// log lines.
    #[must_use]
    pub fn max_diff_entries(&self) -> usize {
        self.max_diff_entries
    }

    /// Compares two documents using this store's entry cap. See
    /// [`Diff::between`].
    #[must_use]
    pub fn diff(&self, before: &Document, after: &Document) -> Diff {
        Diff::between(before, after, self.max_diff_entries)
    }

    // ---- writes ----

    /// Validates and persists `data` as the new document, backing up the
    /// previous version first.
    ///
    /// `data` must be a JSON object at the top level; anything else is
    /// rejected with [`Error::NotAnObject`] before any disk I/O, leaving both
    /// the document and the backup untouched. The optional `actor` and
    /// `reason` only annotate the success log line.
    ///
    /// Under the write lock: the current file is copied to
    /// [`backup_path`](Self::backup_path) (skipped on the very first write),
    /// then the new bytes land via a temp file renamed into place.
    pub async fn write(
        &self,
        data: &Value,
        actor: Option<&str>,
        reason: Option<&str>,
    ) -> Result<()> {
        if !data.is_object() {
            let kind = value_kind(data);
            tracing::error!(
                "rejected write to {}: payload is {}, not an object",
                self.path.display(),
                kind
            );
            return Err(Error::NotAnObject { kind });
        }

        let result = self.persist(data).await;
        match &result {
            Ok(()) => {
                tracing::info!("{} updated{}", self.path.display(), annotate(actor, reason));
            }
            Err(e) => tracing::error!("failed to update {}: {}", self.path.display(), e),
        }
        result
    }

    /// Reads the document, passes a copy through `transform`, logs what
    /// changed, and persists the result.
    ///
    /// Returning `None` from `transform` keeps the document as it was; the
    /// unchanged document is still written back, and the log notes that
    /// nothing effectively changed. The returned [`Diff`] is the one that was
    /// logged.
    ///
    /// Heads up: the read happens before the write lock is taken, so two
    /// concurrent updates can both start from the same snapshot and the last
    /// one to persist wins. Fine for single-writer setups.
    pub async fn update<F>(
        &self,
        transform: F,
        actor: Option<&str>,
        reason: Option<&str>,
    ) -> Result<Diff>
    where
        F: FnOnce(Document) -> Option<Document>,
    {
        let before = self.read().await;
        let after = match transform(before.clone()) {
            Some(doc) => doc,
            None => before.clone(),
        };

        let diff = Diff::between(&before, &after, self.max_diff_entries);
        if diff.is_empty() {
            tracing::info!("{} saw no effective change", self.path.display());
        } else {
            tracing::info!("{} changed: {}", self.path.display(), diff);
        }

        self.write(&Value::Object(after), actor, reason).await?;
        Ok(diff)
    }

    // ---- recovery ----

    /// Replaces the document with its backup by renaming the backup file over
    /// it. The backup is consumed; copy it aside first if you want to keep
    /// it. `actor` and `reason` annotate the log line like in
    /// [`write`](Self::write).
    ///
    /// Never runs automatically. Fails with [`Error::NoBackup`] when no
    /// backup exists.
    pub async fn restore(&self, actor: Option<&str>, reason: Option<&str>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::rename(&self.backup_path, &self.path).await {
            Ok(()) => {
                tracing::info!(
                    "restored {} from {}{}",
                    self.path.display(),
                    self.backup_path.display(),
                    annotate(actor, reason)
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NoBackup {
                path: self.backup_path.clone(),
            }),
            Err(e) => Err(Error::Restore {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    // ---- internal ----

    async fn persist(&self, data: &Value) -> Result<()> {
        let bytes = encode_pretty(data)?;
        let _guard = self.write_lock.lock().await;
        backup_existing(&self.path, &self.backup_path).await?;
        replace_file(&self.path, &bytes).await
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("path", &self.path)
            .field("backup_path", &self.backup_path)
            .field("max_diff_entries", &self.max_diff_entries)
            .finish_non_exhaustive()
    }
}

/// Short human name for a JSON value's type, article included.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn annotate(actor: Option<&str>, reason: Option<&str>) -> String {
    let mut suffix = String::new();
    if let Some(actor) = actor {
        suffix.push_str(" by ");
        suffix.push_str(actor);
    }
    if let Some(reason) = reason {
        suffix.push_str(" for ");
        suffix.push_str(reason);
    }
    suffix
}

fn default_path() -> PathBuf {
    match std::env::var(PATH_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_PATH),
    }
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(BACKUP_SUFFIX);
    PathBuf::from(os)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`DocumentStore`].
///
/// ```rust,no_run
/// use json_ledger::DocumentStore;
///
/// let store = DocumentStore::builder()
///     .path("db.json")
///     .max_diff_entries(10)
///     .build();
/// ```
pub struct DocumentStoreBuilder {
    path: Option<PathBuf>,
    max_diff_entries: usize,
}

impl DocumentStoreBuilder {
    fn new() -> Self {
        Self {
            path: None,
            max_diff_entries: DEFAULT_MAX_DIFF_ENTRIES,
        }
    }

    /// Set the document path explicitly, skipping the environment lookup.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Cap the number of changed keys kept in diffs and change log lines
    /// (default: 5).
    pub fn max_diff_entries(mut self, max: usize) -> Self {
        self.max_diff_entries = max;
        self
    }

    /// Resolve the path and create the store.
    ///
    /// Nothing touches the disk here; the file appears on the first write.
    /// Path resolution order: explicit [`path`](Self::path), then the
    /// `JSON_LEDGER_FILE` environment variable, then `ledger.json`. An empty
    /// environment value counts as unset.
    #[must_use]
    pub fn build(self) -> DocumentStore {
        let path = self.path.unwrap_or_else(default_path);
        let backup_path = backup_path_for(&path);
        DocumentStore {
            path,
            backup_path,
            max_diff_entries: self.max_diff_entries,
            write_lock: Mutex::new(()),
        }
    }
}

impl std::fmt::Debug for DocumentStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreBuilder")
            .field("path", &self.path)
            .field("max_diff_entries", &self.max_diff_entries)
            .finish()
    }
}
