//! Upload store
//!
//! Temporary storage for uploaded decks awaiting processing. Each upload
//! lives in its own token-named directory under the working directory.
//! Processing claims the upload; the claim handle removes the directory
//! when dropped, so the stored file is gone on every exit path. A periodic
//! sweep removes uploads that were never processed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Metadata for one stored upload.
#[derive(Debug, Clone)]
pub struct UploadEntry {
    pub id: Uuid,
    pub file_name: String,
    pub path: PathBuf,
    pub page_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UploadStore {
    inner: Arc<UploadStoreInner>,
}

struct UploadStoreInner {
    root: PathBuf,
    ttl: Duration,
    entries: RwLock<HashMap<Uuid, UploadEntry>>,
}

impl UploadStore {
    /// Create the store, ensuring the working directory exists. Token-named
    /// directories left behind by a previous run are unclaimable, so they
    /// are removed here.
    pub fn new(root: PathBuf, ttl_minutes: i64) -> std::io::Result<Self> {
        std::fs::create_dir_all(&root)?;
        remove_orphaned_uploads(&root)?;
        Ok(Self {
            inner: Arc::new(UploadStoreInner {
                root,
                ttl: Duration::minutes(ttl_minutes),
                entries: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// Persist an upload under a fresh token and record it.
    pub async fn save(
        &self,
        file_name: &str,
        page_count: usize,
        data: &[u8],
    ) -> std::io::Result<UploadEntry> {
        let id = Uuid::new_v4();
        let dir = self.inner.root.join(id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, data).await?;

        let entry = UploadEntry {
            id,
            file_name: file_name.to_string(),
            path,
            page_count,
            created_at: Utc::now(),
        };
        self.inner.entries.write().await.insert(id, entry.clone());

        tracing::debug!(upload_id = %id, file = %entry.file_name, "stored upload");
        Ok(entry)
    }

    /// Take exclusive ownership of a stored upload. The entry is removed
    /// from the store, so a second claim of the same token misses.
    pub async fn claim(&self, id: &Uuid) -> Option<ClaimedUpload> {
        let entry = self.inner.entries.write().await.remove(id)?;
        Some(ClaimedUpload {
            dir: self.inner.root.join(id.to_string()),
            entry,
        })
    }

    /// Remove uploads older than the TTL. Returns how many were swept.
    pub async fn prune_expired(&self) -> usize {
        let cutoff = Utc::now() - self.inner.ttl;

        let expired: Vec<UploadEntry> = {
            let mut entries = self.inner.entries.write().await;
            let ids: Vec<Uuid> = entries
                .values()
                .filter(|e| e.created_at < cutoff)
                .map(|e| e.id)
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };

        let count = expired.len();
        for entry in expired {
            let dir = self.inner.root.join(entry.id.to_string());
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                tracing::warn!(upload_id = %entry.id, "failed to remove expired upload: {}", e);
            }
        }

        if count > 0 {
            tracing::info!(count = count, "swept expired uploads");
        }
        count
    }

    /// Number of uploads currently awaiting processing.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }
}

/// Exclusive handle to one stored upload. Removal of the backing directory
/// is tied to this handle's lifetime, like a named temporary directory, so
/// success, validation failure, and processing faults all clean up.
pub struct ClaimedUpload {
    entry: UploadEntry,
    dir: PathBuf,
}

impl ClaimedUpload {
    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    pub fn file_name(&self) -> &str {
        &self.entry.file_name
    }

    pub fn page_count(&self) -> usize {
        self.entry.page_count
    }
}

impl Drop for ClaimedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.dir.display(),
                    "failed to remove claimed upload: {}", e
                );
            }
        }
    }
}

/// Delete token-named subdirectories of `root`. Anything else in the
/// directory is left alone.
fn remove_orphaned_uploads(root: &Path) -> std::io::Result<()> {
    for dir_entry in std::fs::read_dir(root)? {
        let dir_entry = dir_entry?;
        let is_upload_dir = dir_entry.file_type()?.is_dir()
            && dir_entry
                .file_name()
                .to_str()
                .map(|name| Uuid::parse_str(name).is_ok())
                .unwrap_or(false);
        if is_upload_dir {
            tracing::debug!(path = %dir_entry.path().display(), "removing orphaned upload");
            std::fs::remove_dir_all(dir_entry.path())?;
        }
    }
    Ok(())
}

/// Sanitize a client-supplied filename: keep only the final path component,
/// map everything outside `[A-Za-z0-9._-]` to `_`, and trim leading and
/// trailing dots and underscores. Falls back to "upload.pdf" if nothing
/// survives.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mapped: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = mapped.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        "upload.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}
