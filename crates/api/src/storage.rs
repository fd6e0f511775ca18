//! Local file storage for uploaded videos and appeal evidence.
//!
//! Files are written under `UPLOAD_DIR`; evidence lives in the `evidence/`
//! subdirectory. Only references are stored in the database.

use std::path::{Path, PathBuf};

use seekreap_core::submission::{generate_storage_key, UploadedFile};

/// Subdirectory of the upload root holding evidence files.
pub const EVIDENCE_DIR: &str = "evidence";

/// Writes uploads below a fixed root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Assign a storage key and target path to a received video.
    ///
    /// Nothing is written; call [`Self::write`] once the submission has been
    /// accepted.
    pub fn plan_video(
        &self,
        original_name: &str,
        content_type: Option<String>,
        size_bytes: u64,
    ) -> UploadedFile {
        let storage_key = generate_storage_key(original_name);
        let file_path = self.root.join(&storage_key).to_string_lossy().to_string();
        UploadedFile {
            storage_key,
            original_name: original_name.to_string(),
            content_type,
            size_bytes,
            file_path,
        }
    }

    /// Write `data` to `path`, creating parent directories as needed.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await
    }

    /// Best-effort removal of a file written for a request that then failed.
    pub async fn discard(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
        }
    }

    /// Store an evidence file and return its reference, `evidence/<key>`.
    pub async fn store_evidence(&self, original_name: &str, data: &[u8]) -> std::io::Result<String> {
        let key = generate_storage_key(original_name);
        let file_ref = format!("{EVIDENCE_DIR}/{key}");
        self.write(self.root.join(EVIDENCE_DIR).join(&key), data).await?;
        Ok(file_ref)
    }

    /// Absolute location of a stored reference.
    pub fn resolve(&self, file_ref: &str) -> PathBuf {
        self.root.join(file_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn planned_video_is_written_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let upload = store.plan_video("My Clip.mp4", Some("video/mp4".into()), 3);
        assert!(upload.storage_key.ends_with("-My_Clip.mp4"));
        assert!(upload.file_path.starts_with(&*dir.path().to_string_lossy()));

        store.write(&upload.file_path, b"abc").await.unwrap();
        assert_eq!(tokio::fs::read(&upload.file_path).await.unwrap(), b"abc");

        store.discard(&upload.file_path).await;
        assert!(!Path::new(&upload.file_path).exists());
    }

    #[tokio::test]
    async fn evidence_goes_into_its_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let file_ref = store.store_evidence("../../etc/passwd", b"x").await.unwrap();
        assert!(file_ref.starts_with("evidence/"));
        assert!(file_ref.ends_with("-passwd"));
        assert!(store.resolve(&file_ref).exists());
    }
}
