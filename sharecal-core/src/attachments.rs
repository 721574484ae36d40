//! Blob storage for event attachments.
//!
//! Files live under `<data_dir>/attachments/<uuid>/<filename>`. The relative
//! part is what an [`Attachment`] records as its `path`; the public URL is
//! recomputed from it on every read.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::{SharecalError, SharecalResult};
use crate::event::Attachment;

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    public_base_url: String,
}

impl AttachmentStore {
    pub fn new(root: PathBuf, public_base_url: &str) -> Self {
        AttachmentStore {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` under a fresh directory and describe the result.
    pub fn upload(&self, filename: &str, bytes: &[u8]) -> SharecalResult<Attachment> {
        let filename = sanitize_filename(filename);
        let path = format!("{}/{}", Uuid::new_v4(), filename);
        let target = self.blob_path(&path)?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;

        tracing::info!(path = %path, size = bytes.len(), "Stored attachment");

        let mut attachment = Attachment::new(path, filename);
        self.resolve(&mut attachment);
        Ok(attachment)
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    /// Fill in the derived public URL.
    pub fn resolve(&self, attachment: &mut Attachment) {
        attachment.public_url = Some(self.public_url(&attachment.path));
    }

    pub fn read(&self, path: &str) -> SharecalResult<Vec<u8>> {
        let target = self.blob_path(path)?;
        std::fs::read(&target).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                SharecalError::Attachment(format!("No attachment at '{}'", path))
            }
            _ => SharecalError::Io(e),
        })
    }

    /// Remove a stored blob and its now-empty directory.
    pub fn remove(&self, path: &str) -> SharecalResult<()> {
        let target = self.blob_path(path)?;
        if target.exists() {
            std::fs::remove_file(&target)?;
        }
        if let Some(parent) = target.parent() {
            let is_empty =
                std::fs::read_dir(parent).is_ok_and(|mut entries| entries.next().is_none());
            if parent != self.root && is_empty {
                std::fs::remove_dir(parent)?;
            }
        }
        Ok(())
    }

    /// Resolve a relative blob path, refusing anything that escapes the root.
    fn blob_path(&self, path: &str) -> SharecalResult<PathBuf> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(SharecalError::Attachment(format!(
                "Invalid attachment path '{}'",
                path
            )));
        }

        Ok(self.root.join(relative))
    }
}

/// Keep only the final path segment and characters that are safe in both file
/// names and URLs.
fn sanitize_filename(filename: &str) -> String {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> AttachmentStore {
        AttachmentStore::new(dir.to_path_buf(), "https://files.example.com/attachments/")
    }

    #[test]
    fn test_upload_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let attachment = store.upload("floor plan.pdf", b"%PDF-1.4").unwrap();

        assert_eq!(attachment.filename, "floor_plan.pdf");
        assert!(attachment.path.ends_with("/floor_plan.pdf"));
        assert_eq!(
            attachment.public_url.as_deref(),
            Some(format!("https://files.example.com/attachments/{}", attachment.path).as_str())
        );
        assert_eq!(store.read(&attachment.path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_resolve_recomputes_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let mut attachment = Attachment::new("abc/flyer.png", "flyer.png");
        attachment.public_url = Some("http://stale/flyer.png".into());
        store.resolve(&mut attachment);

        assert_eq!(
            attachment.public_url.as_deref(),
            Some("https://files.example.com/attachments/abc/flyer.png")
        );
    }

    #[test]
    fn test_paths_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for path in ["../secret", "/etc/passwd", "a/../../b", ""] {
            assert!(
                matches!(store.read(path), Err(SharecalError::Attachment(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_remove_cleans_up_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let attachment = store.upload("notes.txt", b"hello").unwrap();
        let blob_dir = dir.path().join(attachment.path.split('/').next().unwrap());
        assert!(blob_dir.exists());

        store.remove(&attachment.path).unwrap();

        assert!(!blob_dir.exists());
        assert!(matches!(store.read(&attachment.path), Err(SharecalError::Attachment(_))));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\report (final).docx"), "report__final_.docx");
        assert_eq!(sanitize_filename(".."), "attachment");
        assert_eq!(sanitize_filename("résumé.pdf"), "r_sum_.pdf");
    }
}
