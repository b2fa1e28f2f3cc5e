use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::models::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    BugMedia,
    BugCode,
    FixMedia,
    FixCode,
}

impl Bucket {
    pub fn dir(&self) -> &'static str {
        match self {
            Bucket::BugMedia => "bug_media",
            Bucket::BugCode => "bug_code",
            Bucket::FixMedia => "fix_evidence/media",
            Bucket::FixCode => "fix_evidence/code",
        }
    }
}

/// Writes uploaded payloads below a media root and hands back the
/// `bucket/filename` reference that the data model stores.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self, bucket: Bucket, file: &UploadedFile) -> io::Result<String> {
        let dir = self.root.join(bucket.dir());
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(&file.file_name));
        tokio::fs::write(dir.join(&name), &file.data).await?;
        Ok(format!("{}/{}", bucket.dir(), name))
    }

    pub async fn save_all(&self, bucket: Bucket, files: &[UploadedFile]) -> io::Result<Vec<String>> {
        let mut saved = Vec::with_capacity(files.len());
        for file in files {
            match self.save(bucket, file).await {
                Ok(reference) => saved.push(reference),
                Err(e) => {
                    self.remove_all(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    /// Best effort; used to roll back files whose database rows were never written.
    pub async fn remove_all(&self, references: &[String]) {
        for reference in references {
            if let Err(e) = tokio::fs::remove_file(self.root.join(reference)).await {
                log::warn!("failed to remove orphaned upload {}: {}", reference, e);
            }
        }
    }
}

/// Keeps the last path component and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
