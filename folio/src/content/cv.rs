//! Uploaded CV (PDF). Only the latest upload is kept.

use super::{ContentError, ContentService};
use crate::store::{Document, Record};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Pages that link the CV.
pub const CV_PAGES: &[&str] = &["/"];

pub const CV_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvInfo {
    /// Name on disk, `<unix millis>-<sanitized original name>`
    pub file_name: String,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Document for CvInfo {
    const COLLECTION: &'static str = "cv";
}

/// A file received from the upload form.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Keep ASCII letters, digits, `.` and `-`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
        .collect()
}

fn is_pdf_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

async fn remove_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove CV file"),
    }
}

impl ContentService {
    fn cv_path(&self, info: &CvInfo) -> PathBuf {
        self.cv_dir.join(&info.file_name)
    }

    /// The most recent upload, if any.
    pub async fn current_cv(&self) -> Result<Option<Record<CvInfo>>, ContentError> {
        let cvs = self.cvs.find_all().await?;
        Ok(cvs.into_iter().max_by_key(|r| r.data.uploaded_at))
    }

    /// Current CV together with its file contents.
    pub async fn read_current_cv(&self) -> Result<Option<(Record<CvInfo>, Vec<u8>)>, ContentError> {
        let Some(record) = self.current_cv().await? else {
            return Ok(None);
        };

        let path = self.cv_path(&record.data);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some((record, bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(id = %record.id, path = %path.display(), "CV record has no file");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read CV file {}", path.display()))
                .into()),
        }
    }

    /// Store a new CV and drop older ones.
    pub async fn upload_cv(&self, upload: CvUpload) -> Result<Record<CvInfo>, ContentError> {
        let original_name = upload.original_name.trim().to_string();
        if original_name.is_empty() || upload.bytes.is_empty() {
            return Err(ContentError::InvalidUpload("No file provided".to_string()));
        }
        if !is_pdf_name(&original_name) {
            return Err(ContentError::InvalidUpload(
                "Only PDF files are allowed".to_string(),
            ));
        }

        let now = Utc::now();
        let info = CvInfo {
            file_name: format!(
                "{}-{}",
                now.timestamp_millis(),
                sanitize_file_name(&original_name)
            ),
            original_name,
            file_size: upload.bytes.len() as u64,
            mime_type: upload
                .content_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| CV_MIME_TYPE.to_string()),
            uploaded_at: now,
        };

        tokio::fs::create_dir_all(&self.cv_dir)
            .await
            .with_context(|| format!("Failed to create CV directory {}", self.cv_dir.display()))?;

        let path = self.cv_path(&info);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("Failed to write CV file {}", path.display()))?;

        let record = match self.cvs.create(info).await {
            Ok(record) => record,
            Err(e) => {
                remove_file(&path).await;
                return Err(e.into());
            }
        };

        self.prune_cvs().await?;
        self.pages.invalidate(CV_PAGES).await;

        info!(
            id = %record.id,
            file = %record.data.file_name,
            size = record.data.file_size,
            "CV uploaded"
        );
        Ok(record)
    }

    /// Remove every CV except the current one.
    ///
    /// Overlapping uploads all keep the same newest record, so at least one
    /// CV survives however their prunes interleave.
    async fn prune_cvs(&self) -> Result<(), ContentError> {
        let Some(keep) = self.current_cv().await? else {
            return Ok(());
        };

        for old in self.cvs.find_all().await? {
            if old.id == keep.id {
                continue;
            }
            self.cvs.delete(&old.id).await?;
            // Same-millisecond re-upload of the same name shares the file
            if old.data.file_name != keep.data.file_name {
                remove_file(&self.cv_path(&old.data)).await;
            }
            info!(id = %old.id, file = %old.data.file_name, "Old CV removed");
        }
        Ok(())
    }

    pub async fn delete_cv(&self, id: &str) -> Result<(), ContentError> {
        let record = self
            .cvs
            .find_by_id(id)
            .await?
            .ok_or(ContentError::NotFound("CV"))?;

        self.cvs.delete(id).await?;
        remove_file(&self.cv_path(&record.data)).await;
        self.pages.invalidate(CV_PAGES).await;

        info!(id, "CV deleted");
        Ok(())
    }
}
