//! Portfolio content: skills, experience, about, contact messages and CV.
//!
//! [`ContentService`] owns one typed collection per entity and the page
//! cache. Every mutation validates its input first and invalidates the
//! public pages that show the changed entity.

pub mod about;
pub mod cv;
pub mod experience;
pub mod messages;
pub mod skills;
pub mod validate;

use crate::cache::PageCache;
use crate::db::DbPool;
use crate::error::{ApiError, FieldError};
use crate::store::Collection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub use about::{About, AboutPatch, EducationItem, Origin, SocialLink};
pub use cv::{CvInfo, CvUpload};
pub use experience::{Experience, ExperienceInput};
pub use messages::{ContactMessage, ContactMessageInput, MessageFilter};
pub use skills::{Proficiency, Skill, SkillCategory, SkillFilter, SkillInput};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("No data provided to update")]
    NothingToUpdate,

    #[error("{0}")]
    InvalidUpload(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<Vec<FieldError>> for ContentError {
    fn from(errors: Vec<FieldError>) -> Self {
        ContentError::Validation(errors)
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Validation(errors) => ApiError::Validation {
                message: "Validation failed".to_string(),
                errors,
            },
            ContentError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            ContentError::NothingToUpdate => {
                ApiError::BadRequest("No data provided to update".to_string())
            }
            ContentError::InvalidUpload(message) => ApiError::BadRequest(message),
            ContentError::Storage(e) => ApiError::Internal(e),
        }
    }
}

/// Entry point for every content read and write.
pub struct ContentService {
    skills: Collection<Skill>,
    experience: Collection<Experience>,
    about: Collection<About>,
    messages: Collection<ContactMessage>,
    cvs: Collection<CvInfo>,
    pages: Arc<PageCache>,
    cv_dir: PathBuf,
}

impl ContentService {
    pub fn new(pool: DbPool, pages: Arc<PageCache>, cv_dir: PathBuf) -> Self {
        Self {
            skills: Collection::new(pool.clone()),
            experience: Collection::new(pool.clone()),
            about: Collection::new(pool.clone()),
            messages: Collection::new(pool.clone()),
            cvs: Collection::new(pool),
            pages,
            cv_dir,
        }
    }

    pub fn pages(&self) -> &PageCache {
        &self.pages
    }

    pub fn cv_dir(&self) -> &Path {
        &self.cv_dir
    }
}

#[cfg(all(test, feature = "sqlite"))]
pub(crate) mod test_support {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::Database;
    use tempfile::TempDir;

    /// Content service over a fresh database in a temp dir.
    pub async fn service() -> (TempDir, ContentService) {
        let temp = TempDir::new().unwrap();
        let db = Database::new(&DatabaseConfig::default(), temp.path())
            .await
            .unwrap();
        let content = ContentService::new(
            db.pool(),
            Arc::new(PageCache::new(None)),
            temp.path().join("cv"),
        );
        (temp, content)
    }
}
