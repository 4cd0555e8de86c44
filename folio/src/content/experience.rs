//! Work experience entries.

use super::validate::{Validator, clean_lines, trimmed};
use super::{ContentError, ContentService};
use crate::error::FieldError;
use crate::store::{Document, Record};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Pages that list experience.
pub const EXPERIENCE_PAGES: &[&str] = &["/", "/experience"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company_name: String,
    pub role: String,
    /// Free text, e.g. "2021 - Present"
    pub duration: String,
    /// One entry per bullet point
    pub description: Vec<String>,
}

impl Document for Experience {
    const COLLECTION: &'static str = "experience";
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperienceInput {
    pub company_name: Option<String>,
    pub role: Option<String>,
    pub duration: Option<String>,
    pub description: Option<Vec<String>>,
}

impl ExperienceInput {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.role.is_none()
            && self.duration.is_none()
            && self.description.is_none()
    }

    pub fn into_experience(self) -> Result<Experience, Vec<FieldError>> {
        let experience = Experience {
            company_name: trimmed(self.company_name).unwrap_or_default(),
            role: trimmed(self.role).unwrap_or_default(),
            duration: trimmed(self.duration).unwrap_or_default(),
            description: clean_lines(self.description.unwrap_or_default()),
        };
        validate(&experience)?;
        Ok(experience)
    }

    pub fn apply_to(self, mut experience: Experience) -> Result<Experience, Vec<FieldError>> {
        if let Some(company_name) = self.company_name {
            experience.company_name = company_name.trim().to_string();
        }
        if let Some(role) = self.role {
            experience.role = role.trim().to_string();
        }
        if let Some(duration) = self.duration {
            experience.duration = duration.trim().to_string();
        }
        if let Some(description) = self.description {
            experience.description = clean_lines(description);
        }

        validate(&experience)?;
        Ok(experience)
    }
}

fn validate(experience: &Experience) -> Result<(), Vec<FieldError>> {
    let mut v = Validator::new();
    v.required("company_name", &experience.company_name, "Company name is required.");
    v.required("role", &experience.role, "Role is required.");
    v.required("duration", &experience.duration, "Duration is required.");
    v.non_empty(
        "description",
        &experience.description,
        "At least one description line is required.",
    );
    v.finish()
}

impl ContentService {
    /// All entries in creation order.
    pub async fn list_experience(&self) -> Result<Vec<Record<Experience>>, ContentError> {
        Ok(self.experience.find_all().await?)
    }

    /// Newest entries first.
    pub async fn recent_experience(
        &self,
        limit: usize,
    ) -> Result<Vec<Record<Experience>>, ContentError> {
        let mut entries = self.experience.find_all().await?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn get_experience(&self, id: &str) -> Result<Record<Experience>, ContentError> {
        self.experience
            .find_by_id(id)
            .await?
            .ok_or(ContentError::NotFound("Experience"))
    }

    pub async fn count_experience(&self) -> Result<u64, ContentError> {
        Ok(self.experience.count().await?)
    }

    pub async fn create_experience(
        &self,
        input: ExperienceInput,
    ) -> Result<Record<Experience>, ContentError> {
        let experience = input.into_experience()?;
        let record = self.experience.create(experience).await?;
        self.pages.invalidate(EXPERIENCE_PAGES).await;

        info!(id = %record.id, company = %record.data.company_name, "Experience created");
        Ok(record)
    }

    pub async fn update_experience(
        &self,
        id: &str,
        input: ExperienceInput,
    ) -> Result<Record<Experience>, ContentError> {
        if input.is_empty() {
            return Err(ContentError::NothingToUpdate);
        }

        let existing = self.get_experience(id).await?;
        let updated = input.apply_to(existing.data)?;
        let record = self
            .experience
            .replace(id, updated)
            .await?
            .ok_or(ContentError::NotFound("Experience"))?;
        self.pages.invalidate(EXPERIENCE_PAGES).await;

        info!(id, "Experience updated");
        Ok(record)
    }

    pub async fn delete_experience(&self, id: &str) -> Result<(), ContentError> {
        if !self.experience.delete(id).await? {
            return Err(ContentError::NotFound("Experience"));
        }
        self.pages.invalidate(EXPERIENCE_PAGES).await;

        info!(id, "Experience deleted");
        Ok(())
    }
}
