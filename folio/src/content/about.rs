//! The single "about me" document.
//!
//! There is at most one `About` record. Updates are partial patches merged
//! onto the current document (or onto an empty one on first save); the
//! merged result must pass validation as a whole.

use super::validate::{Validator, clean_lines, normalize_icon_name, trimmed};
use super::{ContentError, ContentService};
use crate::error::FieldError;
use crate::store::{Document, Record};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Pages that show about information.
pub const ABOUT_PAGES: &[&str] = &["/", "/about", "/contact"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub id: String,
    pub degree: String,
    pub institution: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub platform: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub full_name: String,
    pub profile_picture_url: String,
    pub contact_email: String,
    pub bio_paragraphs: Vec<String>,
    pub personal_values: Vec<String>,
    pub origin: Origin,
    #[serde(default)]
    pub education_history: Vec<EducationItem>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

impl Document for About {
    const COLLECTION: &'static str = "about";
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OriginPatch {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EducationInput {
    pub id: Option<String>,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub duration: String,
    pub year: Option<String>,
    pub icon_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialLinkInput {
    pub id: Option<String>,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
    pub icon_name: Option<String>,
}

/// Partial update. List fields replace the stored list wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AboutPatch {
    pub full_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub contact_email: Option<String>,
    pub bio_paragraphs: Option<Vec<String>>,
    pub personal_values: Option<Vec<String>>,
    pub origin: Option<OriginPatch>,
    pub education_history: Option<Vec<EducationInput>>,
    pub social_links: Option<Vec<SocialLinkInput>>,
}

fn item_id(id: Option<String>) -> String {
    trimmed(id).unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn icon(value: Option<String>) -> Option<String> {
    trimmed(value).map(|i| normalize_icon_name(&i))
}

impl AboutPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.profile_picture_url.is_none()
            && self.contact_email.is_none()
            && self.bio_paragraphs.is_none()
            && self.personal_values.is_none()
            && self.origin.is_none()
            && self.education_history.is_none()
            && self.social_links.is_none()
    }

    /// Merge onto `about` and validate the result.
    pub fn apply_to(self, mut about: About) -> Result<About, Vec<FieldError>> {
        if let Some(v) = self.full_name {
            about.full_name = v.trim().to_string();
        }
        if let Some(v) = self.profile_picture_url {
            about.profile_picture_url = v.trim().to_string();
        }
        if let Some(v) = self.contact_email {
            about.contact_email = v.trim().to_string();
        }
        if let Some(v) = self.bio_paragraphs {
            about.bio_paragraphs = clean_lines(v);
        }
        if let Some(v) = self.personal_values {
            about.personal_values = clean_lines(v);
        }
        if let Some(origin) = self.origin {
            if let Some(city) = origin.city {
                about.origin.city = city.trim().to_string();
            }
            if let Some(country) = origin.country {
                about.origin.country = country.trim().to_string();
            }
        }
        if let Some(items) = self.education_history {
            about.education_history = items
                .into_iter()
                .map(|item| EducationItem {
                    id: item_id(item.id),
                    degree: item.degree.trim().to_string(),
                    institution: item.institution.trim().to_string(),
                    duration: item.duration.trim().to_string(),
                    year: trimmed(item.year),
                    icon_name: icon(item.icon_name),
                })
                .collect();
        }
        if let Some(links) = self.social_links {
            about.social_links = links
                .into_iter()
                .map(|link| SocialLink {
                    id: item_id(link.id),
                    platform: link.platform.trim().to_string(),
                    url: link.url.trim().to_string(),
                    icon_name: icon(link.icon_name),
                })
                .collect();
        }

        validate(&about)?;
        Ok(about)
    }
}

fn validate(about: &About) -> Result<(), Vec<FieldError>> {
    let mut v = Validator::new();
    v.required("full_name", &about.full_name, "Full name is required.");
    v.required(
        "profile_picture_url",
        &about.profile_picture_url,
        "Profile picture URL is required.",
    );
    v.email("contact_email", &about.contact_email, "Invalid email address.");
    v.non_empty(
        "bio_paragraphs",
        &about.bio_paragraphs,
        "At least one bio paragraph is required.",
    );
    v.non_empty(
        "personal_values",
        &about.personal_values,
        "At least one personal value is required.",
    );
    v.required("origin.city", &about.origin.city, "City is required.");
    v.required("origin.country", &about.origin.country, "Country is required.");

    for (i, item) in about.education_history.iter().enumerate() {
        let field = |name: &str| format!("education_history[{i}].{name}");
        v.required(&field("degree"), &item.degree, "Degree is required.");
        v.required(&field("institution"), &item.institution, "Institution is required.");
        v.required(&field("duration"), &item.duration, "Duration is required.");
    }

    for (i, link) in about.social_links.iter().enumerate() {
        let field = |name: &str| format!("social_links[{i}].{name}");
        v.required(&field("platform"), &link.platform, "Platform is required.");
        v.http_url(&field("url"), &link.url, "URL must start with http:// or https://.");
    }

    v.finish()
}

impl ContentService {
    pub async fn get_about(&self) -> Result<Option<Record<About>>, ContentError> {
        Ok(self.about.find_all().await?.into_iter().next())
    }

    /// Merge `patch` into the about document, creating it on first save.
    pub async fn upsert_about(&self, patch: AboutPatch) -> Result<Record<About>, ContentError> {
        if patch.is_empty() {
            return Err(ContentError::NothingToUpdate);
        }

        let record = match self.get_about().await? {
            Some(existing) => {
                let merged = patch.apply_to(existing.data)?;
                self.about
                    .replace(&existing.id, merged)
                    .await?
                    .ok_or(ContentError::NotFound("About"))?
            }
            None => {
                let about = patch.apply_to(About::default())?;
                self.about.create(about).await?
            }
        };
        self.pages.invalidate(ABOUT_PAGES).await;

        info!(id = %record.id, "About information saved");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_patch() -> AboutPatch {
        AboutPatch {
            full_name: Some("Jane Doe".to_string()),
            profile_picture_url: Some("/images/jane.jpg".to_string()),
            contact_email: Some("jane@example.com".to_string()),
            bio_paragraphs: Some(vec!["Hello.".to_string()]),
            personal_values: Some(vec!["Curiosity".to_string()]),
            origin: Some(OriginPatch {
                city: Some("Lisbon".to_string()),
                country: Some("Portugal".to_string()),
            }),
            education_history: Some(vec![EducationInput {
                degree: "BSc".to_string(),
                institution: "IST".to_string(),
                duration: "2014 - 2017".to_string(),
                icon_name: Some("graduation-cap".to_string()),
                ..Default::default()
            }]),
            social_links: Some(vec![SocialLinkInput {
                id: Some("gh".to_string()),
                platform: "GitHub".to_string(),
                url: "https://github.com/jane".to_string(),
                icon_name: None,
            }]),
        }
    }

    #[test]
    fn test_apply_full_patch() {
        let about = full_patch().apply_to(About::default()).unwrap();
        assert_eq!(about.origin.city, "Lisbon");
        assert_eq!(about.education_history[0].icon_name.as_deref(), Some("GraduationCap"));
        assert!(!about.education_history[0].id.is_empty());
        assert_eq!(about.social_links[0].id, "gh");
    }

    #[test]
    fn test_partial_patch_on_empty_document_fails() {
        let errors = AboutPatch {
            full_name: Some("Jane".to_string()),
            ..Default::default()
        }
        .apply_to(About::default())
        .unwrap_err();

        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"contact_email"));
        assert!(fields.contains(&"origin.city"));
        assert!(!fields.contains(&"full_name"));
    }

    #[test]
    fn test_nested_errors_name_the_item() {
        let mut patch = full_patch();
        patch.social_links = Some(vec![SocialLinkInput {
            platform: "Blog".to_string(),
            url: "example.com".to_string(),
            ..Default::default()
        }]);

        let errors = patch.apply_to(About::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "social_links[0].url");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let (_temp, content) = crate::content::test_support::service().await;
        assert!(content.get_about().await.unwrap().is_none());

        let created = content.upsert_about(full_patch()).await.unwrap();
        let updated = content
            .upsert_about(AboutPatch {
                full_name: Some("Jane Q. Doe".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.data.full_name, "Jane Q. Doe");
        assert_eq!(updated.data.origin.country, "Portugal");
        assert_eq!(content.about.count().await.unwrap(), 1);
    }
}
