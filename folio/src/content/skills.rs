//! Skills shown on the home and skills pages.

use super::validate::{Validator, normalize_icon_name, trimmed};
use super::{ContentError, ContentService};
use crate::error::FieldError;
use crate::store::{Document, Record};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Pages that list skills.
pub const SKILL_PAGES: &[&str] = &["/", "/skills"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "Web Developer")]
    WebDeveloper,
    #[serde(rename = "Engineer")]
    Engineer,
    #[serde(rename = "Creative Professional")]
    CreativeProfessional,
    #[serde(rename = "Business & Management")]
    BusinessManagement,
    #[serde(rename = "Other Professional Skills")]
    OtherProfessional,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::WebDeveloper,
        SkillCategory::Engineer,
        SkillCategory::CreativeProfessional,
        SkillCategory::BusinessManagement,
        SkillCategory::OtherProfessional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkillCategory::WebDeveloper => "Web Developer",
            SkillCategory::Engineer => "Engineer",
            SkillCategory::CreativeProfessional => "Creative Professional",
            SkillCategory::BusinessManagement => "Business & Management",
            SkillCategory::OtherProfessional => "Other Professional Skills",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Beginner" => Some(Proficiency::Beginner),
            "Intermediate" => Some(Proficiency::Intermediate),
            "Advanced" => Some(Proficiency::Advanced),
            "Expert" => Some(Proficiency::Expert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: SkillCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiency_level: Option<Proficiency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
}

impl Document for Skill {
    const COLLECTION: &'static str = "skills";
}

/// Create or update body. Every field is optional so that updates can be
/// partial; creation requires `name` and `category`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency_level: Option<String>,
    pub icon_name: Option<String>,
}

const CATEGORY_MESSAGE: &str = "Category must be one of: Web Developer, Engineer, \
     Creative Professional, Business & Management, Other Professional Skills.";
const PROFICIENCY_MESSAGE: &str =
    "Proficiency level must be one of: Beginner, Intermediate, Advanced, Expert.";

impl SkillInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.proficiency_level.is_none()
            && self.icon_name.is_none()
    }

    /// Build a new skill, reporting every invalid field.
    pub fn into_skill(self) -> Result<Skill, Vec<FieldError>> {
        let mut v = Validator::new();

        let name = trimmed(self.name);
        if name.is_none() {
            v.push("name", "Skill name is required.");
        }

        let category = match trimmed(self.category) {
            None => {
                v.push("category", "Category is required.");
                None
            }
            Some(label) => {
                let category = SkillCategory::from_label(&label);
                if category.is_none() {
                    v.push("category", CATEGORY_MESSAGE);
                }
                category
            }
        };

        let proficiency_level = parse_proficiency(self.proficiency_level, &mut v);

        // Every `None` above has pushed its own error
        let (Some(name), Some(category)) = (name, category) else {
            return Err(v.into_errors());
        };
        v.finish()?;

        Ok(Skill {
            name,
            category,
            proficiency_level,
            icon_name: trimmed(self.icon_name).map(|i| normalize_icon_name(&i)),
        })
    }

    /// Apply the provided fields to `skill`. Blank `proficiency_level` or
    /// `icon_name` clears them.
    pub fn apply_to(self, mut skill: Skill) -> Result<Skill, Vec<FieldError>> {
        let mut v = Validator::new();

        if let Some(name) = self.name {
            v.required("name", &name, "Skill name cannot be empty.");
            skill.name = name.trim().to_string();
        }

        if let Some(label) = self.category {
            match SkillCategory::from_label(&label) {
                Some(category) => skill.category = category,
                None => v.push("category", CATEGORY_MESSAGE),
            }
        }

        if self.proficiency_level.is_some() {
            skill.proficiency_level = parse_proficiency(self.proficiency_level, &mut v);
        }

        if let Some(icon) = self.icon_name {
            skill.icon_name = trimmed(Some(icon)).map(|i| normalize_icon_name(&i));
        }

        v.finish()?;
        Ok(skill)
    }
}

fn parse_proficiency(value: Option<String>, v: &mut Validator) -> Option<Proficiency> {
    let label = trimmed(value)?;
    let level = Proficiency::from_label(&label);
    if level.is_none() {
        v.push("proficiency_level", PROFICIENCY_MESSAGE);
    }
    level
}

/// Query parameters for listing skills.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

impl SkillFilter {
    fn matches(&self, skill: &Skill) -> bool {
        if let Some(category) = self.category.as_deref()
            && skill.category.label() != category
        {
            return false;
        }

        if let Some(search) = self.search.as_deref()
            && !skill.name.to_lowercase().contains(&search.to_lowercase())
        {
            return false;
        }

        true
    }
}

impl ContentService {
    pub async fn list_skills(&self, filter: &SkillFilter) -> Result<Vec<Record<Skill>>, ContentError> {
        let skills = self.skills.find_all().await?;
        Ok(skills.into_iter().filter(|s| filter.matches(&s.data)).collect())
    }

    pub async fn get_skill(&self, id: &str) -> Result<Record<Skill>, ContentError> {
        self.skills
            .find_by_id(id)
            .await?
            .ok_or(ContentError::NotFound("Skill"))
    }

    pub async fn count_skills(&self) -> Result<u64, ContentError> {
        Ok(self.skills.count().await?)
    }

    pub async fn create_skill(&self, input: SkillInput) -> Result<Record<Skill>, ContentError> {
        let skill = input.into_skill()?;
        let record = self.skills.create(skill).await?;
        self.pages.invalidate(SKILL_PAGES).await;

        info!(id = %record.id, name = %record.data.name, "Skill created");
        Ok(record)
    }

    pub async fn update_skill(
        &self,
        id: &str,
        input: SkillInput,
    ) -> Result<Record<Skill>, ContentError> {
        if input.is_empty() {
            return Err(ContentError::NothingToUpdate);
        }

        let existing = self.get_skill(id).await?;
        let updated = input.apply_to(existing.data)?;
        let record = self
            .skills
            .replace(id, updated)
            .await?
            .ok_or(ContentError::NotFound("Skill"))?;
        self.pages.invalidate(SKILL_PAGES).await;

        info!(id, "Skill updated");
        Ok(record)
    }

    pub async fn delete_skill(&self, id: &str) -> Result<(), ContentError> {
        if !self.skills.delete(id).await? {
            return Err(ContentError::NotFound("Skill"));
        }
        self.pages.invalidate(SKILL_PAGES).await;

        info!(id, "Skill deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, category: &str) -> SkillInput {
        SkillInput {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_into_skill() {
        let skill = SkillInput {
            proficiency_level: Some("Expert".to_string()),
            icon_name: Some("code-xml".to_string()),
            ..input(" Rust ", "Engineer")
        }
        .into_skill()
        .unwrap();

        assert_eq!(skill.name, "Rust");
        assert_eq!(skill.category, SkillCategory::Engineer);
        assert_eq!(skill.proficiency_level, Some(Proficiency::Expert));
        assert_eq!(skill.icon_name.as_deref(), Some("CodeXml"));
    }

    #[test]
    fn test_into_skill_reports_each_field() {
        let errors = SkillInput {
            proficiency_level: Some("Guru".to_string()),
            ..input("", "Wizard")
        }
        .into_skill()
        .unwrap_err();

        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "category", "proficiency_level"]);
    }

    #[test]
    fn test_into_skill_missing_category_only() {
        let errors = SkillInput {
            name: Some("Rust".to_string()),
            ..Default::default()
        }
        .into_skill()
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "category");
        assert_eq!(errors[0].message, "Category is required.");
    }

    #[test]
    fn test_category_labels_round_trip_through_serde() {
        for category in SkillCategory::ALL {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.label());
            assert_eq!(SkillCategory::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn test_apply_partial_update() {
        let skill = input("Rust", "Engineer").into_skill().unwrap();
        let patch = SkillInput {
            proficiency_level: Some("Advanced".to_string()),
            ..Default::default()
        };

        let updated = patch.apply_to(skill).unwrap();
        assert_eq!(updated.name, "Rust");
        assert_eq!(updated.proficiency_level, Some(Proficiency::Advanced));

        let cleared = SkillInput {
            proficiency_level: Some(String::new()),
            ..Default::default()
        }
        .apply_to(updated)
        .unwrap();
        assert_eq!(cleared.proficiency_level, None);
    }

    #[test]
    fn test_filter() {
        let rust = input("Rust", "Engineer").into_skill().unwrap();
        let figma = input("Figma", "Creative Professional").into_skill().unwrap();

        let by_category = SkillFilter {
            category: Some("Engineer".to_string()),
            ..Default::default()
        };
        assert!(by_category.matches(&rust));
        assert!(!by_category.matches(&figma));

        let by_search = SkillFilter {
            search: Some("FIG".to_string()),
            ..Default::default()
        };
        assert!(by_search.matches(&figma));
        assert!(!by_search.matches(&rust));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_mutations_invalidate_pages() {
        use serde_json::json;

        let (_temp, content) = crate::content::test_support::service().await;
        for path in ["/", "/skills", "/about"] {
            content.pages().insert(path, json!(path)).await;
        }

        let record = content
            .create_skill(input("Rust", "Engineer"))
            .await
            .unwrap();
        assert!(content.pages().get("/").await.is_none());
        assert!(content.pages().get("/skills").await.is_none());
        assert!(content.pages().get("/about").await.is_some());

        content.pages().insert("/skills", json!("stale")).await;
        content.delete_skill(&record.id).await.unwrap();
        assert!(content.pages().get("/skills").await.is_none());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_update_rules() {
        let (_temp, content) = crate::content::test_support::service().await;
        let record = content
            .create_skill(input("Rust", "Engineer"))
            .await
            .unwrap();

        assert!(matches!(
            content.update_skill(&record.id, SkillInput::default()).await,
            Err(ContentError::NothingToUpdate)
        ));
        assert!(matches!(
            content.update_skill("missing", input("Go", "Engineer")).await,
            Err(ContentError::NotFound(_))
        ));

        let updated = content
            .update_skill(&record.id, input("Rust 2024", "Engineer"))
            .await
            .unwrap();
        assert_eq!(updated.data.name, "Rust 2024");
        assert_eq!(updated.created_at, record.created_at);
    }
}
