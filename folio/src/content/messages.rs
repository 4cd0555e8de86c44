//! Contact form submissions.

use super::validate::{Validator, trimmed};
use super::{ContentError, ContentService};
use crate::error::FieldError;
use crate::store::{Document, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum message length in characters.
pub const MIN_MESSAGE_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl Document for ContactMessage {
    const COLLECTION: &'static str = "contact_messages";
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessageInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactMessageInput {
    pub fn into_message(self, now: DateTime<Utc>) -> Result<ContactMessage, Vec<FieldError>> {
        let message = ContactMessage {
            name: trimmed(self.name).unwrap_or_default(),
            email: trimmed(self.email).unwrap_or_default(),
            message: trimmed(self.message).unwrap_or_default(),
            submitted_at: now,
        };

        let mut v = Validator::new();
        v.required("name", &message.name, "Name is required.");
        v.email("email", &message.email, "Invalid email address.");
        v.min_chars(
            "message",
            &message.message,
            MIN_MESSAGE_CHARS,
            "Message must be at least 10 characters long.",
        );
        v.finish()?;

        Ok(message)
    }
}

/// Query parameters for the admin message list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageFilter {
    /// Only messages from this address (case-insensitive)
    pub email: Option<String>,
    pub limit: Option<usize>,
}

impl ContentService {
    pub async fn submit_message(
        &self,
        input: ContactMessageInput,
    ) -> Result<Record<ContactMessage>, ContentError> {
        let message = input.into_message(Utc::now())?;
        let record = self.messages.create(message).await?;

        info!(id = %record.id, from = %record.data.email, "Contact message received");
        Ok(record)
    }

    /// Messages newest first.
    pub async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> Result<Vec<Record<ContactMessage>>, ContentError> {
        let mut messages: Vec<_> = self
            .messages
            .find_all()
            .await?
            .into_iter()
            .filter(|m| match filter.email.as_deref() {
                Some(email) => m.data.email.eq_ignore_ascii_case(email.trim()),
                None => true,
            })
            .collect();

        messages.sort_by(|a, b| b.data.submitted_at.cmp(&a.data.submitted_at));
        if let Some(limit) = filter.limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    pub async fn get_message(&self, id: &str) -> Result<Record<ContactMessage>, ContentError> {
        self.messages
            .find_by_id(id)
            .await?
            .ok_or(ContentError::NotFound("Message"))
    }

    pub async fn count_messages(&self) -> Result<u64, ContentError> {
        Ok(self.messages.count().await?)
    }

    pub async fn delete_message(&self, id: &str) -> Result<(), ContentError> {
        if !self.messages.delete(id).await? {
            return Err(ContentError::NotFound("Message"));
        }

        info!(id, "Contact message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str, message: &str) -> ContactMessageInput {
        ContactMessageInput {
            name: Some("Sam".to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn test_message_length_counts_trimmed_chars() {
        let now = Utc::now();
        assert!(input("sam@example.com", "0123456789").into_message(now).is_ok());

        let errors = input("sam@example.com", "  too short  ")
            .into_message(now)
            .unwrap_err();
        assert_eq!(errors[0].field, "message");
    }

    #[test]
    fn test_rejects_bad_email() {
        let errors = input("sam", "long enough message")
            .into_message(Utc::now())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let (_temp, content) = crate::content::test_support::service().await;
        content
            .submit_message(input("a@example.com", "first message here"))
            .await
            .unwrap();
        content
            .submit_message(input("b@example.com", "second message here"))
            .await
            .unwrap();
        content
            .submit_message(input("A@example.com", "third message here"))
            .await
            .unwrap();

        let all = content.list_messages(&MessageFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].data.message, "third message here");

        let from_a = content
            .list_messages(&MessageFilter {
                email: Some("a@example.com".to_string()),
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].data.message, "third message here");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_submission_does_not_touch_page_cache() {
        let (_temp, content) = crate::content::test_support::service().await;
        content.pages().insert("/contact", serde_json::json!({})).await;

        content
            .submit_message(input("a@example.com", "hello there, world"))
            .await
            .unwrap();
        assert!(content.pages().get("/contact").await.is_some());
    }
}
