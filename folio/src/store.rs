//! Generic document store over the `documents` table.
//!
//! Each content type implements [`Document`] and gets a typed
//! [`Collection`] handle. Bodies are stored as JSON; ids are UUID v4 and
//! timestamps fixed-width RFC 3339 so text ordering matches time ordering.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::Row;
use std::marker::PhantomData;
use uuid::Uuid;

use crate::db::{DbPool, DbRow};
use crate::sql;

/// A content type persisted in its own collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, used as the row discriminator.
    const COLLECTION: &'static str;
}

/// A stored document with its store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

/// Typed handle on one collection.
pub struct Collection<T> {
    pool: DbPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid stored timestamp: {value}"))?
        .with_timezone(&Utc))
}

impl<T: Document> Collection<T> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    fn decode(row: &DbRow) -> Result<Record<T>> {
        let id: String = row.get("id");
        let body: String = row.get("body");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        let data = serde_json::from_str(&body)
            .with_context(|| format!("Corrupt {} document {id}", T::COLLECTION))?;

        Ok(Record {
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
            id,
            data,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Record<T>>> {
        let row = sqlx::query(sql::SELECT_DOCUMENT)
            .bind(T::COLLECTION)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load {} document {id}", T::COLLECTION))?;

        row.as_ref().map(Self::decode).transpose()
    }

    /// All documents in creation order.
    pub async fn find_all(&self) -> Result<Vec<Record<T>>> {
        let rows = sqlx::query(sql::SELECT_COLLECTION)
            .bind(T::COLLECTION)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list {} documents", T::COLLECTION))?;

        rows.iter().map(Self::decode).collect()
    }

    pub async fn create(&self, data: T) -> Result<Record<T>> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(&data)?;
        let stamp = timestamp(now);

        sqlx::query(sql::INSERT_DOCUMENT)
            .bind(&id)
            .bind(T::COLLECTION)
            .bind(&body)
            .bind(&stamp)
            .bind(&stamp)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert {} document", T::COLLECTION))?;

        // Round-trip through the stored precision so returned records compare
        // equal to reloaded ones.
        let now = parse_timestamp(&stamp)?;
        Ok(Record {
            id,
            created_at: now,
            updated_at: now,
            data,
        })
    }

    /// Replace the body of an existing document. Returns `None` if `id` is unknown.
    pub async fn replace(&self, id: &str, data: T) -> Result<Option<Record<T>>> {
        let body = serde_json::to_string(&data)?;

        let result = sqlx::query(sql::UPDATE_DOCUMENT)
            .bind(&body)
            .bind(timestamp(Utc::now()))
            .bind(T::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update {} document {id}", T::COLLECTION))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Delete a document. Returns `false` if nothing was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(sql::DELETE_DOCUMENT)
            .bind(T::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete {} document {id}", T::COLLECTION))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let row = sqlx::query(sql::COUNT_COLLECTION)
            .bind(T::COLLECTION)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {} documents", T::COLLECTION))?;

        let count: i64 = row.get("count");
        Ok(count.max(0) as u64)
    }
}
