//! SQL query constants with database-specific placeholders.
//!
//! All content lives in one `documents` table: one row per document, keyed by
//! `(collection, id)`, with the entity serialized as JSON in `body`.
//! SQLite uses `?` placeholders, PostgreSQL uses `$1, $2, ...` numbered placeholders.

#[cfg(feature = "sqlite")]
pub const INSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (id, collection, body, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?)
"#;

#[cfg(feature = "postgres")]
pub const INSERT_DOCUMENT: &str = r#"
    INSERT INTO documents (id, collection, body, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5)
"#;

#[cfg(feature = "sqlite")]
pub const SELECT_DOCUMENT: &str =
    "SELECT id, body, created_at, updated_at FROM documents WHERE collection = ? AND id = ?";

#[cfg(feature = "postgres")]
pub const SELECT_DOCUMENT: &str =
    "SELECT id, body, created_at, updated_at FROM documents WHERE collection = $1 AND id = $2";

#[cfg(feature = "sqlite")]
pub const SELECT_COLLECTION: &str = r#"
    SELECT id, body, created_at, updated_at FROM documents
    WHERE collection = ?
    ORDER BY created_at ASC, id ASC
"#;

#[cfg(feature = "postgres")]
pub const SELECT_COLLECTION: &str = r#"
    SELECT id, body, created_at, updated_at FROM documents
    WHERE collection = $1
    ORDER BY created_at ASC, id ASC
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_DOCUMENT: &str =
    "UPDATE documents SET body = ?, updated_at = ? WHERE collection = ? AND id = ?";

#[cfg(feature = "postgres")]
pub const UPDATE_DOCUMENT: &str =
    "UPDATE documents SET body = $1, updated_at = $2 WHERE collection = $3 AND id = $4";

#[cfg(feature = "sqlite")]
pub const DELETE_DOCUMENT: &str = "DELETE FROM documents WHERE collection = ? AND id = ?";

#[cfg(feature = "postgres")]
pub const DELETE_DOCUMENT: &str = "DELETE FROM documents WHERE collection = $1 AND id = $2";

#[cfg(feature = "sqlite")]
pub const COUNT_COLLECTION: &str =
    "SELECT COUNT(*) AS count FROM documents WHERE collection = ?";

#[cfg(feature = "postgres")]
pub const COUNT_COLLECTION: &str =
    "SELECT COUNT(*) AS count FROM documents WHERE collection = $1";
