/// Single document lookup
pub const GET_DOCUMENT: &str = "SELECT id, data FROM documents WHERE collection = $1 AND id = $2";

/// Collection query, filters expressed as JSONB containment
pub const QUERY_DOCUMENTS: &str =
    "SELECT id, data FROM documents WHERE collection = $1 AND data @> $2 ORDER BY id";

/// Collection query ordered newest first; the order field is cast to timestamptz
pub const QUERY_DOCUMENTS_NEWEST_FIRST: &str = r#"
    SELECT id, data
    FROM documents
    WHERE collection = $1 AND data @> $2
    ORDER BY (data->>$3)::timestamptz DESC
"#;

/// Collection query ordered oldest first
pub const QUERY_DOCUMENTS_OLDEST_FIRST: &str = r#"
    SELECT id, data
    FROM documents
    WHERE collection = $1 AND data @> $2
    ORDER BY (data->>$3)::timestamptz ASC
"#;

/// Partial update, merging fields into the stored document
pub const UPDATE_DOCUMENT: &str =
    "UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2";

/// Create or replace a whole document
pub const SET_DOCUMENT: &str = r#"
    INSERT INTO documents (collection, id, data)
    VALUES ($1, $2, $3)
    ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
"#;

/// Delete a document
pub const DELETE_DOCUMENT: &str = "DELETE FROM documents WHERE collection = $1 AND id = $2";
