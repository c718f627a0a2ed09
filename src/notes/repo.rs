use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
}

pub async fn create(
    db: &PgPool,
    owner_id: Uuid,
    title: &str,
    content: &str,
) -> anyhow::Result<Note> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        INSERT INTO notes (owner_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, title, content, created_at
        "#,
    )
    .bind(owner_id)
    .bind(title)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(note)
}

/// Newest-first page of the owner's notes, optionally filtered by a
/// case-insensitive substring match on title or content.
pub async fn list_by_owner(
    db: &PgPool,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
    search: Option<&str>,
) -> anyhow::Result<Vec<Note>> {
    let rows = match search {
        Some(term) => {
            let pattern = format!("%{}%", term);
            sqlx::query_as::<_, Note>(
                r#"
                SELECT id, owner_id, title, content, created_at
                FROM notes
                WHERE owner_id = $1 AND (title ILIKE $2 OR content ILIKE $2)
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(owner_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Note>(
                r#"
                SELECT id, owner_id, title, content, created_at
                FROM notes
                WHERE owner_id = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn find_for_owner(
    db: &PgPool,
    owner_id: Uuid,
    note_id: Uuid,
) -> anyhow::Result<Option<Note>> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        SELECT id, owner_id, title, content, created_at
        FROM notes
        WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(note_id)
    .bind(owner_id)
    .fetch_optional(db)
    .await?;
    Ok(note)
}

/// Full update of an owned note. `None` when the note does not exist or
/// belongs to someone else.
pub async fn update_for_owner(
    db: &PgPool,
    owner_id: Uuid,
    note_id: Uuid,
    title: &str,
    content: &str,
) -> anyhow::Result<Option<Note>> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        UPDATE notes
        SET title = $1, content = $2
        WHERE id = $3 AND owner_id = $4
        RETURNING id, owner_id, title, content, created_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(note_id)
    .bind(owner_id)
    .fetch_optional(db)
    .await?;
    Ok(note)
}

pub async fn delete_for_owner(db: &PgPool, owner_id: Uuid, note_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM notes
        WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(note_id)
    .bind(owner_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
