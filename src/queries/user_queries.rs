use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{User, UserDocument},
};

pub async fn create(pool: &PgPool, document: UserDocument) -> Result<User> {
    let user = sqlx::query_as::<_, User>("INSERT INTO users (data) VALUES ($1) RETURNING *")
        .bind(Json(document.into_inner()))
        .fetch_one(pool)
        .await?;

    Ok(user)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC, id ASC")
        .fetch_all(pool)
        .await?;

    Ok(users)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Shallow merge: top-level keys in `patch` replace the stored ones.
pub async fn update(pool: &PgPool, id: Uuid, patch: UserDocument) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET data = data || $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(Json(patch.into_inner()))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
