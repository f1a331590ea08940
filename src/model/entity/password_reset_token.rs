use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{CrudRepository, DatabaseResult, ModelManager, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct PasswordResetToken {
    id: Uuid,
    email: String,
    token: String,
    expires: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PasswordResetTokenCreate {
    pub email: String,
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl ResourceTyped for PasswordResetToken {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::PasswordResetToken
    }
}

impl PasswordResetToken {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires(&self) -> &DateTime<Utc> {
        &self.expires
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires < now
    }
}

#[async_trait]
impl CrudRepository<PasswordResetToken, PasswordResetTokenCreate, Uuid> for PasswordResetToken {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: PasswordResetTokenCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO password_reset_tokens (id, email, token, expires) VALUES ($1,$2,$3,$4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.email)
        .bind(data.token)
        .bind(data.expires)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: PasswordResetTokenCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "UPDATE password_reset_tokens SET email = $1, token = $2, expires = $3 WHERE id = $4 RETURNING *",
        )
        .bind(data.email)
        .bind(data.token)
        .bind(data.expires)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM password_reset_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM password_reset_tokens ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl PasswordResetToken {
    pub async fn find_by_token(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        token: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn delete_for_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE email = $1")
            .bind(email)
            .execute(mm.executor())
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn cleanup_expired(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires < now()")
            .execute(mm.executor())
            .await?;

        Ok(result.rows_affected())
    }
}
