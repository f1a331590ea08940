use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    pub async fn upsert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        is_completed: bool,
    ) -> DatabaseResult<Self> {
        let completed_at = is_completed.then(Utc::now);

        let result = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (id, user_id, lesson_id, is_completed, completed_at)
            VALUES ($1,$2,$3,$4,$5)
            ON CONFLICT (lesson_id, user_id) DO UPDATE
            SET is_completed = EXCLUDED.is_completed,
                completed_at = EXCLUDED.completed_at,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(lesson_id)
        .bind(is_completed)
        .bind(completed_at)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}
