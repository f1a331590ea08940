use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::utils::money;
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    price: i64,
    thumbnail: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CourseCreate {
    pub title: String,
    pub slug: String,
    pub description: String,
    /// satang
    pub price: i64,
    pub thumbnail: Option<String>,
    pub is_published: bool,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    pub fn as_update(&self) -> CourseCreate {
        CourseCreate {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            price: self.price,
            thumbnail: self.thumbnail.clone(),
            is_published: self.is_published,
        }
    }
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            INSERT INTO courses (id, title, slug, description, price, thumbnail, is_published)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price)
        .bind(&data.thumbnail)
        .bind(data.is_published)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            UPDATE courses
            SET title = $1, slug = $2, description = $3, price = $4, thumbnail = $5,
                is_published = $6, updated_at = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price)
        .bind(&data.thumbnail)
        .bind(data.is_published)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Course {
    pub async fn find_published_by_slug(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        slug: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE slug = $1 AND is_published")
            .bind(slug)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_published_in(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        ids: &[Uuid],
    ) -> DatabaseResult<Vec<Self>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE id = ANY($1) AND is_published ORDER BY created_at DESC",
        )
        .bind(ids)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_published(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE is_published ORDER BY title")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseListingRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub price: i64,
    pub thumbnail: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub lessons_count: i64,
    pub enrollments_count: i64,
}

const LISTING_SELECT: &str = r#"
    SELECT
        c.id,
        c.title,
        c.slug,
        c.description,
        c.price,
        c.thumbnail,
        c.is_published,
        c.created_at,
        (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lessons_count,
        (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollments_count
    FROM courses c
"#;

impl CourseListingRow {
    pub async fn search_published(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        search: Option<&str>,
        limit: Option<i64>,
    ) -> DatabaseResult<Vec<Self>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let sql = format!(
            r#"{LISTING_SELECT}
            WHERE c.is_published
              AND ($1::text IS NULL OR c.title ILIKE $1 OR c.description ILIKE $1)
            ORDER BY c.created_at DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }

    pub async fn list_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let sql = format!("{LISTING_SELECT} ORDER BY c.created_at DESC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}

fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("react"), "%react%");
        assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
    }
}
