use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Course, Lesson},
    utils::money,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Matches title or description, case-insensitive
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeaturedQuery {
    pub limit: Option<i64>,
}

/// Lesson as listed on the public course page. `video_url` is only present
/// for free lessons or enrolled viewers.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicLesson {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_free: bool,
    pub video_url: Option<String>,
}

impl PublicLesson {
    pub fn from_lesson(lesson: &Lesson, can_watch: bool) -> Self {
        Self {
            id: lesson.id(),
            title: lesson.title().to_string(),
            description: lesson.description().map(String::from),
            position: lesson.position(),
            is_free: lesson.is_free(),
            video_url: (can_watch || lesson.is_free()).then(|| lesson.video_url().to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub price: i64,
    pub thumbnail: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub lessons: Vec<PublicLesson>,
    pub enrollments_count: i64,
    pub free_lessons_count: usize,
    pub is_enrolled: bool,
}

impl CourseDetail {
    pub fn new(course: &Course, lessons: &[Lesson], enrollments_count: i64, is_enrolled: bool) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            slug: course.slug().to_string(),
            description: course.description().to_string(),
            price: course.price(),
            thumbnail: course.thumbnail().map(String::from),
            updated_at: *course.updated_at(),
            lessons: lessons
                .iter()
                .map(|l| PublicLesson::from_lesson(l, is_enrolled))
                .collect(),
            enrollments_count,
            free_lessons_count: lessons.iter().filter(|l| l.is_free()).count(),
            is_enrolled,
        }
    }
}
