use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::entity::{Course, LessonProgress, LessonWithProgressRow, StudentCourseRow, UserEntity},
    utils::video,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StudentCourse {
    pub course_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    /// Rounded percentage of completed lessons
    pub progress: i64,
}

impl From<StudentCourseRow> for StudentCourse {
    fn from(row: StudentCourseRow) -> Self {
        let progress = row.progress_percent();
        Self {
            course_id: row.course_id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            thumbnail: row.thumbnail,
            enrolled_at: row.enrolled_at,
            total_lessons: row.total_lessons,
            completed_lessons: row.completed_lessons,
            progress,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LearnQuery {
    /// Lesson to open; the first lesson when absent
    pub lesson: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonRef {
    pub id: Uuid,
    pub title: String,
}

impl From<&LessonWithProgressRow> for LessonRef {
    fn from(row: &LessonWithProgressRow) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
        }
    }
}

/// Everything the lesson player needs in one payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LearnView {
    pub course: CourseRef,
    pub lessons: Vec<LessonWithProgressRow>,
    pub current_lesson: Option<LessonWithProgressRow>,
    pub previous_lesson: Option<LessonRef>,
    pub next_lesson: Option<LessonRef>,
    pub youtube_id: Option<String>,
}

impl LearnView {
    pub fn build(
        course: &Course,
        lessons: Vec<LessonWithProgressRow>,
        requested: Option<Uuid>,
    ) -> Option<Self> {
        let course = CourseRef {
            id: course.id(),
            title: course.title().to_string(),
            slug: course.slug().to_string(),
        };

        if lessons.is_empty() {
            return requested.is_none().then_some(Self {
                course,
                lessons,
                current_lesson: None,
                previous_lesson: None,
                next_lesson: None,
                youtube_id: None,
            });
        }

        let index = match requested {
            Some(id) => lessons.iter().position(|l| l.id == id)?,
            None => 0,
        };

        let current = lessons[index].clone();
        let previous_lesson = index.checked_sub(1).map(|i| LessonRef::from(&lessons[i]));
        let next_lesson = lessons.get(index + 1).map(LessonRef::from);
        let youtube_id = video::youtube_id(&current.video_url);

        Some(Self {
            course,
            lessons,
            current_lesson: Some(current),
            previous_lesson,
            next_lesson,
            youtube_id,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProgressBody {
    pub lesson_id: Uuid,
    pub is_completed: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    pub progress: LessonProgress,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProfileBody {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&UserEntity> for ProfileUser {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct PasswordChangeBody {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}
