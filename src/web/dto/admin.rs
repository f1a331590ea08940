use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::entity::{
        Course, CourseCreate, DashboardCounters, Lesson, LessonCreate, OrderItemRow,
        OrderReviewRow, OrderStatus, UserSummaryRow,
    },
    utils::money,
    web::UserRole,
};

pub const PAGE_DEFAULT_LIMIT: i64 = 100;
pub const PAGE_MAX_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(PAGE_DEFAULT_LIMIT)
            .clamp(1, PAGE_MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

// Stats

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: DashboardCounters,
    pub recent_orders: Vec<PaymentView>,
}

// Users

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UserCreateBody {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Choices for the manual enrollment dialog.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnrollOptions {
    pub students: Vec<UserSummaryRow>,
    pub courses: Vec<Course>,
}

// Courses

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CourseCreateBody {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Baht
    #[validate(range(min = 0.0, max = 1_000_000.0, message = "Price must be between 0 and 1,000,000"))]
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub is_published: Option<bool>,
}

impl CourseCreateBody {
    pub fn into_create(self, slug: String) -> CourseCreate {
        CourseCreate {
            title: self.title,
            slug,
            description: self.description,
            price: money::to_minor(self.price.unwrap_or(0.0)),
            thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
            is_published: self.is_published.unwrap_or(false),
        }
    }
}

/// Fields left out keep their current value.
#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct CourseUpdateBody {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000.0, message = "Price must be between 0 and 1,000,000"))]
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub is_published: Option<bool>,
}

impl CourseUpdateBody {
    pub fn apply(self, mut data: CourseCreate) -> CourseCreate {
        if let Some(title) = self.title {
            data.title = title;
        }
        if let Some(description) = self.description {
            data.description = description;
        }
        if let Some(price) = self.price {
            data.price = money::to_minor(price);
        }
        if let Some(thumbnail) = self.thumbnail {
            data.thumbnail = Some(thumbnail).filter(|t| !t.is_empty());
        }
        if let Some(is_published) = self.is_published {
            data.is_published = is_published;
        }
        data
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdminCourseView {
    #[serde(flatten)]
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LessonCreateBody {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Video URL is required"))]
    pub video_url: String,
    pub is_free: Option<bool>,
}

impl LessonCreateBody {
    pub fn into_create(self, course_id: Uuid) -> LessonCreate {
        LessonCreate {
            course_id,
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            video_url: self.video_url,
            position: None,
            is_free: self.is_free.unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct LessonUpdateBody {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Video URL cannot be empty"))]
    pub video_url: Option<String>,
    pub position: Option<i32>,
    pub is_free: Option<bool>,
}

impl LessonUpdateBody {
    pub fn apply(self, mut data: LessonCreate) -> LessonCreate {
        if let Some(title) = self.title {
            data.title = title;
        }
        if let Some(description) = self.description {
            data.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(video_url) = self.video_url {
            data.video_url = video_url;
        }
        if let Some(position) = self.position {
            data.position = Some(position);
        }
        if let Some(is_free) = self.is_free {
            data.is_free = is_free;
        }
        data
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LessonPosition {
    pub id: Uuid,
    pub position: i32,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderBody {
    pub lessons: Vec<LessonPosition>,
}

// Enrollments

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EnrollmentCreateBody {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

// Payments

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentsQuery {
    /// PENDING, APPROVED or REJECTED; every order when absent
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewBody {
    /// `approve` or `reject`
    pub action: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub success: bool,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaymentView {
    #[serde(flatten)]
    pub order: OrderReviewRow,
    pub items: Vec<OrderItemRow>,
}

impl PaymentView {
    pub fn zip(
        orders: Vec<OrderReviewRow>,
        mut items: HashMap<Uuid, Vec<OrderItemRow>>,
    ) -> Vec<Self> {
        orders
            .into_iter()
            .map(|order| {
                let items = items.remove(&order.id).unwrap_or_default();
                Self { order, items }
            })
            .collect()
    }
}
