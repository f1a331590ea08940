use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{model::entity::Course, utils::money};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CartAddBody {
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CartRemoveQuery {
    pub course_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub price: i64,
    pub thumbnail: Option<String>,
}

impl From<&Course> for CartItem {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            slug: course.slug().to_string(),
            price: course.price(),
            thumbnail: course.thumbnail().map(String::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub total: i64,
}

impl CartResponse {
    pub fn new(courses: &[Course]) -> Self {
        Self {
            items: courses.iter().map(CartItem::from).collect(),
            total: courses
                .iter()
                .map(Course::price)
                .fold(0, i64::saturating_add),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
