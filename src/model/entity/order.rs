use std::collections::HashMap;

use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{
    ModelManager,
    error::{DatabaseError, DatabaseResult},
};
use crate::utils::money;
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(DatabaseError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Order {
    id: Uuid,
    user_id: Uuid,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    total_amount: i64,
    status: String,
    slip_url: String,
    rejection_reason: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    approved_by_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: Uuid,
    pub slip_url: String,
    pub items: Vec<(Uuid, i64)>,
}

impl OrderCreate {
    pub fn total(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |acc, (_, price)| acc.checked_add(*price))
    }
}

impl ResourceTyped for Order {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Order
    }
}

impl Order {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn status(&self) -> DatabaseResult<OrderStatus> {
        self.status.parse()
    }

    pub fn slip_url(&self) -> &str {
        &self.slip_url
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn approved_by_id(&self) -> Option<Uuid> {
        self.approved_by_id
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: OrderCreate,
    ) -> DatabaseResult<Self> {
        let total = data.total().ok_or(DatabaseError::AmountOverflow)?;
        let mut tx = mm.begin().await?;

        let order: Order = sqlx::query_as(
            r#"
            INSERT INTO orders (id, user_id, total_amount, status, slip_url)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(total)
        .bind(OrderStatus::Pending.as_str())
        .bind(&data.slip_url)
        .fetch_one(&mut *tx)
        .await?;

        for (course_id, price) in &data.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, course_id, price) VALUES ($1,$2,$3,$4)",
            )
            .bind(Uuid::new_v4())
            .bind(order.id)
            .bind(course_id)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(actor.user_id())
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    /// Marks the order approved by `actor` and enrolls the buyer in every
    /// ordered course. Existing enrollments are kept as they are.
    pub async fn approve(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<Self> {
        let mut tx = mm.begin().await?;

        let approved: Option<Order> = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = $1, approved_at = now(), approved_by_id = $2, updated_at = now()
            WHERE id = $3 AND status = $4
            RETURNING *
            "#,
        )
        .bind(OrderStatus::Approved.as_str())
        .bind(actor.user_id())
        .bind(self.id)
        .bind(OrderStatus::Pending.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(approved) = approved else {
            return Err(DatabaseError::InvalidTransition { from: self.status });
        };

        let course_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT course_id FROM order_items WHERE order_id = $1")
                .bind(self.id)
                .fetch_all(&mut *tx)
                .await?;

        for course_id in course_ids {
            sqlx::query(
                r#"
                INSERT INTO enrollments (id, user_id, course_id)
                VALUES ($1,$2,$3)
                ON CONFLICT (user_id, course_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(approved.user_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(approved)
    }

    pub async fn reject(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        reason: Option<String>,
    ) -> DatabaseResult<Self> {
        let rejected: Option<Order> = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = $1, rejection_reason = $2, approved_by_id = $3, updated_at = now()
            WHERE id = $4 AND status = $5
            RETURNING *
            "#,
        )
        .bind(OrderStatus::Rejected.as_str())
        .bind(reason)
        .bind(actor.user_id())
        .bind(self.id)
        .bind(OrderStatus::Pending.as_str())
        .fetch_optional(mm.executor())
        .await?;

        rejected.ok_or(DatabaseError::InvalidTransition { from: self.status })
    }
}

#[async_trait]
impl HasOwner for Order {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

// Utils

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct OrderItemRow {
    #[serde(skip)]
    pub order_id: Uuid,
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub course_slug: String,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub price: i64,
}

impl OrderItemRow {
    pub async fn for_orders(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        order_ids: &[Uuid],
    ) -> DatabaseResult<HashMap<Uuid, Vec<Self>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT
                oi.order_id,
                oi.id,
                oi.course_id,
                c.title AS course_title,
                c.slug AS course_slug,
                oi.price
            FROM order_items oi
            JOIN courses c ON c.id = oi.course_id
            WHERE oi.order_id = ANY($1)
            ORDER BY c.title
            "#,
        )
        .bind(order_ids)
        .fetch_all(mm.executor())
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Self>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct OrderReviewRow {
    pub id: Uuid,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub total_amount: i64,
    pub status: String,
    pub slip_url: String,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub approver_name: Option<String>,
}

impl OrderReviewRow {
    pub async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        status: Option<OrderStatus>,
        limit: Option<i64>,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                o.id,
                o.total_amount,
                o.status,
                o.slip_url,
                o.rejection_reason,
                o.approved_at,
                o.created_at,
                u.id AS user_id,
                u.name AS user_name,
                u.email AS user_email,
                a.name AS approver_name
            FROM orders o
            JOIN users u ON u.id = o.user_id
            LEFT JOIN users a ON a.id = o.approved_by_id
            WHERE ($1::text IS NULL OR o.status = $1)
            ORDER BY o.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct DashboardCounters {
    pub total_users: i64,
    pub total_courses: i64,
    pub pending_orders: i64,
    #[serde(with = "money::baht")]
    #[schema(value_type = f64)]
    pub total_revenue: i64,
}

impl DashboardCounters {
    pub async fn collect(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Self> {
        let counters = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM orders WHERE status = 'PENDING') AS pending_orders,
                (SELECT COALESCE(SUM(total_amount), 0)::BIGINT FROM orders WHERE status = 'APPROVED') AS total_revenue
            "#,
        )
        .fetch_one(mm.executor())
        .await?;

        Ok(counters)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_parses_stored_text() {
        assert_eq!("PENDING".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("APPROVED".parse::<OrderStatus>().unwrap(), OrderStatus::Approved);
        assert!("approved".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Rejected).unwrap();
        assert_eq!(json, r#""REJECTED""#);
    }

    #[test]
    fn order_total_sums_item_prices() {
        let order = OrderCreate {
            user_id: Uuid::new_v4(),
            slip_url: String::from("/uploads/slips/x.png"),
            items: vec![(Uuid::new_v4(), 129_000), (Uuid::new_v4(), 99_050)],
        };
        assert_eq!(order.total(), Some(228_050));
    }

    #[test]
    fn order_total_refuses_overflow() {
        let order = OrderCreate {
            user_id: Uuid::new_v4(),
            slip_url: String::from("/uploads/slips/x.png"),
            items: vec![(Uuid::new_v4(), i64::MAX), (Uuid::new_v4(), i64::MAX)],
        };
        assert_eq!(order.total(), None);
    }
}
