use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Order, OrderItemRow};

/// An order with its lines.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemRow>,
}

impl OrderView {
    pub fn zip(orders: Vec<Order>, mut items: HashMap<Uuid, Vec<OrderItemRow>>) -> Vec<Self> {
        orders
            .into_iter()
            .map(|order| {
                let items = items.remove(&order.id()).unwrap_or_default();
                Self { order, items }
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrdersResponse {
    pub orders: Vec<OrderView>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderCreatedResponse {
    pub order: OrderView,
}

/// Multipart form for checkout; documentation only.
#[allow(unused)]
#[derive(utoipa::ToSchema)]
pub struct CheckoutForm {
    /// Payment slip image
    #[schema(value_type = String, format = Binary)]
    pub slip: Vec<u8>,
}
