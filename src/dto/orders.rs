use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppResult, FieldErrors},
    models::{Order, OrderItem, OrderStatus, StatusHistoryEntry},
};

pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub notes: Option<String>,
}

impl PlaceOrderRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        errors.check(!self.items.is_empty(), "items", "Order must contain at least one item");
        for (idx, line) in self.items.iter().enumerate() {
            errors.check(
                line.quantity >= 1,
                &format!("items[{idx}].quantity"),
                "Quantity must be at least 1",
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    pub status_id: i32,
    pub comment: Option<String>,
}

impl ChangeStatusRequest {
    pub fn validate(&self) -> AppResult<()> {
        let comment_len = self.comment.as_deref().map_or(0, |c| c.chars().count());
        let mut errors = FieldErrors::new();
        errors.check(
            comment_len <= MAX_COMMENT_CHARS,
            "comment",
            "Comment must be at most 500 characters",
        );
        errors.into_result()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetails {
    pub order: Order,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub history: Vec<StatusHistoryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderStatusList {
    #[schema(value_type = Vec<OrderStatus>)]
    pub items: Vec<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn empty_orders_and_zero_quantities_are_rejected() {
        let empty = PlaceOrderRequest {
            items: vec![],
            notes: None,
        };
        assert!(empty.validate().is_err());

        let zero = PlaceOrderRequest {
            items: vec![
                OrderLineRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 2,
                },
                OrderLineRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 0,
                },
            ],
            notes: None,
        };
        let Err(AppError::Validation(fields)) = zero.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "items[1].quantity");
    }

    #[test]
    fn long_comments_are_rejected() {
        let req = ChangeStatusRequest {
            status_id: 2,
            comment: Some("x".repeat(MAX_COMMENT_CHARS + 1)),
        };
        assert!(req.validate().is_err());
    }
}
