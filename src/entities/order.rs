use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle states for an order. PENDING orders become PAID through the
/// payment webhook or FAILED when the hosted invoice expires; SHIPPED is set
/// by the fulfillment flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Shipped,
}

impl OrderStatus {
    /// Parses the string form stored on the order row.
    pub fn parse(value: &str) -> Result<Self, crate::errors::ServiceError> {
        Self::from_str(value).map_err(|_| {
            crate::errors::ServiceError::InternalError(format!("Unknown order status: {value}"))
        })
    }

    /// Whether the order has been paid for (address edits are locked out).
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::Shipped)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user; optional for legacy/guest orders
    pub user_id: Option<Uuid>,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Customer name must be between 1 and 255 characters"
    ))]
    pub customer_name: String,

    pub status: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub shipping_address: String,

    /// Hosted invoice identifier returned by the payment gateway, set once
    pub invoice_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::Pending, "PENDING")]
    #[case(OrderStatus::Paid, "PAID")]
    #[case(OrderStatus::Failed, "FAILED")]
    #[case(OrderStatus::Shipped, "SHIPPED")]
    fn status_round_trips_through_storage_form(
        #[case] status: OrderStatus,
        #[case] stored: &str,
    ) {
        assert_eq!(status.to_string(), stored);
        assert_eq!(OrderStatus::parse(stored).unwrap(), status);
    }

    #[test]
    fn unknown_status_string_is_an_error() {
        assert!(OrderStatus::parse("REFUNDED").is_err());
    }

    #[test]
    fn settled_statuses_lock_out_edits() {
        assert!(!OrderStatus::Pending.is_settled());
        assert!(!OrderStatus::Failed.is_settled());
        assert!(OrderStatus::Paid.is_settled());
        assert!(OrderStatus::Shipped.is_settled());
    }
}
