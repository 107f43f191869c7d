use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus,
    },
    entities::order_item::{
        self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity,
        Model as OrderItemModel,
    },
    entities::product::Entity as ProductEntity,
    errors::ServiceError,
};

/// Checkout pricing knobs, resolved once from configuration.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub tax_rate: Decimal,
    pub shipping_fee: Decimal,
    pub currency: String,
}

impl PricingConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let tax_rate = Decimal::from_f64(config.default_tax_rate)
            .map(|rate| rate.round_dp(4))
            .unwrap_or_else(|| dec!(0.10));

        Self {
            tax_rate,
            shipping_fee: Decimal::from(config.shipping_flat_fee),
            currency: config.default_currency.clone(),
        }
    }

    /// Tax, shipping and grand total for a given merchandise subtotal.
    pub fn totals(&self, subtotal: Decimal) -> (Decimal, Decimal, Decimal) {
        let tax = (subtotal * self.tax_rate).round_dp(2).normalize();
        let shipping = self.shipping_fee;
        let total = subtotal + tax + shipping;
        (tax, shipping, total)
    }
}

/// One cart line as submitted by the client. Any price the client may have
/// attached is ignored; only the product reference and quantity are trusted.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,

    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "Shipping address is required"))]
    pub shipping_address: String,

    #[validate(length(min = 1, message = "Cart is empty"))]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub shipping_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for building and mutating orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    pricing: PricingConfig,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, pricing: PricingConfig) -> Self {
        Self { db_pool, pricing }
    }

    /// Builds an order from a cart snapshot.
    ///
    /// Prices are re-read from the catalog in one batch query; a cart line
    /// referencing a product that no longer exists fails the whole operation
    /// before anything is written. The order row and its line items are
    /// inserted in a single transaction.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, lines = request.items.len()))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for line in &request.items {
            line.validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let db = &*self.db_pool;

        let product_ids: Vec<Uuid> = request.items.iter().map(|line| line.product_id).collect();
        let products = ProductEntity::find()
            .filter(crate::entities::product::Column::Id.is_in(product_ids))
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load cart products");
                ServiceError::DatabaseError(e)
            })?;

        let price_map: HashMap<Uuid, (String, Decimal)> = products
            .into_iter()
            .map(|p| (p.id, (p.name, p.price)))
            .collect();

        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let mut subtotal = Decimal::ZERO;
        let mut item_models = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let (name, unit_price) = price_map.get(&line.product_id).cloned().ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Cart references an unknown product ({})",
                    line.product_id
                ))
            })?;

            let line_total = unit_price * Decimal::from(line.quantity);
            subtotal += line_total;

            item_models.push(OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                name: Set(name),
                unit_price: Set(unit_price),
                quantity: Set(line.quantity),
                total_price: Set(line_total),
                created_at: Set(now),
            });
        }

        let (tax, shipping, total) = self.pricing.totals(subtotal);

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            user_id: Set(Some(request.user_id)),
            customer_name: Set(request.customer_name.clone()),
            status: Set(OrderStatus::Pending.to_string()),
            subtotal: Set(subtotal),
            tax: Set(tax),
            shipping: Set(shipping),
            total_amount: Set(total),
            currency: Set(self.pricing.currency.clone()),
            shipping_address: Set(request.shipping_address.clone()),
            invoice_id: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        OrderItemEntity::insert_many(item_models)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to insert order items");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, total = %order_model.total_amount, "Order created");

        self.model_to_response(order_model)
    }

    /// Retrieves an order together with its line items.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetailResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        Ok(OrderDetailResponse {
            order: self.model_to_response(order)?,
            items: items.iter().map(Self::item_to_response).collect(),
        })
    }

    /// Loads the bare order row, for collaborators that need the model itself.
    pub async fn find_order(&self, order_id: Uuid) -> Result<Option<OrderModel>, ServiceError> {
        Ok(OrderEntity::find_by_id(order_id).one(&*self.db_pool).await?)
    }

    /// Lists orders newest-first with optional status filtering.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        status: Option<OrderStatus>,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let orders = orders
            .into_iter()
            .map(|order| self.model_to_response(order))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Updates the shipping address of an unpaid order.
    #[instrument(skip(self, address), fields(order_id = %order_id))]
    pub async fn update_shipping_address(
        &self,
        order_id: Uuid,
        address: &str,
    ) -> Result<OrderResponse, ServiceError> {
        if address.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Shipping address is required".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let status = OrderStatus::parse(&order.status)?;
        if status.is_settled() {
            return Err(ServiceError::InvalidOperation(
                "Shipping address cannot be changed after payment".to_string(),
            ));
        }

        let mut active: OrderActiveModel = order.into();
        active.shipping_address = Set(address.trim().to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        info!(order_id = %order_id, "Shipping address updated");
        self.model_to_response(updated)
    }

    /// Marks an order as paid. Re-delivery of the same confirmation is a
    /// no-op: the end state is PAID either way.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_paid(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if OrderStatus::parse(&order.status)? == OrderStatus::Paid {
            info!(order_id = %order_id, "Order already marked paid");
            return self.model_to_response(order);
        }

        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Paid.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        info!(order_id = %order_id, "Order marked paid");
        self.model_to_response(updated)
    }

    /// Marks a still-pending order as failed. A settled order is left alone
    /// so a late expiry event can never downgrade a payment.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_failed_if_pending(
        &self,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if OrderStatus::parse(&order.status)? != OrderStatus::Pending {
            return self.model_to_response(order);
        }

        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Failed.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        warn!(order_id = %order_id, "Order marked failed");
        self.model_to_response(updated)
    }

    /// Records the gateway invoice identifier on the order.
    #[instrument(skip(self, invoice_id), fields(order_id = %order_id))]
    pub async fn set_invoice_id(
        &self,
        order_id: Uuid,
        invoice_id: &str,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let mut active: OrderActiveModel = order.into();
        active.invoice_id = Set(Some(invoice_id.to_string()));
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        Ok(())
    }

    fn model_to_response(&self, model: OrderModel) -> Result<OrderResponse, ServiceError> {
        let status = OrderStatus::parse(&model.status)?;
        Ok(OrderResponse {
            id: model.id,
            user_id: model.user_id,
            customer_name: model.customer_name,
            status,
            subtotal: model.subtotal,
            tax: model.tax,
            shipping: model.shipping,
            total_amount: model.total_amount,
            currency: model.currency,
            shipping_address: model.shipping_address,
            invoice_id: model.invoice_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    fn item_to_response(model: &OrderItemModel) -> OrderItemResponse {
        OrderItemResponse {
            product_id: model.product_id,
            name: model.name.clone(),
            unit_price: model.unit_price,
            quantity: model.quantity,
            total_price: model.total_price,
        }
    }
}
