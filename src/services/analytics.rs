use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    entities::order::{Entity as OrderEntity, OrderStatus},
    errors::ServiceError,
};

/// Revenue and purchase count for one calendar day (PAID orders only).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub purchases: u64,
}

/// Figures backing the admin dashboard and analytics page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub paid_orders: u64,
    pub failed_orders: u64,
    pub shipped_orders: u64,
    /// Sum of total_amount over PAID orders
    pub total_revenue: Decimal,
    pub revenue_by_day: Vec<DailyRevenue>,
}

/// Aggregates order data for the admin views. The whole order set is folded
/// in memory; the data volume here is admin-dashboard scale.
#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DbPool>,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ServiceError> {
        let orders = OrderEntity::find().all(&*self.db_pool).await?;

        let mut summary = DashboardSummary {
            total_orders: 0,
            pending_orders: 0,
            paid_orders: 0,
            failed_orders: 0,
            shipped_orders: 0,
            total_revenue: Decimal::ZERO,
            revenue_by_day: Vec::new(),
        };

        let mut daily: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();

        for order in orders {
            summary.total_orders += 1;

            match OrderStatus::parse(&order.status)? {
                OrderStatus::Pending => summary.pending_orders += 1,
                OrderStatus::Failed => summary.failed_orders += 1,
                OrderStatus::Shipped => summary.shipped_orders += 1,
                OrderStatus::Paid => {
                    summary.paid_orders += 1;
                    summary.total_revenue += order.total_amount;

                    let day = order.created_at.date_naive();
                    let bucket = daily.entry(day).or_insert((Decimal::ZERO, 0));
                    bucket.0 += order.total_amount;
                    bucket.1 += 1;
                }
            }
        }

        summary.revenue_by_day = daily
            .into_iter()
            .map(|(date, (revenue, purchases))| DailyRevenue {
                date,
                revenue,
                purchases,
            })
            .collect();

        Ok(summary)
    }
}
