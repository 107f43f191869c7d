pub mod analytics;
pub mod auth;
pub mod common;
pub mod health;
pub mod orders;
pub mod payment_webhooks;
pub mod payments;
pub mod products;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        analytics::AnalyticsService,
        notifications::NotificationService,
        orders::{OrderService, PricingConfig},
        payments::PaymentService,
        products::ProductService,
        users::UserService,
    },
};

/// Aggregate of the service singletons used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub products: Arc<ProductService>,
    pub users: Arc<UserService>,
    pub payments: Arc<PaymentService>,
    pub notifications: Arc<NotificationService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, config: &AppConfig) -> Self {
        let orders = Arc::new(OrderService::new(
            db.clone(),
            PricingConfig::from_app_config(config),
        ));

        Self {
            products: Arc::new(ProductService::new(db.clone())),
            users: Arc::new(UserService::new(db.clone(), config.otp_ttl_secs)),
            payments: Arc::new(PaymentService::new(config, orders.clone())),
            notifications: Arc::new(NotificationService::new(config)),
            analytics: Arc::new(AnalyticsService::new(db)),
            orders,
        }
    }
}
