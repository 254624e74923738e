//! Module declaration and wiring

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::InventoryApi;
use crate::domain::{NoOpNotificationSink, NotificationSink, Service};
use crate::infra::storage::{Migrator, SeaOrmInventoryStore};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Inventory service module
///
/// Owns the domain service and the native client built on top of it.
pub struct InventoryServiceModule {
    config: Config,
    service: Arc<Service>,
    client: Arc<NativeClient>,
}

impl InventoryServiceModule {
    /// Migrate the database and wire the module without a broadcaster
    pub async fn init(config: Config, db: DatabaseConnection) -> Result<Self> {
        Self::init_with_notifier(config, db, Arc::new(NoOpNotificationSink)).await
    }

    /// Migrate the database and wire the module around `notifier`
    pub async fn init_with_notifier(
        config: Config,
        db: DatabaseConnection,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        Migrator::up(&db, None).await?;
        tracing::info!("Inventory service migrations completed");

        let store = Arc::new(SeaOrmInventoryStore::new(Arc::new(db)));
        let service = Arc::new(Service::new(store, notifier, config.clone()));
        let client = Arc::new(NativeClient::new(service.clone()));

        tracing::info!(
            max_import_rows = config.max_import_rows,
            notifications_enabled = config.notifications_enabled,
            "Inventory service initialized"
        );
        Ok(Self {
            config,
            service,
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Client for in-process callers
    pub fn client(&self) -> Arc<dyn InventoryApi> {
        self.client.clone()
    }
}
