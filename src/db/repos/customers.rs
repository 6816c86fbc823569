use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateCustomer, Customer},
};

#[async_trait]
pub trait CustomerRepo: Send + Sync {
    /// Create a new customer.
    ///
    /// Used by tests and seeding; in production the CRM application owns
    /// customer creation.
    async fn create(&self, input: CreateCustomer) -> DbResult<Customer>;

    /// Get a customer by ID.
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Customer>>;

    /// Count all customers.
    async fn count(&self) -> DbResult<i64>;

    // ==================== Retention Operations ====================

    /// Delete customers whose last order is strictly before the cutoff.
    ///
    /// Customers with no last order date (never ordered) are not eligible
    /// and are never deleted. Deletes in batches to avoid locking the
    /// database. Returns the total number of customers deleted.
    async fn delete_inactive_before(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: u32,
        max_deletes: u64,
    ) -> DbResult<u64>;
}
