use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A CRM customer record.
///
/// The retention policy keys off `last_order_date`: customers whose last
/// order is older than the configured window are eligible for deletion.
/// `last_order_date` is `None` for customers who have never ordered; such
/// records are never deleted by the retention pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_order_date: Option<DateTime<Utc>>,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Timestamp of the customer's most recent order, if any.
    pub last_order_date: Option<DateTime<Utc>>,
}
