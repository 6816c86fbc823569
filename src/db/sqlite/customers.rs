use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::CustomerRepo,
    },
    models::{CreateCustomer, Customer},
};

/// Parse a UUID stored as TEXT, returning a DbError on failure
fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

pub struct SqliteCustomerRepo {
    pool: SqlitePool,
}

impl SqliteCustomerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_customer(row: &SqliteRow) -> DbResult<Customer> {
        Ok(Customer {
            id: parse_uuid(row.try_get("id")?)?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            last_order_date: row.try_get("last_order_date")?,
        })
    }
}

#[async_trait]
impl CustomerRepo for SqliteCustomerRepo {
    async fn create(&self, input: CreateCustomer) -> DbResult<Customer> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, created_at, last_order_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(now)
        .bind(input.last_order_date)
        .execute(&self.pool)
        .await?;

        Ok(Customer {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: now,
            last_order_date: input.last_order_date,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, created_at, last_order_date
            FROM customers
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn delete_inactive_before(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: u32,
        max_deletes: u64,
    ) -> DbResult<u64> {
        let mut total_deleted: u64 = 0;

        loop {
            if total_deleted >= max_deletes {
                break;
            }

            let remaining = max_deletes - total_deleted;
            let limit = std::cmp::min(batch_size as u64, remaining) as i64;

            // Delete a batch using a subquery to select IDs.
            // `last_order_date < ?` excludes NULL rows by SQL comparison
            // semantics, so never-ordered customers are retained.
            let result = sqlx::query(
                r#"
                DELETE FROM customers
                WHERE id IN (
                    SELECT id FROM customers
                    WHERE last_order_date < ?
                    LIMIT ?
                )
                "#,
            )
            .bind(cutoff)
            .bind(limit)
            .execute(&self.pool)
            .await?;

            let rows_deleted = result.rows_affected();
            total_deleted += rows_deleted;

            if rows_deleted < limit as u64 {
                break;
            }
        }

        Ok(total_deleted)
    }
}
