use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{error::DbResult, repos::CustomerRepo},
    models::{CreateCustomer, Customer},
};

pub struct PostgresCustomerRepo {
    pool: PgPool,
}

impl PostgresCustomerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_customer(row: &PgRow) -> DbResult<Customer> {
        Ok(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            last_order_date: row.try_get("last_order_date")?,
        })
    }
}

#[async_trait]
impl CustomerRepo for PostgresCustomerRepo {
    async fn create(&self, input: CreateCustomer) -> DbResult<Customer> {
        let id = Uuid::new_v4();

        let row = sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, created_at, last_order_date)
            VALUES ($1, $2, $3, $4, NOW(), $5)
            RETURNING id, name, email, phone, created_at, last_order_date
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.last_order_date)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_customer(&row)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, created_at, last_order_date
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
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

            // PostgreSQL efficient batched deletion using ctid.
            // `last_order_date < $1` excludes NULL rows by SQL comparison
            // semantics, so never-ordered customers are retained.
            let result = sqlx::query(
                r#"
                DELETE FROM customers
                WHERE ctid IN (
                    SELECT ctid FROM customers
                    WHERE last_order_date < $1
                    LIMIT $2
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
