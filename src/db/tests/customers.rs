//! Shared tests for CustomerRepo implementations
//!
//! Tests are written as async functions that take a `&dyn CustomerRepo`,
//! then wired up to each backend at the bottom of the file.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::repos::CustomerRepo,
    models::CreateCustomer,
    retention::compute_cutoff,
};

// ============================================================================
// Test Input Helpers
// ============================================================================

fn customer_input(email: &str, last_order_date: Option<DateTime<Utc>>) -> CreateCustomer {
    CreateCustomer {
        name: format!("Customer {}", email),
        email: email.to_string(),
        phone: None,
        last_order_date,
    }
}

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

// ============================================================================
// Create / Get / Count
// ============================================================================

pub async fn test_create_and_get(repo: &dyn CustomerRepo) {
    let created = repo
        .create(CreateCustomer {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: Some("+1-555-0100".to_string()),
            last_order_date: Some(days_ago(10)),
        })
        .await
        .expect("Should create customer");

    let fetched = repo
        .get_by_id(created.id)
        .await
        .expect("Should query")
        .expect("Should exist");

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "Ada Lovelace");
    assert_eq!(fetched.email, "ada@example.com");
    assert_eq!(fetched.phone.as_deref(), Some("+1-555-0100"));
    assert!(fetched.last_order_date.is_some());
}

pub async fn test_get_by_id_not_found(repo: &dyn CustomerRepo) {
    let result = repo
        .get_by_id(Uuid::new_v4())
        .await
        .expect("Query should succeed");
    assert!(result.is_none());
}

pub async fn test_create_without_orders(repo: &dyn CustomerRepo) {
    let created = repo
        .create(customer_input("new@example.com", None))
        .await
        .expect("Should create customer");

    let fetched = repo
        .get_by_id(created.id)
        .await
        .expect("Should query")
        .expect("Should exist");
    assert!(fetched.last_order_date.is_none());
    assert!(fetched.phone.is_none());
}

pub async fn test_count(repo: &dyn CustomerRepo) {
    assert_eq!(repo.count().await.expect("Should count"), 0);

    for i in 0..3 {
        repo.create(customer_input(&format!("c{}@example.com", i), None))
            .await
            .expect("Should create customer");
    }

    assert_eq!(repo.count().await.expect("Should count"), 3);
}

// ============================================================================
// Retention: delete_inactive_before
// ============================================================================

pub async fn test_delete_inactive_basic(repo: &dyn CustomerRepo) {
    let stale = repo
        .create(customer_input("stale@example.com", Some(days_ago(400))))
        .await
        .expect("Should create customer");
    let active = repo
        .create(customer_input("active@example.com", Some(days_ago(30))))
        .await
        .expect("Should create customer");

    let cutoff = days_ago(365);
    let deleted = repo
        .delete_inactive_before(cutoff, 1000, u64::MAX)
        .await
        .expect("Delete should succeed");

    assert_eq!(deleted, 1);
    assert!(
        repo.get_by_id(stale.id)
            .await
            .expect("Should query")
            .is_none()
    );
    assert!(
        repo.get_by_id(active.id)
            .await
            .expect("Should query")
            .is_some()
    );
}

pub async fn test_delete_boundary_row_at_cutoff_retained(repo: &dyn CustomerRepo) {
    let cutoff = Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap();

    let at_cutoff = repo
        .create(customer_input("boundary@example.com", Some(cutoff)))
        .await
        .expect("Should create customer");
    let just_before = repo
        .create(customer_input(
            "older@example.com",
            Some(cutoff - Duration::seconds(1)),
        ))
        .await
        .expect("Should create customer");

    let deleted = repo
        .delete_inactive_before(cutoff, 1000, u64::MAX)
        .await
        .expect("Delete should succeed");

    // Strict inequality: exactly-at-cutoff survives, one second older does not
    assert_eq!(deleted, 1);
    assert!(
        repo.get_by_id(at_cutoff.id)
            .await
            .expect("Should query")
            .is_some()
    );
    assert!(
        repo.get_by_id(just_before.id)
            .await
            .expect("Should query")
            .is_none()
    );
}

pub async fn test_delete_never_ordered_retained(repo: &dyn CustomerRepo) {
    let never_ordered = repo
        .create(customer_input("noorders@example.com", None))
        .await
        .expect("Should create customer");

    let deleted = repo
        .delete_inactive_before(Utc::now(), 1000, u64::MAX)
        .await
        .expect("Delete should succeed");

    assert_eq!(deleted, 0);
    assert!(
        repo.get_by_id(never_ordered.id)
            .await
            .expect("Should query")
            .is_some()
    );
}

pub async fn test_delete_zero_eligible(repo: &dyn CustomerRepo) {
    repo.create(customer_input("recent@example.com", Some(days_ago(5))))
        .await
        .expect("Should create customer");

    let deleted = repo
        .delete_inactive_before(days_ago(365), 1000, u64::MAX)
        .await
        .expect("Delete should succeed");

    assert_eq!(deleted, 0);
    assert_eq!(repo.count().await.expect("Should count"), 1);
}

pub async fn test_delete_is_idempotent(repo: &dyn CustomerRepo) {
    repo.create(customer_input("gone@example.com", Some(days_ago(400))))
        .await
        .expect("Should create customer");
    repo.create(customer_input("stays@example.com", Some(days_ago(100))))
        .await
        .expect("Should create customer");

    let cutoff = days_ago(365);
    let first = repo
        .delete_inactive_before(cutoff, 1000, u64::MAX)
        .await
        .expect("Delete should succeed");
    let second = repo
        .delete_inactive_before(cutoff, 1000, u64::MAX)
        .await
        .expect("Delete should succeed");

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    assert_eq!(repo.count().await.expect("Should count"), 1);
}

pub async fn test_delete_in_small_batches(repo: &dyn CustomerRepo) {
    for i in 0..5 {
        repo.create(customer_input(
            &format!("old{}@example.com", i),
            Some(days_ago(400 + i)),
        ))
        .await
        .expect("Should create customer");
    }

    // batch_size 2 forces three rounds of deletion
    let deleted = repo
        .delete_inactive_before(days_ago(365), 2, u64::MAX)
        .await
        .expect("Delete should succeed");

    assert_eq!(deleted, 5);
    assert_eq!(repo.count().await.expect("Should count"), 0);
}

pub async fn test_delete_respects_max_deletes(repo: &dyn CustomerRepo) {
    for i in 0..5 {
        repo.create(customer_input(
            &format!("old{}@example.com", i),
            Some(days_ago(400 + i)),
        ))
        .await
        .expect("Should create customer");
    }

    let deleted = repo
        .delete_inactive_before(days_ago(365), 2, 3)
        .await
        .expect("Delete should succeed");

    assert_eq!(deleted, 3);
    assert_eq!(repo.count().await.expect("Should count"), 2);
}

pub async fn test_delete_example_dates(repo: &dyn CustomerRepo) {
    // For a "now" of 2024-06-01 the cutoff is exactly 2023-06-02
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let cutoff = compute_cutoff(now, 365);
    assert_eq!(cutoff, Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap());

    let qualifies = repo
        .create(customer_input(
            "lapsed@example.com",
            Some(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()),
        ))
        .await
        .expect("Should create customer");
    let remains = repo
        .create(customer_input(
            "returning@example.com",
            Some(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()),
        ))
        .await
        .expect("Should create customer");

    let deleted = repo
        .delete_inactive_before(cutoff, 1000, u64::MAX)
        .await
        .expect("Delete should succeed");

    assert_eq!(deleted, 1);
    assert!(
        repo.get_by_id(qualifies.id)
            .await
            .expect("Should query")
            .is_none()
    );
    assert!(
        repo.get_by_id(remains.id)
            .await
            .expect("Should query")
            .is_some()
    );
}

pub async fn test_delete_on_empty_table(repo: &dyn CustomerRepo) {
    let deleted = repo
        .delete_inactive_before(Utc::now(), 1000, u64::MAX)
        .await
        .expect("Delete should succeed");
    assert_eq!(deleted, 0);
}

// ============================================================================
// SQLite Tests - Fast, in-memory
// ============================================================================

#[cfg(feature = "database-sqlite")]
mod sqlite_tests {
    use super::*;
    use crate::db::{
        sqlite::SqliteCustomerRepo,
        tests::harness::{create_sqlite_pool, run_sqlite_migrations},
    };

    async fn create_repo() -> SqliteCustomerRepo {
        let pool = create_sqlite_pool().await;
        run_sqlite_migrations(&pool).await;
        SqliteCustomerRepo::new(pool)
    }

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let repo = create_repo().await;
                super::$name(&repo).await;
            }
        };
    }

    sqlite_test!(test_create_and_get);
    sqlite_test!(test_get_by_id_not_found);
    sqlite_test!(test_create_without_orders);
    sqlite_test!(test_count);

    sqlite_test!(test_delete_inactive_basic);
    sqlite_test!(test_delete_boundary_row_at_cutoff_retained);
    sqlite_test!(test_delete_never_ordered_retained);
    sqlite_test!(test_delete_zero_eligible);
    sqlite_test!(test_delete_is_idempotent);
    sqlite_test!(test_delete_in_small_batches);
    sqlite_test!(test_delete_respects_max_deletes);
    sqlite_test!(test_delete_example_dates);
    sqlite_test!(test_delete_on_empty_table);
}

// ============================================================================
// PostgreSQL Tests - Require Docker, run with `cargo test -- --ignored`
// ============================================================================

#[cfg(feature = "database-postgres")]
mod postgres_tests {
    use super::*;
    use crate::db::{
        postgres::PostgresCustomerRepo,
        tests::harness::postgres::{create_isolated_postgres_pool, run_postgres_migrations},
    };

    macro_rules! postgres_test {
        ($name:ident) => {
            #[tokio::test]
            #[ignore = "Requires Docker - run with `cargo test -- --ignored`"]
            async fn $name() {
                let pool = create_isolated_postgres_pool().await;
                run_postgres_migrations(&pool).await;
                let repo = PostgresCustomerRepo::new(pool);
                super::$name(&repo).await;
            }
        };
    }

    postgres_test!(test_create_and_get);
    postgres_test!(test_get_by_id_not_found);
    postgres_test!(test_create_without_orders);
    postgres_test!(test_count);

    postgres_test!(test_delete_inactive_basic);
    postgres_test!(test_delete_boundary_row_at_cutoff_retained);
    postgres_test!(test_delete_never_ordered_retained);
    postgres_test!(test_delete_zero_eligible);
    postgres_test!(test_delete_is_idempotent);
    postgres_test!(test_delete_in_small_batches);
    postgres_test!(test_delete_respects_max_deletes);
    postgres_test!(test_delete_example_dates);
    postgres_test!(test_delete_on_empty_table);
}
