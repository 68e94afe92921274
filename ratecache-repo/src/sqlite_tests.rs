//! SQLite store integration tests.

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sqlx::{Connection, SqliteConnection};
    use tempfile::tempdir;

    use ratecache_types::{CachedSnapshot, CancellationToken, RateStore, StoreError};

    use crate::SqliteStore;

    async fn setup_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn row(requested: u32, actual: u32, code: &str, value: &str) -> CachedSnapshot {
        CachedSnapshot {
            requested_date: date(requested),
            actual_date: date(actual),
            currency_code: code.to_string(),
            nominal: 1,
            name: format!("{code} name"),
            value: Decimal::from_str(value).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();

        store.initialize(&cancel).await.unwrap();
        store.initialize(&cancel).await.unwrap();

        assert_eq!(store.initialization_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_initialize_runs_once() {
        let store = Arc::new(setup_store().await);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.initialize(&CancellationToken::new()).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.initialization_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_canceled() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = store.initialize(&cancel).await;

        assert!(matches!(result, Err(StoreError::Canceled(_))));
        assert_eq!(store.initialization_count(), 0);
    }

    #[tokio::test]
    async fn test_read_miss_is_empty() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();

        let rows = store.read_by_requested_date(date(6), &cancel).await.unwrap();

        assert!(rows.is_empty());
        assert!(!store.has_data_for(date(6), &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();
        let rows = vec![row(6, 5, "USD", "91.50"), row(6, 5, "EUR", "98.20")];

        store.write_all(&rows, &cancel).await.unwrap();

        let read = store.read_by_requested_date(date(6), &cancel).await.unwrap();
        assert_eq!(read, rows);
        assert!(store.has_data_for(date(6), &cancel).await.unwrap());
        assert!(!store.has_data_for(date(5), &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_value_scale_round_trips_exactly() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();

        store
            .write_all(&[row(6, 5, "USD", "91.5000")], &cancel)
            .await
            .unwrap();

        let read = store.read_by_requested_date(date(6), &cancel).await.unwrap();
        assert_eq!(read[0].value.to_string(), "91.5000");
    }

    #[tokio::test]
    async fn test_repeated_writes_append_but_read_latest_batch() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();

        store
            .write_all(&[row(6, 5, "USD", "91.50"), row(6, 5, "EUR", "98.20")], &cancel)
            .await
            .unwrap();
        store
            .write_all(&[row(6, 4, "USD", "90.00")], &cancel)
            .await
            .unwrap();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rates")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(total, 3);

        let read = store.read_by_requested_date(date(6), &cancel).await.unwrap();
        assert_eq!(read, vec![row(6, 4, "USD", "90.00")]);
    }

    #[tokio::test]
    async fn test_dates_are_isolated() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();

        store
            .write_all(&[row(6, 5, "USD", "91.50")], &cancel)
            .await
            .unwrap();
        store
            .write_all(&[row(9, 9, "USD", "89.70")], &cancel)
            .await
            .unwrap();

        let saturday = store.read_by_requested_date(date(6), &cancel).await.unwrap();
        assert_eq!(saturday, vec![row(6, 5, "USD", "91.50")]);
    }

    #[tokio::test]
    async fn test_canceled_write_leaves_nothing() {
        let store = setup_store().await;
        let live = CancellationToken::new();
        store.initialize(&live).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = store
            .write_all(&[row(6, 5, "USD", "91.50")], &cancel)
            .await;

        assert!(matches!(result, Err(StoreError::Canceled(_))));
        assert!(!store.has_data_for(date(6), &live).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_canceled_mid_batch_rolls_back() {
        let tmp = tempdir().unwrap();
        let db_url = format!("sqlite://{}?mode=rwc", tmp.path().join("rates.db").display());
        let store = Arc::new(SqliteStore::new(&db_url).await.unwrap());
        let live = CancellationToken::new();
        store.initialize(&live).await.unwrap();

        // Hold the write lock so the batch stalls on its first insert.
        let mut blocker = SqliteConnection::connect(&db_url).await.unwrap();
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut blocker)
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let write = tokio::spawn({
            let store = store.clone();
            let cancel = cancel.clone();
            async move {
                let rows = [row(6, 5, "USD", "91.50"), row(6, 5, "EUR", "98.20")];
                store.write_all(&rows, &cancel).await
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        sqlx::query("ROLLBACK").execute(&mut blocker).await.unwrap();

        let result = write.await.unwrap();

        assert!(matches!(result, Err(StoreError::Canceled(_))));
        assert!(!store.has_data_for(date(6), &live).await.unwrap());
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rates")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_reads_observe_cancellation() {
        let store = setup_store().await;
        let live = CancellationToken::new();
        store
            .write_all(&[row(6, 5, "USD", "91.50")], &live)
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let exists = store.has_data_for(date(6), &cancel).await;
        let rows = store.read_by_requested_date(date(6), &cancel).await;

        assert!(matches!(exists, Err(StoreError::Canceled(_))));
        assert!(matches!(rows, Err(StoreError::Canceled(_))));
        assert_eq!(
            store.read_by_requested_date(date(6), &live).await.unwrap(),
            vec![row(6, 5, "USD", "91.50")]
        );
    }

    #[tokio::test]
    async fn test_empty_write_is_noop() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();

        store.write_all(&[], &cancel).await.unwrap();

        assert!(!store.has_data_for(date(6), &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_row_surfaces_as_error() {
        let store = setup_store().await;
        let cancel = CancellationToken::new();
        store.initialize(&cancel).await.unwrap();

        sqlx::query(
            r#"INSERT INTO rates (batch_id, requested_date, actual_date, currency_code, nominal, name, value)
               VALUES ('b', '2024-01-06', '2024-01-05', 'USD', 1, 'US Dollar', 'not-a-number')"#,
        )
        .execute(store.pool())
        .await
        .unwrap();

        let result = store.read_by_requested_date(date(6), &cancel).await;

        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_file_backed_store_persists_across_handles() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("rates.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let cancel = CancellationToken::new();

        {
            let store = SqliteStore::new(&db_url).await.unwrap();
            store
                .write_all(&[row(6, 5, "USD", "91.50")], &cancel)
                .await
                .unwrap();
            store.pool().close().await;
        }

        let reopened = SqliteStore::new(&db_url).await.unwrap();
        let read = reopened
            .read_by_requested_date(date(6), &cancel)
            .await
            .unwrap();

        assert_eq!(read, vec![row(6, 5, "USD", "91.50")]);
    }
}
