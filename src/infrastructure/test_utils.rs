/// Test utilities for DuckDB-based tests
///
/// Every [`TestStore`](test_harness::TestStore) owns a fresh database inside a
/// temporary directory, so tests never see each other's data. The store is
/// wired to a recording diagnostics sink and a hook counting notifications.
///
/// ## Usage Examples
///
/// ```rust,ignore
/// use crate::infrastructure::test_utils::test_harness::TestStore;
///
/// #[tokio::test]
/// async fn my_test() {
///     let test_store = TestStore::new().await;
///     let store = test_store.store();
///
///     // Use store for testing...
///     // Database is removed when test_store is dropped
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::entities::{WeightEntry, WeightLossGoal};
    use crate::infrastructure::{CallbackHook, DataStore, DiagnosticsSink, DuckDbDataStore, Subscription};
    use anyhow::Result;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Diagnostics sink that keeps every reported message
    #[derive(Debug, Default)]
    pub struct RecordingDiagnostics {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingDiagnostics {
        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl DiagnosticsSink for RecordingDiagnostics {
        fn track_fatal_error(&self, message: &str, error: Option<&anyhow::Error>) {
            let line = match error {
                Some(e) => format!("{message}: {e:#}"),
                None => message.to_string(),
            };
            self.messages.lock().unwrap().push(line);
        }
    }

    /// Test harness that creates a fresh DuckDB instance for each test
    /// and automatically cleans up when dropped
    pub struct TestStore {
        store: DuckDbDataStore,
        diagnostics: Arc<RecordingDiagnostics>,
        notifications: Arc<AtomicUsize>,
        _subscription: Subscription,
        _temp_dir: TempDir, // Keep temp dir alive
    }

    impl TestStore {
        /// Create and initialize a store on a new database file
        pub async fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let diagnostics = Arc::new(RecordingDiagnostics::default());
            let store = DuckDbDataStore::new().with_diagnostics(diagnostics.clone());

            let notifications = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&notifications);
            let subscription = store.subscribe(Box::new(CallbackHook::new("counter", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })));

            store
                .initialize(&temp_dir.path().join("test.db"))
                .await
                .expect("Failed to initialize test DuckDB store");

            Self {
                store,
                diagnostics,
                notifications,
                _subscription: subscription,
                _temp_dir: temp_dir,
            }
        }

        pub fn store(&self) -> &DuckDbDataStore {
            &self.store
        }

        pub fn diagnostics(&self) -> &RecordingDiagnostics {
            &self.diagnostics
        }

        /// Number of "user data updated" notifications seen so far
        pub fn notifications(&self) -> usize {
            self.notifications.load(Ordering::SeqCst)
        }

        pub fn reset_notifications(&self) {
            self.notifications.store(0, Ordering::SeqCst);
        }

        /// Get database path (useful for debugging)
        pub fn db_path(&self) -> PathBuf {
            self._temp_dir.path().join("test.db")
        }

        /// Store one entry per `(date, weight)` pair
        pub async fn seed_entries(&self, entries: &[(NaiveDate, i64)]) -> Result<Vec<WeightEntry>> {
            let mut seeded = Vec::new();
            for &(date, weight) in entries {
                let entry = WeightEntry::new(date, Decimal::from(weight));
                self.store.add_entry(&entry).await?;
                seeded.push(entry);
            }
            Ok(seeded)
        }

        /// Store a 200 -> 150 goal running over 100 days from `start`
        pub async fn seed_goal(&self, start: NaiveDate) -> Result<WeightLossGoal> {
            let goal = WeightLossGoal::new(
                start,
                Decimal::from(200),
                start + chrono::Duration::days(100),
                Decimal::from(150),
            );
            self.store.set_goal(&goal).await?;
            Ok(goal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::infrastructure::DataStore;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_harness_basic_functionality() {
        let test_store = TestStore::new().await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        // Initially empty
        assert!(test_store.store().get_entry_for_date(date).await.unwrap().is_none());

        let seeded = test_store.seed_entries(&[(date, 180)]).await.unwrap();
        let loaded = test_store.store().get_entry_for_date(date).await.unwrap();
        assert_eq!(loaded.as_ref(), seeded.first());
    }

    #[tokio::test]
    async fn test_harness_isolation() {
        // Each test gets a fresh database
        let test_store1 = TestStore::new().await;
        let test_store2 = TestStore::new().await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        test_store1.seed_entries(&[(date, 180)]).await.unwrap();

        assert!(test_store2.store().get_entry_for_date(date).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_harness_counts_notifications() {
        let test_store = TestStore::new().await;
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        test_store.reset_notifications();
        test_store.seed_goal(start).await.unwrap();

        // set_goal notifies for the inner removal and for the insert
        assert_eq!(test_store.notifications(), 2);
    }
}
