use crate::entities::{WeightEntry, WeightLossGoal};
use crate::infrastructure::storage::DataStore;
use crate::infrastructure::{
    DataUpdateHook, DiagnosticsSink, HookRegistry, LatencyStrategy, LogDiagnostics, NoLatency,
    Subscription,
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use duckdb::types::Type;
use duckdb::{Connection, OptionalExt, Row, params};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The goal table holds at most this one row.
const GOAL_ROW_ID: i32 = 1;

// Dates are stored as day numbers counted from 0001-01-01 (day 1), so they
// sort chronologically for every date chrono can represent.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS weight_entries (
        day INTEGER PRIMARY KEY,
        weight TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS weight_loss_goal (
        id INTEGER PRIMARY KEY,
        start_day INTEGER NOT NULL,
        start_weight TEXT NOT NULL,
        goal_day INTEGER NOT NULL,
        goal_weight TEXT NOT NULL
    );
"#;

type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// DuckDB-backed [`DataStore`].
///
/// Statements run on tokio's blocking pool; the connection is shared behind a
/// mutex and stays `None` until [`DataStore::initialize`] has run.
pub struct DuckDbDataStore {
    conn: SharedConnection,
    /// Claimed by the first `initialize` call before it opens anything
    claimed: AtomicBool,
    initialized: AtomicBool,
    hooks: HookRegistry,
    diagnostics: Arc<dyn DiagnosticsSink>,
    latency: Arc<dyn LatencyStrategy>,
}

impl DuckDbDataStore {
    pub fn new() -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            claimed: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            hooks: HookRegistry::new(),
            diagnostics: Arc::new(LogDiagnostics),
            latency: Arc::new(NoLatency),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_latency(mut self, latency: Arc<dyn LatencyStrategy>) -> Self {
        self.latency = latency;
        self
    }

    /// Same as [`DataStore::initialize`] but backed by an in-memory database
    pub async fn initialize_in_memory(&self) -> Result<()> {
        self.latency.delay().await;
        self.open_with(|| {
            Connection::open_in_memory().context("Failed to create in-memory DuckDB connection")
        })
        .await
    }

    async fn open_with<F>(&self, open: F) -> Result<()>
    where
        F: FnOnce() -> Result<Connection> + Send + 'static,
    {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            anyhow::bail!("Data store has already been initialized");
        }

        let shared = Arc::clone(&self.conn);
        let opened = tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = open()?;
            conn.execute_batch(SCHEMA)
                .context("Failed to create weight tables")?;

            let mut slot = shared
                .lock()
                .map_err(|_| anyhow!("Database connection lock poisoned"))?;
            *slot = Some(conn);
            Ok(())
        })
        .await
        .context("Database task panicked")
        .and_then(|opened| opened);

        if let Err(e) = opened {
            // Let a later call retry, e.g. after fixing the path
            self.claimed.store(false, Ordering::SeqCst);
            return Err(e);
        }

        self.initialized.store(true, Ordering::SeqCst);
        log::info!("Data store initialized");
        self.fire_user_data_updated();
        Ok(())
    }

    /// Run `op` against the connection on the blocking pool
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let slot = shared
                .lock()
                .map_err(|_| anyhow!("Database connection lock poisoned"))?;
            let conn = slot
                .as_ref()
                .context("Data store has not been initialized")?;
            op(conn)
        })
        .await
        .context("Database task panicked")?
    }

    fn fire_user_data_updated(&self) {
        self.hooks.notify();
    }

    fn report_unexpected_row_count(&self, operation: &str, count: usize) {
        self.diagnostics.track_fatal_error(
            &format!("{operation} got an unexpected result (not 1) of {count}"),
            None,
        );
    }

    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
        self.run(move |conn| Ok(conn.execute(sql, [])?)).await
    }
}

impl Default for DuckDbDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for DuckDbDataStore {
    async fn initialize(&self, path: &Path) -> Result<()> {
        self.latency.delay().await;
        let path = path.to_path_buf();
        log::debug!("Opening weight database at {}", path.display());
        self.open_with(move || {
            Connection::open(&path)
                .with_context(|| format!("Failed to open DuckDB database at {}", path.display()))
        })
        .await
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn add_entry(&self, entry: &WeightEntry) -> Result<bool> {
        self.latency.delay().await;

        // Editing is remove-then-add; an existing date is never overwritten here.
        if self.entry_exists_for_date(entry.date).await? {
            log::warn!("Weight entry for {} already exists", entry.date);
            return Ok(false);
        }

        let day = day_number(entry.date);
        let weight = entry.weight.to_string();
        let inserted = self
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO weight_entries (day, weight) VALUES (?, ?)",
                    params![day, weight],
                )
                .context("Failed to insert weight entry")
            })
            .await?;

        if inserted != 1 {
            self.report_unexpected_row_count("add_entry", inserted);
            return Ok(false);
        }

        log::debug!("Added weight entry {entry}");
        self.fire_user_data_updated();
        Ok(true)
    }

    async fn get_all_entries(&self) -> Result<Vec<WeightEntry>> {
        self.latency.delay().await;
        self.run(|conn| {
            let mut stmt = conn
                .prepare("SELECT day, weight FROM weight_entries")
                .context("Failed to prepare select statement")?;
            let entries = stmt
                .query_map([], row_to_entry)?
                .collect::<duckdb::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn get_latest_entries(&self, max_count: usize) -> Result<Vec<WeightEntry>> {
        self.latency.delay().await;
        let limit = i64::try_from(max_count).unwrap_or(i64::MAX);
        self.run(move |conn| {
            let mut stmt = conn
                .prepare("SELECT day, weight FROM weight_entries ORDER BY day DESC LIMIT ?")
                .context("Failed to prepare select statement")?;
            let entries = stmt
                .query_map(params![limit], row_to_entry)?
                .collect::<duckdb::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn get_entry_for_date(&self, date: NaiveDate) -> Result<Option<WeightEntry>> {
        self.latency.delay().await;
        let day = day_number(date);
        self.run(move |conn| {
            conn.query_row(
                "SELECT day, weight FROM weight_entries WHERE day = ?",
                params![day],
                row_to_entry,
            )
            .optional()
            .context("Failed to load weight entry")
        })
        .await
    }

    async fn remove_entry_for_date(&self, date: NaiveDate) -> Result<bool> {
        self.latency.delay().await;

        // Subscribers re-sync even when nothing was removed.
        if self.get_entry_for_date(date).await?.is_none() {
            log::warn!("No weight entry for {date} to remove");
            self.fire_user_data_updated();
            return Ok(false);
        }

        let day = day_number(date);
        let deleted = self
            .run(move |conn| {
                conn.execute(
                    "DELETE FROM weight_entries WHERE day = ?",
                    params![day],
                )
                .context("Failed to delete weight entry")
            })
            .await?;

        self.fire_user_data_updated();
        if deleted != 1 {
            log::warn!("Removing weight entry for {date} affected {deleted} rows");
            return Ok(false);
        }

        log::debug!("Removed weight entry for {date}");
        Ok(true)
    }

    async fn get_goal(&self) -> Result<Option<WeightLossGoal>> {
        self.latency.delay().await;
        self.run(|conn| {
            conn.query_row(
                "SELECT start_day, start_weight, goal_day, goal_weight FROM weight_loss_goal LIMIT 1",
                [],
                row_to_goal,
            )
            .optional()
            .context("Failed to load weight loss goal")
        })
        .await
    }

    async fn set_goal(&self, goal: &WeightLossGoal) -> Result<bool> {
        self.latency.delay().await;

        if !self.remove_goal().await? {
            self.fire_user_data_updated();
            return Ok(false);
        }

        let start_day = day_number(goal.start_date);
        let start_weight = goal.start_weight.to_string();
        let goal_day = day_number(goal.goal_date);
        let goal_weight = goal.goal_weight.to_string();
        let inserted = self
            .run(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO weight_loss_goal (id, start_day, start_weight, goal_day, goal_weight)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                    params![GOAL_ROW_ID, start_day, start_weight, goal_day, goal_weight],
                )
                .context("Failed to insert weight loss goal")
            })
            .await?;

        if inserted != 1 {
            self.report_unexpected_row_count("set_goal", inserted);
            self.fire_user_data_updated();
            return Ok(false);
        }

        log::debug!("Set weight loss goal {goal}");
        self.fire_user_data_updated();
        Ok(true)
    }

    async fn remove_goal(&self) -> Result<bool> {
        self.latency.delay().await;

        if self.get_goal().await?.is_some() {
            let deleted = self
                .run(|conn| {
                    conn.execute(
                        "DELETE FROM weight_loss_goal WHERE id = ?",
                        params![GOAL_ROW_ID],
                    )
                    .context("Failed to delete weight loss goal")
                })
                .await?;

            if deleted != 1 {
                self.report_unexpected_row_count("remove_goal", deleted);
                return Ok(false);
            }
            log::debug!("Removed weight loss goal");
        }

        self.fire_user_data_updated();
        Ok(true)
    }

    fn subscribe(&self, hook: Box<dyn DataUpdateHook>) -> Subscription {
        self.hooks.register(hook)
    }
}

fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn parse_day(idx: usize, day: i32) -> duckdb::Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(day).ok_or_else(|| {
        duckdb::Error::FromSqlConversionFailure(
            idx,
            Type::Int,
            format!("day number {day} is out of range").into(),
        )
    })
}

fn parse_weight(idx: usize, value: &str) -> duckdb::Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_entry(row: &Row<'_>) -> duckdb::Result<WeightEntry> {
    let day: i32 = row.get(0)?;
    let weight: String = row.get(1)?;
    Ok(WeightEntry {
        date: parse_day(0, day)?,
        weight: parse_weight(1, &weight)?,
    })
}

fn row_to_goal(row: &Row<'_>) -> duckdb::Result<WeightLossGoal> {
    let start_day: i32 = row.get(0)?;
    let start_weight: String = row.get(1)?;
    let goal_day: i32 = row.get(2)?;
    let goal_weight: String = row.get(3)?;
    Ok(WeightLossGoal {
        start_date: parse_day(0, start_day)?,
        start_weight: parse_weight(1, &start_weight)?,
        goal_date: parse_day(2, goal_day)?,
        goal_weight: parse_weight(3, &goal_weight)?,
    })
}
