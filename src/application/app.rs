use crate::application::{Config, GraphModel};
use crate::domain::{TodaysDisplayInfo, todays_display_info, weight_met_goal_on_date};
use crate::entities::{WeightEntry, WeightLossGoal};
use crate::infrastructure::{
    ActivityLogHook, CallbackHook, DataStore, DiagnosticsSink, DuckDbDataStore, FixedLatency,
    LogDiagnostics, Subscription,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One row of the weight history list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub entry: WeightEntry,
    pub met_goal: bool,
}

/// Everything shown on the progress screen, fetched in one go
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: TodaysDisplayInfo,
    pub history: Vec<HistoryRow>,
    pub graph: GraphModel,
}

#[derive(Serialize)]
struct ExportDocument {
    entries: Vec<WeightEntry>,
    goal: Option<WeightLossGoal>,
}

pub struct LineDietApp {
    store: Arc<DuckDbDataStore>,
    config: Config,
    diagnostics: Arc<dyn DiagnosticsSink>,
    stale: Arc<AtomicBool>,
    _subscriptions: Vec<Subscription>,
}

impl LineDietApp {
    pub async fn open(config: Config) -> Result<Self> {
        Self::with_default_plugins(config, Arc::new(LogDiagnostics)).await
    }

    pub async fn with_default_plugins(
        config: Config,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory {}", config.data_dir.display())
        })?;

        let mut store = DuckDbDataStore::new().with_diagnostics(Arc::clone(&diagnostics));
        if let Some(latency) = config.simulated_latency {
            log::info!("Simulating {latency:?} storage latency");
            store = store.with_latency(Arc::new(FixedLatency(latency)));
        }
        let store = Arc::new(store);

        // Views are rebuilt lazily: a notification only marks them stale.
        let stale = Arc::new(AtomicBool::new(true));
        let stale_flag = Arc::clone(&stale);
        let activity_log = ActivityLogHook::open(&config.data_dir)?;
        let subscriptions = vec![
            store.subscribe(Box::new(CallbackHook::new("Refresh Marker", move || {
                stale_flag.store(true, Ordering::SeqCst);
                Ok(())
            }))),
            store.subscribe(Box::new(activity_log)),
        ];

        store.initialize(&config.db_path).await?;

        Ok(Self {
            store,
            config,
            diagnostics,
            stale,
            _subscriptions: subscriptions,
        })
    }

    pub fn store(&self) -> &DuckDbDataStore {
        &self.store
    }

    /// Whether user data changed since the last [`LineDietApp::dashboard`]
    pub fn needs_refresh(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Record a weight. Returns `false` if the day already has one.
    pub async fn log_weight(&self, date: NaiveDate, weight: Decimal) -> Result<bool> {
        self.store.add_entry(&WeightEntry::new(date, weight)).await
    }

    /// Replace the weight recorded for `date`, adding one if there is none
    pub async fn edit_weight(&self, date: NaiveDate, weight: Decimal) -> Result<bool> {
        if self.store.entry_exists_for_date(date).await?
            && !self.store.remove_entry_for_date(date).await?
        {
            return Ok(false);
        }
        self.store.add_entry(&WeightEntry::new(date, weight)).await
    }

    /// Delete the weight for `date` on the user's request.
    ///
    /// Any failure comes back as an error the user can act on by retrying.
    pub async fn delete_weight(&self, date: NaiveDate) -> Result<()> {
        match self.store.remove_entry_for_date(date).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(anyhow!(
                "Could not delete the weight for {date}. Please try again."
            )),
            Err(e) => {
                self.diagnostics
                    .track_fatal_error("delete_weight threw an error", Some(&e));
                Err(e.context(format!(
                    "Could not delete the weight for {date}. Please try again."
                )))
            }
        }
    }

    pub async fn goal(&self) -> Result<Option<WeightLossGoal>> {
        self.store.get_goal().await
    }

    pub async fn set_goal(&self, goal: &WeightLossGoal) -> Result<bool> {
        self.store.set_goal(goal).await
    }

    pub async fn clear_goal(&self) -> Result<bool> {
        self.store.remove_goal().await
    }

    /// Latest entries, newest first, each flagged with whether it met the goal
    pub async fn history(&self) -> Result<Vec<HistoryRow>> {
        let goal = self.store.get_goal().await?;
        let entries = self
            .store
            .get_latest_entries(self.config.history_count)
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| HistoryRow {
                met_goal: weight_met_goal_on_date(goal.as_ref(), entry.date, entry.weight),
                entry,
            })
            .collect())
    }

    pub async fn today(&self, today: NaiveDate) -> Result<TodaysDisplayInfo> {
        let entry = self.store.get_entry_for_date(today).await?;
        let goal = self.store.get_goal().await?;
        Ok(todays_display_info(goal.as_ref(), entry.as_ref()))
    }

    pub async fn graph(&self, today: NaiveDate) -> Result<GraphModel> {
        let entries = self.store.get_all_entries().await?;
        let goal = self.store.get_goal().await?;
        Ok(GraphModel::build(&entries, goal.as_ref(), today))
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        self.stale.store(false, Ordering::SeqCst);
        Ok(Dashboard {
            today: self.today(today).await?,
            history: self.history().await?,
            graph: self.graph(today).await?,
        })
    }

    /// Background refresh: failures go to diagnostics and yield `None`
    pub async fn refresh(&self, today: NaiveDate) -> Option<Dashboard> {
        match self.dashboard(today).await {
            Ok(dashboard) => Some(dashboard),
            Err(e) => {
                self.diagnostics
                    .track_fatal_error("refresh - an error occurred", Some(&e));
                None
            }
        }
    }

    /// JSON document with every entry (oldest first) and the goal
    pub async fn export(&self) -> Result<String> {
        let mut entries = self.store.get_all_entries().await?;
        entries.sort_by_key(|e| e.date);
        let document = ExportDocument {
            entries,
            goal: self.store.get_goal().await?,
        };
        serde_json::to_string_pretty(&document).context("Failed to serialize export")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProgressStatus;
    use tempfile::TempDir;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(n)
    }

    fn lbs(value: i64) -> Decimal {
        Decimal::from(value)
    }

    async fn open_app() -> (LineDietApp, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let app = LineDietApp::open(Config::for_dir(temp_dir.path())).await.unwrap();
        (app, temp_dir)
    }

    fn goal() -> WeightLossGoal {
        WeightLossGoal::new(day(0), lbs(200), day(100), lbs(150))
    }

    #[tokio::test]
    async fn test_open_creates_database_and_activity_log() {
        let (app, temp_dir) = open_app().await;

        assert!(app.store().is_initialized());
        assert!(temp_dir.path().join("linediet.db").exists());
        assert!(temp_dir.path().join("activity_log.txt").exists());
    }

    #[tokio::test]
    async fn test_notifications_mark_view_stale() {
        let (app, _temp_dir) = open_app().await;
        assert!(app.needs_refresh());

        app.dashboard(day(0)).await.unwrap();
        assert!(!app.needs_refresh());

        app.log_weight(day(0), lbs(200)).await.unwrap();
        assert!(app.needs_refresh());
    }

    #[tokio::test]
    async fn test_edit_weight_replaces_existing_entry() {
        let (app, _temp_dir) = open_app().await;

        assert!(app.log_weight(day(3), lbs(199)).await.unwrap());
        assert!(!app.log_weight(day(3), lbs(150)).await.unwrap());
        assert!(app.edit_weight(day(3), lbs(197)).await.unwrap());
        assert!(app.edit_weight(day(4), lbs(196)).await.unwrap());

        let entry = app.store().get_entry_for_date(day(3)).await.unwrap().unwrap();
        assert_eq!(entry.weight, lbs(197));
    }

    #[tokio::test]
    async fn test_delete_missing_weight_asks_to_retry() {
        let (app, _temp_dir) = open_app().await;

        let err = app.delete_weight(day(3)).await.unwrap_err();
        assert!(err.to_string().contains("Please try again"));

        app.log_weight(day(3), lbs(199)).await.unwrap();
        app.delete_weight(day(3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_history_flags_days_on_track() {
        let (app, _temp_dir) = open_app().await;
        app.set_goal(&goal()).await.unwrap();
        app.log_weight(day(50), lbs(170)).await.unwrap();
        app.log_weight(day(60), lbs(180)).await.unwrap();

        let history = app.history().await.unwrap();
        let flags: Vec<_> = history.iter().map(|row| (row.entry.date, row.met_goal)).collect();
        assert_eq!(flags, vec![(day(60), false), (day(50), true)]);
    }

    #[tokio::test]
    async fn test_dashboard_combines_views() {
        let (app, _temp_dir) = open_app().await;
        app.set_goal(&goal()).await.unwrap();
        app.log_weight(day(50), lbs(170)).await.unwrap();

        let dashboard = app.refresh(day(50)).await.unwrap();
        assert_eq!(dashboard.today.status, ProgressStatus::OnTrack);
        assert_eq!(dashboard.history.len(), 1);
        assert_eq!(dashboard.graph.points.len(), 1);
        assert!(dashboard.graph.goal_line.is_some());

        assert!(app.clear_goal().await.unwrap());
        let today = app.today(day(50)).await.unwrap();
        assert_eq!(today.status, ProgressStatus::Neutral);
    }

    #[tokio::test]
    async fn test_export_is_sorted_json() {
        let (app, _temp_dir) = open_app().await;
        app.log_weight(day(2), lbs(198)).await.unwrap();
        app.log_weight(day(1), Decimal::new(1995, 1)).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&app.export().await.unwrap()).unwrap();
        assert_eq!(json["entries"][0]["date"], "2024-01-02");
        assert_eq!(json["entries"][0]["weight"], "199.5");
        assert_eq!(json["entries"][1]["date"], "2024-01-03");
        assert!(json["goal"].is_null());
    }
}
