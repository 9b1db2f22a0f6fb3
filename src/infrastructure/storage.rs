use crate::entities::{WeightEntry, WeightLossGoal};
use crate::infrastructure::{DataUpdateHook, Subscription};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

/// Trait for storing weight entries and the weight loss goal.
///
/// Business-rule rejections (duplicate date, nothing to delete) come back as
/// `Ok(false)`; only storage engine faults are returned as errors.
///
/// Every mutating operation (and the removal operations even when nothing was
/// removed) fires the "user data updated" notification to all subscribers.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Open or create the backing database and ensure its tables exist.
    /// Must be called before anything else; fires the notification once ready.
    async fn initialize(&self, path: &Path) -> Result<()>;

    fn is_initialized(&self) -> bool;

    /// Insert a new entry. Returns `false` if the date already has one.
    async fn add_entry(&self, entry: &WeightEntry) -> Result<bool>;

    /// All entries, in no particular order
    async fn get_all_entries(&self) -> Result<Vec<WeightEntry>>;

    /// Up to `max_count` entries, newest first
    async fn get_latest_entries(&self, max_count: usize) -> Result<Vec<WeightEntry>>;

    async fn get_entry_for_date(&self, date: NaiveDate) -> Result<Option<WeightEntry>>;

    /// Delete the entry for `date`. Returns `false` if there was none.
    async fn remove_entry_for_date(&self, date: NaiveDate) -> Result<bool>;

    async fn entry_exists_for_date(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.get_entry_for_date(date).await?.is_some())
    }

    async fn get_goal(&self) -> Result<Option<WeightLossGoal>>;

    /// Replace the goal. Any existing goal is removed first.
    async fn set_goal(&self, goal: &WeightLossGoal) -> Result<bool>;

    /// Remove the goal. Succeeds when there was no goal to begin with.
    async fn remove_goal(&self) -> Result<bool>;

    /// Listen for the "user data updated" notification
    fn subscribe(&self, hook: Box<dyn DataUpdateHook>) -> Subscription;
}
