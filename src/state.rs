use crate::clock::Clock;
use crate::dialog::{DialogHabit, RecommendationDialog};
use crate::errors::ValidationError;
use crate::gateway::Gateway;
use crate::models::{AppData, Settings, SettingsPatch};
use crate::scheduler::Scheduler;
use crate::store::{reduce, Action};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Single owner of the habit data. Every write goes through [`dispatch`].
///
/// [`dispatch`]: HabitStore::dispatch
#[derive(Clone)]
pub struct HabitStore {
    data: Arc<Mutex<AppData>>,
    clock: Arc<dyn Clock>,
}

impl HabitStore {
    pub fn new(data: AppData, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn snapshot(&self) -> AppData {
        self.data.lock().await.clone()
    }

    /// Runs `action` against the current data and swaps in the result.
    pub async fn dispatch(&self, action: Action) -> Result<AppData, ValidationError> {
        self.dispatch_then(action, |_| {}).await
    }

    /// Like [`dispatch`](HabitStore::dispatch), but runs `on_commit` on the
    /// new data before the lock is released, so follow-up effects happen in
    /// the same order as the writes.
    pub async fn dispatch_then(
        &self,
        action: Action,
        on_commit: impl FnOnce(&AppData),
    ) -> Result<AppData, ValidationError> {
        let today = self.today();
        let mut data = self.data.lock().await;
        debug!(?action, %today, "dispatch");
        let next = reduce(&data, action, today)?;
        *data = next.clone();
        on_commit(&next);
        Ok(next)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: HabitStore,
    pub gateway: Arc<Gateway>,
    pub scheduler: Arc<Scheduler>,
    pub dialog: Arc<Mutex<RecommendationDialog>>,
}

impl AppState {
    pub fn new(store: HabitStore, gateway: Gateway, scheduler: Scheduler) -> Self {
        Self {
            store,
            gateway: Arc::new(gateway),
            scheduler: Arc::new(scheduler),
            dialog: Arc::new(Mutex::new(RecommendationDialog::default())),
        }
    }

    /// Applies the patch and re-arms the timers the settings govern.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, ValidationError> {
        let scheduler = &self.scheduler;
        let data = self
            .store
            .dispatch_then(Action::UpdateSettings(patch), |data| {
                scheduler.apply(&data.settings)
            })
            .await?;
        Ok(data.settings)
    }

    pub async fn open_recommendations(&self, habit: DialogHabit) -> RecommendationDialog {
        let name = habit.name.clone();
        let mut dialog = self.dialog.lock().await;
        let generation = dialog.open(habit);
        self.spawn_request(generation, name);
        dialog.clone()
    }

    pub async fn refresh_recommendations(&self) -> RecommendationDialog {
        let mut dialog = self.dialog.lock().await;
        if let Some((generation, name)) = dialog.refresh() {
            self.spawn_request(generation, name);
        }
        dialog.clone()
    }

    pub async fn close_recommendations(&self) -> RecommendationDialog {
        let mut dialog = self.dialog.lock().await;
        dialog.close();
        dialog.clone()
    }

    pub async fn dialog_snapshot(&self) -> RecommendationDialog {
        self.dialog.lock().await.clone()
    }

    fn spawn_request(&self, generation: u64, habit_name: String) {
        let gateway = Arc::clone(&self.gateway);
        let dialog = Arc::clone(&self.dialog);
        tokio::spawn(async move {
            let recommendations = gateway.recommendations(&habit_name).await;
            if !dialog.lock().await.resolve(generation, recommendations) {
                debug!(generation, "discarding recommendations for a stale dialog");
            }
        });
    }
}
