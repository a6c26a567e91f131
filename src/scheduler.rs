//! Background timers: the midnight rollover and the hourly reminder.
//!
//! Both timers only produce [`Action`]s or read snapshots through the
//! [`HabitStore`]; they never hold the store lock across a sleep.

use crate::models::{Habits, Settings};
use crate::state::HabitStore;
use crate::store::{has_unmarked, Action};
use crate::streak::next_midnight;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, warn};

pub const REMINDER_TITLE: &str = "Habit Tracker Reminder";
pub const REMINDER_BODY: &str = "You have uncompleted habits for today!";

/// Platform notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "default" => Ok(Permission::Default),
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            other => Err(format!("unknown permission: {other}")),
        }
    }
}

pub trait Notifier: Send + Sync + 'static {
    fn request_permission(&self) -> Permission;
    fn notify(&self, title: &str, body: &str);
}

/// Delivers reminders to the structured log.
pub struct LogNotifier {
    grant: Permission,
}

impl LogNotifier {
    pub fn new(grant: Permission) -> Self {
        Self { grant }
    }
}

impl Notifier for LogNotifier {
    fn request_permission(&self) -> Permission {
        self.grant
    }

    fn notify(&self, title: &str, body: &str) {
        info!(%title, %body, "reminder");
    }
}

/// Asks for permission at most once and decides whether a tick should
/// notify.
pub struct ReminderGate {
    permission: Permission,
    notifier: Arc<dyn Notifier>,
}

impl ReminderGate {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            permission: Permission::Default,
            notifier,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn ensure_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = self.notifier.request_permission();
            match self.permission {
                Permission::Granted => debug!("notification permission granted"),
                Permission::Denied => warn!("notification permission denied; reminders disabled"),
                Permission::Default => debug!("notification permission left undecided"),
            }
        }
        self.permission
    }

    /// Emits one reminder when permission is granted and something is left
    /// to do. Returns whether a reminder went out.
    pub fn check(&self, habits: &Habits) -> bool {
        if self.permission != Permission::Granted || !has_unmarked(habits) {
            return false;
        }
        self.notifier.notify(REMINDER_TITLE, REMINDER_BODY);
        true
    }
}

pub struct Scheduler {
    store: HabitStore,
    reminder_interval: Duration,
    gate: Arc<Mutex<ReminderGate>>,
    rollover: Mutex<Option<JoinHandle<()>>>,
    reminders: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(store: HabitStore, notifier: Arc<dyn Notifier>, reminder_interval: Duration) -> Self {
        Self {
            store,
            reminder_interval,
            gate: Arc::new(Mutex::new(ReminderGate::new(notifier))),
            rollover: Mutex::new(None),
            reminders: Mutex::new(None),
        }
    }

    /// Startup sweep followed by arming the timers the settings ask for.
    pub async fn start(&self) {
        let settings = self.store.snapshot().await.settings;
        if settings.streak_reset {
            let day = self.store.today();
            if self.store.dispatch(Action::Rollover { day }).await.is_ok() {
                info!(%day, "startup rollover applied");
            }
        }
        self.apply(&settings);
    }

    /// Arms or cancels each timer to match `settings`.
    pub fn apply(&self, settings: &Settings) {
        self.set_rollover(settings.streak_reset);
        self.set_reminders(settings.notifications);
    }

    pub fn rollover_armed(&self) -> bool {
        lock(&self.rollover).is_some()
    }

    pub fn reminders_armed(&self) -> bool {
        lock(&self.reminders).is_some()
    }

    pub fn permission(&self) -> Permission {
        lock(&self.gate).permission()
    }

    pub fn shutdown(&self) {
        self.set_rollover(false);
        self.set_reminders(false);
    }

    fn set_rollover(&self, enabled: bool) {
        let mut slot = lock(&self.rollover);
        match (enabled, slot.is_some()) {
            (true, false) => {
                debug!("arming midnight rollover");
                *slot = Some(tokio::spawn(rollover_loop(self.store.clone())));
            }
            (false, true) => {
                if let Some(handle) = slot.take() {
                    debug!("cancelling midnight rollover");
                    handle.abort();
                }
            }
            _ => {}
        }
    }

    fn set_reminders(&self, enabled: bool) {
        let mut slot = lock(&self.reminders);
        if !enabled {
            if let Some(handle) = slot.take() {
                debug!("cancelling reminders");
                handle.abort();
            }
            return;
        }
        if slot.is_some() {
            return;
        }
        if lock(&self.gate).ensure_permission() == Permission::Denied {
            return;
        }
        debug!(interval = ?self.reminder_interval, "arming reminders");
        *slot = Some(tokio::spawn(reminder_loop(
            self.store.clone(),
            Arc::clone(&self.gate),
            self.reminder_interval,
        )));
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn rollover_loop(store: HabitStore) {
    loop {
        let (day, wait) = next_midnight(store.now());
        sleep(wait).await;
        match store.dispatch(Action::Rollover { day }).await {
            Ok(_) => info!(%day, "midnight rollover applied"),
            Err(err) => warn!("midnight rollover rejected: {err}"),
        }
    }
}

async fn reminder_loop(store: HabitStore, gate: Arc<Mutex<ReminderGate>>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let habits = store.snapshot().await.habits;
        lock(&gate).check(&habits);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{AppData, Habit, HabitKind};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingNotifier {
        grant: Permission,
        requests: AtomicUsize,
        sent: AtomicUsize,
    }

    impl RecordingNotifier {
        fn new(grant: Permission) -> Arc<Self> {
            Arc::new(Self {
                grant,
                requests: AtomicUsize::new(0),
                sent: AtomicUsize::new(0),
            })
        }
    }

    impl Notifier for RecordingNotifier {
        fn request_permission(&self) -> Permission {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.grant
        }

        fn notify(&self, _title: &str, _body: &str) {
            self.sent.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn store_on(date: NaiveDate, data: AppData) -> HabitStore {
        HabitStore::new(data, Arc::new(FixedClock::on(date)))
    }

    #[test]
    fn permission_is_requested_once() {
        let notifier = RecordingNotifier::new(Permission::Denied);
        let mut gate = ReminderGate::new(notifier.clone());
        assert_eq!(gate.ensure_permission(), Permission::Denied);
        assert_eq!(gate.ensure_permission(), Permission::Denied);
        assert_eq!(notifier.requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reminder_needs_permission_and_unmarked_habit() {
        let notifier = RecordingNotifier::new(Permission::Granted);
        let mut gate = ReminderGate::new(notifier.clone());
        let mut data = AppData::with_sample_habits();

        assert!(!gate.check(&data.habits), "no permission asked yet");
        gate.ensure_permission();
        assert!(gate.check(&data.habits));

        for habit in data.habits.iter_mut() {
            habit.marked = true;
        }
        assert!(!gate.check(&data.habits));
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn denied_gate_never_notifies() {
        let notifier = RecordingNotifier::new(Permission::Denied);
        let mut gate = ReminderGate::new(notifier.clone());
        gate.ensure_permission();
        assert!(!gate.check(&AppData::with_sample_habits().habits));
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn startup_sweep_runs_when_streak_reset_enabled() {
        let mut data = AppData::default();
        let mut kept = Habit::new(1, "Run", HabitKind::Good);
        kept.marked = true;
        kept.streak = 5;
        kept.last_marked_date = Some(day(9));
        let mut stale = Habit::new(2, "Soda", HabitKind::Bad);
        stale.streak = 2;
        stale.last_marked_date = Some(day(7));
        data.habits.good.push(kept);
        data.habits.bad.push(stale);

        let store = store_on(day(10), data);
        let scheduler = Scheduler::new(
            store.clone(),
            RecordingNotifier::new(Permission::Granted),
            Duration::from_secs(3600),
        );
        scheduler.start().await;

        let habits = store.snapshot().await.habits;
        assert!(!habits.good[0].marked);
        assert_eq!(habits.good[0].streak, 5);
        assert_eq!(habits.bad[0].streak, 0);
        assert!(scheduler.rollover_armed());
        assert!(scheduler.reminders_armed());
    }

    #[tokio::test]
    async fn timers_follow_settings() {
        let store = store_on(day(10), AppData::with_sample_habits());
        let notifier = RecordingNotifier::new(Permission::Granted);
        let scheduler = Scheduler::new(store, notifier.clone(), Duration::from_secs(3600));

        scheduler.apply(&Settings {
            dark_mode: false,
            notifications: false,
            streak_reset: false,
        });
        assert!(!scheduler.rollover_armed());
        assert!(!scheduler.reminders_armed());
        assert_eq!(notifier.requests.load(Ordering::SeqCst), 0);

        scheduler.apply(&Settings::default());
        assert!(scheduler.rollover_armed());
        assert!(scheduler.reminders_armed());
        assert_eq!(scheduler.permission(), Permission::Granted);

        scheduler.shutdown();
        assert!(!scheduler.rollover_armed());
        assert!(!scheduler.reminders_armed());
    }

    #[tokio::test]
    async fn denied_permission_keeps_reminders_off() {
        let store = store_on(day(10), AppData::with_sample_habits());
        let notifier = RecordingNotifier::new(Permission::Denied);
        let scheduler = Scheduler::new(store, notifier.clone(), Duration::from_secs(3600));

        scheduler.apply(&Settings::default());
        assert!(!scheduler.reminders_armed());
        scheduler.apply(&Settings::default());
        assert_eq!(notifier.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn midnight_timer_rolls_into_next_day() {
        let mut data = AppData::default();
        let mut kept = Habit::new(1, "Run", HabitKind::Good);
        kept.marked = true;
        kept.streak = 3;
        kept.last_marked_date = Some(day(10));
        let mut stale = Habit::new(2, "Soda", HabitKind::Bad);
        stale.streak = 2;
        stale.last_marked_date = Some(day(8));
        data.habits.good.push(kept);
        data.habits.bad.push(stale);

        let clock = FixedClock(day(10).and_hms_opt(23, 59, 0).unwrap());
        let store = HabitStore::new(data, Arc::new(clock));
        let scheduler = Scheduler::new(
            store.clone(),
            RecordingNotifier::new(Permission::Granted),
            Duration::from_secs(3600),
        );
        scheduler.apply(&Settings {
            dark_mode: false,
            notifications: false,
            streak_reset: true,
        });

        sleep(Duration::from_secs(30)).await;
        let habits = store.snapshot().await.habits;
        assert!(habits.good[0].marked, "swept before midnight");
        assert_eq!(habits.bad[0].streak, 2);

        sleep(Duration::from_secs(31)).await;
        let habits = store.snapshot().await.habits;
        assert!(!habits.good[0].marked);
        assert_eq!(habits.good[0].streak, 3);
        assert_eq!(habits.bad[0].streak, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reminder_tick_notifies_while_habits_are_open() {
        let store = store_on(day(10), AppData::with_sample_habits());
        let notifier = RecordingNotifier::new(Permission::Granted);
        let scheduler = Scheduler::new(store.clone(), notifier.clone(), Duration::from_secs(10));
        scheduler.apply(&Settings {
            dark_mode: false,
            notifications: true,
            streak_reset: false,
        });

        sleep(Duration::from_secs(5)).await;
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(6)).await;
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);

        for (id, kind) in [(1, HabitKind::Good), (2, HabitKind::Good), (3, HabitKind::Bad), (4, HabitKind::Bad)] {
            store.dispatch(Action::Toggle { id, kind }).await.unwrap();
        }
        sleep(Duration::from_secs(10)).await;
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);

        scheduler.shutdown();
        store.dispatch(Action::Toggle { id: 1, kind: HabitKind::Good }).await.unwrap();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn permission_parses_case_insensitively() {
        assert_eq!("GRANTED".parse::<Permission>(), Ok(Permission::Granted));
        assert!("maybe".parse::<Permission>().is_err());
    }
}
