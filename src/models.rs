use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Streak length from which the page celebrates a habit.
pub const MILESTONE_STREAK: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    #[default]
    Good,
    Bad,
}

impl HabitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitKind::Good => "good",
            HabitKind::Bad => "bad",
        }
    }
}

impl fmt::Display for HabitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    pub id: u64,
    pub name: String,
    pub kind: HabitKind,
    /// `completed` for good habits, `avoided` for bad ones.
    pub marked: bool,
    pub streak: u32,
    pub last_marked_date: Option<NaiveDate>,
}

impl Habit {
    pub fn new(id: u64, name: impl Into<String>, kind: HabitKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            marked: false,
            streak: 0,
            last_marked_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Habits {
    pub good: Vec<Habit>,
    pub bad: Vec<Habit>,
}

impl Habits {
    pub fn partition(&self, kind: HabitKind) -> &[Habit] {
        match kind {
            HabitKind::Good => &self.good,
            HabitKind::Bad => &self.bad,
        }
    }

    pub fn partition_mut(&mut self, kind: HabitKind) -> &mut Vec<Habit> {
        match kind {
            HabitKind::Good => &mut self.good,
            HabitKind::Bad => &mut self.bad,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Habit> {
        self.good.iter().chain(self.bad.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Habit> {
        self.good.iter_mut().chain(self.bad.iter_mut())
    }

    pub fn find(&self, id: u64, kind: HabitKind) -> Option<&Habit> {
        self.partition(kind).iter().find(|habit| habit.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
    pub streak_reset: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
            streak_reset: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub streak_reset: Option<bool>,
}

impl SettingsPatch {
    /// Patch that flips a single named setting relative to `current`.
    pub fn toggle(name: SettingName, current: &Settings) -> Self {
        let mut patch = Self::default();
        match name {
            SettingName::DarkMode => patch.dark_mode = Some(!current.dark_mode),
            SettingName::Notifications => patch.notifications = Some(!current.notifications),
            SettingName::StreakReset => patch.streak_reset = Some(!current.streak_reset),
        }
        patch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingName {
    DarkMode,
    Notifications,
    StreakReset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppData {
    pub habits: Habits,
    pub settings: Settings,
}

impl AppData {
    pub fn with_sample_habits() -> Self {
        Self {
            habits: Habits {
                good: vec![
                    Habit::new(1, "Daily Exercise", HabitKind::Good),
                    Habit::new(2, "Read 30 mins", HabitKind::Good),
                ],
                bad: vec![
                    Habit::new(3, "Smoking", HabitKind::Bad),
                    Habit::new(4, "Late Night Snacking", HabitKind::Bad),
                ],
            },
            settings: Settings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
    #[serde(default)]
    pub kind: HabitKind,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub id: u64,
    pub name: String,
    pub kind: HabitKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avoided: Option<bool>,
    pub streak: u32,
    pub last_marked_date: Option<NaiveDate>,
    pub milestone: bool,
}

impl From<&Habit> for HabitResponse {
    fn from(habit: &Habit) -> Self {
        let (completed, avoided) = match habit.kind {
            HabitKind::Good => (Some(habit.marked), None),
            HabitKind::Bad => (None, Some(habit.marked)),
        };
        Self {
            id: habit.id,
            name: habit.name.clone(),
            kind: habit.kind,
            completed,
            avoided,
            streak: habit.streak,
            last_marked_date: habit.last_marked_date,
            milestone: habit.streak >= MILESTONE_STREAK,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PartitionsResponse {
    pub good: Vec<HabitResponse>,
    pub bad: Vec<HabitResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub good: u8,
    pub bad: u8,
}

#[derive(Debug, Serialize)]
pub struct HabitsResponse {
    pub today: NaiveDate,
    pub habits: PartitionsResponse,
    pub settings: Settings,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}
