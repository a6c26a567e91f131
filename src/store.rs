//! Pure transitions over [`AppData`].
//!
//! Every mutation, whether it comes from a request handler or a timer, is an
//! [`Action`] run through [`reduce`]. A rejected action leaves the input
//! untouched.

use crate::errors::ValidationError;
use crate::models::{AppData, Habit, HabitKind, Habits, Progress, SettingsPatch};
use crate::streak;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddHabit { name: String, kind: HabitKind },
    DeleteHabit { id: u64, kind: HabitKind },
    Toggle { id: u64, kind: HabitKind },
    UndoToday { id: u64, kind: HabitKind },
    /// Daily sweep into `day`.
    Rollover { day: NaiveDate },
    UpdateSettings(SettingsPatch),
}

pub fn reduce(data: &AppData, action: Action, today: NaiveDate) -> Result<AppData, ValidationError> {
    let mut next = data.clone();
    match action {
        Action::AddHabit { name, kind } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyName);
            }
            let id = next_id(&next.habits);
            next.habits.partition_mut(kind).push(Habit::new(id, name, kind));
        }
        Action::DeleteHabit { id, kind } => {
            next.habits.partition_mut(kind).retain(|habit| habit.id != id);
        }
        Action::Toggle { id, kind } => {
            if let Some(habit) = find_mut(&mut next.habits, id, kind) {
                streak::toggle(habit, today);
            }
        }
        Action::UndoToday { id, kind } => {
            if let Some(habit) = find_mut(&mut next.habits, id, kind) {
                streak::undo_today(habit);
            }
        }
        Action::Rollover { day } => {
            for habit in next.habits.iter_mut() {
                streak::rollover(habit, day);
            }
        }
        Action::UpdateSettings(patch) => {
            let settings = &mut next.settings;
            if let Some(value) = patch.dark_mode {
                settings.dark_mode = value;
            }
            if let Some(value) = patch.notifications {
                settings.notifications = value;
            }
            if let Some(value) = patch.streak_reset {
                settings.streak_reset = value;
            }
        }
    }
    Ok(next)
}

/// One past the largest id in either partition, or 1 for an empty store.
pub fn next_id(habits: &Habits) -> u64 {
    habits.iter().map(|habit| habit.id).max().unwrap_or(0) + 1
}

pub fn has_unmarked(habits: &Habits) -> bool {
    habits.iter().any(|habit| !habit.marked)
}

pub fn progress(habits: &Habits) -> Progress {
    Progress {
        good: percent_marked(&habits.good),
        bad: percent_marked(&habits.bad),
    }
}

fn percent_marked(habits: &[Habit]) -> u8 {
    if habits.is_empty() {
        return 0;
    }
    let marked = habits.iter().filter(|habit| habit.marked).count();
    (marked as f64 / habits.len() as f64 * 100.0).round() as u8
}

fn find_mut(habits: &mut Habits, id: u64, kind: HabitKind) -> Option<&mut Habit> {
    habits.partition_mut(kind).iter_mut().find(|habit| habit.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn add(data: &AppData, name: &str, kind: HabitKind) -> AppData {
        reduce(
            data,
            Action::AddHabit {
                name: name.to_string(),
                kind,
            },
            today(),
        )
        .expect("add habit")
    }

    #[test]
    fn add_trims_name_and_uses_defaults() {
        let data = add(&AppData::default(), "  Stretch  ", HabitKind::Good);
        let habit = &data.habits.good[0];
        assert_eq!(habit.id, 1);
        assert_eq!(habit.name, "Stretch");
        assert_eq!(habit.streak, 0);
        assert!(!habit.marked);
        assert_eq!(habit.last_marked_date, None);
    }

    #[test]
    fn add_rejects_blank_name_without_mutation() {
        let data = AppData::with_sample_habits();
        let err = reduce(
            &data,
            Action::AddHabit {
                name: "   ".to_string(),
                kind: HabitKind::Bad,
            },
            today(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
        assert_eq!(data, AppData::with_sample_habits());
    }

    #[test]
    fn ids_continue_from_maximum_across_partitions() {
        let data = AppData::with_sample_habits();
        let data = add(&data, "Doomscrolling", HabitKind::Bad);
        assert_eq!(data.habits.bad.last().unwrap().id, 5);

        let data = reduce(&data, Action::DeleteHabit { id: 2, kind: HabitKind::Good }, today()).unwrap();
        let data = add(&data, "Journal", HabitKind::Good);
        assert_eq!(data.habits.good.last().unwrap().id, 6);
    }

    #[test]
    fn ids_stay_unique_through_adds_and_deletes() {
        let mut data = AppData::default();
        let script = [
            (true, HabitKind::Good, 0),
            (true, HabitKind::Bad, 0),
            (false, HabitKind::Bad, 2),
            (true, HabitKind::Bad, 0),
            (true, HabitKind::Good, 0),
            (false, HabitKind::Good, 4),
            (true, HabitKind::Good, 0),
            (false, HabitKind::Good, 1),
            (true, HabitKind::Bad, 0),
        ];
        for (is_add, kind, id) in script {
            data = if is_add {
                add(&data, "same name", kind)
            } else {
                reduce(&data, Action::DeleteHabit { id, kind }, today()).unwrap()
            };
            let ids: Vec<u64> = data.habits.iter().map(|habit| habit.id).collect();
            let unique: HashSet<u64> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len(), "duplicate id in {ids:?}");
        }
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let data = add(&AppData::default(), "Read", HabitKind::Good);
        let data = add(&data, "Read", HabitKind::Good);
        assert_eq!(data.habits.good.len(), 2);
    }

    #[test]
    fn delete_missing_habit_is_noop() {
        let data = AppData::with_sample_habits();
        let next = reduce(&data, Action::DeleteHabit { id: 1, kind: HabitKind::Bad }, today()).unwrap();
        assert_eq!(next, data);
    }

    #[test]
    fn toggle_and_undo_flow_through_reduce() {
        let data = AppData::with_sample_habits();
        let data = reduce(&data, Action::Toggle { id: 3, kind: HabitKind::Bad }, today()).unwrap();
        let habit = data.habits.find(3, HabitKind::Bad).unwrap();
        assert!(habit.marked);
        assert_eq!(habit.streak, 1);
        assert_eq!(habit.last_marked_date, Some(today()));

        let data = reduce(&data, Action::UndoToday { id: 3, kind: HabitKind::Bad }, today()).unwrap();
        let habit = data.habits.find(3, HabitKind::Bad).unwrap();
        assert!(!habit.marked);
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.last_marked_date, None);
    }

    #[test]
    fn toggle_uses_kind_partition() {
        let data = AppData::with_sample_habits();
        let next = reduce(&data, Action::Toggle { id: 1, kind: HabitKind::Bad }, today()).unwrap();
        assert_eq!(next, data);
    }

    #[test]
    fn rollover_sweeps_both_partitions() {
        let mut data = AppData::with_sample_habits();
        let yesterday = today() - chrono::Duration::days(1);
        data.habits.good[0].marked = true;
        data.habits.good[0].streak = 5;
        data.habits.good[0].last_marked_date = Some(yesterday);
        data.habits.bad[0].marked = true;
        data.habits.bad[0].streak = 3;
        data.habits.bad[0].last_marked_date = Some(yesterday - chrono::Duration::days(1));

        let next = reduce(&data, Action::Rollover { day: today() }, today()).unwrap();
        assert!(next.habits.iter().all(|habit| !habit.marked));
        assert_eq!(next.habits.good[0].streak, 5);
        assert_eq!(next.habits.bad[0].streak, 0);
    }

    #[test]
    fn settings_patch_only_touches_given_fields() {
        let data = AppData::default();
        let patch = SettingsPatch {
            dark_mode: Some(true),
            ..SettingsPatch::default()
        };
        let next = reduce(&data, Action::UpdateSettings(patch), today()).unwrap();
        assert!(next.settings.dark_mode);
        assert!(next.settings.notifications);
        assert!(next.settings.streak_reset);
    }

    #[test]
    fn progress_rounds_percent_marked() {
        let mut data = AppData::with_sample_habits();
        data = add(&data, "Floss", HabitKind::Good);
        data.habits.good[0].marked = true;
        data.habits.bad[0].marked = true;
        data.habits.bad[1].marked = true;
        let progress = progress(&data.habits);
        assert_eq!(progress.good, 33);
        assert_eq!(progress.bad, 100);
        assert_eq!(super::progress(&Habits::default()).good, 0);
    }

    #[test]
    fn unmarked_detection() {
        let mut data = AppData::with_sample_habits();
        assert!(has_unmarked(&data.habits));
        for habit in data.habits.iter_mut() {
            habit.marked = true;
        }
        assert!(!has_unmarked(&data.habits));
        assert!(!has_unmarked(&Habits::default()));
    }
}
