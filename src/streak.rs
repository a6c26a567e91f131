//! Calendar-day rules for streaks.
//!
//! Days are compared as `NaiveDate`s in local time, never as elapsed
//! durations, so a mark at 23:59 followed by one at 00:01 counts as two
//! consecutive days.

use crate::models::Habit;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub fn yesterday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(1)
}

pub fn is_yesterday(date: Option<NaiveDate>, today: NaiveDate) -> bool {
    date == Some(yesterday(today))
}

/// Streak after marking on `today`, given the previous mark. Re-marking a day
/// that was already counted keeps the streak as it was.
pub fn next_streak(previous: u32, last_marked: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_marked {
        None => 1,
        Some(date) if date == today => previous.max(1),
        Some(_) if is_yesterday(last_marked, today) => previous.saturating_add(1),
        Some(_) => 1,
    }
}

/// Flip the status flag. Un-marking leaves streak and date alone so today's
/// tick can be withdrawn without losing the run built up to yesterday.
pub fn toggle(habit: &mut Habit, today: NaiveDate) {
    if habit.marked {
        habit.marked = false;
        return;
    }

    habit.streak = next_streak(habit.streak, habit.last_marked_date, today);
    habit.last_marked_date = Some(today);
    habit.marked = true;
}

pub fn undo_today(habit: &mut Habit) {
    habit.marked = false;
    habit.streak = 0;
    habit.last_marked_date = None;
}

/// Daily sweep into `today`: the streak survives only when the habit was
/// marked yesterday.
pub fn rollover(habit: &mut Habit, today: NaiveDate) {
    habit.marked = false;
    if !is_yesterday(habit.last_marked_date, today) {
        habit.streak = 0;
    }
}

/// Next local midnight strictly after `now`, and the day it starts.
///
/// The wait is naive wall-clock time, so on a daylight-saving change day the
/// sweep fires an hour early or late. The returned day is exact either way,
/// and that is what the rollover uses.
pub fn next_midnight(now: NaiveDateTime) -> (NaiveDate, std::time::Duration) {
    let day = now.date() + Duration::days(1);
    let midnight = day.and_time(NaiveTime::MIN);
    let wait = (midnight - now).to_std().unwrap_or_default();
    (day, wait)
}
