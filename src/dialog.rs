use crate::models::Recommendation;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogHabit {
    pub id: u64,
    pub name: String,
}

/// Transient state of the AI recommendations dialog. Replies are tagged with
/// the generation current when they were requested; closing or re-opening
/// the dialog bumps the generation so late replies are dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationDialog {
    pub open: bool,
    pub generation: u64,
    pub habit: Option<DialogHabit>,
    pub loading: bool,
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(skip)]
    pending: u32,
}

impl RecommendationDialog {
    pub fn open(&mut self, habit: DialogHabit) -> u64 {
        self.generation += 1;
        self.open = true;
        self.habit = Some(habit);
        self.recommendations = None;
        self.pending = 1;
        self.loading = true;
        self.generation
    }

    /// Starts another request for the open habit under the current
    /// generation.
    pub fn refresh(&mut self) -> Option<(u64, String)> {
        if !self.open {
            return None;
        }
        let name = self.habit.as_ref()?.name.clone();
        self.pending += 1;
        self.loading = true;
        Some((self.generation, name))
    }

    pub fn close(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    /// Applies a reply; returns `false` when it arrived for a dialog that has
    /// since been closed or re-opened.
    pub fn resolve(&mut self, generation: u64, recommendations: Vec<Recommendation>) -> bool {
        if !self.open || generation != self.generation {
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        self.loading = self.pending > 0;
        self.recommendations = Some(recommendations);
        true
    }
}
