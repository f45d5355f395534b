//! Workout preferences picked out of free-text chat messages.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPreferences {
    pub workout_type: Option<String>,
    pub location: Option<String>,
    pub difficulty: Option<String>,
}

impl WorkoutPreferences {
    /// Fill unset fields from `other`. Values already chosen are kept.
    pub fn merge_missing(&mut self, other: WorkoutPreferences) {
        if self.workout_type.is_none() {
            self.workout_type = other.workout_type;
        }
        if self.location.is_none() {
            self.location = other.location;
        }
        if self.difficulty.is_none() {
            self.difficulty = other.difficulty;
        }
    }
}

fn first_match(lower: &str, rules: Rules) -> Option<String> {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, value)| (*value).to_string())
}

type Rules = &'static [(&'static [&'static str], &'static str)];

const WORKOUT_TYPES: Rules = &[
    (&["full", "body"], "full-body"),
    (&["split"], "split"),
    (&["push", "pull", "leg"], "push-pull-legs"),
];

const LOCATIONS: Rules = &[(&["gym", "fitness"], "gym"), (&["home", "house"], "home")];

const DIFFICULTIES: Rules = &[
    (&["beginner"], "Beginner"),
    (&["intermediate"], "Intermediate"),
    (&["advanced"], "Advanced"),
];

pub fn detect_preferences(text: &str) -> WorkoutPreferences {
    let lower = text.to_lowercase();
    WorkoutPreferences {
        workout_type: first_match(&lower, WORKOUT_TYPES),
        location: first_match(&lower, LOCATIONS),
        difficulty: first_match(&lower, DIFFICULTIES),
    }
}
