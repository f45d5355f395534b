//! Keyword gate for chat input.
//!
//! Matching is lowercase substring containment, so `"weights"` hits
//! `"weight"` and `"backpack"` hits `"back"`.

use serde::{Deserialize, Serialize};

const FITNESS_KEYWORDS: &[&str] = &[
    "workout", "exercise", "training", "gym", "fitness", "muscle", "strength", "cardio",
    "weight", "lifting", "reps", "sets", "routine", "program", "plan", "diet", "nutrition",
    "calories", "protein", "carbs", "fats", "macros", "meal", "supplement", "vitamin",
    "mineral", "bmr", "tdee", "metabolism", "body fat", "lean mass", "bulking", "cutting",
    "maintenance", "gain", "lose", "weight loss", "muscle gain", "recovery", "rest", "sleep",
    "hydration", "water", "stretching", "flexibility", "mobility", "injury", "pain",
    "soreness", "cramps", "fatigue", "energy", "endurance", "performance", "athlete",
    "sports", "running", "cycling", "swimming", "push", "pull", "legs", "upper body",
    "lower body", "core", "abs", "chest", "back", "shoulders", "arms", "glutes", "quads",
    "hamstrings", "calves", "biceps", "triceps",
];

const WORKOUT_KEYWORDS: &[&str] = &[
    "workout", "routine", "training", "program", "plan", "exercise", "push", "pull", "legs",
    "4-day", "5-day", "split",
];

const NUTRITION_KEYWORDS: &[&str] = &[
    "diet", "nutrition", "calories", "protein", "carbs", "fats", "macros", "meal", "bmr",
    "tdee", "bulking", "cutting", "maintenance",
];

/// Sub-type of an in-domain question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessType {
    Workout,
    Nutrition,
    General,
}

/// Outcome of classifying one chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    OutOfDomain,
    Workout,
    Nutrition,
    General,
}

impl QueryClass {
    pub fn in_domain(self) -> bool {
        !matches!(self, QueryClass::OutOfDomain)
    }

    pub fn subtype(self) -> Option<FitnessType> {
        match self {
            QueryClass::OutOfDomain => None,
            QueryClass::Workout => Some(FitnessType::Workout),
            QueryClass::Nutrition => Some(FitnessType::Nutrition),
            QueryClass::General => Some(FitnessType::General),
        }
    }

    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryClass::OutOfDomain => "out_of_domain",
            QueryClass::Workout => "workout",
            QueryClass::Nutrition => "nutrition",
            QueryClass::General => "general",
        }
    }
}

impl From<FitnessType> for QueryClass {
    fn from(t: FitnessType) -> Self {
        match t {
            FitnessType::Workout => QueryClass::Workout,
            FitnessType::Nutrition => QueryClass::Nutrition,
            FitnessType::General => QueryClass::General,
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|k| haystack.contains(k))
}

pub fn is_fitness_related(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    contains_any(&text.to_lowercase(), FITNESS_KEYWORDS)
}

/// Workout vocabulary wins over nutrition vocabulary.
pub fn classify_fitness_type(text: &str) -> FitnessType {
    let lower = text.to_lowercase();
    if contains_any(&lower, WORKOUT_KEYWORDS) {
        FitnessType::Workout
    } else if contains_any(&lower, NUTRITION_KEYWORDS) {
        FitnessType::Nutrition
    } else {
        FitnessType::General
    }
}

pub fn classify(text: &str) -> QueryClass {
    if !is_fitness_related(text) {
        return QueryClass::OutOfDomain;
    }
    classify_fitness_type(text).into()
}
