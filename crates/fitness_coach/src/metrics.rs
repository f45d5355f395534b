//! Calorie and macronutrient targets.
//!
//! BMR uses the Mifflin-St Jeor equation, TDEE applies the usual activity
//! multipliers, and the goal adjusts TDEE by a percentage band. Macros are
//! derived per bound of the goal-calorie band:
//!
//! - protein: 1.6 to 2.2 g per kg of body weight
//! - fats: 20% to 30% of calories, 9 kcal/g
//! - carbs: 80% to 120% of what remains after protein and fats, 4 kcal/g
//!
//! Everything here is pure. Rounding happens once per reported value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::{ActivityLevel, Goal, Sex, UserProfile};

const PROTEIN_G_PER_KG_MIN: f64 = 1.6;
const PROTEIN_G_PER_KG_MAX: f64 = 2.2;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Inclusive integer range. Calories for energy ranges, grams for macros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    fn ordered(self) -> Self {
        Self {
            min: self.min.min(self.max),
            max: self.min.max(self.max),
        }
    }

    fn clamp_non_negative(self) -> Self {
        Self {
            min: self.min.max(0),
            max: self.max.max(0),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResult {
    pub maintenance_calories: i64,
    pub goal_calories: Range,
    pub protein: Range,
    pub fats: Range,
    pub carbs: Range,
}

/// Round half up: `2.5 -> 3`, `-2.5 -> -2`.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Basal metabolic rate in kcal/day.
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Multiplier for an activity label. Unknown labels count as sedentary.
pub fn activity_multiplier(level: &str) -> f64 {
    ActivityLevel::parse(level)
        .unwrap_or(ActivityLevel::Sedentary)
        .multiplier()
}

pub fn tdee(bmr: f64, multiplier: f64) -> f64 {
    bmr * multiplier
}

pub fn goal_calories(tdee: f64, goal: Goal) -> Range {
    let (lo, hi) = match goal {
        Goal::Bulk => (1.10, 1.20),
        Goal::Cut => (0.80, 0.90),
        Goal::Maintain => (1.0, 1.0),
    };
    Range::new(round_half_up(tdee * lo), round_half_up(tdee * hi))
}

pub fn protein_range(weight_kg: f64) -> Range {
    Range::new(
        round_half_up(weight_kg * PROTEIN_G_PER_KG_MIN),
        round_half_up(weight_kg * PROTEIN_G_PER_KG_MAX),
    )
}

pub fn fats_range(calories: i64) -> Range {
    let c = calories as f64;
    Range::new(
        round_half_up(c * 0.20 / KCAL_PER_G_FAT),
        round_half_up(c * 0.30 / KCAL_PER_G_FAT),
    )
}

/// Carb grams left over once protein and fats are paid for.
///
/// Can be negative for heavy users on a small calorie budget.
pub fn carbs_range(total_calories: i64, protein_g: i64, fats_g: i64) -> Range {
    let remaining = total_calories as f64
        - protein_g as f64 * KCAL_PER_G_PROTEIN
        - fats_g as f64 * KCAL_PER_G_FAT;
    Range::new(
        round_half_up(remaining * 0.8 / KCAL_PER_G_CARBS),
        round_half_up(remaining * 1.2 / KCAL_PER_G_CARBS),
    )
}

/// Full target set for a validated profile.
///
/// Every reported value is non-negative and every range ascending. Tiny,
/// elderly profiles can push Mifflin-St Jeor below zero; those energy
/// figures are clamped to 0.
pub fn compute_metrics(profile: &UserProfile) -> MetricsResult {
    let bmr = bmr(profile.weight_kg, profile.height_cm, profile.age, profile.sex);
    let tdee = tdee(bmr, profile.activity_level.multiplier());
    let maintenance = round_half_up(tdee);

    let raw_goal = goal_calories(tdee, profile.goal);
    let goal = raw_goal.clamp_non_negative().ordered();
    if goal != raw_goal {
        tracing::warn!(
            tdee,
            min = raw_goal.min,
            max = raw_goal.max,
            "negative calorie target clamped to zero"
        );
    }
    let (protein, fats, carbs) = macro_split(goal, profile.weight_kg);

    MetricsResult {
        maintenance_calories: maintenance.max(0),
        goal_calories: goal,
        protein,
        fats,
        carbs,
    }
}

/// Lower macro bounds come from the lower calorie bound, upper from the
/// upper one. Carbs therefore need not come out ascending.
fn macro_split(goal: Range, weight_kg: f64) -> (Range, Range, Range) {
    let protein = protein_range(weight_kg);
    let fats = Range::new(fats_range(goal.min).min, fats_range(goal.max).max);
    let raw = Range::new(
        carbs_range(goal.min, protein.min, fats.min).min,
        carbs_range(goal.max, protein.max, fats.max).max,
    );

    let mut carbs = raw.clamp_non_negative();
    if carbs != raw {
        tracing::warn!(
            min = raw.min,
            max = raw.max,
            goal_min = goal.min,
            "negative carb budget clamped to zero"
        );
    }
    if carbs.min > carbs.max {
        tracing::debug!(min = carbs.min, max = carbs.max, "carb bounds reordered");
        carbs = carbs.ordered();
    }

    (protein, fats, carbs)
}
