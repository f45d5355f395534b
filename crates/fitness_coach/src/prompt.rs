//! Prompt templates for the generative backend.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::classifier::QueryClass;
use crate::coach::CoachRequest;
use crate::metrics::{MetricsResult, Range};
use crate::profile::{HeightUnit, UserDetails};

/// Prepended to every prompt, followed by a blank line.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional fitness coach. Provide structured, \
actionable fitness advice. Always format workout plans with clear sections. Keep responses \
concise and professional.";

const NOT_PROVIDED: &str = "Not provided";
const DEFAULT_DIFFICULTY: &str = "Beginner";

const WORKOUT_STRUCTURE: &str = "Please provide a workout plan that includes:
1. Warm-up (3-5 min)
2. Main Workout (5-8 exercises with sets x reps and rest time)
3. Cool-down (1-2 stretches)
4. Notes (1 short tip)

Format the response in this exact structure:
## Title (Goal + Gym/Home + Level)

### Warm-up
- [Exercise] - [Duration]

### Main Workout
1. [Exercise Name]
   - Sets x Reps: [sets] x [reps]
   - Rest: [time]

(Repeat for 5-8 exercises)

### Cool-down
- [Stretch] - [Duration]

### Notes
- [1 short actionable tip]

Keep response between 80-140 words. No disclaimers or long paragraphs.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Workout,
    Nutrition,
    General,
}

/// Sampling parameters sent with every request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub kind: TemplateKind,
    pub text: String,
    pub generation: GenerationConfig,
}

impl PromptRequest {
    /// Wrap a raw prompt with the system instruction.
    pub fn new(kind: TemplateKind, prompt: &str) -> Self {
        Self {
            kind,
            text: format!("{SYSTEM_INSTRUCTION}\n\n{prompt}"),
            generation: GenerationConfig::default(),
        }
    }
}

/// Pick a template for `class` and fill it from `request`.
///
/// The workout template needs both a workout type and a location, the
/// nutrition template needs computed results. Anything short of that gets
/// the general template.
pub fn build_prompt(class: QueryClass, request: &CoachRequest) -> PromptRequest {
    let details = request.user_details.as_ref();
    let results = request.results.as_ref();
    let question = request.user_input.as_deref().unwrap_or_default();

    match (class, &request.workout_type, &request.location, results) {
        (QueryClass::Workout, Some(workout_type), Some(location), _) => {
            let mut p = format!(
                "Generate a {workout_type} workout plan for {location} workouts based on the following user details:\n\n"
            );
            push_profile(&mut p, details);
            let difficulty = request.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY);
            let _ = writeln!(p, "- Difficulty Level: {difficulty}");
            p.push('\n');
            push_results(&mut p, results);
            p.push('\n');
            p.push_str(WORKOUT_STRUCTURE);
            PromptRequest::new(TemplateKind::Workout, &p)
        }
        (QueryClass::Nutrition, _, _, Some(_)) => {
            let mut p = String::from(
                "Answer the following nutrition-related question with specific numbers based on the user's results:\n\n",
            );
            let _ = writeln!(p, "Question: {question}\n");
            push_profile(&mut p, details);
            p.push('\n');
            push_results(&mut p, results);
            p.push_str(
                "\nProvide specific, actionable advice with numbers. Keep response between 80-140 words. No disclaimers.",
            );
            PromptRequest::new(TemplateKind::Nutrition, &p)
        }
        _ => {
            let mut p = String::from(
                "Answer the following fitness-related question concisely and professionally:\n\n",
            );
            let _ = writeln!(p, "Question: {question}\n");
            push_profile(&mut p, details);
            p.push('\n');
            push_results(&mut p, results);
            p.push_str(
                "\nProvide specific, actionable advice. Keep response between 80-140 words. No disclaimers.",
            );
            PromptRequest::new(TemplateKind::General, &p)
        }
    }
}

fn or_missing<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_PROVIDED.to_string(), |v| v.to_string())
}

fn weight_label(d: &UserDetails) -> Option<String> {
    d.weight.map(|w| format!("{w} {}", d.weight_unit.as_str()))
}

fn height_label(d: &UserDetails) -> Option<String> {
    match d.height_unit {
        HeightUnit::Cm => d.height_cm.map(|cm| format!("{cm} cm")),
        HeightUnit::Ft => d
            .height_feet
            .map(|ft| format!("{ft}'{}\"", d.height_inches.unwrap_or(0.0))),
    }
}

fn push_profile(p: &mut String, details: Option<&UserDetails>) {
    p.push_str("User Profile:\n");
    let _ = writeln!(p, "- Age: {}", or_missing(details.and_then(|d| d.age)));
    let _ = writeln!(p, "- Weight: {}", or_missing(details.and_then(weight_label)));
    let _ = writeln!(p, "- Height: {}", or_missing(details.and_then(height_label)));
    let _ = writeln!(p, "- Sex: {}", or_missing(details.and_then(|d| d.sex)));
    let _ = writeln!(
        p,
        "- Activity Level: {}",
        or_missing(details.and_then(|d| d.activity_level.as_deref()))
    );
    let _ = writeln!(p, "- Goal: {}", or_missing(details.and_then(|d| d.goal)));
}

fn grams(r: Range) -> String {
    format!("{r}g")
}

fn push_results(p: &mut String, results: Option<&MetricsResult>) {
    p.push_str("Results Data:\n");
    let _ = writeln!(
        p,
        "- Maintenance Calories: {}",
        or_missing(results.map(|r| r.maintenance_calories))
    );
    let _ = writeln!(p, "- Goal Calories: {}", or_missing(results.map(|r| r.goal_calories)));
    let _ = writeln!(p, "- Protein: {}", or_missing(results.map(|r| grams(r.protein))));
    let _ = writeln!(p, "- Fats: {}", or_missing(results.map(|r| grams(r.fats))));
    let _ = writeln!(p, "- Carbs: {}", or_missing(results.map(|r| grams(r.carbs))));
}
