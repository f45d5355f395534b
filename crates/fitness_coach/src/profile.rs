//! Body-metric input: the raw form payload ([`UserDetails`]) and its
//! validated, unit-normalized form ([`UserProfile`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::metrics::{self, MetricsResult};
use crate::units;

/// Biological sex as used by Mifflin-St Jeor. Only the two published
/// equations exist, so only two values are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(format!("unsupported sex: {other}")),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ActivityLevel {
    #[default]
    #[serde(rename = "Sedentary")]
    Sedentary,
    #[serde(rename = "Lightly Active")]
    LightlyActive,
    #[serde(rename = "Moderately Active")]
    ModeratelyActive,
    #[serde(rename = "Very Active")]
    VeryActive,
    #[serde(rename = "Extra Active")]
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Form label, e.g. `"Lightly Active"`.
    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtraActive => "Extra Active",
        }
    }

    /// TDEE multiplier for this level.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Strict lookup. Accepts the form label (`"Very Active"`) or the
    /// compact name (`"VeryActive"`), case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.label() == s || level.label().replace(' ', "") == s)
    }
}

/// Unknown labels fall back to sedentary.
impl From<String> for ActivityLevel {
    fn from(value: String) -> Self {
        Self::parse(value.trim()).unwrap_or(ActivityLevel::Sedentary)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Goal {
    Bulk,
    Cut,
    Maintain,
}

impl Goal {
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Bulk => "bulk",
            Goal::Cut => "cut",
            Goal::Maintain => "maintain",
        }
    }
}

/// Anything that is not `bulk` or `cut` means maintenance.
impl From<String> for Goal {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "bulk" => Goal::Bulk,
            "cut" => Goal::Cut,
            _ => Goal::Maintain,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    Ft,
}

/// Form payload as the browser sends it. Every field may be missing or an
/// empty string while the user is still typing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "blank_default")]
    pub weight_unit: WeightUnit,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub height_feet: Option<f64>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub height_inches: Option<f64>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, deserialize_with = "blank_default")]
    pub height_unit: HeightUnit,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
}

/// Treat `null` and `""` as absent, accept numeric strings for numeric fields.
pub(crate) fn blank_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    use serde::de::Error;
    let value: Option<Value> = Option::deserialize(deserializer)?;
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => match serde_json::from_value::<T>(Value::String(s.clone())) {
            Ok(v) => return Ok(Some(v)),
            Err(err) => match serde_json::from_str::<Value>(s.trim()) {
                Ok(n @ Value::Number(_)) => n,
                _ => return Err(D::Error::custom(err)),
            },
        },
        Some(other) => other,
    };
    serde_json::from_value(value).map(Some).map_err(D::Error::custom)
}

fn blank_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    blank_opt(deserializer).map(Option::unwrap_or_default)
}

impl UserDetails {
    /// Weight in kilograms, converting from pounds when needed.
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.map(|w| match self.weight_unit {
            WeightUnit::Kg => w,
            WeightUnit::Lbs => units::pounds_to_kg(w),
        })
    }

    /// Height in centimeters for whichever unit the form was filled in.
    pub fn height_cm(&self) -> Option<f64> {
        match self.height_unit {
            HeightUnit::Cm => self.height_cm,
            HeightUnit::Ft => self
                .height_feet
                .map(|ft| units::feet_inches_to_cm(ft, self.height_inches.unwrap_or(0.0))),
        }
    }

    /// Check the form and build a calculation-ready profile.
    ///
    /// All field errors are collected, not just the first one.
    pub fn validate(&self) -> Result<UserProfile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        match self.weight {
            None => errors.add("weight", "Weight is required"),
            Some(w) if w <= 0.0 => errors.add("weight", "Weight must be greater than 0"),
            Some(_) => {}
        }

        match self.age {
            None => errors.add("age", "Age is required"),
            Some(a) if a == 0 || a > 120 => errors.add("age", "Please enter a valid age (1-120)"),
            Some(_) => {}
        }

        if self.sex.is_none() {
            errors.add("sex", "Sex is required");
        }
        if self.goal.is_none() {
            errors.add("goal", "Fitness goal is required");
        }

        match self.height_unit {
            HeightUnit::Ft => {
                match self.height_feet {
                    None => errors.add("heightFeet", "Feet is required"),
                    Some(ft) if ft < 0.0 => errors.add("heightFeet", "Feet cannot be negative"),
                    Some(_) => {}
                }
                match self.height_inches {
                    None => errors.add("heightInches", "Inches is required"),
                    Some(inches) if !(0.0..12.0).contains(&inches) => {
                        errors.add("heightInches", "Inches must be between 0 and 11")
                    }
                    Some(_) => {}
                }
                if !errors.contains("heightFeet") && !errors.contains("heightInches") {
                    let cm = self.height_cm().unwrap_or(0.0);
                    if cm <= 0.0 || cm > 300.0 {
                        errors.add("heightFeet", "Please enter a valid height (up to 9'10\")");
                    }
                }
            }
            HeightUnit::Cm => match self.height_cm {
                None => errors.add("heightCm", "Height is required"),
                Some(cm) if cm <= 0.0 || cm > 300.0 => {
                    errors.add("heightCm", "Please enter a valid height in cm (1-300)")
                }
                Some(_) => {}
            },
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        match (
            self.weight_kg(),
            self.height_cm(),
            self.age,
            self.sex,
            self.goal,
        ) {
            (Some(weight_kg), Some(height_cm), Some(age), Some(sex), Some(goal)) => {
                Ok(UserProfile {
                    weight_kg,
                    height_cm,
                    age,
                    sex,
                    activity_level: self
                        .activity_level
                        .clone()
                        .map(ActivityLevel::from)
                        .unwrap_or_default(),
                    goal,
                })
            }
            // every None above was already reported
            _ => Err(errors),
        }
    }
}

/// Field name (camelCase, as in the form) to message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{} invalid profile field(s)", .0.len())]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

/// Validated anthropometrics in metric units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl UserProfile {
    pub fn metrics(&self) -> MetricsResult {
        metrics::compute_metrics(self)
    }
}
