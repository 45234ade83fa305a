//! User profile collected by the intake form.

use serde::{Deserialize, Serialize};

/// Example values pre-filled in the form and used by `plan` when no flags are given.
pub const EXAMPLE_TRANSPORTATION: &str = "gasoline car, 20 km daily commute";
pub const EXAMPLE_DIET: &str = "meat-eating, occasional fast food";
pub const EXAMPLE_ENERGY_USAGE: &str = "standard home, no solar, AC usage high";
pub const EXAMPLE_GOALS: &str = "reduce carbon footprint by 30% in 6 months";

/// Values interpolated into the prompts when a field is missing or blank.
const FALLBACK_TRANSPORTATION: &str = "car";
const FALLBACK_DIET: &str = "mixed";
const FALLBACK_ENERGY_USAGE: &str = "standard";
const FALLBACK_GOALS: &str = "reduce carbon footprint";

/// Free-text description of the user's lifestyle and goals.
///
/// Every field is optional. Accessors return the prompt fallback when a
/// field is absent or only whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
}

impl UserProfile {
    /// Profile with the form's pre-filled example values.
    pub fn example() -> Self {
        Self {
            transportation: Some(EXAMPLE_TRANSPORTATION.to_string()),
            diet: Some(EXAMPLE_DIET.to_string()),
            energy_usage: Some(EXAMPLE_ENERGY_USAGE.to_string()),
            goals: Some(EXAMPLE_GOALS.to_string()),
        }
    }

    pub fn transportation(&self) -> &str {
        field_or(&self.transportation, FALLBACK_TRANSPORTATION)
    }

    pub fn diet(&self) -> &str {
        field_or(&self.diet, FALLBACK_DIET)
    }

    pub fn energy_usage(&self) -> &str {
        field_or(&self.energy_usage, FALLBACK_ENERGY_USAGE)
    }

    pub fn goals(&self) -> &str {
        field_or(&self.goals, FALLBACK_GOALS)
    }

    /// (label, value) pairs in display order, with fallbacks applied.
    pub fn summary(&self) -> [(&'static str, &str); 4] {
        [
            ("transportation", self.transportation()),
            ("diet", self.diet()),
            ("energy_usage", self.energy_usage()),
            ("goals", self.goals()),
        ]
    }
}

fn field_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}
