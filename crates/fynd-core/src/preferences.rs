use serde::{Deserialize, Serialize};

/// Item condition, best-to-worst as Blocket sellers describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Ny,
    SomNy,
    Bra,
    Ok,
    Defekt,
}

impl Condition {
    /// The lowercase label used when matching against extracted
    /// `condition` attributes.
    #[must_use]
    pub fn as_label(self) -> &'static str {
        match self {
            Condition::Ny => "ny",
            Condition::SomNy => "som ny",
            Condition::Bra => "bra",
            Condition::Ok => "ok",
            Condition::Defekt => "defekt",
        }
    }
}

/// How a soft criterion's value relates to the extracted attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Equals,
    Min,
    Max,
    Contains,
}

/// One soft (non-filtering) preference criterion.
///
/// Soft criteria never remove candidates; they feed the preference
/// component of the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceCriterion {
    pub attribute: String,
    pub value: serde_json::Value,
    pub constraint: ConstraintKind,
}

/// A user's constraints for one watch or pipeline run.
///
/// `min_price`/`max_price`/`locations`/`require_shipping` are hard
/// constraints applied by the candidate filter; everything else is soft
/// and only affects scoring. Immutable within a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub require_shipping: bool,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub additional_requirements: Option<String>,
    /// Soft criteria, including any added from domain-specific dynamic
    /// questions after discovery.
    #[serde(default)]
    pub soft_criteria: Vec<PreferenceCriterion>,
}

impl PreferenceProfile {
    /// All soft criteria, with a requested condition folded in as an
    /// `equals` criterion on the extracted `condition` attribute.
    #[must_use]
    pub fn all_soft_criteria(&self) -> Vec<PreferenceCriterion> {
        let mut criteria = self.soft_criteria.clone();
        if let Some(condition) = self.condition {
            criteria.push(PreferenceCriterion {
                attribute: "condition".to_string(),
                value: serde_json::Value::String(condition.as_label().to_string()),
                constraint: ConstraintKind::Equals,
            });
        }
        criteria
    }

    /// True when the profile applies at least one hard constraint.
    #[must_use]
    pub fn has_hard_constraints(&self) -> bool {
        self.min_price.is_some()
            || self.max_price.is_some()
            || !self.locations.is_empty()
            || self.require_shipping
    }
}
