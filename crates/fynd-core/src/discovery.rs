use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The inference collaborator returned a shape that violates the
/// clarification contract.
#[derive(Debug, Error)]
pub enum DomainGateError {
    #[error("confidence {confidence} is below threshold {threshold} but no clarifying question was provided")]
    MissingQuestion { confidence: f64, threshold: f64 },

    #[error("confidence {confidence} is below threshold {threshold} but the clarifying question has no options")]
    MissingOptions { confidence: f64, threshold: f64 },

    #[error("confidence {confidence} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange { confidence: f64 },
}

/// A domain-specific question the discovery step suggests asking the
/// buyer, to be answered as a soft criterion on a later run.
///
/// `id` names the extracted attribute the answer constrains (for
/// example `storage_gb`). User-facing text is Swedish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceQuestion {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Why the answer matters for price or quality in this domain.
    #[serde(default)]
    pub why: Option<String>,
}

/// A product domain inferred from a sample of listings.
///
/// `needs_clarification` is a pure function of `confidence` and the
/// configured threshold — it is computed at construction, never taken
/// from the inference source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredDomain {
    pub domain_label: String,
    pub confidence: f64,
    pub needs_clarification: bool,
    #[serde(default)]
    pub clarifying_question: Option<String>,
    #[serde(default)]
    pub clarification_options: Vec<String>,
    /// Suggested preference questions for this domain, if the
    /// inference source provided any.
    #[serde(default)]
    pub preference_questions: Vec<PreferenceQuestion>,
}

impl InferredDomain {
    /// Builds an `InferredDomain`, enforcing the confidence gate.
    ///
    /// When confidence is below `threshold`, the collaborator must have
    /// supplied a clarifying question with at least one option; absence
    /// is a contract violation, not something to default around.
    ///
    /// # Errors
    ///
    /// Returns [`DomainGateError`] if confidence is out of range, or the
    /// gate fires without a usable question/option set.
    pub fn from_inference(
        domain_label: String,
        confidence: f64,
        clarifying_question: Option<String>,
        clarification_options: Vec<String>,
        threshold: f64,
    ) -> Result<Self, DomainGateError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainGateError::ConfidenceOutOfRange { confidence });
        }

        let needs_clarification = confidence < threshold;

        if needs_clarification {
            if clarifying_question.as_deref().is_none_or(str::is_empty) {
                return Err(DomainGateError::MissingQuestion {
                    confidence,
                    threshold,
                });
            }
            if clarification_options.is_empty() {
                return Err(DomainGateError::MissingOptions {
                    confidence,
                    threshold,
                });
            }
        }

        Ok(Self {
            domain_label,
            confidence,
            needs_clarification,
            clarifying_question,
            clarification_options,
            preference_questions: Vec::new(),
        })
    }

    /// Attaches suggested preference questions to a validated domain.
    #[must_use]
    pub fn with_preference_questions(mut self, questions: Vec<PreferenceQuestion>) -> Self {
        self.preference_questions = questions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 0.70;

    fn gated(confidence: f64) -> Result<InferredDomain, DomainGateError> {
        InferredDomain::from_inference(
            "mobiltelefoner".to_string(),
            confidence,
            Some("Vilken modell letar du efter?".to_string()),
            vec!["iPhone".to_string(), "Samsung".to_string()],
            THRESHOLD,
        )
    }

    #[test]
    fn gate_fires_exactly_below_threshold() {
        // (confidence, expected needs_clarification)
        let cases = [
            (0.0, true),
            (0.69, true),
            (0.70, false),
            (0.71, false),
            (1.0, false),
        ];
        for (confidence, expected) in cases {
            let domain = gated(confidence).unwrap();
            assert_eq!(
                domain.needs_clarification, expected,
                "confidence {confidence}"
            );
        }
    }

    #[test]
    fn gated_response_without_question_is_rejected() {
        let err = InferredDomain::from_inference(
            "cyklar".to_string(),
            0.4,
            None,
            vec!["mountainbike".to_string()],
            THRESHOLD,
        )
        .unwrap_err();
        assert!(matches!(err, DomainGateError::MissingQuestion { .. }));
    }

    #[test]
    fn gated_response_with_empty_question_is_rejected() {
        let err = InferredDomain::from_inference(
            "cyklar".to_string(),
            0.4,
            Some(String::new()),
            vec!["mountainbike".to_string()],
            THRESHOLD,
        )
        .unwrap_err();
        assert!(matches!(err, DomainGateError::MissingQuestion { .. }));
    }

    #[test]
    fn gated_response_without_options_is_rejected() {
        let err = InferredDomain::from_inference(
            "cyklar".to_string(),
            0.4,
            Some("Vilken typ?".to_string()),
            vec![],
            THRESHOLD,
        )
        .unwrap_err();
        assert!(matches!(err, DomainGateError::MissingOptions { .. }));
    }

    #[test]
    fn confident_response_needs_no_question() {
        let domain = InferredDomain::from_inference(
            "cyklar".to_string(),
            0.95,
            None,
            vec![],
            THRESHOLD,
        )
        .unwrap();
        assert!(!domain.needs_clarification);
    }

    #[test]
    fn preference_questions_attach_to_a_validated_domain() {
        let domain = gated(0.9).unwrap().with_preference_questions(vec![
            PreferenceQuestion {
                id: "storage_gb".to_string(),
                question: "Hur mycket lagring behöver du?".to_string(),
                options: vec!["128 GB".to_string(), "256 GB".to_string()],
                why: Some("Påverkar priset".to_string()),
            },
        ]);
        assert_eq!(domain.preference_questions.len(), 1);
        assert_eq!(domain.preference_questions[0].id, "storage_gb");
    }

    #[test]
    fn serde_tolerates_absent_preference_questions() {
        let raw = serde_json::json!({
            "domain_label": "cyklar",
            "confidence": 0.9,
            "needs_clarification": false
        });
        let domain: InferredDomain = serde_json::from_value(raw).unwrap();
        assert!(domain.preference_questions.is_empty());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(matches!(
            gated(1.5).unwrap_err(),
            DomainGateError::ConfidenceOutOfRange { .. }
        ));
        assert!(matches!(
            gated(-0.1).unwrap_err(),
            DomainGateError::ConfidenceOutOfRange { .. }
        ));
    }
}
