//! The confidence-override decision policy.
//!
//! The policy is deliberately asymmetric: a pollution prediction the model
//! is not confident about is suppressed in favor of `no_waste`, but only
//! when the distribution also shows reasonable evidence of a clean scene.
//! A confidently-wrong-but-not-clean prediction is left as-is.

use crate::config::PolicyConfig;
use crate::labels::Label;
use crate::types::Distribution;

/// A (label, confidence) pair produced by the decision policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub label: Label,
    pub confidence: f32,
}

/// Applies the confidence-override rule to a classification distribution.
#[derive(Debug, Clone, Copy)]
pub struct DecisionPolicy {
    /// Below this argmax confidence, a pollution label is eligible for override.
    confidence_floor: f32,
    /// Minimum `no_waste` probability required for the override to fire.
    clean_evidence_floor: f32,
}

impl DecisionPolicy {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            confidence_floor: config.confidence_floor,
            clean_evidence_floor: config.clean_evidence_floor,
        }
    }

    /// Decide the final label and confidence for a distribution.
    ///
    /// Override rule: if the argmax is a pollution label with confidence
    /// below the floor, and p(no_waste) exceeds the clean-evidence floor,
    /// the decision becomes `(no_waste, p_no_waste)`. Otherwise the argmax
    /// pair stands unchanged, even when its confidence is low.
    ///
    /// Confidence is reported rounded to 4 decimal places.
    pub fn decide(&self, distribution: &Distribution) -> Decision {
        let (mut label, mut confidence) = distribution.argmax();

        if label != Label::NoWaste && confidence < self.confidence_floor {
            let p_no_waste = distribution.probability(Label::NoWaste);
            if p_no_waste > self.clean_evidence_floor {
                tracing::debug!(
                    original = %label,
                    confidence,
                    p_no_waste,
                    "low confidence, overriding to no_waste"
                );
                label = Label::NoWaste;
                confidence = p_no_waste;
            }
        }

        Decision {
            label,
            confidence: round4(confidence),
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}

/// Round to 4 decimal places, the precision the application layer stores.
fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(probs: [f32; Label::COUNT]) -> Distribution {
        Distribution::new(probs).unwrap()
    }

    #[test]
    fn test_confident_pollution_kept() {
        let decision = DecisionPolicy::default().decide(&dist([0.90, 0.02, 0.03, 0.02, 0.03]));
        assert_eq!(decision.label, Label::Plastic);
        assert_eq!(decision.confidence, 0.90);
    }

    #[test]
    fn test_override_fires_with_clean_evidence() {
        // 0.40 < 0.85 and p(no_waste) = 0.45 > 0.15
        let decision = DecisionPolicy::default().decide(&dist([0.40, 0.05, 0.05, 0.05, 0.45]));
        assert_eq!(decision.label, Label::NoWaste);
        assert_eq!(decision.confidence, 0.45);
    }

    #[test]
    fn test_override_held_without_clean_evidence() {
        // 0.40 < 0.85 but p(no_waste) = 0.10 <= 0.15: original pair stands
        let decision = DecisionPolicy::default().decide(&dist([0.40, 0.30, 0.10, 0.10, 0.10]));
        assert_eq!(decision.label, Label::Plastic);
        assert_eq!(decision.confidence, 0.40);
    }

    #[test]
    fn test_clean_evidence_floor_is_exclusive() {
        // p(no_waste) exactly at the floor does not fire the override
        let decision = DecisionPolicy::default().decide(&dist([0.45, 0.20, 0.10, 0.10, 0.15]));
        assert_eq!(decision.label, Label::Plastic);
        assert_eq!(decision.confidence, 0.45);
    }

    #[test]
    fn test_confidence_floor_is_exclusive() {
        // Argmax exactly at 0.85 counts as confident
        let decision = DecisionPolicy::default().decide(&dist([0.85, 0.0, 0.0, 0.0, 0.15]));
        assert_eq!(decision.label, Label::Plastic);
        assert_eq!(decision.confidence, 0.85);
    }

    #[test]
    fn test_no_waste_argmax_never_overridden() {
        let decision = DecisionPolicy::default().decide(&dist([0.10, 0.10, 0.10, 0.10, 0.60]));
        assert_eq!(decision.label, Label::NoWaste);
        assert_eq!(decision.confidence, 0.60);
    }

    #[test]
    fn test_confidence_rounded_to_four_places() {
        let decision = DecisionPolicy::default().decide(&dist([0.123456, 0.1, 0.1, 0.1, 0.576544]));
        assert_eq!(decision.label, Label::NoWaste);
        assert_eq!(decision.confidence, 0.5765);
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = DecisionPolicy::new(&PolicyConfig {
            confidence_floor: 0.5,
            clean_evidence_floor: 0.3,
        });
        // 0.55 >= 0.5: confident enough under the custom floor
        let decision = policy.decide(&dist([0.55, 0.0, 0.0, 0.0, 0.45]));
        assert_eq!(decision.label, Label::Plastic);
    }
}
