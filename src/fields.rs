//! Enumerations and field constants shared across the workspace.
//!
//! This module defines the priority bands derived from service scores and the
//! scoring strategies the service is known to understand.

use serde::Serialize;

/// Strategy sent when none has been chosen.
pub const DEFAULT_STRATEGY: &str = "smart_balance";

/// Strategies the scoring service is known to accept, in cycling order.
///
/// Any other text is still forwarded verbatim; the service falls back to its
/// own default for names it does not recognise.
pub const KNOWN_STRATEGIES: [&str; 4] = [
    "smart_balance",
    "fastest_wins",
    "high_impact",
    "deadline_driven",
];

/// Lower bound (inclusive) of the High band.
pub const HIGH_THRESHOLD: f64 = 70.0;
/// Lower bound (inclusive) of the Medium band.
pub const MEDIUM_THRESHOLD: f64 = 40.0;

/// Coarse priority classification of a numeric score.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityBand {
    High,
    Medium,
    Low,
}

impl PriorityBand {
    /// Classify a score. Absent scores band as 0.
    pub fn from_score(score: Option<f64>) -> Self {
        let score = score.unwrap_or(0.0);
        if score >= HIGH_THRESHOLD {
            PriorityBand::High
        } else if score >= MEDIUM_THRESHOLD {
            PriorityBand::Medium
        } else {
            PriorityBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityBand::High => "High",
            PriorityBand::Medium => "Medium",
            PriorityBand::Low => "Low",
        }
    }
}

/// Return the strategy that follows `current` in [`KNOWN_STRATEGIES`].
///
/// Unknown strategies restart the cycle at the first known one.
pub fn next_strategy(current: &str) -> &'static str {
    match KNOWN_STRATEGIES.iter().position(|s| *s == current) {
        Some(i) => KNOWN_STRATEGIES[(i + 1) % KNOWN_STRATEGIES.len()],
        None => KNOWN_STRATEGIES[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(70.0), PriorityBand::High)]
    #[case(Some(99.5), PriorityBand::High)]
    #[case(Some(69.9), PriorityBand::Medium)]
    #[case(Some(40.0), PriorityBand::Medium)]
    #[case(Some(39.9), PriorityBand::Low)]
    #[case(Some(0.0), PriorityBand::Low)]
    #[case(Some(-5.0), PriorityBand::Low)]
    #[case(None, PriorityBand::Low)]
    fn bands_use_inclusive_lower_bounds(#[case] score: Option<f64>, #[case] band: PriorityBand) {
        assert_eq!(PriorityBand::from_score(score), band);
    }

    #[test]
    fn strategy_cycle_wraps_and_recovers_from_unknown() {
        assert_eq!(next_strategy("smart_balance"), "fastest_wins");
        assert_eq!(next_strategy("deadline_driven"), "smart_balance");
        assert_eq!(next_strategy("my_custom"), "smart_balance");
    }
}
