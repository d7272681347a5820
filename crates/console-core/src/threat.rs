//! Threat-level classification.

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the high tier.
pub const HIGH_THRESHOLD: u8 = 70;

/// Lower bound (inclusive) of the medium tier.
pub const MEDIUM_THRESHOLD: u8 = 40;

/// Coarse risk bucket for a session's numeric threat level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatTier {
    Low,
    Medium,
    High,
}

impl ThreatTier {
    /// Map a threat level in `0..=100` onto its tier.
    ///
    /// | Level    | Tier   |
    /// |----------|--------|
    /// | ≥ 70     | high   |
    /// | 40 – 69  | medium |
    /// | < 40     | low    |
    pub fn classify(level: u8) -> Self {
        if level >= HIGH_THRESHOLD {
            Self::High
        } else if level >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for ThreatTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(ThreatTier::classify(0), ThreatTier::Low);
        assert_eq!(ThreatTier::classify(39), ThreatTier::Low);
        assert_eq!(ThreatTier::classify(40), ThreatTier::Medium);
        assert_eq!(ThreatTier::classify(69), ThreatTier::Medium);
        assert_eq!(ThreatTier::classify(70), ThreatTier::High);
        assert_eq!(ThreatTier::classify(100), ThreatTier::High);
    }

    #[test]
    fn test_classify_full_range() {
        for level in 0..=100u8 {
            let tier = ThreatTier::classify(level);
            let expected = if level >= 70 {
                ThreatTier::High
            } else if level >= 40 {
                ThreatTier::Medium
            } else {
                ThreatTier::Low
            };
            assert_eq!(tier, expected, "level {level}");
        }
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(ThreatTier::High.to_string(), "high");
        assert_eq!(ThreatTier::Medium.to_string(), "medium");
        assert_eq!(ThreatTier::Low.to_string(), "low");
    }
}
