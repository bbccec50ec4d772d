//! Rounding rules for per-agent lead counts

use serde::{Deserialize, Serialize};

/// Rule turning `percentage / 100 × pool` into a whole number of leads.
///
/// The two rules only disagree when the exact share ends in `.5`.
///
/// # Example
///
/// ```
/// use leadflow_domain::RoundingRule;
///
/// assert_eq!(RoundingRule::HalfUp.share(25, 10), 3);   // 2.5 -> 3
/// assert_eq!(RoundingRule::HalfEven.share(25, 10), 2); // 2.5 -> 2
/// assert_eq!(RoundingRule::HalfEven.share(50, 3), 2);  // 1.5 -> 2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// `.5` rounds up
    #[default]
    HalfUp,
    /// `.5` rounds to the nearest even count
    HalfEven,
}

impl RoundingRule {
    /// Number of leads a `percentage` share of `pool` leads is worth.
    ///
    /// Computed in integer arithmetic so that `.5` boundaries are exact.
    pub fn share(&self, percentage: u32, pool: usize) -> usize {
        let scaled = percentage as u128 * pool as u128;
        let quotient = scaled / 100;
        let remainder = scaled % 100;
        let rounded = match self {
            RoundingRule::HalfUp => {
                if remainder >= 50 {
                    quotient + 1
                } else {
                    quotient
                }
            }
            RoundingRule::HalfEven => {
                if remainder > 50 || (remainder == 50 && quotient % 2 == 1) {
                    quotient + 1
                } else {
                    quotient
                }
            }
        };
        rounded as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingRule::HalfUp => "half_up",
            RoundingRule::HalfEven => "half_even",
        }
    }
}

impl std::fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoundingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "half_up" | "up" => Ok(RoundingRule::HalfUp),
            "half_even" | "even" | "bankers" => Ok(RoundingRule::HalfEven),
            other => Err(format!(
                "Unknown rounding rule: {}. Valid: half_up, half_even",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_shares_agree() {
        for rule in [RoundingRule::HalfUp, RoundingRule::HalfEven] {
            assert_eq!(rule.share(70, 10), 7);
            assert_eq!(rule.share(30, 10), 3);
            assert_eq!(rule.share(100, 0), 0);
            assert_eq!(rule.share(0, 50), 0);
        }
    }

    #[test]
    fn test_half_boundaries() {
        // 0.5
        assert_eq!(RoundingRule::HalfUp.share(50, 1), 1);
        assert_eq!(RoundingRule::HalfEven.share(50, 1), 0);
        // 1.5
        assert_eq!(RoundingRule::HalfUp.share(50, 3), 2);
        assert_eq!(RoundingRule::HalfEven.share(50, 3), 2);
        // 2.5
        assert_eq!(RoundingRule::HalfUp.share(50, 5), 3);
        assert_eq!(RoundingRule::HalfEven.share(50, 5), 2);
    }

    #[test]
    fn test_non_half_fractions() {
        // 3.3 and 3.7
        assert_eq!(RoundingRule::HalfUp.share(33, 10), 3);
        assert_eq!(RoundingRule::HalfEven.share(37, 10), 4);
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!("half_up".parse::<RoundingRule>().ok(), Some(RoundingRule::HalfUp));
        assert_eq!(
            "Half-Even".parse::<RoundingRule>().ok(),
            Some(RoundingRule::HalfEven)
        );
        assert!("nearest".parse::<RoundingRule>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&RoundingRule::HalfEven).unwrap();
        assert_eq!(json, "\"half_even\"");
    }
}
