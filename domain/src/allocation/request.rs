//! Percentage allocation request

use crate::core::error::DomainError;
use crate::core::ids::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One agent's target share of a distribution, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentShare {
    pub agent_id: AgentId,
    pub percentage: u32,
}

impl AgentShare {
    pub fn new(agent_id: impl Into<AgentId>, percentage: u32) -> Self {
        Self {
            agent_id: agent_id.into(),
            percentage,
        }
    }
}

impl std::str::FromStr for AgentShare {
    type Err = String;

    /// Parses `<agent_id>=<percentage>`, e.g. `3=70` or `3=70%`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (agent, pct) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected <agent>=<percentage>, got '{}'", s))?;
        let agent_id: AgentId = agent
            .parse()
            .map_err(|_| format!("Invalid agent id '{}'", agent))?;
        let percentage: u32 = pct
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| format!("Invalid percentage '{}'", pct))?;
        if percentage > 100 {
            return Err(format!("Percentage must be at most 100, got {}", percentage));
        }
        Ok(Self::new(agent_id, percentage))
    }
}

/// Transient input to a distribution run. Never persisted.
///
/// # Example
///
/// ```
/// use leadflow_domain::{AgentShare, PercentageAllocationRequest};
///
/// let request = PercentageAllocationRequest::new(vec![
///     AgentShare::new(1, 70),
///     AgentShare::new(2, 30),
/// ]);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageAllocationRequest {
    pub shares: Vec<AgentShare>,
}

impl PercentageAllocationRequest {
    pub fn new(shares: Vec<AgentShare>) -> Self {
        Self { shares }
    }

    /// Sum of all percentages, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.shares
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.percentage))
    }

    /// Shares that explicitly receive leads, in input order
    pub fn participating(&self) -> impl Iterator<Item = &AgentShare> {
        self.shares.iter().filter(|s| s.percentage > 0)
    }

    /// The agent that receives leads left over after rounding.
    ///
    /// Zero-percentage agents are never eligible.
    pub fn remainder_recipient(&self) -> Option<AgentId> {
        self.participating().next().map(|s| s.agent_id)
    }

    /// Check the request before anything touches the store.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.shares.is_empty() {
            return Err(DomainError::NoAgents);
        }

        let mut seen = HashSet::new();
        for share in &self.shares {
            if !seen.insert(share.agent_id) {
                return Err(DomainError::DuplicateAgent(share.agent_id));
            }
            if share.percentage > 100 {
                return Err(DomainError::InvalidRequest(format!(
                    "agent {} has a share of {}%, above 100%",
                    share.agent_id, share.percentage
                )));
            }
        }

        let total = self.total();
        if total != 100 {
            return Err(DomainError::InvalidPercentageTotal(total));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(shares: &[(i64, u32)]) -> PercentageAllocationRequest {
        PercentageAllocationRequest::new(
            shares.iter().map(|&(a, p)| AgentShare::new(a, p)).collect(),
        )
    }

    #[test]
    fn test_validate_accepts_exact_hundred() {
        assert!(request(&[(1, 70), (2, 30)]).validate().is_ok());
        assert!(request(&[(1, 0), (2, 100)]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_off_by_one_totals() {
        assert_eq!(
            request(&[(1, 70), (2, 29)]).validate(),
            Err(DomainError::InvalidPercentageTotal(99))
        );
        assert_eq!(
            request(&[(1, 70), (2, 31)]).validate(),
            Err(DomainError::InvalidPercentageTotal(101))
        );
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicates() {
        assert_eq!(request(&[]).validate(), Err(DomainError::NoAgents));
        assert_eq!(
            request(&[(1, 50), (1, 50)]).validate(),
            Err(DomainError::DuplicateAgent(AgentId::new(1)))
        );
    }

    #[test]
    fn test_validate_rejects_share_above_hundred_that_wraps_the_total() {
        let req = request(&[(1, u32::MAX), (2, 101)]);
        assert_eq!(req.total(), u32::MAX);
        assert!(matches!(req.validate(), Err(DomainError::InvalidRequest(_))));

        assert!(matches!(
            request(&[(1, 150), (2, 0)]).validate(),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_remainder_recipient_skips_zero_shares() {
        let req = request(&[(5, 0), (6, 40), (7, 60)]);
        assert_eq!(req.remainder_recipient(), Some(AgentId::new(6)));
        assert_eq!(request(&[(5, 0)]).remainder_recipient(), None);
    }

    #[test]
    fn test_parse_share() {
        assert_eq!("3=70".parse::<AgentShare>().unwrap(), AgentShare::new(3, 70));
        assert_eq!("4=25%".parse::<AgentShare>().unwrap(), AgentShare::new(4, 25));
        assert!("3:70".parse::<AgentShare>().is_err());
        assert!("x=10".parse::<AgentShare>().is_err());
        assert!("1=4294967295".parse::<AgentShare>().is_err());
        assert!("1=101".parse::<AgentShare>().is_err());
    }
}
