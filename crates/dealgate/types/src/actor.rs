//! Actor model: who may carry out a planned execution command.

use crate::RiskBand;
use serde::{Deserialize, Serialize};

/// The entity eligible to carry out an execution command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    Ai,
    Human,
    Hybrid,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::Human => "HUMAN",
            Self::Hybrid => "HYBRID",
        }
    }
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One actor's assessed ability to execute a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorCapability {
    pub actor_type: ActorType,
    pub can_execute: bool,
    /// Selection confidence in `[0, 1]`; meaningful only when
    /// `can_execute` is true
    pub confidence: f64,
    /// Why the actor is constrained or blocked
    pub constraints: Vec<String>,
    /// Risk observations relevant to this actor
    pub risk_factors: Vec<String>,
}

impl ActorCapability {
    /// An eligible capability with the given confidence.
    pub fn eligible(actor_type: ActorType, confidence: f64) -> Self {
        Self {
            actor_type,
            can_execute: true,
            confidence,
            constraints: Vec::new(),
            risk_factors: Vec::new(),
        }
    }

    /// A blocked capability carrying the constraint that blocked it.
    pub fn blocked(actor_type: ActorType, constraint: impl Into<String>) -> Self {
        Self {
            actor_type,
            can_execute: false,
            confidence: 0.0,
            constraints: vec![constraint.into()],
            risk_factors: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_risk_factor(mut self, factor: impl Into<String>) -> Self {
        self.risk_factors.push(factor.into());
        self
    }
}

/// Tenant-level actor selection policy, supplied per call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorSelectionConfig {
    /// The highest risk band AI may execute at
    pub ai_max_risk: RiskBand,
    /// AI capabilities below this confidence are reported as capable
    /// but never selected
    pub min_ai_confidence: f64,
}

impl Default for ActorSelectionConfig {
    fn default() -> Self {
        Self {
            ai_max_risk: RiskBand::Medium,
            min_ai_confidence: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_wire_names() {
        assert_eq!(serde_json::to_string(&ActorType::Ai).unwrap(), "\"AI\"");
        assert_eq!(
            serde_json::to_string(&ActorType::Hybrid).unwrap(),
            "\"HYBRID\""
        );
    }

    #[test]
    fn test_capability_constructors() {
        let ok = ActorCapability::eligible(ActorType::Human, 0.9);
        assert!(ok.can_execute);
        assert!(ok.constraints.is_empty());

        let blocked = ActorCapability::blocked(ActorType::Ai, "risk above AI threshold");
        assert!(!blocked.can_execute);
        assert_eq!(blocked.confidence, 0.0);
        assert_eq!(blocked.constraints.len(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = ActorSelectionConfig::default();
        assert_eq!(config.ai_max_risk, RiskBand::Medium);
        assert_eq!(config.min_ai_confidence, 0.5);
    }
}
