//! Risk model: the four-band assessment that gates actor selection.

use serde::{Deserialize, Serialize};

use crate::OpportunityId;

/// Risk band, ordered. Comparisons use this ordering: a band is "at
/// or below" a threshold via `<=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One named contribution to an assessment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub description: String,
    pub severity: RiskBand,
}

impl RiskFactor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, severity: RiskBand) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            severity,
        }
    }
}

/// The risk engine's output: an overall band plus the factors that
/// produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk: RiskBand,
    pub risk_factors: Vec<RiskFactor>,
    pub mitigation_required: bool,
    pub recommended_actions: Vec<String>,
}

impl RiskAssessment {
    /// A low-risk assessment with no factors.
    pub fn low() -> Self {
        Self {
            overall_risk: RiskBand::Low,
            risk_factors: Vec::new(),
            mitigation_required: false,
            recommended_actions: Vec::new(),
        }
    }

    pub fn with_band(mut self, band: RiskBand) -> Self {
        self.overall_risk = band;
        self.mitigation_required = band >= RiskBand::High;
        self
    }
}

/// Caller-supplied attributes of the opportunity and its situation,
/// the input to risk assessment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpportunityContext {
    pub opportunity_id: OpportunityId,
    /// Deal value in the tenant's currency minor units are not
    /// assumed; treated as a magnitude
    pub deal_value: f64,
    /// External customer risk score in `[0, 100]`
    pub customer_risk_score: f64,
    /// Minutes until the current action's SLA breaches; negative
    /// means already breached; `None` means no SLA pressure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_minutes_remaining: Option<i64>,
    /// Failed attempts so far on the current action
    pub retry_count: u32,
    /// Evidence records accumulated for the current stage
    pub evidence_count: usize,
}

impl OpportunityContext {
    pub fn new(opportunity_id: impl Into<String>) -> Self {
        Self {
            opportunity_id: OpportunityId::new(opportunity_id),
            deal_value: 0.0,
            customer_risk_score: 0.0,
            sla_minutes_remaining: None,
            retry_count: 0,
            evidence_count: 0,
        }
    }

    pub fn with_deal_value(mut self, value: f64) -> Self {
        self.deal_value = value;
        self
    }

    pub fn with_customer_risk_score(mut self, score: f64) -> Self {
        self.customer_risk_score = score;
        self
    }

    pub fn with_sla_minutes_remaining(mut self, minutes: i64) -> Self {
        self.sla_minutes_remaining = Some(minutes);
        self
    }

    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_evidence_count(mut self, count: usize) -> Self {
        self.evidence_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_ordering() {
        assert!(RiskBand::Low < RiskBand::Medium);
        assert!(RiskBand::Medium < RiskBand::High);
        assert!(RiskBand::High < RiskBand::Critical);
    }

    #[test]
    fn test_band_wire_names() {
        let json = serde_json::to_string(&RiskBand::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn test_mitigation_follows_band() {
        assert!(!RiskAssessment::low().mitigation_required);
        assert!(RiskAssessment::low().with_band(RiskBand::High).mitigation_required);
        assert!(!RiskAssessment::low().with_band(RiskBand::Medium).mitigation_required);
    }

    #[test]
    fn test_context_builder() {
        let ctx = OpportunityContext::new("opp-1")
            .with_deal_value(50_000.0)
            .with_customer_risk_score(72.0)
            .with_sla_minutes_remaining(-10)
            .with_retry_count(2)
            .with_evidence_count(4);
        assert_eq!(ctx.deal_value, 50_000.0);
        assert_eq!(ctx.sla_minutes_remaining, Some(-10));
    }
}
