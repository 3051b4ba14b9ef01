//! Risk assessment: derives a four-band risk picture from the
//! opportunity's situation.
//!
//! Scoring is additive over non-negative contributions, so raising
//! deal value, customer risk score, or SLA urgency can never lower
//! the band. The point weights are policy; the four-band contract and
//! that monotonicity are not.

use dealgate_types::{OpportunityContext, RiskAssessment, RiskBand, RiskFactor};

/// Assess the risk of acting on an opportunity in its current
/// situation.
pub fn assess_risk(context: &OpportunityContext) -> RiskAssessment {
    let mut score: u32 = 0;
    let mut factors = Vec::new();

    // Deal value
    if context.deal_value >= 100_000.0 {
        score += 3;
        factors.push(RiskFactor::new(
            "deal_value",
            format!("deal value {:.0} is enterprise-scale", context.deal_value),
            RiskBand::High,
        ));
    } else if context.deal_value >= 25_000.0 {
        score += 2;
        factors.push(RiskFactor::new(
            "deal_value",
            format!("deal value {:.0} is significant", context.deal_value),
            RiskBand::Medium,
        ));
    } else if context.deal_value >= 5_000.0 {
        score += 1;
        factors.push(RiskFactor::new(
            "deal_value",
            format!("deal value {:.0}", context.deal_value),
            RiskBand::Low,
        ));
    }

    // External customer risk score
    if context.customer_risk_score >= 80.0 {
        score += 3;
        factors.push(RiskFactor::new(
            "customer_risk_score",
            format!("customer risk score {:.0} of 100", context.customer_risk_score),
            RiskBand::High,
        ));
    } else if context.customer_risk_score >= 50.0 {
        score += 2;
        factors.push(RiskFactor::new(
            "customer_risk_score",
            format!("customer risk score {:.0} of 100", context.customer_risk_score),
            RiskBand::Medium,
        ));
    } else if context.customer_risk_score >= 25.0 {
        score += 1;
        factors.push(RiskFactor::new(
            "customer_risk_score",
            format!("customer risk score {:.0} of 100", context.customer_risk_score),
            RiskBand::Low,
        ));
    }

    // SLA pressure
    match context.sla_minutes_remaining {
        Some(remaining) if remaining < 0 => {
            score += 3;
            factors.push(RiskFactor::new(
                "sla_breached",
                format!("SLA breached {} minutes ago", -remaining),
                RiskBand::High,
            ));
        }
        Some(remaining) if remaining <= 15 => {
            score += 2;
            factors.push(RiskFactor::new(
                "sla_pressure",
                format!("{} minutes until SLA breach", remaining),
                RiskBand::Medium,
            ));
        }
        Some(remaining) if remaining <= 60 => {
            score += 1;
            factors.push(RiskFactor::new(
                "sla_pressure",
                format!("{} minutes until SLA breach", remaining),
                RiskBand::Low,
            ));
        }
        _ => {}
    }

    // Repeated failures
    if context.retry_count >= 3 {
        score += 2;
        factors.push(RiskFactor::new(
            "retry_count",
            format!("{} failed attempts on the current action", context.retry_count),
            RiskBand::Medium,
        ));
    } else if context.retry_count >= 1 {
        score += 1;
        factors.push(RiskFactor::new(
            "retry_count",
            format!("{} failed attempt on the current action", context.retry_count),
            RiskBand::Low,
        ));
    }

    // Acting blind
    if context.evidence_count == 0 {
        score += 1;
        factors.push(RiskFactor::new(
            "no_evidence",
            "no evidence collected for the current stage",
            RiskBand::Low,
        ));
    }

    let overall_risk = band_for(score);
    let recommended_actions = recommendations(overall_risk, &factors);

    RiskAssessment {
        overall_risk,
        risk_factors: factors,
        mitigation_required: overall_risk >= RiskBand::High,
        recommended_actions,
    }
}

fn band_for(score: u32) -> RiskBand {
    match score {
        0..=1 => RiskBand::Low,
        2..=4 => RiskBand::Medium,
        5..=7 => RiskBand::High,
        _ => RiskBand::Critical,
    }
}

fn recommendations(band: RiskBand, factors: &[RiskFactor]) -> Vec<String> {
    let mut actions = Vec::new();
    if band >= RiskBand::High {
        actions.push("require human review before execution".to_string());
    }
    if band >= RiskBand::Critical {
        actions.push("pause automated outreach for this opportunity".to_string());
    }
    if factors.iter().any(|f| f.name == "sla_breached") {
        actions.push("prioritize immediate outreach".to_string());
    }
    if factors.iter().any(|f| f.name == "customer_risk_score" && f.severity >= RiskBand::High) {
        actions.push("request additional verification".to_string());
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealgate_types::OpportunityContext;

    #[test]
    fn test_quiet_context_is_low() {
        let assessment = assess_risk(&OpportunityContext::new("opp-1").with_evidence_count(2));
        assert_eq!(assessment.overall_risk, RiskBand::Low);
        assert!(assessment.risk_factors.is_empty());
        assert!(!assessment.mitigation_required);
        assert!(assessment.recommended_actions.is_empty());
    }

    #[test]
    fn test_everything_on_fire_is_critical() {
        let context = OpportunityContext::new("opp-1")
            .with_deal_value(250_000.0)
            .with_customer_risk_score(90.0)
            .with_sla_minutes_remaining(-30)
            .with_retry_count(4);

        let assessment = assess_risk(&context);
        assert_eq!(assessment.overall_risk, RiskBand::Critical);
        assert!(assessment.mitigation_required);
        assert!(assessment
            .recommended_actions
            .iter()
            .any(|a| a.contains("pause automated outreach")));
    }

    #[test]
    fn test_factors_name_their_inputs() {
        let context = OpportunityContext::new("opp-1")
            .with_deal_value(30_000.0)
            .with_evidence_count(3);

        let assessment = assess_risk(&context);
        assert_eq!(assessment.risk_factors.len(), 1);
        assert_eq!(assessment.risk_factors[0].name, "deal_value");
    }

    #[test]
    fn test_monotone_in_deal_value() {
        let base = OpportunityContext::new("opp-1")
            .with_customer_risk_score(60.0)
            .with_evidence_count(1);

        let mut previous = RiskBand::Low;
        for value in [0.0, 5_000.0, 25_000.0, 100_000.0, 1_000_000.0] {
            let band = assess_risk(&base.clone().with_deal_value(value)).overall_risk;
            assert!(band >= previous, "band dropped at deal value {}", value);
            previous = band;
        }
    }

    #[test]
    fn test_monotone_in_urgency() {
        let base = OpportunityContext::new("opp-1")
            .with_deal_value(30_000.0)
            .with_evidence_count(1);

        let relaxed = assess_risk(&base.clone().with_sla_minutes_remaining(500)).overall_risk;
        let tight = assess_risk(&base.clone().with_sla_minutes_remaining(10)).overall_risk;
        let breached = assess_risk(&base.with_sla_minutes_remaining(-5)).overall_risk;

        assert!(tight >= relaxed);
        assert!(breached >= tight);
    }

    #[test]
    fn test_deterministic() {
        let context = OpportunityContext::new("opp-1")
            .with_deal_value(50_000.0)
            .with_customer_risk_score(72.0)
            .with_sla_minutes_remaining(5)
            .with_retry_count(2);

        let first = assess_risk(&context);
        let second = assess_risk(&context);
        assert_eq!(first, second);
    }

    #[test]
    fn test_breached_sla_recommends_outreach() {
        let context = OpportunityContext::new("opp-1")
            .with_sla_minutes_remaining(-1)
            .with_evidence_count(1);

        let assessment = assess_risk(&context);
        assert!(assessment
            .recommended_actions
            .iter()
            .any(|a| a.contains("immediate outreach")));
    }
}
