//! Actor selection: who is permitted to execute a planned command.
//!
//! [`assess_actor_capabilities`] reports every actor's eligibility;
//! [`select_actor`] is built on top of it, so the dual API cannot
//! disagree. Both are pure functions of their inputs.

use dealgate_types::{
    ActorCapability, ActorSelectionConfig, ActorType, ExecutionCommand, RiskAssessment, RiskBand,
};
use serde::{Deserialize, Serialize};

/// Per-actor capability assessment for one command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorCapabilitySet {
    pub ai: ActorCapability,
    pub human: ActorCapability,
    pub hybrid: ActorCapability,
}

impl ActorCapabilitySet {
    pub fn capability(&self, actor_type: ActorType) -> &ActorCapability {
        match actor_type {
            ActorType::Ai => &self.ai,
            ActorType::Human => &self.human,
            ActorType::Hybrid => &self.hybrid,
        }
    }
}

/// Assess each actor's ability to execute the command at the assessed
/// risk, under the tenant's selection policy.
pub fn assess_actor_capabilities(
    command: &ExecutionCommand,
    risk: &RiskAssessment,
    config: &ActorSelectionConfig,
) -> ActorCapabilitySet {
    let ai = assess_ai(command, risk, config);
    let human = assess_human(command, risk);
    let hybrid = assess_hybrid(&ai, &human);

    ActorCapabilitySet { ai, human, hybrid }
}

/// Pick the actor permitted to execute the command.
///
/// Deterministic total-order tie-break: low risk prefers AI, high and
/// critical risk force a human, medium risk prefers hybrid when both
/// components qualify and otherwise falls back human-first. When no
/// actor is eligible the call fails closed: the returned capability
/// has `can_execute == false` and names what blocked it.
pub fn select_actor(
    command: &ExecutionCommand,
    risk: &RiskAssessment,
    config: &ActorSelectionConfig,
) -> ActorCapability {
    let capabilities = assess_actor_capabilities(command, risk, config);

    let ai_selectable =
        capabilities.ai.can_execute && capabilities.ai.confidence >= config.min_ai_confidence;

    let selected = match risk.overall_risk {
        RiskBand::Low => {
            if ai_selectable {
                Some(&capabilities.ai)
            } else if capabilities.hybrid.can_execute {
                Some(&capabilities.hybrid)
            } else if capabilities.human.can_execute {
                Some(&capabilities.human)
            } else {
                None
            }
        }
        RiskBand::Medium => {
            if capabilities.hybrid.can_execute {
                Some(&capabilities.hybrid)
            } else if capabilities.human.can_execute {
                Some(&capabilities.human)
            } else if ai_selectable {
                Some(&capabilities.ai)
            } else {
                None
            }
        }
        // High and critical risk force human oversight
        RiskBand::High | RiskBand::Critical => {
            if capabilities.human.can_execute {
                Some(&capabilities.human)
            } else {
                None
            }
        }
    };

    match selected {
        Some(capability) => capability.clone(),
        None => fail_closed(capabilities, risk),
    }
}

fn assess_ai(
    command: &ExecutionCommand,
    risk: &RiskAssessment,
    config: &ActorSelectionConfig,
) -> ActorCapability {
    if !command.ai_allowed {
        return ActorCapability::blocked(ActorType::Ai, "action does not permit AI execution");
    }
    if risk.overall_risk > config.ai_max_risk {
        return ActorCapability::blocked(
            ActorType::Ai,
            format!(
                "risk {} exceeds AI threshold {}",
                risk.overall_risk, config.ai_max_risk
            ),
        )
        .with_risk_factor(format!("overall risk {}", risk.overall_risk));
    }

    // Confidence decays as risk approaches the AI ceiling
    let confidence = match risk.overall_risk {
        RiskBand::Low => 0.90,
        RiskBand::Medium => 0.75,
        RiskBand::High => 0.55,
        RiskBand::Critical => 0.30,
    };
    ActorCapability::eligible(ActorType::Ai, confidence)
}

fn assess_human(command: &ExecutionCommand, risk: &RiskAssessment) -> ActorCapability {
    if !command.human_allowed {
        return ActorCapability::blocked(ActorType::Human, "action does not permit human execution");
    }

    // Human oversight is increasingly preferred at higher risk
    let confidence = match risk.overall_risk {
        RiskBand::Low => 0.70,
        RiskBand::Medium => 0.80,
        RiskBand::High => 0.90,
        RiskBand::Critical => 0.95,
    };
    ActorCapability::eligible(ActorType::Human, confidence)
}

fn assess_hybrid(ai: &ActorCapability, human: &ActorCapability) -> ActorCapability {
    if !ai.can_execute {
        let mut blocked = ActorCapability::blocked(ActorType::Hybrid, "AI component not available");
        for constraint in &ai.constraints {
            blocked = blocked.with_constraint(constraint.clone());
        }
        return blocked;
    }
    if !human.can_execute {
        let mut blocked =
            ActorCapability::blocked(ActorType::Hybrid, "human component not available");
        for constraint in &human.constraints {
            blocked = blocked.with_constraint(constraint.clone());
        }
        return blocked;
    }

    ActorCapability::eligible(ActorType::Hybrid, (ai.confidence + human.confidence) / 2.0)
}

/// No actor qualified. Report the strictest view rather than default
/// to an unsafe actor.
fn fail_closed(capabilities: ActorCapabilitySet, risk: &RiskAssessment) -> ActorCapability {
    tracing::warn!(risk = %risk.overall_risk, "No actor eligible for command");

    let mut capability = capabilities.human;
    capability.can_execute = false;
    capability.confidence = 0.0;
    capability
        .constraints
        .push("no actor eligible for this command".to_string());
    capability
}
