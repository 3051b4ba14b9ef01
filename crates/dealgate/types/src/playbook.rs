//! Playbook definitions: the blueprint for a sales process.
//!
//! A playbook maps each stage to its required actions and the
//! evidence conditions that move an opportunity forward (or out).
//! Playbooks are data — they load from a versioned configuration
//! store and are immutable once published. New behavior requires a
//! new version.

use crate::{ActionId, ActorType, CanonicalStage, PlaybookId, StageId, TenantId, TransitionCondition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A versioned process definition: which actions each stage requires
/// and which evidence conditions advance it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Playbook {
    pub playbook_id: PlaybookId,
    pub version: u32,
    /// Absent for a global playbook; set for a tenant override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    /// The stage a new opportunity enters at
    pub entry_stage: StageId,
    pub stages: HashMap<StageId, PlaybookStage>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Playbook {
    pub fn new(playbook_id: impl Into<String>, version: u32, entry_stage: impl Into<String>) -> Self {
        Self {
            playbook_id: PlaybookId::new(playbook_id),
            version,
            tenant_id: None,
            entry_stage: StageId::new(entry_stage),
            stages: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn for_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_stage(mut self, stage: PlaybookStage) -> Self {
        self.stages.insert(stage.stage_id.clone(), stage);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn stage(&self, stage_id: &StageId) -> Option<&PlaybookStage> {
        self.stages.get(stage_id)
    }

    pub fn is_global(&self) -> bool {
        self.tenant_id.is_none()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// One stage of a playbook: its required actions and transitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaybookStage {
    pub stage_id: StageId,
    pub canonical_stage: CanonicalStage,
    /// Actions that must be carried out while in this stage
    pub must_do: Vec<StageAction>,
    /// Evidence condition and target for the success path
    pub on_success: TransitionRule,
    /// Evidence condition and target for the failure path
    pub on_failure: TransitionRule,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub escalations: Vec<EscalationRule>,
    /// Advisory ceiling on time spent in this stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_minutes: Option<u32>,
}

impl PlaybookStage {
    pub fn new(
        stage_id: impl Into<String>,
        canonical_stage: CanonicalStage,
        on_success: TransitionRule,
        on_failure: TransitionRule,
    ) -> Self {
        Self {
            stage_id: StageId::new(stage_id),
            canonical_stage,
            must_do: Vec::new(),
            on_success,
            on_failure,
            escalations: Vec::new(),
            max_duration_minutes: None,
        }
    }

    pub fn with_action(mut self, action: StageAction) -> Self {
        self.must_do.push(action);
        self
    }

    pub fn with_escalation(mut self, rule: EscalationRule) -> Self {
        self.escalations.push(rule);
        self
    }

    pub fn with_max_duration(mut self, minutes: u32) -> Self {
        self.max_duration_minutes = Some(minutes);
        self
    }

    /// Union of evidence types required across this stage's actions.
    pub fn required_evidence(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for action in &self.must_do {
            for evidence_type in &action.evidence_required {
                if !seen.contains(evidence_type) {
                    seen.push(evidence_type.clone());
                }
            }
        }
        seen
    }
}

/// A condition/target pair: when the condition holds, the opportunity
/// moves to `next_stage`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionRule {
    pub condition: TransitionCondition,
    pub next_stage: StageId,
}

impl TransitionRule {
    pub fn new(condition: TransitionCondition, next_stage: impl Into<String>) -> Self {
        Self {
            condition,
            next_stage: StageId::new(next_stage),
        }
    }
}

/// An action a stage requires before it can resolve.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageAction {
    pub action_id: ActionId,
    pub action_type: ActionType,
    pub channel: Channel,
    /// Service-level window for completing this action
    pub sla_minutes: u32,
    /// Evidence types that prove this action happened
    pub evidence_required: Vec<String>,
    pub human_allowed: bool,
    pub ai_allowed: bool,
    /// Advisory retry metadata for the execution layer; the core
    /// never retries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
}

impl StageAction {
    pub fn new(action_id: impl Into<String>, action_type: ActionType, channel: Channel) -> Self {
        Self {
            action_id: ActionId::new(action_id),
            action_type,
            channel,
            sla_minutes: 60,
            evidence_required: Vec::new(),
            human_allowed: true,
            ai_allowed: true,
            retry_policy: None,
        }
    }

    pub fn with_sla(mut self, minutes: u32) -> Self {
        self.sla_minutes = minutes;
        self
    }

    pub fn requires_evidence(mut self, evidence_type: impl Into<String>) -> Self {
        self.evidence_required.push(evidence_type.into());
        self
    }

    pub fn human_only(mut self) -> Self {
        self.human_allowed = true;
        self.ai_allowed = false;
        self
    }

    pub fn ai_only(mut self) -> Self {
        self.human_allowed = false;
        self.ai_allowed = true;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }
}

/// What kind of work an action represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ContactAttempt,
    QualificationCall,
    SendMessage,
    ScheduleMeeting,
    FollowUp,
}

/// The channel an action goes out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Voice,
    Sms,
    Email,
    Calendar,
}

/// Advisory retry/backoff metadata, applied by the execution layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_minutes: u32,
    /// Escalate to a human once this many attempts have failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalate_after: Option<u32>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_minutes: u32) -> Self {
        Self {
            max_attempts,
            backoff_minutes,
            escalate_after: None,
        }
    }

    pub fn escalating_after(mut self, attempts: u32) -> Self {
        self.escalate_after = Some(attempts);
        self
    }
}

/// A hint that a stalled stage should be routed to a particular actor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscalationRule {
    pub trigger_after_minutes: u32,
    pub escalate_to: ActorType,
    pub reason: String,
}

impl EscalationRule {
    pub fn new(trigger_after_minutes: u32, escalate_to: ActorType, reason: impl Into<String>) -> Self {
        Self {
            trigger_after_minutes,
            escalate_to,
            reason: reason.into(),
        }
    }
}

/// Caller-supplied temporal context for one evaluation.
///
/// The evaluator never reads the system clock. `TimeElapsed`
/// conditions need a stage entry time; when the caller cannot supply
/// one, those conditions are unsatisfiable for that call.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub now: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_entered_at: Option<DateTime<Utc>>,
}

impl EvaluationContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            stage_entered_at: None,
        }
    }

    pub fn with_stage_entry(mut self, entered_at: DateTime<Utc>) -> Self {
        self.stage_entered_at = Some(entered_at);
        self
    }

    /// Whole minutes since stage entry, if entry time is known.
    pub fn elapsed_minutes(&self) -> Option<i64> {
        self.stage_entered_at
            .map(|entered| (self.now - entered).num_minutes())
    }
}

/// The Stage Evaluator's judgement of one stage against accumulated
/// evidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageEvaluationResult {
    pub can_advance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<StageId>,
    pub reason: String,
    /// Union of evidence types the stage's actions require
    pub required_evidence: Vec<String>,
    /// Required evidence types not yet present
    pub missing_evidence: Vec<String>,
    /// Actions whose required evidence is missing
    pub blocking_actions: Vec<ActionId>,
}

impl StageEvaluationResult {
    /// A blocked result with no computed gap analysis.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            can_advance: false,
            next_stage: None,
            reason: reason.into(),
            required_evidence: Vec::new(),
            missing_evidence: Vec::new(),
            blocking_actions: Vec::new(),
        }
    }

    /// An advancing result toward `next_stage`.
    pub fn advance(next_stage: StageId, reason: impl Into<String>) -> Self {
        Self {
            can_advance: true,
            next_stage: Some(next_stage),
            reason: reason.into(),
            required_evidence: Vec::new(),
            missing_evidence: Vec::new(),
            blocking_actions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThresholdOp;

    fn make_stage() -> PlaybookStage {
        PlaybookStage::new(
            "prospect_identified",
            CanonicalStage::ProspectIdentified,
            TransitionRule::new(
                TransitionCondition::present("call_connected"),
                "initial_contact",
            ),
            TransitionRule::new(
                TransitionCondition::count("call_attempt_logged", ThresholdOp::Gte, 3),
                "lost",
            ),
        )
        .with_action(
            StageAction::new(
                "initial_contact_attempt",
                ActionType::ContactAttempt,
                Channel::Voice,
            )
            .with_sla(15)
            .requires_evidence("call_attempt_logged"),
        )
    }

    #[test]
    fn test_playbook_builder() {
        let playbook = Playbook::new("sales_default", 1, "prospect_identified")
            .with_stage(make_stage())
            .with_metadata("owner", "revops");

        assert!(playbook.is_global());
        assert_eq!(playbook.stage_count(), 1);
        assert!(playbook.stage(&StageId::new("prospect_identified")).is_some());
        assert!(playbook.stage(&StageId::new("nope")).is_none());
    }

    #[test]
    fn test_tenant_override_flag() {
        let playbook = Playbook::new("sales_default", 2, "prospect_identified")
            .for_tenant(TenantId::new("tenant-1"));
        assert!(!playbook.is_global());
    }

    #[test]
    fn test_required_evidence_union_dedupes() {
        let stage = make_stage().with_action(
            StageAction::new("second_attempt", ActionType::ContactAttempt, Channel::Voice)
                .requires_evidence("call_attempt_logged")
                .requires_evidence("voicemail_left"),
        );
        assert_eq!(
            stage.required_evidence(),
            vec!["call_attempt_logged".to_string(), "voicemail_left".to_string()]
        );
    }

    #[test]
    fn test_action_actor_gates() {
        let action = StageAction::new("a", ActionType::SendMessage, Channel::Sms).human_only();
        assert!(action.human_allowed);
        assert!(!action.ai_allowed);

        let action = StageAction::new("b", ActionType::SendMessage, Channel::Sms).ai_only();
        assert!(action.ai_allowed);
        assert!(!action.human_allowed);
    }

    #[test]
    fn test_playbook_serde_round_trip() {
        let playbook = Playbook::new("sales_default", 1, "prospect_identified")
            .with_stage(make_stage());
        let json = serde_json::to_string(&playbook).unwrap();
        let back: Playbook = serde_json::from_str(&json).unwrap();
        assert_eq!(back.playbook_id, playbook.playbook_id);
        assert_eq!(back.stage_count(), 1);
        let stage = back.stage(&StageId::new("prospect_identified")).unwrap();
        assert_eq!(stage.must_do.len(), 1);
        assert_eq!(stage.must_do[0].sla_minutes, 15);
    }

    #[test]
    fn test_retry_policy() {
        let policy = RetryPolicy::new(3, 30).escalating_after(2);
        assert_eq!(policy.escalate_after, Some(2));
    }

    #[test]
    fn test_evaluation_context_elapsed() {
        let entered = Utc::now();
        let now = entered + chrono::Duration::minutes(42);

        let ctx = EvaluationContext::at(now);
        assert_eq!(ctx.elapsed_minutes(), None);

        let ctx = ctx.with_stage_entry(entered);
        assert_eq!(ctx.elapsed_minutes(), Some(42));
    }
}
