//! Audit events: the append-only record of every enforcement
//! decision, attempt and outcome alike.

use crate::{CorrelationId, EvidenceId, OpportunityId, PlaybookId, StageId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Policy governing whether a blocked decision is merely logged or
/// actually denied.
///
/// The mode is an explicit parameter on each evaluation call — never
/// hidden enforcer state — so concurrent tenant evaluations cannot
/// observe each other's policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    /// Log the decision, always allow the transition
    MonitorOnly,
    /// Deny transitions the playbook does not sanction
    Block,
    /// Deny, and instruct the caller to revert an already-applied
    /// external change
    BlockAndRevert,
}

impl EnforcementMode {
    /// Whether this mode actually denies unsanctioned transitions.
    pub fn enforces(&self) -> bool {
        !matches!(self, Self::MonitorOnly)
    }
}

/// What initiated a transition attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// An external CRM webhook reported a stage move
    Webhook,
    /// A human moved the opportunity in the product
    Manual,
    /// The engine itself proposed the move after evaluation
    Evaluation,
}

/// One audit record: a transition attempt and its outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub event_id: String,
    pub tenant_id: TenantId,
    pub opportunity_id: OpportunityId,
    pub playbook_id: PlaybookId,
    pub from_stage: StageId,
    pub to_stage: StageId,
    pub trigger: TransitionTrigger,
    /// IDs of the evidence records the decision was made against
    pub evidence_snapshot: Vec<EvidenceId>,
    /// Whether the decision was actually enforced (false under
    /// monitor-only)
    pub enforced: bool,
    pub mode: EnforcementMode,
    pub allowed: bool,
    pub reason: String,
    pub correlation_id: CorrelationId,
    pub occurred_at: DateTime<Utc>,
}

impl TransitionEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        opportunity_id: OpportunityId,
        playbook_id: PlaybookId,
        from_stage: StageId,
        to_stage: StageId,
        trigger: TransitionTrigger,
        mode: EnforcementMode,
        correlation_id: CorrelationId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            opportunity_id,
            playbook_id,
            from_stage,
            to_stage,
            trigger,
            evidence_snapshot: Vec::new(),
            enforced: mode.enforces(),
            mode,
            allowed: false,
            reason: String::new(),
            correlation_id,
            occurred_at,
        }
    }

    pub fn with_outcome(mut self, allowed: bool, reason: impl Into<String>) -> Self {
        self.allowed = allowed;
        self.reason = reason.into();
        self
    }

    pub fn with_evidence_snapshot(mut self, evidence: Vec<EvidenceId>) -> Self {
        self.evidence_snapshot = evidence;
        self
    }
}
