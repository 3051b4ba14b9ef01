//! Playbook enforcement: the decision point for stage transitions.
//!
//! The enforcer composes the registry, the stage evaluator, and the
//! action planner. It applies the enforcement mode supplied with each
//! call and records an audit event for every decision, allowed or
//! not. It coordinates — it never moves an opportunity itself.

use crate::{audit::AuditSink, evaluator::evaluate_stage, planner::plan_stage_actions};
use dealgate_types::{
    ActionEvidence, CorrelationId, EnforcementMode, EvaluationContext, ExecutionCommand,
    OpportunityId, PlaybookId, StageEvaluationResult, StageId, TenantId, TransitionEvent,
    TransitionTrigger,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::registry::PlaybookRegistry;

/// One requested stage transition, with the evidence it rests on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub tenant_id: TenantId,
    pub opportunity_id: OpportunityId,
    pub playbook_id: PlaybookId,
    pub current_stage_id: StageId,
    pub requested_stage_id: StageId,
    pub trigger: TransitionTrigger,
    /// Evidence accumulated for the current stage, supplied by the
    /// caller's persistence layer
    pub evidence: Vec<ActionEvidence>,
    pub correlation_id: CorrelationId,
}

impl TransitionRequest {
    pub fn new(
        tenant_id: impl Into<String>,
        opportunity_id: impl Into<String>,
        playbook_id: impl Into<String>,
        current_stage_id: impl Into<String>,
        requested_stage_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: TenantId::new(tenant_id),
            opportunity_id: OpportunityId::new(opportunity_id),
            playbook_id: PlaybookId::new(playbook_id),
            current_stage_id: StageId::new(current_stage_id),
            requested_stage_id: StageId::new(requested_stage_id),
            trigger: TransitionTrigger::Webhook,
            evidence: Vec::new(),
            correlation_id: CorrelationId::generate(),
        }
    }

    pub fn with_trigger(mut self, trigger: TransitionTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<ActionEvidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// The enforcer's verdict on one transition request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnforcementDecision {
    pub allowed: bool,
    pub reason: String,
    pub mode: EnforcementMode,
    /// The stage evaluation the decision rests on; absent when the
    /// playbook could not be loaded
    pub evaluation: Option<StageEvaluationResult>,
    /// Commands planned for the next stage, when the requested stage
    /// matches the evaluated one
    pub commands: Vec<ExecutionCommand>,
    /// Under block-and-revert, a denied transition asks the caller to
    /// undo the external change that triggered it
    pub revert_required: bool,
}

/// Decides whether stage transitions are sanctioned by the playbook.
pub struct PlaybookEnforcer {
    registry: Arc<PlaybookRegistry>,
    audit: Arc<dyn AuditSink>,
}

impl PlaybookEnforcer {
    pub fn new(registry: Arc<PlaybookRegistry>, audit: Arc<dyn AuditSink>) -> Self {
        Self { registry, audit }
    }

    /// Evaluate one transition request under the given enforcement
    /// mode.
    ///
    /// The decision is pure with respect to the caller-supplied
    /// inputs. An audit event is recorded on every call — including
    /// playbook-not-found degradations — and a failed publish is
    /// logged without affecting the returned decision.
    pub fn evaluate_transition(
        &self,
        request: &TransitionRequest,
        mode: EnforcementMode,
        context: &EvaluationContext,
    ) -> EnforcementDecision {
        let playbook = self.registry.get(&request.tenant_id, &request.playbook_id);

        let decision = match playbook {
            None => {
                let allowed = !mode.enforces();
                EnforcementDecision {
                    allowed,
                    reason: format!(
                        "playbook '{}' not found for tenant '{}'",
                        request.playbook_id, request.tenant_id
                    ),
                    mode,
                    evaluation: None,
                    commands: Vec::new(),
                    revert_required: !allowed && mode == EnforcementMode::BlockAndRevert,
                }
            }
            Some(playbook) => {
                let evaluation = evaluate_stage(
                    &playbook,
                    &request.current_stage_id,
                    &request.evidence,
                    context,
                );

                let matches_evaluation =
                    evaluation.next_stage.as_ref() == Some(&request.requested_stage_id);
                // Monitor-only always allows; an undecided stage has
                // nothing to block; a matching target is sanctioned.
                let allowed = !mode.enforces() || !evaluation.can_advance || matches_evaluation;

                let reason = if !evaluation.can_advance {
                    format!("no stage decision yet: {}", evaluation.reason)
                } else if matches_evaluation {
                    evaluation.reason.clone()
                } else {
                    format!(
                        "requested stage '{}' does not match evaluated next stage '{}'",
                        request.requested_stage_id,
                        evaluation
                            .next_stage
                            .as_ref()
                            .map(|s| s.as_str())
                            .unwrap_or("none"),
                    )
                };

                let commands = if allowed && matches_evaluation {
                    plan_stage_actions(
                        &playbook,
                        &request.requested_stage_id,
                        &request.opportunity_id,
                        &request.tenant_id,
                        &request.correlation_id,
                    )
                } else {
                    Vec::new()
                };

                EnforcementDecision {
                    allowed,
                    reason,
                    mode,
                    evaluation: Some(evaluation),
                    commands,
                    revert_required: !allowed && mode == EnforcementMode::BlockAndRevert,
                }
            }
        };

        tracing::info!(
            tenant_id = %request.tenant_id,
            opportunity_id = %request.opportunity_id,
            from = %request.current_stage_id,
            to = %request.requested_stage_id,
            mode = ?mode,
            allowed = decision.allowed,
            reason = %decision.reason,
            "Transition evaluated"
        );

        self.record_audit(request, mode, &decision, context);
        decision
    }

    /// Record the attempt and outcome. Publication failure must never
    /// reach the caller of the decision.
    fn record_audit(
        &self,
        request: &TransitionRequest,
        mode: EnforcementMode,
        decision: &EnforcementDecision,
        context: &EvaluationContext,
    ) {
        let event = TransitionEvent::new(
            request.tenant_id.clone(),
            request.opportunity_id.clone(),
            request.playbook_id.clone(),
            request.current_stage_id.clone(),
            request.requested_stage_id.clone(),
            request.trigger.clone(),
            mode,
            request.correlation_id.clone(),
            context.now,
        )
        .with_outcome(decision.allowed, decision.reason.clone())
        .with_evidence_snapshot(
            request
                .evidence
                .iter()
                .map(|e| e.evidence_id.clone())
                .collect(),
        );

        if let Err(error) = self.audit.publish(event) {
            tracing::warn!(
                correlation_id = %request.correlation_id,
                %error,
                "Audit publish failed; decision unaffected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditLog;
    use chrono::Utc;
    use dealgate_types::{
        ActionType, CanonicalStage, Channel, EvidenceSource, Playbook, PlaybookStage, StageAction,
        ThresholdOp, TransitionCondition, TransitionRule,
    };

    fn terminal_stage(id: &str, canonical: CanonicalStage) -> PlaybookStage {
        PlaybookStage::new(
            id,
            canonical,
            TransitionRule::new(TransitionCondition::ManualDecision, id),
            TransitionRule::new(TransitionCondition::ManualDecision, id),
        )
    }

    fn make_playbook() -> Playbook {
        Playbook::new("sales_default", 1, "prospect_identified")
            .with_stage(
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
                ),
            )
            .with_stage(
                PlaybookStage::new(
                    "initial_contact",
                    CanonicalStage::InitialContact,
                    TransitionRule::new(TransitionCondition::present("qualified"), "initial_contact"),
                    TransitionRule::new(TransitionCondition::ManualDecision, "initial_contact"),
                )
                .with_action(
                    StageAction::new("qualification_call", ActionType::QualificationCall, Channel::Voice)
                        .with_sla(60)
                        .requires_evidence("call_summary"),
                ),
            )
            .with_stage(terminal_stage("lost", CanonicalStage::ClosedLost))
    }

    fn make_enforcer() -> (PlaybookEnforcer, Arc<InMemoryAuditLog>) {
        let registry = Arc::new(PlaybookRegistry::new());
        registry.register(make_playbook()).unwrap();
        let audit = Arc::new(InMemoryAuditLog::new());
        (
            PlaybookEnforcer::new(registry, Arc::clone(&audit) as Arc<dyn AuditSink>),
            audit,
        )
    }

    fn connected_evidence() -> Vec<ActionEvidence> {
        vec![ActionEvidence::new(
            "prospect_identified",
            "initial_contact_attempt",
            "call_connected",
            EvidenceSource::Webhook,
        )]
    }

    fn context() -> EvaluationContext {
        EvaluationContext::at(Utc::now())
    }

    #[test]
    fn test_matching_transition_allowed_with_commands() {
        let (enforcer, audit) = make_enforcer();
        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "initial_contact",
        )
        .with_evidence(connected_evidence());

        let decision = enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());

        assert!(decision.allowed);
        assert!(!decision.revert_required);
        // Next stage has one must_do action
        assert_eq!(decision.commands.len(), 1);
        assert_eq!(decision.commands[0].action_id.as_str(), "qualification_call");
        assert_eq!(audit.len(), 1);
        assert!(audit.events()[0].allowed);
    }

    #[test]
    fn test_mismatched_transition_denied_in_block_mode() {
        let (enforcer, audit) = make_enforcer();
        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "lost",
        )
        .with_evidence(connected_evidence());

        let decision = enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());

        assert!(!decision.allowed);
        assert!(decision.commands.is_empty());
        assert!(decision.reason.contains("does not match"));
        assert!(!audit.events()[0].allowed);
    }

    #[test]
    fn test_monitor_only_never_denies() {
        let (enforcer, audit) = make_enforcer();
        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "lost",
        )
        .with_evidence(connected_evidence());

        let decision =
            enforcer.evaluate_transition(&request, EnforcementMode::MonitorOnly, &context());

        assert!(decision.allowed);
        // Attempt is still audited, flagged as not enforced
        assert_eq!(audit.len(), 1);
        assert!(!audit.events()[0].enforced);
    }

    #[test]
    fn test_undecided_stage_is_not_blocked() {
        let (enforcer, _audit) = make_enforcer();
        // No evidence: evaluator cannot advance, so there is nothing
        // to block
        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "initial_contact",
        );

        let decision = enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());

        assert!(decision.allowed);
        assert!(decision.reason.contains("no stage decision yet"));
        assert!(decision.commands.is_empty());
    }

    #[test]
    fn test_missing_playbook_denies_unless_monitoring() {
        let (enforcer, audit) = make_enforcer();
        let request =
            TransitionRequest::new("tenant-1", "opp-1", "ghost", "a", "b");

        let blocked = enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());
        assert!(!blocked.allowed);
        assert!(blocked.evaluation.is_none());
        assert!(blocked.reason.contains("not found"));

        let observed =
            enforcer.evaluate_transition(&request, EnforcementMode::MonitorOnly, &context());
        assert!(observed.allowed);

        // Both degradations were audited
        assert_eq!(audit.len(), 2);
    }

    #[test]
    fn test_block_and_revert_sets_revert_flag() {
        let (enforcer, _audit) = make_enforcer();
        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "lost",
        )
        .with_evidence(connected_evidence());

        let decision =
            enforcer.evaluate_transition(&request, EnforcementMode::BlockAndRevert, &context());

        assert!(!decision.allowed);
        assert!(decision.revert_required);
    }

    #[test]
    fn test_failure_path_to_lost_allowed() {
        let (enforcer, _audit) = make_enforcer();
        let attempts: Vec<ActionEvidence> = (0..3)
            .map(|_| {
                ActionEvidence::new(
                    "prospect_identified",
                    "initial_contact_attempt",
                    "call_attempt_logged",
                    EvidenceSource::Webhook,
                )
            })
            .collect();

        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "lost",
        )
        .with_evidence(attempts);

        let decision = enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());

        assert!(decision.allowed);
        assert_eq!(decision.reason, "Failure condition met");
        // The lost stage has no must_do actions, so nothing is planned
        assert!(decision.commands.is_empty());
    }

    #[test]
    fn test_audit_failure_does_not_change_decision() {
        struct FailingSink;
        impl AuditSink for FailingSink {
            fn publish(&self, _event: TransitionEvent) -> dealgate_types::DealgateResult<()> {
                Err(dealgate_types::DealgateError::AuditChannelClosed)
            }
        }

        let registry = Arc::new(PlaybookRegistry::new());
        registry.register(make_playbook()).unwrap();
        let enforcer = PlaybookEnforcer::new(registry, Arc::new(FailingSink));

        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "initial_contact",
        )
        .with_evidence(connected_evidence());

        let decision = enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());
        assert!(decision.allowed);
    }

    #[test]
    fn test_evidence_snapshot_recorded() {
        let (enforcer, audit) = make_enforcer();
        let evidence = connected_evidence();
        let expected_id = evidence[0].evidence_id.clone();

        let request = TransitionRequest::new(
            "tenant-1",
            "opp-1",
            "sales_default",
            "prospect_identified",
            "initial_contact",
        )
        .with_evidence(evidence);

        enforcer.evaluate_transition(&request, EnforcementMode::Block, &context());

        let events = audit.events();
        assert_eq!(events[0].evidence_snapshot, vec![expected_id]);
    }
}
