//! Stage evaluation: judges accumulated evidence against a stage's
//! success and failure conditions.
//!
//! Evaluation order is fixed: success condition first, then failure,
//! then a blocked result carrying the evidence gap. The function is a
//! pure computation — identical inputs produce identical results.

use dealgate_types::{
    ActionEvidence, EvaluationContext, Playbook, StageEvaluationResult, StageId,
    TransitionCondition,
};

/// Evaluate one stage of a playbook against the evidence accumulated
/// for it.
///
/// 1. Unknown stage → blocked, "stage not found".
/// 2. Success condition satisfied → advance to its target.
/// 3. Failure condition satisfied → advance to its target.
/// 4. Otherwise blocked, with `required_evidence`, `missing_evidence`
///    and `blocking_actions` describing what is still owed.
pub fn evaluate_stage(
    playbook: &Playbook,
    stage_id: &StageId,
    evidence: &[ActionEvidence],
    context: &EvaluationContext,
) -> StageEvaluationResult {
    let stage = match playbook.stage(stage_id) {
        Some(stage) => stage,
        None => {
            return StageEvaluationResult::blocked(format!(
                "stage not found: '{}' is not defined in playbook '{}'",
                stage_id, playbook.playbook_id
            ))
        }
    };

    if condition_met(&stage.on_success.condition, evidence, context) {
        return StageEvaluationResult::advance(
            stage.on_success.next_stage.clone(),
            "Success condition met",
        );
    }

    if condition_met(&stage.on_failure.condition, evidence, context) {
        return StageEvaluationResult::advance(
            stage.on_failure.next_stage.clone(),
            "Failure condition met",
        );
    }

    let required_evidence = stage.required_evidence();
    let missing_evidence: Vec<String> = required_evidence
        .iter()
        .filter(|required| !evidence.iter().any(|e| &e.evidence_type == *required))
        .cloned()
        .collect();
    let blocking_actions = stage
        .must_do
        .iter()
        .filter(|action| {
            action
                .evidence_required
                .iter()
                .any(|required| missing_evidence.contains(required))
        })
        .map(|action| action.action_id.clone())
        .collect();

    StageEvaluationResult {
        can_advance: false,
        next_stage: None,
        reason: "Neither success nor failure condition met".to_string(),
        required_evidence,
        missing_evidence,
        blocking_actions,
    }
}

/// Whether a condition holds against the accumulated evidence.
fn condition_met(
    condition: &TransitionCondition,
    evidence: &[ActionEvidence],
    context: &EvaluationContext,
) -> bool {
    match condition {
        TransitionCondition::EvidencePresent {
            evidence_type,
            threshold,
            operator,
        } => {
            let count = evidence
                .iter()
                .filter(|e| &e.evidence_type == evidence_type)
                .count() as u32;
            match (threshold, operator) {
                (Some(threshold), Some(operator)) => operator.compare(count, *threshold),
                // A threshold without an operator defaults to gte
                (Some(threshold), None) => count >= *threshold,
                _ => count >= 1,
            }
        }

        TransitionCondition::EvidenceAbsent { evidence_type } => {
            !evidence.iter().any(|e| &e.evidence_type == evidence_type)
        }

        TransitionCondition::TimeElapsed { threshold_minutes } => context
            .elapsed_minutes()
            .map(|elapsed| elapsed > *threshold_minutes as i64)
            .unwrap_or(false),

        // Deliberate abstention: a human must decide out of band
        TransitionCondition::ManualDecision => false,
    }
}
