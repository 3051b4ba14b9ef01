//! Action planning: converts a stage's required actions into
//! execution commands.
//!
//! The planner emits instructions, it never executes them. Commands
//! are minted fresh on every call; the execution layer owns
//! idempotency and retries.

use dealgate_types::{
    ActionType, CommandId, CommandPriority, CommandType, CorrelationId, ExecutionCommand,
    OpportunityId, Playbook, StageId, TenantId,
};

/// One execution command per `must_do` action of the named stage.
///
/// Returns an empty vec for an unknown stage or a stage with no
/// actions. Actor gates and retry policy pass through from the action
/// definition unmodified; priority derives from the action's SLA via
/// the documented banding on [`CommandPriority::from_sla_minutes`].
pub fn plan_stage_actions(
    playbook: &Playbook,
    stage_id: &StageId,
    opportunity_id: &OpportunityId,
    tenant_id: &TenantId,
    correlation_id: &CorrelationId,
) -> Vec<ExecutionCommand> {
    let stage = match playbook.stage(stage_id) {
        Some(stage) => stage,
        None => return Vec::new(),
    };

    let commands: Vec<ExecutionCommand> = stage
        .must_do
        .iter()
        .map(|action| ExecutionCommand {
            command_id: CommandId::generate(),
            opportunity_id: opportunity_id.clone(),
            playbook_id: playbook.playbook_id.clone(),
            stage_id: stage_id.clone(),
            action_id: action.action_id.clone(),
            command_type: command_type_for(action.action_type),
            channel: action.channel,
            priority: CommandPriority::from_sla_minutes(action.sla_minutes),
            human_allowed: action.human_allowed,
            ai_allowed: action.ai_allowed,
            retry_policy: action.retry_policy.clone(),
            correlation_id: correlation_id.clone(),
        })
        .collect();

    if !commands.is_empty() {
        tracing::debug!(
            tenant_id = %tenant_id,
            opportunity_id = %opportunity_id,
            stage_id = %stage_id,
            commands = commands.len(),
            "Stage actions planned"
        );
    }

    commands
}

fn command_type_for(action_type: ActionType) -> CommandType {
    match action_type {
        ActionType::ContactAttempt | ActionType::QualificationCall => CommandType::ExecuteContact,
        ActionType::SendMessage => CommandType::SendMessage,
        ActionType::ScheduleMeeting => CommandType::ScheduleMeeting,
        ActionType::FollowUp => CommandType::FollowUp,
    }
}
