//! Execution commands: planned, not-yet-performed instructions.
//!
//! The Action Planner produces commands; execution adapters carry
//! them out. Commands are produced fresh per planning call and
//! consumed exactly once downstream — idempotency is the execution
//! layer's concern.

use crate::{
    ActionId, Channel, CommandId, CorrelationId, OpportunityId, PlaybookId, RetryPolicy, StageId,
};
use serde::{Deserialize, Serialize};

/// A planned instruction for an execution adapter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionCommand {
    pub command_id: CommandId,
    pub opportunity_id: OpportunityId,
    pub playbook_id: PlaybookId,
    pub stage_id: StageId,
    pub action_id: ActionId,
    pub command_type: CommandType,
    pub channel: Channel,
    pub priority: CommandPriority,
    /// Actor gates, passed through from the action definition
    pub human_allowed: bool,
    pub ai_allowed: bool,
    /// Advisory retry metadata for the execution layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
    pub correlation_id: CorrelationId,
}

/// What an execution adapter is being asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    ExecuteContact,
    SendMessage,
    ScheduleMeeting,
    FollowUp,
}

/// Scheduling priority, derived from the action's SLA window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl CommandPriority {
    /// The documented SLA banding: `<= 15` minutes is `Urgent`,
    /// `<= 60` is `High`, `<= 240` is `Normal`, anything slower is
    /// `Low`.
    pub fn from_sla_minutes(sla_minutes: u32) -> Self {
        match sla_minutes {
            0..=15 => Self::Urgent,
            16..=60 => Self::High,
            61..=240 => Self::Normal,
            _ => Self::Low,
        }
    }
}
