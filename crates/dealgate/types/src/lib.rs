//! Domain types for dealgate — the deterministic rule-evaluation core
//! that governs how a sales opportunity moves through a canonical
//! process model and which actor may execute the next required action.
//!
//! Everything in this crate is data: definitions (pipelines,
//! playbooks), records (evidence, commands, audit events), and
//! decision results. The engines that evaluate them live in
//! `dealgate-stages`, `dealgate-playbook`, and `dealgate-actors`.
//!
//! Definitions are immutable once published. To modify, create a new
//! version.

#![deny(unsafe_code)]

pub mod actor;
pub mod command;
pub mod condition;
pub mod error;
pub mod evidence;
pub mod event;
pub mod id;
pub mod pipeline;
pub mod playbook;
pub mod risk;
pub mod stage;

pub use actor::{ActorCapability, ActorSelectionConfig, ActorType};
pub use command::{CommandPriority, CommandType, ExecutionCommand};
pub use condition::{ThresholdOp, TransitionCondition};
pub use error::{DealgateError, DealgateResult};
pub use evidence::{ActionEvidence, EvidenceSource};
pub use event::{EnforcementMode, TransitionEvent, TransitionTrigger};
pub use id::{
    ActionId, CommandId, CorrelationId, EvidenceId, OpportunityId, PipelineId, PlaybookId,
    StageId, TenantId,
};
pub use pipeline::{PipelineConfiguration, StageMapping};
pub use playbook::{
    ActionType, Channel, EscalationRule, EvaluationContext, Playbook, PlaybookStage, RetryPolicy,
    StageAction, StageEvaluationResult, TransitionRule,
};
pub use risk::{OpportunityContext, RiskAssessment, RiskBand, RiskFactor};
pub use stage::CanonicalStage;
