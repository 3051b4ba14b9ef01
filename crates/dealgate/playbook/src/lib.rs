//! Playbook Enforcement Engine for dealgate.
//!
//! The engine decides whether a requested stage transition is
//! sanctioned by the opportunity's playbook, and plans the execution
//! commands the next stage requires. It never executes anything.
//!
//! # Architecture
//!
//! The [`PlaybookEnforcer`] composes specialized components:
//!
//! - [`PlaybookRegistry`] — stores versioned playbook definitions
//!   (global + tenant overrides) and lints them at publish time
//! - [`evaluator`] — judges accumulated evidence against a stage's
//!   success/failure conditions
//! - [`planner`] — converts a stage's required actions into
//!   execution commands with computed priority
//! - [`audit`] — the fire-and-forget side channel every decision is
//!   recorded on
//!
//! All decisions are pure computations over caller-supplied inputs;
//! the only shared state is the registry's snapshot map.
//!
//! # Example
//!
//! ```rust
//! use dealgate_playbook::{InMemoryAuditLog, PlaybookEnforcer, PlaybookRegistry, TransitionRequest};
//! use dealgate_types::*;
//! use std::sync::Arc;
//!
//! let playbook = Playbook::new("sales_default", 1, "prospect_identified")
//!     .with_stage(
//!         PlaybookStage::new(
//!             "prospect_identified",
//!             CanonicalStage::ProspectIdentified,
//!             TransitionRule::new(
//!                 TransitionCondition::present("call_connected"),
//!                 "initial_contact",
//!             ),
//!             TransitionRule::new(TransitionCondition::ManualDecision, "prospect_identified"),
//!         )
//!         .with_action(
//!             StageAction::new("initial_contact_attempt", ActionType::ContactAttempt, Channel::Voice)
//!                 .requires_evidence("call_attempt_logged"),
//!         ),
//!     )
//!     .with_stage(PlaybookStage::new(
//!         "initial_contact",
//!         CanonicalStage::InitialContact,
//!         TransitionRule::new(TransitionCondition::ManualDecision, "initial_contact"),
//!         TransitionRule::new(TransitionCondition::ManualDecision, "initial_contact"),
//!     ));
//!
//! let registry = Arc::new(PlaybookRegistry::new());
//! registry.register(playbook).unwrap();
//!
//! let enforcer = PlaybookEnforcer::new(registry, Arc::new(InMemoryAuditLog::new()));
//! let request = TransitionRequest::new(
//!     "tenant-1", "opp-1", "sales_default", "prospect_identified", "initial_contact",
//! )
//! .with_evidence(vec![ActionEvidence::new(
//!     "prospect_identified",
//!     "initial_contact_attempt",
//!     "call_connected",
//!     EvidenceSource::Webhook,
//! )]);
//!
//! let decision = enforcer.evaluate_transition(
//!     &request,
//!     EnforcementMode::Block,
//!     &EvaluationContext::at(chrono::Utc::now()),
//! );
//! assert!(decision.allowed);
//! ```

#![deny(unsafe_code)]

pub mod audit;
pub mod enforcer;
pub mod evaluator;
pub mod planner;
pub mod registry;

pub use audit::{AuditQueue, AuditSink, InMemoryAuditLog};
pub use enforcer::{EnforcementDecision, PlaybookEnforcer, TransitionRequest};
pub use evaluator::evaluate_stage;
pub use planner::plan_stage_actions;
pub use registry::PlaybookRegistry;
