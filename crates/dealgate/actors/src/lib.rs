//! Actor Selection Decision Engine for dealgate.
//!
//! Given a planned execution command and the opportunity's situation,
//! this crate decides which actor — AI, human, or a hybrid of both —
//! is permitted to carry the command out.
//!
//! Both halves are pure functions: [`assess_risk`] derives a
//! four-band risk assessment from caller-supplied context, and
//! [`select_actor`] picks an actor deterministically from the
//! command's gates, the risk band, and the tenant's selection policy.
//! Identical inputs always produce bit-identical output; that
//! determinism is what makes the decisions auditable.

#![deny(unsafe_code)]

pub mod risk;
pub mod selector;

pub use risk::assess_risk;
pub use selector::{assess_actor_capabilities, select_actor, ActorCapabilitySet};
