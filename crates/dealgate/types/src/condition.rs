//! Transition conditions: the evidence gates on playbook stages.
//!
//! A stage advances because evidence says so, never by fiat. Every
//! condition is an explicit variant so the evaluator's match is
//! compiler-checked for completeness.

use serde::{Deserialize, Serialize};

/// The condition that decides a stage's success or failure transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionCondition {
    /// Satisfied when evidence of the given type exists. With
    /// `threshold` and `operator` set, the *count* of matching
    /// evidence items is compared against the threshold instead.
    EvidencePresent {
        evidence_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        threshold: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        operator: Option<ThresholdOp>,
    },

    /// Satisfied when no evidence of the given type exists
    EvidenceAbsent { evidence_type: String },

    /// Satisfied when wall-clock time since stage entry exceeds the
    /// threshold. Stage entry time is supplied by the caller; when it
    /// is unknown this condition is not satisfiable.
    TimeElapsed { threshold_minutes: u32 },

    /// Never satisfied by the engine. A human must decide out of band.
    ManualDecision,
}

impl TransitionCondition {
    /// Presence of at least one evidence item of `evidence_type`.
    pub fn present(evidence_type: impl Into<String>) -> Self {
        Self::EvidencePresent {
            evidence_type: evidence_type.into(),
            threshold: None,
            operator: None,
        }
    }

    /// Count of matching evidence items compared against `threshold`.
    pub fn count(evidence_type: impl Into<String>, operator: ThresholdOp, threshold: u32) -> Self {
        Self::EvidencePresent {
            evidence_type: evidence_type.into(),
            threshold: Some(threshold),
            operator: Some(operator),
        }
    }

    pub fn absent(evidence_type: impl Into<String>) -> Self {
        Self::EvidenceAbsent {
            evidence_type: evidence_type.into(),
        }
    }

    pub fn elapsed(threshold_minutes: u32) -> Self {
        Self::TimeElapsed { threshold_minutes }
    }

    /// Whether this condition can ever be satisfied automatically.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, Self::ManualDecision)
    }

    /// The evidence type this condition inspects, if any.
    pub fn evidence_type(&self) -> Option<&str> {
        match self {
            Self::EvidencePresent { evidence_type, .. }
            | Self::EvidenceAbsent { evidence_type } => Some(evidence_type),
            Self::TimeElapsed { .. } | Self::ManualDecision => None,
        }
    }
}

/// Comparison operator for count-threshold conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOp {
    Gte,
    Lte,
    Eq,
}

impl ThresholdOp {
    pub fn compare(&self, count: u32, threshold: u32) -> bool {
        match self {
            Self::Gte => count >= threshold,
            Self::Lte => count <= threshold,
            Self::Eq => count == threshold,
        }
    }
}
