//! Evidence records: proof that a real-world action or outcome
//! happened.
//!
//! Evidence is append-only. Records are never mutated, only
//! accumulated per opportunity and stage; the engines read whatever
//! slice the caller supplies.

use crate::{ActionId, EvidenceId, StageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, timestamped record that something happened.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionEvidence {
    pub evidence_id: EvidenceId,
    /// The playbook stage the evidence was collected in
    pub stage_id: StageId,
    /// The action the evidence belongs to
    pub action_id: ActionId,
    /// Free-form type tag matched against `evidence_required` lists
    /// and transition conditions (e.g. `call_connected`)
    pub evidence_type: String,
    pub collected_at: DateTime<Utc>,
    /// Who or what recorded it (webhook handler, user id, system)
    pub collected_by: String,
    /// Structured payload as delivered by the source
    pub data: serde_json::Value,
    pub source: EvidenceSource,
    /// Optional confidence for inferred evidence, in `[0, 1]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ActionEvidence {
    pub fn new(
        stage_id: impl Into<String>,
        action_id: impl Into<String>,
        evidence_type: impl Into<String>,
        source: EvidenceSource,
    ) -> Self {
        Self {
            evidence_id: EvidenceId::generate(),
            stage_id: StageId::new(stage_id),
            action_id: ActionId::new(action_id),
            evidence_type: evidence_type.into(),
            collected_at: Utc::now(),
            collected_by: String::new(),
            data: serde_json::Value::Null,
            source,
            confidence: None,
        }
    }

    pub fn collected_by(mut self, who: impl Into<String>) -> Self {
        self.collected_by = who.into();
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Where an evidence record came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Delivered by an external system webhook
    Webhook,
    /// Recorded by a human through the product
    Manual,
    /// Emitted by an internal component
    System,
    /// Derived by analysis rather than observed directly
    Inferred,
}
