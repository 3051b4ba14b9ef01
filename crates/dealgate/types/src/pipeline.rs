//! Pipeline configuration: per-tenant stage mappings and the
//! allowed-transition graph.
//!
//! A `PipelineConfiguration` is created when a tenant's pipeline is
//! wired up and is immutable once evaluations run against it. To
//! change a tenant's graph, publish a replacement configuration.

use crate::{CanonicalStage, DealgateError, DealgateResult, PipelineId, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps one external (tenant CRM) stage identifier onto the canonical
/// stage set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageMapping {
    /// The stage identifier as the tenant's CRM knows it
    pub external_stage_id: String,
    /// The canonical stage it maps to
    pub canonical_stage: CanonicalStage,
    /// Whether this external stage represents a won deal
    #[serde(default)]
    pub is_won: bool,
    /// Whether this external stage represents a lost deal
    #[serde(default)]
    pub is_lost: bool,
}

impl StageMapping {
    pub fn new(external_stage_id: impl Into<String>, canonical_stage: CanonicalStage) -> Self {
        Self {
            external_stage_id: external_stage_id.into(),
            canonical_stage,
            is_won: canonical_stage.is_won(),
            is_lost: canonical_stage.is_lost(),
        }
    }
}

/// A tenant pipeline: its external→canonical stage mappings and the
/// allowed-transition graph over canonical stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfiguration {
    pub tenant_id: TenantId,
    pub pipeline_id: PipelineId,
    /// External stage mappings, one per CRM pipeline stage
    pub stages: Vec<StageMapping>,
    /// Adjacency: legal next stages per canonical stage. Terminal
    /// stages are present with empty lists.
    pub allowed_transitions: HashMap<CanonicalStage, Vec<CanonicalStage>>,
}

impl PipelineConfiguration {
    pub fn new(tenant_id: TenantId, pipeline_id: PipelineId) -> Self {
        Self {
            tenant_id,
            pipeline_id,
            stages: Vec::new(),
            allowed_transitions: HashMap::new(),
        }
    }

    /// The documented default nine-stage pipeline, used when a tenant
    /// has not published its own configuration.
    ///
    /// The graph is mostly linear with three escape hatches: any
    /// non-terminal stage may move to `ClosedLost`, `Negotiation` may
    /// fall back to `ProposalSent`, and `VerbalCommit` may fall back
    /// to `Negotiation`.
    pub fn default_nine_stage(tenant_id: TenantId, pipeline_id: PipelineId) -> Self {
        use CanonicalStage::*;

        let mut allowed: HashMap<CanonicalStage, Vec<CanonicalStage>> = HashMap::new();
        allowed.insert(ProspectIdentified, vec![InitialContact, ClosedLost]);
        allowed.insert(InitialContact, vec![Qualified, ClosedLost]);
        allowed.insert(Qualified, vec![MeetingScheduled, ClosedLost]);
        allowed.insert(MeetingScheduled, vec![ProposalSent, ClosedLost]);
        allowed.insert(ProposalSent, vec![Negotiation, ClosedLost]);
        allowed.insert(Negotiation, vec![VerbalCommit, ProposalSent, ClosedLost]);
        allowed.insert(VerbalCommit, vec![ClosedWon, Negotiation, ClosedLost]);
        allowed.insert(ClosedWon, vec![]);
        allowed.insert(ClosedLost, vec![]);

        let stages = CanonicalStage::all()
            .into_iter()
            .map(|stage| StageMapping::new(stage.as_str(), stage))
            .collect();

        Self {
            tenant_id,
            pipeline_id,
            stages,
            allowed_transitions: allowed,
        }
    }

    pub fn add_stage(mut self, mapping: StageMapping) -> Self {
        self.stages.push(mapping);
        self
    }

    pub fn add_transition(mut self, from: CanonicalStage, to: CanonicalStage) -> Self {
        self.allowed_transitions.entry(from).or_default().push(to);
        self
    }

    /// Map an external stage identifier to its canonical stage.
    pub fn map_external(&self, external_stage_id: &str) -> Option<CanonicalStage> {
        self.stages
            .iter()
            .find(|m| m.external_stage_id == external_stage_id)
            .map(|m| m.canonical_stage)
    }

    /// Legal next stages from `from`. Empty for terminal or unknown
    /// stages.
    pub fn next_stages(&self, from: CanonicalStage) -> &[CanonicalStage] {
        self.allowed_transitions
            .get(&from)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Structural validation, run when a configuration is published.
    ///
    /// Every stage referenced in a transition target list must itself
    /// exist as a key, and terminal canonical stages must not have
    /// outgoing transitions.
    pub fn validate(&self) -> DealgateResult<()> {
        for (from, targets) in &self.allowed_transitions {
            if from.is_terminal() && !targets.is_empty() {
                return Err(DealgateError::InvalidPipeline(format!(
                    "terminal stage '{}' has outgoing transitions",
                    from
                )));
            }
            for to in targets {
                if !self.allowed_transitions.contains_key(to) {
                    return Err(DealgateError::InvalidPipeline(format!(
                        "transition target '{}' is not a key in the graph",
                        to
                    )));
                }
            }
        }
        Ok(())
    }
}
