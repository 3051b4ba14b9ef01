//! Canonical stage registry: per-tenant pipeline configurations.
//!
//! Configurations are set once via the admin path and read on every
//! evaluation. Tenants without an explicit configuration get the
//! documented default nine-stage pipeline.

use dealgate_types::{
    CanonicalStage, DealgateError, DealgateResult, PipelineConfiguration, PipelineId, TenantId,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of tenant pipeline configurations.
pub struct PipelineRegistry {
    configurations: RwLock<HashMap<(TenantId, PipelineId), Arc<PipelineConfiguration>>>,
}

impl PipelineRegistry {
    /// Create an empty registry. Every lookup falls back to the
    /// default nine-stage pipeline until configurations are set.
    pub fn new() -> Self {
        Self {
            configurations: RwLock::new(HashMap::new()),
        }
    }

    /// Publish a tenant's pipeline configuration.
    ///
    /// Validates the graph before storing. Replacing an existing
    /// configuration swaps the whole snapshot; in-flight readers keep
    /// the `Arc` they already hold.
    pub fn set_configuration(&self, config: PipelineConfiguration) -> DealgateResult<()> {
        config.validate()?;

        let key = (config.tenant_id.clone(), config.pipeline_id.clone());
        let mut configurations = self
            .configurations
            .write()
            .map_err(|_| DealgateError::LockPoisoned)?;

        tracing::info!(
            tenant_id = %key.0,
            pipeline_id = %key.1,
            stages = config.stages.len(),
            "Pipeline configuration published"
        );
        configurations.insert(key, Arc::new(config));
        Ok(())
    }

    /// The tenant's configuration, or the default nine-stage pipeline
    /// if none has been published.
    pub fn configuration(
        &self,
        tenant_id: &TenantId,
        pipeline_id: &PipelineId,
    ) -> DealgateResult<Arc<PipelineConfiguration>> {
        let configurations = self
            .configurations
            .read()
            .map_err(|_| DealgateError::LockPoisoned)?;

        if let Some(config) = configurations.get(&(tenant_id.clone(), pipeline_id.clone())) {
            return Ok(Arc::clone(config));
        }

        Ok(Arc::new(PipelineConfiguration::default_nine_stage(
            tenant_id.clone(),
            pipeline_id.clone(),
        )))
    }

    /// Map an external CRM stage identifier to its canonical stage.
    pub fn map_external_stage(
        &self,
        tenant_id: &TenantId,
        pipeline_id: &PipelineId,
        external_stage_id: &str,
    ) -> DealgateResult<Option<CanonicalStage>> {
        let config = self.configuration(tenant_id, pipeline_id)?;
        Ok(config.map_external(external_stage_id))
    }

    /// Whether a tenant has published an explicit configuration.
    pub fn has_configuration(&self, tenant_id: &TenantId, pipeline_id: &PipelineId) -> bool {
        self.configurations
            .read()
            .map(|c| c.contains_key(&(tenant_id.clone(), pipeline_id.clone())))
            .unwrap_or(false)
    }

    /// Number of explicitly published configurations.
    pub fn count(&self) -> usize {
        self.configurations.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
