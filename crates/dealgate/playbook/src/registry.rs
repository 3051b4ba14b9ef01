//! Playbook registry: stores versioned playbook definitions.
//!
//! Lookup is tenant-specific first, then global fallback. Playbooks
//! are immutable once published; re-publishing the same version is
//! rejected. The lint here is a static check run at publish time — it
//! never executes the playbook.

use dealgate_types::{DealgateError, DealgateResult, Playbook, PlaybookId, TenantId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry key: global playbooks use `tenant: None`.
type PlaybookKey = (Option<TenantId>, PlaybookId);

/// Registry of playbook definitions, global and per-tenant.
pub struct PlaybookRegistry {
    playbooks: RwLock<HashMap<PlaybookKey, Vec<Arc<Playbook>>>>,
}

impl PlaybookRegistry {
    pub fn new() -> Self {
        Self {
            playbooks: RwLock::new(HashMap::new()),
        }
    }

    /// Publish a playbook.
    ///
    /// Runs the structural lint and rejects invalid definitions.
    /// Publishing a `(tenant, id, version)` that already exists is
    /// rejected — new behavior requires a new version.
    pub fn register(&self, playbook: Playbook) -> DealgateResult<PlaybookId> {
        let errors = Self::lint(&playbook);
        if !errors.is_empty() {
            return Err(DealgateError::InvalidPlaybook(errors));
        }

        let key = (playbook.tenant_id.clone(), playbook.playbook_id.clone());
        let mut playbooks = self
            .playbooks
            .write()
            .map_err(|_| DealgateError::LockPoisoned)?;

        let versions = playbooks.entry(key).or_default();
        if versions.iter().any(|p| p.version == playbook.version) {
            return Err(DealgateError::VersionAlreadyPublished(
                playbook.playbook_id.clone(),
            ));
        }

        tracing::info!(
            playbook_id = %playbook.playbook_id,
            version = playbook.version,
            tenant = playbook.tenant_id.as_ref().map(|t| t.as_str()).unwrap_or("global"),
            "Playbook published"
        );

        let id = playbook.playbook_id.clone();
        versions.push(Arc::new(playbook));
        versions.sort_by_key(|p| p.version);
        Ok(id)
    }

    /// The latest version of a playbook: tenant-specific key first,
    /// then global fallback.
    pub fn get(&self, tenant_id: &TenantId, playbook_id: &PlaybookId) -> Option<Arc<Playbook>> {
        let playbooks = self.playbooks.read().ok()?;

        let tenant_key = (Some(tenant_id.clone()), playbook_id.clone());
        if let Some(found) = playbooks.get(&tenant_key).and_then(|v| v.last()) {
            return Some(Arc::clone(found));
        }

        let global_key = (None, playbook_id.clone());
        playbooks
            .get(&global_key)
            .and_then(|v| v.last())
            .map(Arc::clone)
    }

    /// A specific published version, tenant fallback as in [`get`].
    ///
    /// [`get`]: Self::get
    pub fn get_version(
        &self,
        tenant_id: &TenantId,
        playbook_id: &PlaybookId,
        version: u32,
    ) -> Option<Arc<Playbook>> {
        let playbooks = self.playbooks.read().ok()?;

        for key in [
            (Some(tenant_id.clone()), playbook_id.clone()),
            (None, playbook_id.clone()),
        ] {
            if let Some(found) = playbooks
                .get(&key)
                .and_then(|v| v.iter().find(|p| p.version == version))
            {
                return Some(Arc::clone(found));
            }
        }
        None
    }

    /// All published versions for a playbook id under one key.
    pub fn versions(&self, tenant_id: Option<&TenantId>, playbook_id: &PlaybookId) -> Vec<u32> {
        self.playbooks
            .read()
            .ok()
            .and_then(|map| {
                map.get(&(tenant_id.cloned(), playbook_id.clone()))
                    .map(|v| v.iter().map(|p| p.version).collect())
            })
            .unwrap_or_default()
    }

    /// Number of published playbooks (all versions, all keys).
    pub fn count(&self) -> usize {
        self.playbooks
            .read()
            .map(|map| map.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }

    /// Structural lint, run at publish time.
    ///
    /// Checks shape only: non-empty entry stage and stage map, entry
    /// stage exists, every success/failure target resolves to a stage
    /// in the same playbook, and every `must_do` action names the
    /// evidence that proves it.
    pub fn lint(playbook: &Playbook) -> Vec<String> {
        let mut errors = Vec::new();

        if playbook.entry_stage.as_str().is_empty() {
            errors.push("entry_stage must not be empty".to_string());
        }
        if playbook.stages.is_empty() {
            errors.push("playbook must define at least one stage".to_string());
        } else if !playbook.stages.contains_key(&playbook.entry_stage) {
            errors.push(format!(
                "entry stage '{}' is not defined in the playbook",
                playbook.entry_stage
            ));
        }

        for (stage_id, stage) in &playbook.stages {
            if !playbook.stages.contains_key(&stage.on_success.next_stage) {
                errors.push(format!(
                    "stage '{}': on_success target '{}' does not exist",
                    stage_id, stage.on_success.next_stage
                ));
            }
            if !playbook.stages.contains_key(&stage.on_failure.next_stage) {
                errors.push(format!(
                    "stage '{}': on_failure target '{}' does not exist",
                    stage_id, stage.on_failure.next_stage
                ));
            }
            for action in &stage.must_do {
                if action.evidence_required.is_empty() {
                    errors.push(format!(
                        "stage '{}': action '{}' requires no evidence; every must_do action needs at least one evidence type",
                        stage_id, action.action_id
                    ));
                }
                if let Some(policy) = &action.retry_policy {
                    if policy.max_attempts == 0 {
                        errors.push(format!(
                            "stage '{}': action '{}' has a retry policy with zero attempts",
                            stage_id, action.action_id
                        ));
                    }
                }
            }
            for escalation in &stage.escalations {
                if escalation.trigger_after_minutes == 0 {
                    errors.push(format!(
                        "stage '{}': escalation to {} triggers immediately",
                        stage_id, escalation.escalate_to
                    ));
                }
            }
        }

        errors
    }
}

impl Default for PlaybookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
