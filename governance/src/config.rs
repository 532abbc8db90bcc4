//! Governance configurations and their resolution by scope.
//!
//! A configuration supplies the quorum and passing threshold a new proposal
//! copies at creation. Each scope (global, or one organization) has at most
//! one active configuration, tracked by the store's scope index. Lookup
//! prefers the proposal's own organization and falls back to the global
//! configuration: the most specific scope wins.

use std::sync::{Arc, Mutex};

use agora_store::GovernanceStore;
use agora_types::{ConfigId, OrganizationId, Scope, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::{decode, encode};
use crate::GovernanceError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    pub id: ConfigId,
    /// `None` for the global default.
    pub organization_id: Option<OrganizationId>,
    pub quorum_required: u64,
    /// Percent, 0–100.
    pub passing_threshold: u8,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl GovernanceConfig {
    pub fn scope(&self) -> Scope {
        Scope::from_org(self.organization_id.as_ref())
    }
}

/// Caller input for creating a configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewGovernanceConfig {
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    pub quorum_required: u64,
    pub passing_threshold: u8,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl NewGovernanceConfig {
    fn validate(&self) -> Result<(), GovernanceError> {
        if self.quorum_required == 0 {
            return Err(GovernanceError::InvalidInput(
                "quorum_required must be at least 1".into(),
            ));
        }
        if self.passing_threshold > 100 {
            return Err(GovernanceError::InvalidInput(format!(
                "passing_threshold {} exceeds 100 percent",
                self.passing_threshold
            )));
        }
        Ok(())
    }
}

/// Owns governance configurations and answers "which config applies here".
pub struct ConfigResolver {
    store: Arc<dyn GovernanceStore>,
    /// Serializes writers so each scope keeps a single active configuration.
    write_lock: Mutex<()>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn GovernanceStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The configuration that applies to `scope`: the active one registered
    /// for exactly that scope, else the active global one, else `None`.
    pub fn get_config(&self, scope: &Scope) -> Result<Option<GovernanceConfig>, GovernanceError> {
        if let Scope::Organization(_) = scope {
            if let Some(config) = self.active_for_exact(scope)? {
                return Ok(Some(config));
            }
        }
        self.active_for_exact(&Scope::Global)
    }

    /// Whatever the scope index points at is active; the store swaps the
    /// index and the superseded record together.
    fn active_for_exact(&self, scope: &Scope) -> Result<Option<GovernanceConfig>, GovernanceError> {
        self.store
            .get_active_config(scope)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn load(&self, id: &ConfigId) -> Result<Option<GovernanceConfig>, GovernanceError> {
        self.store
            .get_config(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Store a new configuration. An active configuration supersedes the
    /// previously active one of the same scope, which is deactivated.
    pub fn create(
        &self,
        input: NewGovernanceConfig,
        now: Timestamp,
    ) -> Result<GovernanceConfig, GovernanceError> {
        input.validate()?;
        let scope = Scope::from_org(input.organization_id.as_ref());
        let config = GovernanceConfig {
            id: agora_crypto::new_config_id(&scope.storage_key(), now),
            organization_id: input.organization_id,
            quorum_required: input.quorum_required,
            passing_threshold: input.passing_threshold,
            is_active: input.is_active,
            created_at: now,
        };

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if config.is_active {
            let superseded = match self.active_for_exact(&scope)? {
                Some(mut previous) => {
                    previous.is_active = false;
                    Some((previous.id, encode(&previous)?))
                }
                None => None,
            };
            self.store.replace_active_config(
                &scope,
                &config.id,
                &encode(&config)?,
                superseded.as_ref().map(|(id, data)| (id, data.as_slice())),
            )?;
            if let Some((previous, _)) = superseded {
                info!(config = %previous, %scope, "governance config superseded");
            }
        } else {
            self.store.put_config(&config.id, &encode(&config)?)?;
        }

        info!(
            config = %config.id,
            %scope,
            quorum = config.quorum_required,
            threshold = config.passing_threshold,
            active = config.is_active,
            "governance config created"
        );
        Ok(config)
    }

    /// Deactivate a configuration. Proposals that already copied its values
    /// are unaffected.
    pub fn deactivate(&self, id: &ConfigId) -> Result<GovernanceConfig, GovernanceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut config = self.load(id)?.ok_or_else(|| GovernanceError::NotFound {
            kind: "governance config",
            id: id.to_string(),
        })?;
        if !config.is_active {
            return Ok(config);
        }
        config.is_active = false;
        let scope = config.scope();
        self.store
            .retire_config(&scope, &config.id, &encode(&config)?)?;
        info!(config = %config.id, %scope, "governance config deactivated");
        Ok(config)
    }

    /// Every stored configuration, newest first.
    pub fn list(&self) -> Result<Vec<GovernanceConfig>, GovernanceError> {
        let mut configs = self
            .store
            .iter_configs()?
            .iter()
            .map(|bytes| decode::<GovernanceConfig>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        configs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(configs)
    }
}
