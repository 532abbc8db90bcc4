//! LMDB implementation of ConfigStore.

use agora_store::{ConfigStore, StoreError};
use agora_types::{ConfigId, Scope};

use crate::governance::{scope_key, LmdbGovernanceStore};
use crate::LmdbError;

impl ConfigStore for LmdbGovernanceStore {
    fn put_config(&self, id: &ConfigId, data: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.configs_db
            .put(&mut wtxn, id.as_bytes().as_slice(), data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_config(&self, id: &ConfigId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .configs_db
            .get(&rtxn, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        Ok(val.map(|bytes| bytes.to_vec()))
    }

    fn iter_configs(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.configs_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_, val) = entry.map_err(LmdbError::from)?;
            results.push(val.to_vec());
        }
        Ok(results)
    }

    fn get_active_config(&self, scope: &Scope) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(id) = self
            .config_scope_db
            .get(&rtxn, &scope_key(scope))
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        match self.configs_db.get(&rtxn, id).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(bytes.to_vec())),
            None => Err(StoreError::Corruption(format!(
                "scope {scope} points at a missing config"
            ))),
        }
    }

    fn replace_active_config(
        &self,
        scope: &Scope,
        id: &ConfigId,
        data: &[u8],
        superseded: Option<(&ConfigId, &[u8])>,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if let Some((old_id, old_data)) = superseded {
            self.configs_db
                .put(&mut wtxn, old_id.as_bytes().as_slice(), old_data)
                .map_err(LmdbError::from)?;
        }
        self.configs_db
            .put(&mut wtxn, id.as_bytes().as_slice(), data)
            .map_err(LmdbError::from)?;
        self.config_scope_db
            .put(&mut wtxn, &scope_key(scope), id.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn retire_config(
        &self,
        scope: &Scope,
        id: &ConfigId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let key = scope_key(scope);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.configs_db
            .put(&mut wtxn, id.as_bytes().as_slice(), data)
            .map_err(LmdbError::from)?;
        let points_here = self
            .config_scope_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some_and(|current| current == id.as_bytes().as_slice());
        if points_here {
            self.config_scope_db
                .delete(&mut wtxn, &key)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::open_test_store;
    use agora_types::OrganizationId;

    #[test]
    fn global_and_org_scopes_are_independent() {
        let (_dir, env) = open_test_store();
        let store = env.governance_store();
        let org = Scope::Organization(OrganizationId::parse("guild").unwrap());
        let global_cfg = ConfigId::new([1; 32]);
        let org_cfg = ConfigId::new([2; 32]);

        assert_eq!(store.get_active_config(&Scope::Global).unwrap(), None);
        store
            .replace_active_config(&Scope::Global, &global_cfg, b"global", None)
            .unwrap();
        store
            .replace_active_config(&org, &org_cfg, b"guild", None)
            .unwrap();

        assert_eq!(
            store.get_active_config(&Scope::Global).unwrap(),
            Some(b"global".to_vec())
        );
        assert_eq!(store.get_active_config(&org).unwrap(), Some(b"guild".to_vec()));
    }

    #[test]
    fn replacement_rewrites_superseded_record_with_index() {
        let (_dir, env) = open_test_store();
        let store = env.governance_store();
        let first = ConfigId::new([1; 32]);
        let second = ConfigId::new([2; 32]);
        store
            .replace_active_config(&Scope::Global, &first, b"first-active", None)
            .unwrap();
        store
            .replace_active_config(
                &Scope::Global,
                &second,
                b"second-active",
                Some((&first, b"first-retired")),
            )
            .unwrap();

        assert_eq!(
            store.get_active_config(&Scope::Global).unwrap(),
            Some(b"second-active".to_vec())
        );
        assert_eq!(
            store.get_config(&first).unwrap(),
            Some(b"first-retired".to_vec())
        );
        assert_eq!(store.iter_configs().unwrap().len(), 2);
    }

    #[test]
    fn retiring_clears_only_a_matching_index() {
        let (_dir, env) = open_test_store();
        let store = env.governance_store();
        let active = ConfigId::new([5; 32]);
        let stale = ConfigId::new([6; 32]);
        store
            .replace_active_config(&Scope::Global, &active, b"active", None)
            .unwrap();

        // A config the index does not point at leaves the index alone.
        store.retire_config(&Scope::Global, &stale, b"stale").unwrap();
        assert_eq!(
            store.get_active_config(&Scope::Global).unwrap(),
            Some(b"active".to_vec())
        );

        store.retire_config(&Scope::Global, &active, b"retired").unwrap();
        assert_eq!(store.get_active_config(&Scope::Global).unwrap(), None);
        assert_eq!(store.get_config(&active).unwrap(), Some(b"retired".to_vec()));
    }

    #[test]
    fn configs_round_trip() {
        let (_dir, env) = open_test_store();
        let store = env.governance_store();
        let id = ConfigId::new([8; 32]);
        store.put_config(&id, b"cfg").unwrap();
        assert_eq!(store.get_config(&id).unwrap(), Some(b"cfg".to_vec()));
        assert_eq!(store.iter_configs().unwrap(), vec![b"cfg".to_vec()]);
    }
}
