//! Organizational scoping for proposals and governance configurations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::validate_token;
use crate::TypesError;

/// Identifier of the organizational unit a proposal or configuration belongs to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationId(String);

impl OrganizationId {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        validate_token(&s, Self::MAX_LEN).map_err(TypesError::InvalidOrganization)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrganizationId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrganizationId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<OrganizationId> for String {
    fn from(org: OrganizationId) -> Self {
        org.0
    }
}

/// The scope a record applies to: the global default, or one organization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Global,
    Organization(OrganizationId),
}

impl Scope {
    /// Build a scope from an optional organization id (absence = global).
    pub fn from_org(org: Option<&OrganizationId>) -> Self {
        match org {
            Some(id) => Self::Organization(id.clone()),
            None => Self::Global,
        }
    }

    pub fn organization(&self) -> Option<&OrganizationId> {
        match self {
            Self::Global => None,
            Self::Organization(id) => Some(id),
        }
    }

    /// Byte key used by storage backends for the scope index.
    ///
    /// The global scope maps to the empty key, which no organization id can produce.
    pub fn storage_key(&self) -> Vec<u8> {
        match self {
            Self::Global => Vec::new(),
            Self::Organization(id) => id.as_str().as_bytes().to_vec(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Organization(id) => write!(f, "org:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_key_is_distinct_from_any_org() {
        let org = OrganizationId::parse("treasury").unwrap();
        assert!(Scope::Global.storage_key().is_empty());
        assert_eq!(Scope::from_org(Some(&org)).storage_key(), b"treasury".to_vec());
    }

    #[test]
    fn from_org_none_is_global() {
        assert_eq!(Scope::from_org(None), Scope::Global);
        assert_eq!(Scope::Global.organization(), None);
    }
}
