use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claims::ClaimSet;

/// Identity of an authenticated principal (one sign-in).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The authenticated identity making a request, represented by its claims.
///
/// Built by the authentication layer and handed to the evaluator by
/// reference; nothing in this crate mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    claims: ClaimSet,
}

impl Principal {
    pub fn new(id: PrincipalId, claims: ClaimSet) -> Self {
        Self { id, claims }
    }

    /// Principal with a fresh identifier, mostly useful in tests.
    pub fn with_claims(claims: ClaimSet) -> Self {
        Self::new(PrincipalId::new(), claims)
    }

    pub fn id(&self) -> PrincipalId {
        self.id
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Value of the first `Name` claim, if any.
    pub fn name(&self) -> Option<&str> {
        self.claims
            .find_first(crate::claims::claim_types::NAME)
            .map(|c| c.value())
    }
}
