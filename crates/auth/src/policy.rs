//! Named policies and the start-up policy registry.

use core::num::NonZeroU32;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use claimgate_core::{DomainError, DomainResult};

use crate::claims::claim_types;
use crate::requirement::{ProbationThreshold, Requirement};

pub const ADMIN_ONLY: &str = "AdminOnly";
pub const MUST_BELONG_TO_HR_DEPARTMENT: &str = "MustBelongToHRDepartment";
pub const HR_MANAGER_ONLY: &str = "HRManagerOnly";

/// A named conjunction of requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    name: String,
    #[serde(default)]
    requirements: Vec<Requirement>,
}

impl Policy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirements: Vec::new(),
        }
    }

    pub fn require(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn require_claim(self, claim_type: impl Into<String>) -> Self {
        self.require(Requirement::claim_present(claim_type))
    }

    pub fn require_claim_value(self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.require(Requirement::claim_equals(claim_type, value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

/// Policy table as read from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyTable {
    pub policies: Vec<Policy>,
}

/// Immutable mapping from policy name to [`Policy`].
///
/// Built once before serving requests and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistry {
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::default()
    }

    /// Registry holding the three demo policies.
    pub fn with_default_policies() -> DomainResult<Self> {
        default_policies()
            .into_iter()
            .fold(Self::builder(), PolicyRegistryBuilder::policy)
            .build()
    }

    pub fn from_table(table: PolicyTable) -> DomainResult<Self> {
        table
            .policies
            .into_iter()
            .fold(Self::builder(), PolicyRegistryBuilder::policy)
            .build()
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        let table: PolicyTable = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("invalid policy table: {e}")))?;
        Self::from_table(table)
    }

    pub fn get(&self, name: &str) -> Option<&Policy> {
        self.policies.get(name)
    }

    /// Registered policy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct PolicyRegistryBuilder {
    policies: Vec<Policy>,
}

impl PolicyRegistryBuilder {
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Fails on empty or duplicate policy names.
    pub fn build(self) -> DomainResult<PolicyRegistry> {
        let mut policies = HashMap::with_capacity(self.policies.len());
        for policy in self.policies {
            if policy.name.trim().is_empty() {
                return Err(DomainError::validation("policy name must not be empty"));
            }
            if policies.contains_key(&policy.name) {
                return Err(DomainError::conflict(format!(
                    "policy '{}' registered twice",
                    policy.name
                )));
            }
            policies.insert(policy.name.clone(), policy);
        }
        Ok(PolicyRegistry { policies })
    }
}

/// The demo policy table.
pub fn default_policies() -> Vec<Policy> {
    const HR_MANAGER_PROBATION: NonZeroU32 = match NonZeroU32::new(3) {
        Some(months) => months,
        None => panic!("probation threshold must be positive"),
    };
    let probation = Requirement::ProbationElapsed(ProbationThreshold::months(HR_MANAGER_PROBATION));

    vec![
        Policy::new(ADMIN_ONLY).require_claim(claim_types::ADMIN),
        Policy::new(MUST_BELONG_TO_HR_DEPARTMENT).require_claim_value(claim_types::DEPARTMENT, "HR"),
        Policy::new(HR_MANAGER_ONLY)
            .require_claim_value(claim_types::DEPARTMENT, "HR")
            .require_claim(claim_types::MANAGER)
            .require(probation),
    ]
}
