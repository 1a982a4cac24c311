//! Requirements: immutable, parameterized conditions attached to policies.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use claimgate_core::{DomainError, DomainResult};

use crate::claims::claim_types;

/// Discriminant of [`Requirement`], used to key the handler registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    ClaimPresent,
    ClaimEquals,
    ProbationElapsed,
}

impl core::fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            RequirementKind::ClaimPresent => "claim_present",
            RequirementKind::ClaimEquals => "claim_equals",
            RequirementKind::ProbationElapsed => "probation_elapsed",
        })
    }
}

/// A single condition a principal must meet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// At least one claim of `claim_type` exists, whatever its value.
    ClaimPresent { claim_type: String },

    /// Some claim of `claim_type` has exactly `value`.
    ClaimEquals { claim_type: String, value: String },

    /// The employment date claim is older than the probation threshold.
    ProbationElapsed(ProbationThreshold),
}

impl Requirement {
    pub fn claim_present(claim_type: impl Into<String>) -> Self {
        Self::ClaimPresent {
            claim_type: claim_type.into(),
        }
    }

    pub fn claim_equals(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ClaimEquals {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Probation requirement over the `EmploymentDate` claim.
    pub fn probation_elapsed(threshold_months: u32) -> DomainResult<Self> {
        Ok(Self::ProbationElapsed(ProbationThreshold::new(threshold_months)?))
    }

    pub fn kind(&self) -> RequirementKind {
        match self {
            Requirement::ClaimPresent { .. } => RequirementKind::ClaimPresent,
            Requirement::ClaimEquals { .. } => RequirementKind::ClaimEquals,
            Requirement::ProbationElapsed(_) => RequirementKind::ProbationElapsed,
        }
    }
}

impl core::fmt::Display for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Requirement::ClaimPresent { claim_type } => write!(f, "claim '{claim_type}' present"),
            Requirement::ClaimEquals { claim_type, value } => {
                write!(f, "claim '{claim_type}' equals '{value}'")
            }
            Requirement::ProbationElapsed(p) => write!(
                f,
                "more than {} months since '{}'",
                p.threshold_months(),
                p.claim_type()
            ),
        }
    }
}

/// Parameters of [`Requirement::ProbationElapsed`].
///
/// `threshold_months` is positive by construction; deserializing a zero
/// threshold fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbationThreshold {
    #[serde(default = "default_employment_claim")]
    claim_type: String,
    threshold_months: NonZeroU32,
}

fn default_employment_claim() -> String {
    claim_types::EMPLOYMENT_DATE.to_string()
}

/// Length of a "month" for probation purposes. Not calendar months.
pub const DAYS_PER_MONTH: i64 = 30;

impl ProbationThreshold {
    pub fn new(threshold_months: u32) -> DomainResult<Self> {
        Self::for_claim(claim_types::EMPLOYMENT_DATE, threshold_months)
    }

    pub fn for_claim(claim_type: impl Into<String>, threshold_months: u32) -> DomainResult<Self> {
        let threshold_months = NonZeroU32::new(threshold_months)
            .ok_or_else(|| DomainError::validation("threshold_months must be a positive integer"))?;
        Ok(Self {
            claim_type: claim_type.into(),
            threshold_months,
        })
    }

    /// Infallible constructor for thresholds already known to be positive.
    pub fn months(threshold_months: NonZeroU32) -> Self {
        Self {
            claim_type: default_employment_claim(),
            threshold_months,
        }
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn threshold_months(&self) -> u32 {
        self.threshold_months.get()
    }

    /// Threshold in days, using the fixed 30-day month.
    pub fn threshold_days(&self) -> i64 {
        DAYS_PER_MONTH * i64::from(self.threshold_months.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probation_rejects_zero_threshold() {
        let err = Requirement::probation_elapsed(0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn probation_uses_thirty_day_months() {
        let p = ProbationThreshold::new(3).unwrap();
        assert_eq!(p.claim_type(), "EmploymentDate");
        assert_eq!(p.threshold_days(), 90);
    }

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(Requirement::claim_present("Admin").kind(), RequirementKind::ClaimPresent);
        assert_eq!(
            Requirement::claim_equals("Department", "HR").kind(),
            RequirementKind::ClaimEquals
        );
        assert_eq!(
            Requirement::probation_elapsed(3).unwrap().kind(),
            RequirementKind::ProbationElapsed
        );
    }

    #[test]
    fn deserializes_tagged_requirements() {
        let json = r#"[
            { "kind": "claim_present", "claim_type": "Admin" },
            { "kind": "claim_equals", "claim_type": "Department", "value": "HR" },
            { "kind": "probation_elapsed", "threshold_months": 3 }
        ]"#;
        let reqs: Vec<Requirement> = serde_json::from_str(json).unwrap();
        assert_eq!(
            reqs,
            vec![
                Requirement::claim_present("Admin"),
                Requirement::claim_equals("Department", "HR"),
                Requirement::probation_elapsed(3).unwrap(),
            ]
        );
    }

    #[test]
    fn deserializing_zero_threshold_fails() {
        let json = r#"{ "kind": "probation_elapsed", "threshold_months": 0 }"#;
        assert!(serde_json::from_str::<Requirement>(json).is_err());
    }
}
