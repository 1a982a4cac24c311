use serde::{Deserialize, Serialize};

/// Well-known claim types issued by the demo directory and referenced by the
/// default policy table.
pub mod claim_types {
    pub const NAME: &str = "Name";
    pub const EMAIL: &str = "Email";
    pub const DEPARTMENT: &str = "Department";
    pub const ADMIN: &str = "Admin";
    pub const MANAGER: &str = "Manager";
    pub const EMPLOYMENT_DATE: &str = "EmploymentDate";
}

/// A typed attribute asserted about an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    claim_type: String,
    value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Read-only multiset of claims keyed by type.
///
/// Insertion order is retained so that [`ClaimSet::find_first`] is stable;
/// no other ordering is promised. Type and value comparisons are exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    pub fn new(claims: impl IntoIterator<Item = Claim>) -> Self {
        Self(claims.into_iter().collect())
    }

    /// Claim types are compared exactly; `department` is not `Department`.
    pub fn has_claim(&self, claim_type: &str) -> bool {
        self.0.iter().any(|c| c.claim_type == claim_type)
    }

    /// First claim of `claim_type`, in insertion order.
    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.0.iter().find(|c| c.claim_type == claim_type)
    }

    pub fn find_all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a Claim> + 'a {
        self.0.iter().filter(move |c| c.claim_type == claim_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T: Into<String>, V: Into<String>> FromIterator<(T, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(t, v)| Claim::new(t, v)))
    }
}
