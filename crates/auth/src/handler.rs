//! Requirement handlers and the kind → handler registry.
//!
//! A handler either reports [`Outcome::Success`] or abstains. It never fails a
//! requirement explicitly: a requirement nobody succeeded is unsatisfied. The
//! only error a handler may return is a claim it cannot interpret.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::authorize::AuthzError;
use crate::principal::Principal;
use crate::requirement::{Requirement, RequirementKind};

/// Result of evaluating one requirement with one handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Abstain,
}

/// Logic bound to a single [`RequirementKind`].
///
/// Implementations must be pure and synchronous: no I/O, no clock reads (use
/// `now`), no interior mutability. The evaluator may call them in any order.
pub trait RequirementHandler: Send + Sync + core::fmt::Debug {
    fn kind(&self) -> RequirementKind;

    fn evaluate(
        &self,
        principal: &Principal,
        requirement: &Requirement,
        now: DateTime<Utc>,
    ) -> Result<Outcome, AuthzError>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct ClaimPresentHandler;

impl RequirementHandler for ClaimPresentHandler {
    fn kind(&self) -> RequirementKind {
        RequirementKind::ClaimPresent
    }

    fn evaluate(
        &self,
        principal: &Principal,
        requirement: &Requirement,
        _now: DateTime<Utc>,
    ) -> Result<Outcome, AuthzError> {
        let Requirement::ClaimPresent { claim_type } = requirement else {
            return Ok(Outcome::Abstain);
        };
        Ok(success_if(principal.claims().has_claim(claim_type)))
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct ClaimEqualsHandler;

impl RequirementHandler for ClaimEqualsHandler {
    fn kind(&self) -> RequirementKind {
        RequirementKind::ClaimEquals
    }

    fn evaluate(
        &self,
        principal: &Principal,
        requirement: &Requirement,
        _now: DateTime<Utc>,
    ) -> Result<Outcome, AuthzError> {
        let Requirement::ClaimEquals { claim_type, value } = requirement else {
            return Ok(Outcome::Abstain);
        };
        let matched = principal
            .claims()
            .find_all(claim_type)
            .any(|c| c.value() == value);
        Ok(success_if(matched))
    }
}

/// Succeeds once more than `30 * threshold_months` whole days have passed
/// since the employment date claim.
///
/// The 30-day month is intentional and must not be replaced by calendar
/// arithmetic: a 3-month threshold is exactly 90 days, and day 90 itself does
/// not pass.
#[derive(Debug, Default, Copy, Clone)]
pub struct ProbationElapsedHandler;

impl RequirementHandler for ProbationElapsedHandler {
    fn kind(&self) -> RequirementKind {
        RequirementKind::ProbationElapsed
    }

    fn evaluate(
        &self,
        principal: &Principal,
        requirement: &Requirement,
        now: DateTime<Utc>,
    ) -> Result<Outcome, AuthzError> {
        let Requirement::ProbationElapsed(threshold) = requirement else {
            return Ok(Outcome::Abstain);
        };

        // Missing claim is "undecided", not a failure.
        let Some(claim) = principal.claims().find_first(threshold.claim_type()) else {
            return Ok(Outcome::Abstain);
        };

        let employed_on = parse_claim_date(claim.value()).map_err(|reason| {
            AuthzError::MalformedClaim {
                claim_type: claim.claim_type().to_string(),
                value: claim.value().to_string(),
                reason,
            }
        })?;

        let elapsed_days = (now.date_naive() - employed_on).num_days();
        tracing::trace!(
            elapsed_days,
            threshold_days = threshold.threshold_days(),
            "probation check"
        );

        Ok(success_if(elapsed_days > threshold.threshold_days()))
    }
}

fn success_if(condition: bool) -> Outcome {
    if condition {
        Outcome::Success
    } else {
        Outcome::Abstain
    }
}

/// Parse a date-valued claim.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM:SS`; the
/// time of day is discarded.
pub fn parse_claim_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts.date());
    }
    Err("invalid date format (expected YYYY-MM-DD)".to_string())
}

/// Handlers grouped by the requirement kind they serve.
///
/// Built once at start-up and cheap to clone (handlers are shared).
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<RequirementKind, Vec<Arc<dyn RequirementHandler>>>,
}

impl HandlerRegistry {
    /// Registry without any handler; every requirement is unsatisfied.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One built-in handler per requirement kind.
    pub fn with_builtin_handlers() -> Self {
        Self::empty()
            .with(ClaimPresentHandler)
            .with(ClaimEqualsHandler)
            .with(ProbationElapsedHandler)
    }

    /// Add a handler under the kind it declares. Several handlers may share a
    /// kind; any one of them succeeding satisfies the requirement.
    pub fn with(mut self, handler: impl RequirementHandler + 'static) -> Self {
        self.register(Arc::new(handler));
        self
    }

    pub fn register(&mut self, handler: Arc<dyn RequirementHandler>) {
        self.handlers.entry(handler.kind()).or_default().push(handler);
    }

    pub fn handlers_for(&self, kind: RequirementKind) -> &[Arc<dyn RequirementHandler>] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClaimSet;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn employed_days_ago(days: i64) -> Principal {
        let date = (now() - Duration::days(days)).date_naive();
        Principal::with_claims(
            [("EmploymentDate", date.format("%Y-%m-%d").to_string())]
                .into_iter()
                .collect(),
        )
    }

    fn probation(months: u32) -> Requirement {
        Requirement::probation_elapsed(months).unwrap()
    }

    #[test]
    fn claim_present_succeeds_only_with_claim() {
        let admin = Principal::with_claims([("Admin", "True")].into_iter().collect());
        let nobody = Principal::with_claims(ClaimSet::default());
        let req = Requirement::claim_present("Admin");

        assert_eq!(ClaimPresentHandler.evaluate(&admin, &req, now()).unwrap(), Outcome::Success);
        assert_eq!(ClaimPresentHandler.evaluate(&nobody, &req, now()).unwrap(), Outcome::Abstain);
    }

    #[test]
    fn claim_equals_checks_every_claim_of_type() {
        let p = Principal::with_claims(
            [("Department", "Finance"), ("Department", "HR")]
                .into_iter()
                .collect(),
        );
        let hr = Requirement::claim_equals("Department", "HR");
        let sales = Requirement::claim_equals("Department", "Sales");
        let lowercase = Requirement::claim_equals("Department", "hr");

        assert_eq!(ClaimEqualsHandler.evaluate(&p, &hr, now()).unwrap(), Outcome::Success);
        assert_eq!(ClaimEqualsHandler.evaluate(&p, &sales, now()).unwrap(), Outcome::Abstain);
        assert_eq!(ClaimEqualsHandler.evaluate(&p, &lowercase, now()).unwrap(), Outcome::Abstain);
    }

    #[test]
    fn handler_abstains_on_foreign_requirement() {
        let p = Principal::with_claims([("Admin", "True")].into_iter().collect());
        let req = Requirement::claim_present("Admin");
        assert_eq!(ClaimEqualsHandler.evaluate(&p, &req, now()).unwrap(), Outcome::Abstain);
        assert_eq!(ProbationElapsedHandler.evaluate(&p, &req, now()).unwrap(), Outcome::Abstain);
    }

    #[test]
    fn probation_abstains_without_employment_date() {
        let p = Principal::with_claims([("Department", "HR"), ("Manager", "True")].into_iter().collect());
        let outcome = ProbationElapsedHandler.evaluate(&p, &probation(3), now()).unwrap();
        assert_eq!(outcome, Outcome::Abstain);
    }

    #[test]
    fn probation_day_ninety_is_not_enough() {
        let outcome = ProbationElapsedHandler
            .evaluate(&employed_days_ago(90), &probation(3), now())
            .unwrap();
        assert_eq!(outcome, Outcome::Abstain);
    }

    #[test]
    fn probation_day_ninety_one_succeeds() {
        let outcome = ProbationElapsedHandler
            .evaluate(&employed_days_ago(91), &probation(3), now())
            .unwrap();
        assert_eq!(outcome, Outcome::Success);
    }

    #[test]
    fn probation_months_are_thirty_days_not_calendar_months() {
        // A full calendar month after 2024-02-01 is only 30 days (leap year).
        let p = Principal::with_claims([("EmploymentDate", "2024-02-01")].into_iter().collect());
        let march_2 = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        let march_3 = Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap();
        assert_eq!(
            ProbationElapsedHandler.evaluate(&p, &probation(1), march_2).unwrap(),
            Outcome::Abstain
        );
        assert_eq!(
            ProbationElapsedHandler.evaluate(&p, &probation(1), march_3).unwrap(),
            Outcome::Success
        );
    }

    #[test]
    fn probation_future_employment_abstains() {
        let outcome = ProbationElapsedHandler
            .evaluate(&employed_days_ago(-10), &probation(3), now())
            .unwrap();
        assert_eq!(outcome, Outcome::Abstain);
    }

    #[test]
    fn probation_ignores_time_of_day() {
        let early = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 1).unwrap();
        let p = Principal::with_claims(
            [("EmploymentDate", "2024-03-16T23:00:00Z")].into_iter().collect(),
        );
        // 2024-03-16 → 2024-06-15 is 91 calendar days, although less than 91 * 24h.
        assert_eq!(
            ProbationElapsedHandler.evaluate(&p, &probation(3), early).unwrap(),
            Outcome::Success
        );
    }

    #[test]
    fn probation_malformed_date_is_an_error() {
        let p = Principal::with_claims([("EmploymentDate", "last spring")].into_iter().collect());
        let err = ProbationElapsedHandler
            .evaluate(&p, &probation(3), now())
            .unwrap_err();
        let AuthzError::MalformedClaim { claim_type, value, .. } = err else {
            panic!("expected MalformedClaim");
        };
        assert_eq!(claim_type, "EmploymentDate");
        assert_eq!(value, "last spring");
    }

    #[test]
    fn probation_uses_configured_claim_type() {
        let threshold = crate::requirement::ProbationThreshold::for_claim("HireDate", 1).unwrap();
        let req = Requirement::ProbationElapsed(threshold);
        let p = Principal::with_claims([("HireDate", "2020-01-01")].into_iter().collect());
        assert_eq!(
            ProbationElapsedHandler.evaluate(&p, &req, now()).unwrap(),
            Outcome::Success
        );
    }

    #[test]
    fn parse_claim_date_accepts_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        assert_eq!(parse_claim_date("2021-05-01").unwrap(), expected);
        assert_eq!(parse_claim_date(" 2021-05-01 ").unwrap(), expected);
        assert_eq!(parse_claim_date("2021-05-01T08:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_claim_date("2021-05-01T08:00:00").unwrap(), expected);
        assert!(parse_claim_date("2021-13-01").is_err());
        assert!(parse_claim_date("").is_err());
    }

    #[test]
    fn builtin_registry_has_one_handler_per_kind() {
        let registry = HandlerRegistry::with_builtin_handlers();
        for kind in [
            RequirementKind::ClaimPresent,
            RequirementKind::ClaimEquals,
            RequirementKind::ProbationElapsed,
        ] {
            assert_eq!(registry.handlers_for(kind).len(), 1);
        }
        assert!(HandlerRegistry::empty()
            .handlers_for(RequirementKind::ClaimPresent)
            .is_empty());
    }
}
