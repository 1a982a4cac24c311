//! Fixed demo user directory.
//!
//! Credential checking is a plain comparison against two hard-coded users;
//! this is a demonstration of authorization, not of credential storage.

use chrono::{Duration, NaiveDate};

use claimgate_auth::{ClaimSet, claim_types};

/// Claims for `user_name` if `password` matches, `None` otherwise.
///
/// `today` anchors relative employment dates so the intern stays on probation.
pub fn authenticate(user_name: &str, password: &str, today: NaiveDate) -> Option<ClaimSet> {
    match (user_name, password) {
        ("admin", "password") => Some(
            [
                (claim_types::NAME, "admin".to_string()),
                (claim_types::EMAIL, "admin@mywebsite.com".to_string()),
                (claim_types::DEPARTMENT, "HR".to_string()),
                (claim_types::ADMIN, "True".to_string()),
                (claim_types::MANAGER, "True".to_string()),
                (claim_types::EMPLOYMENT_DATE, "2021-05-01".to_string()),
            ]
            .into_iter()
            .collect(),
        ),
        ("intern", "password") => Some(
            [
                (claim_types::NAME, "intern".to_string()),
                (claim_types::EMAIL, "intern@mywebsite.com".to_string()),
                (claim_types::DEPARTMENT, "Sales".to_string()),
                (
                    claim_types::EMPLOYMENT_DATE,
                    (today - Duration::days(30)).format("%Y-%m-%d").to_string(),
                ),
            ]
            .into_iter()
            .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn admin_gets_hr_manager_claims() {
        let claims = authenticate("admin", "password", today()).unwrap();
        assert!(claims.has_claim("Admin"));
        assert_eq!(claims.find_first("Department").unwrap().value(), "HR");
        assert_eq!(claims.find_first("EmploymentDate").unwrap().value(), "2021-05-01");
    }

    #[test]
    fn intern_is_recent_sales_hire() {
        let claims = authenticate("intern", "password", today()).unwrap();
        assert!(!claims.has_claim("Admin"));
        assert_eq!(claims.find_first("EmploymentDate").unwrap().value(), "2024-05-16");
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert!(authenticate("admin", "hunter2", today()).is_none());
        assert!(authenticate("", "", today()).is_none());
    }
}
