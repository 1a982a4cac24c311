//! `claimgate-auth` — claims-based policy authorization (pure, synchronous).
//!
//! This crate is intentionally decoupled from HTTP, cookies and clocks:
//! evaluation is a function of (principal claims, policy, `now`).

pub mod authorize;
pub mod claims;
pub mod handler;
pub mod policy;
pub mod principal;
pub mod requirement;
pub mod ticket;

pub use authorize::{AuthorizationExplanation, AuthzError, PolicyEvaluator, RequirementCheck, Verdict};
pub use claims::{Claim, ClaimSet, claim_types};
pub use handler::{
    ClaimEqualsHandler, ClaimPresentHandler, HandlerRegistry, Outcome, ProbationElapsedHandler,
    RequirementHandler,
};
pub use policy::{Policy, PolicyRegistry, PolicyRegistryBuilder, PolicyTable};
pub use principal::{Principal, PrincipalId};
pub use requirement::{ProbationThreshold, Requirement, RequirementKind};
pub use ticket::{AuthTicket, TicketValidationError, validate_ticket};
