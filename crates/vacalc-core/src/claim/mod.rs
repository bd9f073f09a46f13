//! Claims: admitting rated conditions and reading them from files.
//!
//! A [`Claim`] is the collaborator that owns the condition list. It validates
//! each proposal against the catalog so the calculator never has to.

mod file;
mod roster;
mod schema;

pub use file::{ClaimFile, ClaimFileError};
pub use roster::{is_mental_health, Claim, ClaimError, ProposedCondition, MENTAL_HEALTH_CONDITIONS};
pub use schema::validate_claim_schema;
