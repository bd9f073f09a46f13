//! Shape check for claim documents.
//!
//! A claim is checked against `schema/claim.schema.json` before it is
//! deserialized. Violations are reported as `ClaimFileError::Schema`, one
//! entry per violation, each led by the JSON pointer of the offending value.

use serde_json::Value;
use std::sync::OnceLock;

use super::file::ClaimFileError;

const CLAIM_SCHEMA_JSON: &str = include_str!("../../schema/claim.schema.json");

static CLAIM_VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn claim_validator() -> Result<&'static jsonschema::Validator, ClaimFileError> {
    CLAIM_VALIDATOR
        .get_or_init(|| {
            let schema: Value = serde_json::from_str(CLAIM_SCHEMA_JSON)
                .map_err(|e| format!("claim schema is not JSON: {e}"))?;
            jsonschema::options()
                .build(&schema)
                .map_err(|e| format!("claim schema does not compile: {e}"))
        })
        .as_ref()
        .map_err(|reason| ClaimFileError::SchemaUnavailable(reason.clone()))
}

/// Check a parsed claim document against the claim schema.
///
/// Every violation is collected; a document is never half-accepted.
pub fn validate_claim_schema(document: &Value) -> Result<(), ClaimFileError> {
    let violations: Vec<String> = claim_validator()?
        .iter_errors(document)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let at = if pointer.is_empty() { "claim" } else { pointer.as_str() };
            format!("{at}: {error}")
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ClaimFileError::Schema(violations))
    }
}
