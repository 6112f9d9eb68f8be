/* Fixture key normalization
 *
 * Fixture keys are snake_case and sometimes use a different word than the
 * schema. Keys are rewritten in stages and the first candidate that names a
 * declared field wins. The tables are data, not rules; add to them when a
 * new mismatch turns up.
 */

use crate::errors::{ReflectError, ReflectResult};
use crate::schema::field_alias;
use msgdef_types::naming::to_pascal_case;

/// External fixture key -> schema spelling, applied before casing.
pub const FIELD_SYNONYMS: &[(&str, &str)] = &[
    ("timeout", "timeout_ms"),
    ("throttle_time", "throttle_time_ms"),
    ("max_wait", "max_wait_ms"),
    ("session_lifetime", "session_lifetime_ms"),
    ("transaction_timeout", "transaction_timeout_ms"),
    ("max_lifetime", "max_lifetime_ms"),
    ("session_timeout", "session_timeout_ms"),
    ("rebalance_timeout", "rebalance_timeout_ms"),
    ("expiry_time_period", "expiry_time_period_ms"),
    ("renew_period", "renew_period_ms"),
    ("retention_time", "retention_time_ms"),
    ("heartbeat_interval", "heartbeat_interval_ms"),
    ("issue_timestamp", "issue_timestamp_ms"),
    ("expiry_timestamp", "expiry_timestamp_ms"),
    ("max_timestamp", "max_timestamp_ms"),
    ("transaction_start_time", "transaction_start_time_ms"),
    ("log_append_time", "log_append_time_ms"),
];

/// Results of the casing transform that miss the declared spelling.
pub const CASING_EXCEPTIONS: &[(&str, &str)] = &[
    ("IssueTimestampMs", "IssueTimestamp"),
    ("ExpiryTimestampMs", "ExpiryTimestamp"),
    ("MaxTimestampMs", "MaxTimestamp"),
    ("KraftVersionFeature", "KRaftVersionFeature"),
    ("IsKraftController", "IsKRaftController"),
    ("KraftVersion", "KRaftVersion"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

pub fn synonym(external: &str) -> Option<&'static str> {
    lookup(FIELD_SYNONYMS, external)
}

pub fn casing_exception(name: &str) -> Option<&'static str> {
    lookup(CASING_EXCEPTIONS, name)
}

fn is_known(name: &str, known: &[&str]) -> bool {
    known.contains(&name) || field_alias(name).is_some_and(|alias| known.contains(&alias))
}

/// Map a fixture key onto one of the `known` declared field names.
///
/// Stages: synonym table, generic snake_case -> PascalCase transform, then
/// the casing-exception table. A stage's result is accepted as soon as it
/// names a declared field (directly or through the walker's alias table).
pub fn normalize(external: &str, known: &[&str]) -> ReflectResult<String> {
    let mut tried = Vec::with_capacity(3);

    let substituted = synonym(external).unwrap_or(external);
    if is_known(substituted, known) {
        return Ok(substituted.to_string());
    }
    tried.push(substituted.to_string());

    let cased = to_pascal_case(substituted);
    if is_known(&cased, known) {
        return Ok(cased);
    }

    if let Some(overridden) = casing_exception(&cased) {
        if is_known(overridden, known) {
            return Ok(overridden.to_string());
        }
        tried.push(cased);
        tried.push(overridden.to_string());
    } else {
        tried.push(cased);
    }

    Err(ReflectError::Naming {
        external: external.to_string(),
        tried,
    })
}
