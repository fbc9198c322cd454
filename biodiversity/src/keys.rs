//! Ledger key conventions.
//!
//! Users, collections and specimens share one flat key space and are stored
//! under their username, collection name and GUID respectively.

const PENDING_PREFIX: &str = "pending";
const ATTRIBUTION_SUFFIX: &str = "|attribution";

/// Key of a specimen's pending queue.
pub fn pending_key(guid: &str) -> String {
    format!("{PENDING_PREFIX}{guid}")
}

/// Key of an actor's attribution slot.
pub fn attribution_key(username: &str) -> String {
    format!("{username}{ATTRIBUTION_SUFFIX}")
}
