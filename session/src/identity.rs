//! Startup identity resolution.
//!
//! Runs exactly once, before the session starts, and decides whether the
//! panel gets a live session at all. There is no retry: a lookup that
//! cannot complete is fatal for this run, because acting on a lock without
//! knowing who is asking is worse than refusing to act.

use latch_api::{ApiError, LockApi};

/// What identity resolution produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// The server knows this user by this display name.
    Registered { name: String },
    /// The server answered but has no name on file for this identifier.
    /// Also used when there is no stored identifier to ask about.
    Unregistered,
    /// The lookup could not complete; the panel must not guess.
    LookupFailed { detail: String },
}

/// Resolves the display name behind the configured identifier.
pub async fn resolve_identity(api: &LockApi) -> IdentityOutcome {
    let outcome = classify_lookup(api.get_name().await);
    match &outcome {
        IdentityOutcome::Registered { name } => {
            tracing::info!("resolved identity as {name:?}");
        }
        IdentityOutcome::Unregistered => {
            tracing::info!("no registration behind the stored identifier");
        }
        IdentityOutcome::LookupFailed { detail } => {
            tracing::warn!("identity lookup failed: {detail}");
        }
    }
    outcome
}

/// Pure classification of a name lookup result.
#[must_use]
pub fn classify_lookup(result: Result<Option<String>, ApiError>) -> IdentityOutcome {
    match result {
        Ok(Some(name)) => IdentityOutcome::Registered { name },
        Ok(None) => IdentityOutcome::Unregistered,
        Err(err) => IdentityOutcome::LookupFailed {
            detail: err.to_string(),
        },
    }
}
