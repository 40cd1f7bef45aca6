//! Core domain types for Latch.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

use thiserror::Error;

// ============================================================================
// User Identity
// ============================================================================

/// An opaque identifier for a registered user of the lock service.
///
/// The value is sent verbatim in the `User-Id` request header. It is a
/// credential in all but name, so `Debug` redacts it and there is no
/// `Display` impl; call [`UserId::as_str`] where the raw value is needed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

#[derive(Debug, Error)]
#[error("user id must not be empty")]
pub struct EmptyUserIdError;

impl UserId {
    /// Rejects empty and whitespace-only values; trims the rest.
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyUserIdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EmptyUserIdError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserId(<redacted>)")
    }
}

// ============================================================================
// Lock Vocabulary
// ============================================================================

/// What the panel currently believes about the physical bolt.
///
/// A belief is only as fresh as the status read that produced it; between
/// reads the bolt can move without the panel knowing. `Unknown` means no
/// read has succeeded yet, or the most recent one failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockBelief {
    Locked,
    Unlocked,
    #[default]
    Unknown,
}

impl LockBelief {
    #[must_use]
    pub fn from_reported(locked: bool) -> Self {
        if locked { Self::Locked } else { Self::Unlocked }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::Unlocked => "Unlocked",
            Self::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// An actuation the user can ask the lock to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Open,
    Close,
}

impl CommandKind {
    /// Belief implied by a server-confirmed command.
    #[must_use]
    pub fn confirmed_belief(self) -> LockBelief {
        match self {
            Self::Open => LockBelief::Unlocked,
            Self::Close => LockBelief::Locked,
        }
    }

    /// Lowercase verb for logs.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }

    /// Notice shown while the command is on the wire.
    #[must_use]
    pub fn pending_notice(self) -> &'static str {
        match self {
            Self::Open => "Opening...",
            Self::Close => "Closing...",
        }
    }

    /// Notice shown once the server confirms the command.
    #[must_use]
    pub fn done_notice(self) -> &'static str {
        match self {
            Self::Open => "Opened",
            Self::Close => "Closed",
        }
    }

    /// Alert prefix for a command that did not go through.
    #[must_use]
    pub fn failure_alert(self) -> &'static str {
        match self {
            Self::Open => "Open failed",
            Self::Close => "Close failed",
        }
    }
}

// ============================================================================
// Notices
// ============================================================================

/// A short-lived status line message.
///
/// Sequence numbers strictly increase within a session. An expiry carrying
/// a stale sequence number must leave a newer notice alone, so a notice can
/// only ever be superseded, never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    text: String,
    seq: u64,
}

impl Notice {
    #[must_use]
    pub fn new(text: impl Into<String>, seq: u64) -> Self {
        Self {
            text: text.into(),
            seq,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

// ============================================================================
// Session Faults
// ============================================================================

/// A condition the panel cannot recover from without a restart.
///
/// Faults are only ever set during identity resolution. Refresh, command,
/// and rename failures stay recoverable and never escalate to a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFault {
    /// No stored identifier, or the server does not recognize this one.
    #[error("not registered")]
    Unregistered,
    /// The registration lookup itself could not complete.
    #[error("could not verify registration: {0}")]
    IdentityLookup(String),
}
