//! Event and action vocabulary for the session state machine.
//!
//! Events flow in (user input, timer ticks, call resolutions), actions flow
//! out (calls to issue, timers to arm). The machine itself never performs
//! IO; the driver does, and feeds the results back as events.

use latch_api::ApiError;
use latch_types::CommandKind;
use thiserror::Error;

/// Why a remote call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFailure {
    /// The server answered, well-formed, and said no.
    #[error("refused by the server")]
    Refused,
    /// The call itself failed; the detail is shown to the user.
    #[error("{0}")]
    Failed(String),
}

impl CallFailure {
    /// User-facing line for this failure under the given heading.
    ///
    /// A refusal carries no detail worth showing, so the heading stands
    /// alone; anything else gets the detail appended.
    #[must_use]
    pub(crate) fn describe(&self, heading: &str) -> String {
        match self {
            Self::Refused => heading.to_string(),
            Self::Failed(detail) => format!("{heading}: {detail}"),
        }
    }
}

impl From<ApiError> for CallFailure {
    fn from(err: ApiError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Inputs to the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The refresh cadence fired. The first tick lands immediately at
    /// startup; there is no separate "initial read" event.
    RefreshTick,
    /// A status read finished, reporting the bolt position on success.
    RefreshResolved(Result<bool, CallFailure>),
    /// The user asked for an actuation.
    CommandRequested(CommandKind),
    /// An actuation call finished.
    CommandResolved {
        kind: CommandKind,
        outcome: Result<(), CallFailure>,
    },
    /// The user committed a new display name.
    NameEdited(String),
    /// A rename call finished.
    RenameResolved(Result<(), CallFailure>),
    /// The display window for the notice with this sequence number elapsed.
    NoticeExpired { seq: u64 },
}

/// Side effects the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Issue a status read.
    ReadStatus,
    /// Issue an open or close actuation.
    SendCommand(CommandKind),
    /// Issue a rename.
    SendRename(String),
    /// Arm the expiry timer for the notice carrying this sequence number,
    /// replacing any previously armed timer.
    ArmNoticeExpiry { seq: u64 },
    /// Play the swing animation for a confirmed actuation.
    PlaySwing(CommandKind),
}
