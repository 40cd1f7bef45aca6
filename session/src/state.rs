//! Pure session state machine.
//!
//! [`SessionState::apply`] consumes one [`SessionEvent`] and returns the
//! [`SessionAction`]s it implies. No IO, no clock, no tasks; every rule
//! about belief, busy-ness, notices, and alerts lives here where it can be
//! unit tested without a server.

use latch_types::{CommandKind, LockBelief, Notice, SessionFault};

use crate::event::{CallFailure, SessionAction, SessionEvent};
use crate::identity::IdentityOutcome;

/// Which operation family produced the current alert.
///
/// An alert only clears when the same family next succeeds; a status read
/// going green must not wipe out "Open failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertKind {
    Refresh,
    Command,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alert {
    kind: AlertKind,
    text: String,
}

/// Session state for one panel run.
///
/// The belief model is deliberately asymmetric: open/close wait for the
/// server's confirmation before the belief flips, while a rename flips the
/// local name immediately and never rolls back. A wrong name is cosmetic;
/// a wrong bolt belief tells someone a door is shut when it is not.
#[derive(Debug)]
pub struct SessionState {
    fault: Option<SessionFault>,
    display_name: Option<String>,
    belief: LockBelief,
    command_in_flight: bool,
    notice: Option<Notice>,
    next_notice_seq: u64,
    alert: Option<Alert>,
}

impl SessionState {
    #[must_use]
    pub fn new(identity: IdentityOutcome) -> Self {
        let (fault, display_name) = match identity {
            IdentityOutcome::Registered { name } => (None, Some(name)),
            IdentityOutcome::Unregistered => (Some(SessionFault::Unregistered), None),
            IdentityOutcome::LookupFailed { detail } => {
                (Some(SessionFault::IdentityLookup(detail)), None)
            }
        };
        Self {
            fault,
            display_name,
            belief: LockBelief::Unknown,
            command_in_flight: false,
            notice: None,
            next_notice_seq: 0,
            alert: None,
        }
    }

    /// Applies one event and returns the side effects it implies.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::RefreshTick => self.on_refresh_tick(),
            SessionEvent::RefreshResolved(outcome) => self.on_refresh_resolved(outcome),
            SessionEvent::CommandRequested(kind) => self.on_command_requested(kind),
            SessionEvent::CommandResolved { kind, outcome } => {
                self.on_command_resolved(kind, outcome)
            }
            SessionEvent::NameEdited(name) => self.on_name_edited(&name),
            SessionEvent::RenameResolved(outcome) => self.on_rename_resolved(outcome),
            SessionEvent::NoticeExpired { seq } => self.on_notice_expired(seq),
        }
    }

    fn on_refresh_tick(&self) -> Vec<SessionAction> {
        if self.fault.is_some() {
            return Vec::new();
        }
        // An in-flight command does not pause the cadence.
        vec![SessionAction::ReadStatus]
    }

    fn on_refresh_resolved(&mut self, outcome: Result<bool, CallFailure>) -> Vec<SessionAction> {
        match outcome {
            Ok(locked) => {
                // Last write wins, even over a belief a confirmation just set.
                self.belief = LockBelief::from_reported(locked);
                self.clear_alert(AlertKind::Refresh);
            }
            Err(failure) => {
                self.belief = LockBelief::Unknown;
                self.set_alert(
                    AlertKind::Refresh,
                    failure.describe("Could not read lock status"),
                );
            }
        }
        Vec::new()
    }

    fn on_command_requested(&mut self, kind: CommandKind) -> Vec<SessionAction> {
        if self.fault.is_some() || self.command_in_flight {
            return Vec::new();
        }
        self.command_in_flight = true;
        let seq = self.post_notice(kind.pending_notice());
        vec![
            SessionAction::SendCommand(kind),
            SessionAction::ArmNoticeExpiry { seq },
        ]
    }

    fn on_command_resolved(
        &mut self,
        kind: CommandKind,
        outcome: Result<(), CallFailure>,
    ) -> Vec<SessionAction> {
        // The slot frees on failure too; the user may retry at once.
        self.command_in_flight = false;
        match outcome {
            Ok(()) => {
                self.belief = kind.confirmed_belief();
                self.clear_alert(AlertKind::Command);
                let seq = self.post_notice(kind.done_notice());
                vec![
                    SessionAction::ArmNoticeExpiry { seq },
                    SessionAction::PlaySwing(kind),
                ]
            }
            Err(failure) => {
                // The pending notice must not outlive the attempt it describes.
                self.notice = None;
                self.set_alert(AlertKind::Command, failure.describe(kind.failure_alert()));
                Vec::new()
            }
        }
    }

    fn on_name_edited(&mut self, name: &str) -> Vec<SessionAction> {
        if self.fault.is_some() {
            return Vec::new();
        }
        let name = name.trim();
        if name.is_empty() || self.display_name.as_deref() == Some(name) {
            return Vec::new();
        }
        // Optimistic: the local name flips now and is never rolled back.
        self.display_name = Some(name.to_string());
        vec![SessionAction::SendRename(name.to_string())]
    }

    fn on_rename_resolved(&mut self, outcome: Result<(), CallFailure>) -> Vec<SessionAction> {
        match outcome {
            Ok(()) => {
                self.clear_alert(AlertKind::Rename);
                let seq = self.post_notice("Name updated");
                vec![SessionAction::ArmNoticeExpiry { seq }]
            }
            Err(failure) => {
                self.set_alert(AlertKind::Rename, failure.describe("Name update failed"));
                Vec::new()
            }
        }
    }

    fn on_notice_expired(&mut self, seq: u64) -> Vec<SessionAction> {
        // A stale expiry must not clear a newer notice.
        if self.notice.as_ref().is_some_and(|notice| notice.seq() == seq) {
            self.notice = None;
        }
        Vec::new()
    }

    fn post_notice(&mut self, text: &str) -> u64 {
        self.next_notice_seq += 1;
        self.notice = Some(Notice::new(text, self.next_notice_seq));
        self.next_notice_seq
    }

    fn set_alert(&mut self, kind: AlertKind, text: String) {
        self.alert = Some(Alert { kind, text });
    }

    fn clear_alert(&mut self, kind: AlertKind) {
        if self.alert.as_ref().is_some_and(|alert| alert.kind == kind) {
            self.alert = None;
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn belief(&self) -> LockBelief {
        self.belief
    }

    #[must_use]
    pub fn command_in_flight(&self) -> bool {
        self.command_in_flight
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn alert_text(&self) -> Option<&str> {
        self.alert.as_ref().map(|alert| alert.text.as_str())
    }

    #[must_use]
    pub fn fault(&self) -> Option<&SessionFault> {
        self.fault.as_ref()
    }
}
