//! Async driver around [`SessionState`].
//!
//! [`Panel`] owns the API client, the refresh cadence, and the notice
//! expiry timer. Events funnel through one unbounded channel: the ticker
//! task, the expiry task, and every spawned call resolution all send into
//! it, and the front end drains it once per frame with [`Panel::pump`].
//!
//! Teardown aborts the ticker and the expiry timer but deliberately not
//! in-flight calls; their resolutions land in a closed channel and vanish.

use std::time::Duration;

use latch_api::{LockApi, StatusReading};
use latch_types::{CommandKind, LockBelief, SessionFault};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::{CallFailure, SessionAction, SessionEvent};
use crate::identity::IdentityOutcome;
use crate::state::SessionState;

/// Timing knobs for a running panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOptions {
    /// Cadence of status reads. The first read fires immediately.
    pub refresh_period: Duration,
    /// How long a notice stays on screen.
    pub notice_ttl: Duration,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            refresh_period: Duration::from_secs(60),
            notice_ttl: Duration::from_secs(3),
        }
    }
}

/// Render-ready snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub belief: LockBelief,
    pub busy: bool,
    pub display_name: Option<String>,
    pub notice: Option<String>,
    pub alert: Option<String>,
    pub fault: Option<SessionFault>,
}

impl PanelView {
    /// Actuation keys are live only when the session is healthy and idle.
    #[must_use]
    pub fn can_command(&self) -> bool {
        self.fault.is_none() && !self.busy
    }

    /// Name editing stays live while busy; only a fault disables it.
    #[must_use]
    pub fn can_rename(&self) -> bool {
        self.fault.is_none()
    }
}

/// One running panel session.
pub struct Panel {
    state: SessionState,
    api: Option<LockApi>,
    options: PanelOptions,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    refresh_task: Option<JoinHandle<()>>,
    expiry_task: Option<JoinHandle<()>>,
    pending_swing: Option<CommandKind>,
}

impl Panel {
    /// Panel for a resolved identity.
    ///
    /// Polling starts only when the identity is usable; a fatal identity
    /// still renders but never touches the network.
    #[must_use]
    pub fn start(api: LockApi, identity: IdentityOutcome, options: PanelOptions) -> Self {
        let mut panel = Self::build(Some(api), identity, options);
        panel.spawn_refresh_ticker();
        panel
    }

    /// Panel for a missing stored identifier: renders the unregistered
    /// fault and has no client to call with.
    #[must_use]
    pub fn without_identity(options: PanelOptions) -> Self {
        Self::build(None, IdentityOutcome::Unregistered, options)
    }

    fn build(api: Option<LockApi>, identity: IdentityOutcome, options: PanelOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(identity),
            api,
            options,
            events_tx,
            events_rx,
            refresh_task: None,
            expiry_task: None,
            pending_swing: None,
        }
    }

    fn spawn_refresh_ticker(&mut self) {
        if self.state.fault().is_some() {
            return;
        }
        let tx = self.events_tx.clone();
        let period = self.options.refresh_period;
        self.refresh_task = Some(tokio::spawn(async move {
            // The interval's first tick is immediate and doubles as the
            // startup read.
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if tx.send(SessionEvent::RefreshTick).is_err() {
                    break;
                }
            }
        }));
    }

    /// Drains every queued event into the state machine. Call once per
    /// frame, before [`Panel::snapshot`].
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
        }
    }

    pub fn request_open(&mut self) {
        self.dispatch(SessionEvent::CommandRequested(CommandKind::Open));
    }

    pub fn request_close(&mut self) {
        self.dispatch(SessionEvent::CommandRequested(CommandKind::Close));
    }

    pub fn commit_name(&mut self, name: impl Into<String>) {
        self.dispatch(SessionEvent::NameEdited(name.into()));
    }

    /// Swing queued by a confirmed actuation, if any. Clears on read.
    #[must_use]
    pub fn take_swing(&mut self) -> Option<CommandKind> {
        self.pending_swing.take()
    }

    #[must_use]
    pub fn snapshot(&self) -> PanelView {
        PanelView {
            belief: self.state.belief(),
            busy: self.state.command_in_flight(),
            display_name: self.state.display_name().map(str::to_string),
            notice: self.state.notice().map(|notice| notice.text().to_string()),
            alert: self.state.alert_text().map(str::to_string),
            fault: self.state.fault().cloned(),
        }
    }

    /// Stops the cadence and any armed notice expiry. In-flight calls are
    /// left to finish; their resolutions hit a closed channel and vanish.
    pub fn shutdown(&mut self) {
        self.events_rx.close();
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
        if let Some(task) = self.expiry_task.take() {
            task.abort();
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        match &event {
            SessionEvent::RefreshResolved(Err(failure)) => {
                tracing::warn!("status read failed: {failure}");
            }
            SessionEvent::CommandResolved {
                kind,
                outcome: Err(failure),
            } => {
                tracing::warn!("{} failed: {failure}", kind.verb());
            }
            SessionEvent::RenameResolved(Err(failure)) => {
                tracing::warn!("rename failed: {failure}");
            }
            _ => {}
        }
        let actions = self.state.apply(event);
        for action in actions {
            self.execute(action);
        }
    }

    fn execute(&mut self, action: SessionAction) {
        match action {
            SessionAction::ReadStatus => self.spawn_status_read(),
            SessionAction::SendCommand(kind) => self.spawn_command(kind),
            SessionAction::SendRename(name) => self.spawn_rename(name),
            SessionAction::ArmNoticeExpiry { seq } => self.arm_notice_expiry(seq),
            SessionAction::PlaySwing(kind) => self.pending_swing = Some(kind),
        }
    }

    fn spawn_status_read(&self) {
        let Some(api) = self.api.clone() else { return };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match api.status().await {
                Ok(StatusReading::Reported { locked }) => Ok(locked),
                Ok(StatusReading::Refused) => Err(CallFailure::Refused),
                Err(err) => Err(CallFailure::from(err)),
            };
            let _ = tx.send(SessionEvent::RefreshResolved(outcome));
        });
    }

    fn spawn_command(&self, kind: CommandKind) {
        let Some(api) = self.api.clone() else { return };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match api.command(kind).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(CallFailure::Refused),
                Err(err) => Err(CallFailure::from(err)),
            };
            let _ = tx.send(SessionEvent::CommandResolved { kind, outcome });
        });
    }

    fn spawn_rename(&self, name: String) {
        let Some(api) = self.api.clone() else { return };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match api.set_name(&name).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(CallFailure::Refused),
                Err(err) => Err(CallFailure::from(err)),
            };
            let _ = tx.send(SessionEvent::RenameResolved(outcome));
        });
    }

    fn arm_notice_expiry(&mut self, seq: u64) {
        // One timer at a time; a superseding notice replaces it outright.
        if let Some(task) = self.expiry_task.take() {
            task.abort();
        }
        let tx = self.events_tx.clone();
        let ttl = self.options.notice_ttl;
        self.expiry_task = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = tx.send(SessionEvent::NoticeExpired { seq });
        }));
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.shutdown();
    }
}
