//! Session orchestration for the lock panel.
//!
//! # Architecture
//!
//! The crate is split into a pure core and an async shell:
//!
//! - [`SessionState`] - pure state machine; consumes [`SessionEvent`]s and
//!   returns [`SessionAction`]s, never touching the network or the clock
//! - [`Panel`] - async driver that owns the [`LockApi`], executes actions,
//!   and feeds call resolutions back in as events
//! - [`resolve_identity`] - one-shot startup lookup that gates everything
//! - [`LatchConfig`] - on-disk configuration under `~/.latch/`
//!
//! The front end drains driver events once per frame via [`Panel::pump`]
//! and renders from [`Panel::snapshot`]. All policy (who may actuate,
//! when a belief moves, how long a notice lives) sits in the pure core;
//! the driver only carries it out.

mod config;
mod driver;
mod event;
mod identity;
mod state;

pub use config::{
    config_path, ConfigError, LatchConfig, PanelSection, ServerSection, UserSection,
    DEFAULT_SERVER_URL,
};
pub use driver::{Panel, PanelOptions, PanelView};
pub use event::{CallFailure, SessionAction, SessionEvent};
pub use identity::{classify_lookup, resolve_identity, IdentityOutcome};
pub use state::SessionState;

// Re-exported so the front end only depends on this crate.
pub use latch_api::{ApiError, LockApi, StatusReading};
pub use latch_types::{CommandKind, LockBelief, Notice, SessionFault, UserId};
