//! Latch CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`latch_session`] (state and IO) and the local [`ui`]
//! module (rendering), providing RAII-based terminal management with
//! guaranteed cleanup.
//!
//! ```text
//! main() -> resolve_identity() -> Panel -> TerminalSession -> run_panel()
//! ```
//!
//! # Event Loop
//!
//! A fixed 30ms render cadence drives everything:
//!
//! 1. Wait for frame tick
//! 2. Drain pending key/paste events (non-blocking)
//! 3. Drain driver events into the state machine (`panel.pump()`)
//! 4. Advance the swing animation clock
//! 5. Render frame
//!
//! Identity resolution happens once, before the terminal is taken over, so
//! a failed lookup leaves a readable error instead of a torn screen.

mod effects;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use latch_session::{LatchConfig, LockApi, Panel, config_path, resolve_identity};

use crate::effects::Effects;
use crate::ui::{Glyphs, NameEditor};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_latch_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_latch_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = latch_log_file_candidates();
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn latch_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.latch/logs/latch.log
    if let Some(config_path) = config_path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("latch.log"));
    }

    // Fallback: ./.latch/logs/latch.log (useful in constrained environments)
    candidates.push(PathBuf::from(".latch").join("logs").join("latch.log"));

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Manages raw mode, bracketed paste, and the alternate screen. On drop,
/// all terminal state is restored to its original configuration, so the
/// terminal stays usable even after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableBracketedPaste);
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(out);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let mut out = stdout();
                let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = LatchConfig::load()?.unwrap_or_default();
    let options = config.panel_options();
    let glyphs = ui::glyphs(config.ascii_only());

    let mut panel = match config.user_id() {
        Some(user_id) => {
            let api = LockApi::with_timeout(config.server_url(), user_id, config.timeout_secs())?;
            let identity = resolve_identity(&api).await;
            Panel::start(api, identity, options)
        }
        None => Panel::without_identity(options),
    };

    let run_result = {
        let mut session = TerminalSession::new()?;
        run_panel(&mut session.terminal, &mut panel, glyphs).await
    };
    panel.shutdown();

    if let Err(err) = run_result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(30);

async fn run_panel<B>(terminal: &mut Terminal<B>, panel: &mut Panel, glyphs: Glyphs) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut effects = Effects::new();
    let mut editor: Option<NameEditor> = None;
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        if drain_input(panel, &mut editor)? {
            return Ok(());
        }

        panel.pump();
        if let Some(kind) = panel.take_swing() {
            effects.start_swing(kind);
        }
        effects.advance();

        let view = panel.snapshot();
        terminal.draw(|frame| ui::draw(frame, &view, editor.as_ref(), &effects, glyphs))?;
    }
}

fn drain_input(panel: &mut Panel, editor: &mut Option<NameEditor>) -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(panel, editor, key) {
                    return Ok(true);
                }
            }
            Event::Paste(text) => {
                if let Some(editor) = editor.as_mut() {
                    editor.insert_str(&text);
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

/// Applies one key press. Returns true when the user asked to quit.
fn handle_key(panel: &mut Panel, editor: &mut Option<NameEditor>, key: KeyEvent) -> bool {
    // Ctrl-C quits from anywhere, edit mode included.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(active) = editor.as_mut() {
        match key.code {
            KeyCode::Esc => *editor = None,
            KeyCode::Enter => {
                let name = active.text().trim().to_string();
                if !name.is_empty() {
                    panel.commit_name(name);
                }
                *editor = None;
            }
            KeyCode::Backspace => active.backspace(),
            KeyCode::Char(c) => active.insert(c),
            _ => {}
        }
        return false;
    }

    let view = panel.snapshot();
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('o') if view.can_command() => panel.request_open(),
        KeyCode::Char('c') if view.can_command() => panel.request_close(),
        KeyCode::Char('e') if view.can_rename() => {
            *editor = Some(NameEditor::prefilled(
                view.display_name.as_deref().unwrap_or_default(),
            ));
        }
        _ => {}
    }
    false
}
