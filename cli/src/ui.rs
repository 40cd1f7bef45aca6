//! Rendering for the lock panel.
//!
//! One small card centered on a dark background: lock glyph, belief
//! label, display name, a transient notice line, a persistent alert
//! line, and key hints. A fatal identity replaces the card body with
//! the fault explanation and leaves only quit available.
//!
//! Uses the Kanagawa Wave palette with an optional ASCII glyph set for
//! terminals that render the Unicode set poorly.

use latch_session::{LockBelief, PanelView, SessionFault};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::effects::Effects;

const CARD_WIDTH: u16 = 46;
const CARD_HEIGHT: u16 = 13;

// ============================================================================
// Theme
// ============================================================================

/// Kanagawa Wave color palette constants.
mod colors {
    use super::Color;

    // === Backgrounds (Sumi Ink) ===
    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    // === Foregrounds (Fuji) ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray

    // === Accent Colors ===
    pub const CYAN: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const ORANGE: Color = Color::Rgb(255, 160, 102); // surimiOrange
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed
}

/// Resolved theme palette used by the panel.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub border: Color,
    pub text: Color,
    pub muted: Color,
    pub notice: Color,
    pub locked: Color,
    pub unlocked: Color,
    pub unknown: Color,
    pub alert: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg: colors::BG_DARK,
            border: colors::BG_BORDER,
            text: colors::TEXT_PRIMARY,
            muted: colors::TEXT_MUTED,
            notice: colors::CYAN,
            locked: colors::RED,
            unlocked: colors::GREEN,
            unknown: colors::ORANGE,
            alert: colors::RED,
        }
    }

    /// Color that carries the belief at a glance.
    #[must_use]
    pub fn belief_color(&self, belief: LockBelief) -> Color {
        match belief {
            LockBelief::Locked => self.locked,
            LockBelief::Unlocked => self.unlocked,
            LockBelief::Unknown => self.unknown,
        }
    }
}

// ============================================================================
// Glyphs
// ============================================================================

/// Glyph set for the panel.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub locked: &'static str,
    pub unlocked: &'static str,
    pub unknown: &'static str,
    pub cursor: &'static str,
    pub swing_frames: &'static [&'static str],
}

const SWING_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
const SWING_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

/// Returns the glyph set for the configured rendering mode.
#[must_use]
pub fn glyphs(ascii_only: bool) -> Glyphs {
    if ascii_only {
        Glyphs {
            locked: "*",
            unlocked: "o",
            unknown: "?",
            cursor: "_",
            swing_frames: SWING_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            locked: "●",
            unlocked: "○",
            unknown: "◌",
            cursor: "▏",
            swing_frames: SWING_FRAMES,
        }
    }
}

impl Glyphs {
    /// Idle glyph for a belief.
    #[must_use]
    pub fn belief(&self, belief: LockBelief) -> &'static str {
        match belief {
            LockBelief::Locked => self.locked,
            LockBelief::Unlocked => self.unlocked,
            LockBelief::Unknown => self.unknown,
        }
    }
}

// ============================================================================
// Name editor
// ============================================================================

/// In-progress name edit. Single line, plain text.
#[derive(Debug, Default)]
pub struct NameEditor {
    text: String,
}

impl NameEditor {
    #[must_use]
    pub fn prefilled(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub fn insert(&mut self, c: char) {
        if !c.is_control() {
            self.text.push(c);
        }
    }

    /// Inserts pasted text, dropping control characters and newlines.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Drawing
// ============================================================================

/// Renders one frame of the panel.
pub fn draw(
    frame: &mut Frame,
    view: &PanelView,
    editor: Option<&NameEditor>,
    effects: &Effects,
    glyphs: Glyphs,
) {
    let palette = Palette::standard();
    let area = frame.area();

    frame.render_widget(Block::new().style(Style::default().bg(palette.bg)), area);

    let card = centered(area, CARD_WIDTH, CARD_HEIGHT);
    let block = Block::bordered()
        .title(" latch ")
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.bg).fg(palette.text));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    if let Some(fault) = view.fault.as_ref() {
        draw_fault(frame, inner, fault, &palette);
    } else {
        draw_panel(frame, inner, view, editor, effects, glyphs, &palette);
    }
}

fn draw_fault(frame: &mut Frame, area: Rect, fault: &SessionFault, palette: &Palette) {
    let headline = match fault {
        SessionFault::Unregistered => "Not registered",
        SessionFault::IdentityLookup(_) => "Could not verify registration",
    };

    let mut lines = vec![
        Line::default(),
        Line::styled(
            headline,
            Style::default()
                .fg(palette.alert)
                .add_modifier(Modifier::BOLD),
        )
        .centered(),
    ];
    if let SessionFault::IdentityLookup(detail) = fault {
        lines.push(Line::styled(detail.clone(), Style::default().fg(palette.muted)).centered());
    }
    lines.push(Line::default());
    lines.push(
        Line::styled(
            "Set user.id in ~/.latch/config.toml and restart.",
            Style::default().fg(palette.muted),
        )
        .centered(),
    );
    lines.push(Line::default());
    lines.push(Line::styled("[q] quit", Style::default().fg(palette.muted)).centered());

    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_panel(
    frame: &mut Frame,
    area: Rect,
    view: &PanelView,
    editor: Option<&NameEditor>,
    effects: &Effects,
    glyphs: Glyphs,
    palette: &Palette,
) {
    let [_, glyph_row, label_row, _, name_row, notice_row, alert_row, _, hint_row] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

    // A playing swing overrides the idle belief glyph.
    let glyph = effects
        .swing_frame(glyphs.swing_frames)
        .unwrap_or_else(|| glyphs.belief(view.belief));
    frame.render_widget(
        Paragraph::new(
            Line::styled(
                glyph,
                Style::default()
                    .fg(palette.belief_color(view.belief))
                    .add_modifier(Modifier::BOLD),
            )
            .centered(),
        ),
        glyph_row,
    );

    frame.render_widget(
        Paragraph::new(
            Line::styled(
                view.belief.label(),
                Style::default().fg(palette.belief_color(view.belief)),
            )
            .centered(),
        ),
        label_row,
    );

    let name_line = match editor {
        Some(editor) => Line::from(vec![
            Span::styled("Name ", Style::default().fg(palette.muted)),
            Span::styled(editor.text().to_string(), Style::default().fg(palette.text)),
            Span::styled(glyphs.cursor, Style::default().fg(palette.notice)),
        ]),
        None => Line::from(vec![
            Span::styled("Name ", Style::default().fg(palette.muted)),
            Span::styled(
                view.display_name.clone().unwrap_or_else(|| "(unnamed)".to_string()),
                Style::default().fg(palette.text),
            ),
        ]),
    }
    .centered();
    frame.render_widget(Paragraph::new(name_line), name_row);

    if let Some(notice) = view.notice.as_deref() {
        frame.render_widget(
            Paragraph::new(
                Line::styled(notice.to_string(), Style::default().fg(palette.notice)).centered(),
            ),
            notice_row,
        );
    }

    if let Some(alert) = view.alert.as_deref() {
        frame.render_widget(
            Paragraph::new(
                Line::styled(alert.to_string(), Style::default().fg(palette.alert)).centered(),
            ),
            alert_row,
        );
    }

    let hints = if editor.is_some() {
        "[enter] save  [esc] cancel"
    } else {
        "[o] open  [c] close  [e] name  [q] quit"
    };
    frame.render_widget(
        Paragraph::new(Line::styled(hints, Style::default().fg(palette.muted)).centered()),
        hint_row,
    );
}

/// Centers a fixed-size card inside `area`, clamping to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
