//! Neon theme for LiveSitter
//!
//! Color palette and style helpers shared by every panel, plus the mapping
//! from overlay opacity to terminal attributes.

use ratatui::style::{Color, Modifier, Style};

/// Below this opacity an overlay is drawn dimmed
pub const FAINT_OPACITY: f64 = 0.5;

/// Neon color palette
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Deep black-blue
    pub const BACKGROUND: Color = Color::Rgb(0x0a, 0x0a, 0x0f);

    /// Cyan neon
    pub const PRIMARY: Color = Color::Rgb(0x00, 0xff, 0xf2);

    /// Magenta
    pub const SECONDARY: Color = Color::Rgb(0xff, 0x00, 0xff);

    /// Yellow
    pub const ACCENT: Color = Color::Rgb(0xff, 0xff, 0x00);

    /// Hot pink
    pub const HIGHLIGHT: Color = Color::Rgb(0xff, 0x00, 0x80);

    pub const TEXT: Color = Color::Rgb(0xe0, 0xe0, 0xe0);

    pub const DIM: Color = Color::Rgb(0x40, 0x40, 0x50);

    pub const SUCCESS: Color = Color::Rgb(0x00, 0xff, 0x00);

    pub const WARNING: Color = Color::Rgb(0xff, 0xaa, 0x00);

    pub const ERROR: Color = Color::Rgb(0xff, 0x00, 0x40);

    /// Panel background
    pub const BACKGROUND_LIGHT: Color = Color::Rgb(0x14, 0x14, 0x1e);

    /// Video surface stand-in
    pub const STAGE: Color = Color::Rgb(0x05, 0x05, 0x08);

    pub const BORDER: Color = Color::Rgb(0x00, 0x80, 0x78);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Style::default()
            .fg(Self::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected settings field
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND_LIGHT)
    }

    pub fn input_cursor() -> Style {
        Style::default().fg(Self::BACKGROUND).bg(Self::PRIMARY)
    }

    pub fn keybind() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND_LIGHT)
    }

    /// Spinner shown while a request is in flight
    pub fn loading() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn stage() -> Style {
        Style::default().bg(Self::STAGE)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OVERLAY STYLES
    // ═══════════════════════════════════════════════════════════════════════

    /// Caption text; `dragging` draws it reversed
    pub fn caption(opacity: f64, dragging: bool) -> Style {
        Self::overlay(
            Style::default()
                .fg(Self::ACCENT)
                .bg(Self::STAGE)
                .add_modifier(Modifier::BOLD),
            opacity,
            dragging,
        )
    }

    /// Logo box
    pub fn logo(opacity: f64, dragging: bool) -> Style {
        Self::overlay(
            Style::default().fg(Self::SECONDARY).bg(Self::STAGE),
            opacity,
            dragging,
        )
    }

    fn overlay(base: Style, opacity: f64, dragging: bool) -> Style {
        let style = if opacity < FAINT_OPACITY {
            base.add_modifier(Modifier::DIM)
        } else {
            base
        };
        if dragging {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }
}
