//! Neon palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use breachwatch_core::Tone;

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

/// Bar colours for the login-form distribution chart.
pub const CHART_SERIES: &[Color] = &[NEON_CYAN, CORAL, ELECTRIC_PURPLE, LIGHT_BLUE];

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

// ── Search chrome ─────────────────────────────────────────────────────

/// Foreground for a status badge of the given tone.
pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Good => SUCCESS_GREEN,
        Tone::Bad => ERROR_RED,
        Tone::Warn => ELECTRIC_YELLOW,
        Tone::Info => LIGHT_BLUE,
        Tone::Muted => BORDER_GRAY,
    }
}

/// Facet token chip.
pub fn token_chip() -> Style {
    Style::default().fg(NEON_CYAN)
}

/// IP exclusion chip.
pub fn exclusion_chip() -> Style {
    Style::default().fg(CORAL)
}

/// Chip under the chip cursor.
pub fn chip_selected() -> Style {
    Style::default()
        .fg(BG_DARK)
        .bg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

/// Banner shown while results come from bundled sample data.
pub fn fallback_banner() -> Style {
    Style::default()
        .fg(ELECTRIC_YELLOW)
        .add_modifier(Modifier::BOLD)
}
