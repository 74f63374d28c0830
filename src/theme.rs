//! Theme definitions.
//!
//! Three fixed themes mirror the classic editor presets: dark, light, and
//! high contrast. The selected key is persisted in the config file; the
//! palette maps the key to the handful of colors the view needs.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Identifier for the selected theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKey {
    #[default]
    Dark,
    Light,
    #[serde(rename = "hc")]
    HighContrast,
}

impl ThemeKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKey::Dark => "dark",
            ThemeKey::Light => "light",
            ThemeKey::HighContrast => "hc",
        }
    }

    /// Parse a persisted theme name; unknown names fall back to dark.
    pub fn parse(name: &str) -> Self {
        match name {
            "light" => ThemeKey::Light,
            "hc" | "high-contrast" => ThemeKey::HighContrast,
            _ => ThemeKey::Dark,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            ThemeKey::Dark => &DARK,
            ThemeKey::Light => &LIGHT,
            ThemeKey::HighContrast => &HIGH_CONTRAST,
        }
    }
}

impl std::fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colors the view layer draws with.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub dim_fg: Color,
    pub accent: Color,
    pub tab_active_bg: Color,
    pub tab_inactive_bg: Color,
    pub terminal_bg: Color,
    pub terminal_prompt: Color,
    pub link_fg: Color,
    pub toast_bg: Color,
}

pub static DARK: Palette = Palette {
    bg: Color::Rgb(30, 30, 30),
    fg: Color::Rgb(212, 212, 212),
    dim_fg: Color::Rgb(128, 128, 128),
    accent: Color::Rgb(0, 122, 204),
    tab_active_bg: Color::Rgb(45, 45, 45),
    tab_inactive_bg: Color::Rgb(37, 37, 38),
    terminal_bg: Color::Rgb(11, 11, 11),
    terminal_prompt: Color::Rgb(78, 201, 112),
    link_fg: Color::Rgb(86, 156, 214),
    toast_bg: Color::Rgb(37, 37, 38),
};

pub static LIGHT: Palette = Palette {
    bg: Color::Rgb(255, 255, 255),
    fg: Color::Rgb(30, 30, 30),
    dim_fg: Color::Rgb(110, 110, 110),
    accent: Color::Rgb(0, 90, 158),
    tab_active_bg: Color::Rgb(243, 243, 243),
    tab_inactive_bg: Color::Rgb(236, 236, 236),
    terminal_bg: Color::Rgb(245, 245, 245),
    terminal_prompt: Color::Rgb(22, 128, 57),
    link_fg: Color::Rgb(0, 90, 158),
    toast_bg: Color::Rgb(236, 236, 236),
};

pub static HIGH_CONTRAST: Palette = Palette {
    bg: Color::Black,
    fg: Color::White,
    dim_fg: Color::Gray,
    accent: Color::Yellow,
    tab_active_bg: Color::Black,
    tab_inactive_bg: Color::Black,
    terminal_bg: Color::Black,
    terminal_prompt: Color::LightGreen,
    link_fg: Color::LightCyan,
    toast_bg: Color::Black,
};
