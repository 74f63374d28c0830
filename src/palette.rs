//! Command palette catalog and filtering.
//!
//! The catalog is fixed: open each portfolio file, switch themes, and one
//! easter egg. Executing an entry is the view layer's job; this module only
//! describes the entries and filters them against a query.

use crate::theme::ThemeKey;

/// What executing a palette entry should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteAction {
    OpenFile(&'static str),
    SetTheme(ThemeKey),
    ToggleTerminal,
    ShowAchievements,
    HireEasterEgg,
}

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteCommand {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    pub keywords: &'static [&'static str],
    pub action: PaletteAction,
}

/// The full catalog, in display order. Every embedded portfolio file has an
/// open entry; the palette is the explorer here.
pub const COMMANDS: [PaletteCommand; 10] = [
    PaletteCommand {
        id: "open-readme",
        title: "Open README.md",
        subtitle: None,
        keywords: &["file", "readme", "about"],
        action: PaletteAction::OpenFile("README.md"),
    },
    PaletteCommand {
        id: "open-contact",
        title: "Open contact.json",
        subtitle: None,
        keywords: &["file", "contact"],
        action: PaletteAction::OpenFile("contact.json"),
    },
    PaletteCommand {
        id: "open-projects",
        title: "Open projects.md",
        subtitle: None,
        keywords: &["file", "projects"],
        action: PaletteAction::OpenFile("projects.md"),
    },
    PaletteCommand {
        id: "open-experience",
        title: "Open experience.md",
        subtitle: None,
        keywords: &["file", "experience"],
        action: PaletteAction::OpenFile("experience.md"),
    },
    PaletteCommand {
        id: "theme-dark",
        title: "Theme: Dark",
        subtitle: None,
        keywords: &["theme"],
        action: PaletteAction::SetTheme(ThemeKey::Dark),
    },
    PaletteCommand {
        id: "theme-light",
        title: "Theme: Light",
        subtitle: None,
        keywords: &["theme"],
        action: PaletteAction::SetTheme(ThemeKey::Light),
    },
    PaletteCommand {
        id: "theme-hc",
        title: "Theme: High Contrast",
        subtitle: None,
        keywords: &["theme", "accessibility"],
        action: PaletteAction::SetTheme(ThemeKey::HighContrast),
    },
    PaletteCommand {
        id: "toggle-terminal",
        title: "Toggle Terminal",
        subtitle: None,
        keywords: &["terminal", "panel"],
        action: PaletteAction::ToggleTerminal,
    },
    PaletteCommand {
        id: "view-achievements",
        title: "View Achievements",
        subtitle: None,
        keywords: &["achievements", "progress"],
        action: PaletteAction::ShowAchievements,
    },
    PaletteCommand {
        id: "easter-egg",
        title: "Hire and pay lots of money",
        subtitle: Some("A friendly suggestion"),
        keywords: &["easter egg", "fun"],
        action: PaletteAction::HireEasterEgg,
    },
];

/// Case-insensitive subsequence match of `query` against `candidate`.
fn matches_query(query_lower: &str, candidate: &str) -> bool {
    let candidate_lower = candidate.to_lowercase();
    let mut query_chars = query_lower.chars();
    let mut current_char = query_chars.next();

    for c in candidate_lower.chars() {
        match current_char {
            Some(qc) if qc == c => current_char = query_chars.next(),
            Some(_) => {}
            None => break,
        }
    }

    current_char.is_none()
}

/// Filter the catalog. An empty query returns everything in catalog order;
/// otherwise entries match when the query is a subsequence of the title or
/// any keyword.
pub fn filter(query: &str) -> Vec<&'static PaletteCommand> {
    let query_lower = query.to_lowercase();
    COMMANDS
        .iter()
        .filter(|cmd| {
            query.is_empty()
                || matches_query(&query_lower, cmd.title)
                || cmd.keywords.iter().any(|k| matches_query(&query_lower, k))
        })
        .collect()
}
