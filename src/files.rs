//! The portfolio's static file map and open-tab bookkeeping.
//!
//! There is no real file system behind the explorer: the four portfolio
//! files are embedded in the binary, keyed by name, with a display language
//! derived from the extension.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// One embedded portfolio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileContent {
    pub language: &'static str,
    pub value: &'static str,
}

/// Map a file extension to a display language.
pub fn language_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|ext| ext.to_lowercase()).as_deref() {
        Some("md") | Some("markdown") => "markdown",
        Some("json") => "json",
        Some("ts") => "typescript",
        Some("js") => "javascript",
        _ => "text",
    }
}

const README: &str = "\
# Zach Carter

Full-stack developer who enjoys building small, fast things.

This portfolio is itself a terminal app. Poke around:

- Open the other files from the command palette (Ctrl+P)
- Try the terminal at the bottom (`help` is a good start)
- There are achievements. Some are secret.
";

const PROJECTS: &str = "\
# Projects

## codefolio
This very thing. A portfolio that pretends to be a code editor.

## chunkline
A line-indexed virtual file reader for editing files larger than RAM.

## driftwatch
Config drift detector for fleets of build machines. Diffs live state
against the declared manifest and yells early.
";

const EXPERIENCE: &str = "\
# Experience

## Senior Software Engineer — Harborlight Systems (2021—now)
Storage tooling, terminal UIs, and the occasional parser.

## Software Engineer — Quillback (2018—2021)
Web services, then the internal CLI platform everyone actually used.
";

const CONTACT: &str = "\
{
  \"email\": \"zach@zcarter.dev\",
  \"github\": \"https://github.com/zcarter\",
  \"availability\": \"open to interesting problems\"
}
";

/// All portfolio files, keyed by display name.
pub static FILES: Lazy<BTreeMap<&'static str, FileContent>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    for (name, value) in [
        ("README.md", README),
        ("projects.md", PROJECTS),
        ("experience.md", EXPERIENCE),
        ("contact.json", CONTACT),
    ] {
        map.insert(
            name,
            FileContent {
                language: language_for(name),
                value,
            },
        );
    }
    map
});

/// Open tabs and the active file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    open_tabs: Vec<&'static str>,
    active_file: Option<&'static str>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_tabs(&self) -> &[&'static str] {
        &self.open_tabs
    }

    pub fn active_file(&self) -> Option<&'static str> {
        self.active_file
    }

    pub fn active_content(&self) -> Option<FileContent> {
        self.active_file.and_then(|name| FILES.get(name).copied())
    }

    /// Open a file: add a tab if not already open, and activate it.
    /// Unknown names are ignored.
    pub fn open_file(&mut self, name: &str) -> bool {
        let Some((&known, _)) = FILES.get_key_value(name) else {
            tracing::debug!("Ignoring open of unknown file {:?}", name);
            return false;
        };
        if !self.open_tabs.contains(&known) {
            self.open_tabs.push(known);
        }
        self.active_file = Some(known);
        true
    }

    /// Close a tab. When the active file is closed, the most recently
    /// opened remaining tab becomes active.
    pub fn close_tab(&mut self, name: &str) {
        self.open_tabs.retain(|&t| t != name);
        if self.active_file == Some(name) {
            self.active_file = self.open_tabs.last().copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_files_embedded() {
        assert_eq!(FILES.len(), 4);
        assert_eq!(FILES["contact.json"].language, "json");
        assert_eq!(FILES["README.md"].language, "markdown");
    }

    #[test]
    fn test_language_mapping() {
        assert_eq!(language_for("notes.MD"), "markdown");
        assert_eq!(language_for("data.json"), "json");
        assert_eq!(language_for("plain"), "text");
    }

    #[test]
    fn test_open_file_adds_tab_once() {
        let mut ws = Workspace::new();
        assert!(ws.open_file("README.md"));
        assert!(ws.open_file("projects.md"));
        assert!(ws.open_file("README.md"));

        assert_eq!(ws.open_tabs(), &["README.md", "projects.md"]);
        assert_eq!(ws.active_file(), Some("README.md"));
    }

    #[test]
    fn test_unknown_file_is_ignored() {
        let mut ws = Workspace::new();
        assert!(!ws.open_file("secrets.txt"));
        assert!(ws.open_tabs().is_empty());
    }

    #[test]
    fn test_close_active_tab_activates_last_remaining() {
        let mut ws = Workspace::new();
        ws.open_file("README.md");
        ws.open_file("projects.md");
        ws.open_file("contact.json");

        ws.close_tab("contact.json");
        assert_eq!(ws.active_file(), Some("projects.md"));

        ws.close_tab("README.md");
        assert_eq!(ws.active_file(), Some("projects.md"));

        ws.close_tab("projects.md");
        assert_eq!(ws.active_file(), None);
    }
}
