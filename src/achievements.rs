//! Achievement catalog and progress tracking.
//!
//! Six fixed achievements are unlocked by watching what the visitor does:
//! opening portfolio files, running fake-shell commands, using the command
//! palette, flipping themes, triggering the hire command, and entering the
//! Konami code. Progress is persisted through a `ProgressStore` after every
//! mutation, and unlocks are announced to any subscribed observers.

use crate::storage::ProgressStore;
use crate::time_source::SharedTimeSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// How long the "recently unlocked" toast stays up before auto-clearing.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Identifier for each achievement in the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementId {
    FileExplorer,
    CommandMaster,
    Hired,
    ThemeSwitcher,
    KonamiCode,
    TerminalWarrior,
}

impl AchievementId {
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FileExplorer => "file-explorer",
            AchievementId::CommandMaster => "command-master",
            AchievementId::Hired => "hired",
            AchievementId::ThemeSwitcher => "theme-switcher",
            AchievementId::KonamiCode => "konami-code",
            AchievementId::TerminalWarrior => "terminal-warrior",
        }
    }
}

/// Static catalog entry: what the achievement is and what it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: u32,
}

/// The full catalog. Immutable, known at compile time.
pub const CATALOG: [Achievement; 6] = [
    Achievement {
        id: AchievementId::FileExplorer,
        title: "File Explorer",
        description: "Opened all available files",
        icon: "📁",
        // README.md, projects.md, experience.md, contact.json
        requirement: 4,
    },
    Achievement {
        id: AchievementId::CommandMaster,
        title: "Command Master",
        description: "Used 10 different command palette commands",
        icon: "⚡",
        requirement: 10,
    },
    Achievement {
        id: AchievementId::Hired,
        title: "You're Hired!",
        description: "Triggered the hire command",
        icon: "🎉",
        requirement: 1,
    },
    Achievement {
        id: AchievementId::ThemeSwitcher,
        title: "Theme Switcher",
        description: "Switched between light and dark theme 5 times",
        icon: "💡",
        requirement: 5,
    },
    Achievement {
        id: AchievementId::KonamiCode,
        title: "Secret Unlocked",
        description: "Discovered the Konami Code",
        icon: "🎮",
        requirement: 1,
    },
    Achievement {
        id: AchievementId::TerminalWarrior,
        title: "Terminal Warrior",
        description: "Executed 25 terminal commands",
        icon: "⌨️",
        requirement: 25,
    },
];

/// Look up the catalog entry for an id.
pub fn definition(id: AchievementId) -> &'static Achievement {
    CATALOG
        .iter()
        .find(|a| a.id == id)
        .expect("catalog covers every AchievementId")
}

fn requirement(id: AchievementId) -> u32 {
    definition(id).requirement
}

/// Persisted progress record.
///
/// Serialized with the legacy browser-storage field names so an exported
/// record from the web version of the portfolio loads unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    pub unlocked: BTreeSet<AchievementId>,
    /// Legacy per-achievement counter slot; carried through untouched for
    /// storage-format compatibility.
    pub progress: serde_json::Map<String, serde_json::Value>,
    pub opened_files: BTreeSet<String>,
    pub used_commands: BTreeSet<String>,
    pub theme_switches: u32,
    pub command_count: u32,
}

/// Callback invoked on every unlock (toast, confetti, ...).
pub type UnlockObserver = Box<dyn FnMut(&Achievement)>;

/// Tracks visitor activity and unlocks achievements.
///
/// All operations are total: a failing store write is logged and swallowed,
/// and malformed persisted data loads as the zero default.
pub struct AchievementTracker {
    progress: Progress,
    store: Box<dyn ProgressStore>,
    time_source: SharedTimeSource,
    recent_unlock: Option<(&'static Achievement, Instant)>,
    observers: Vec<UnlockObserver>,
}

impl AchievementTracker {
    pub fn new(store: Box<dyn ProgressStore>, time_source: SharedTimeSource) -> Self {
        let progress = store.load().unwrap_or_default();
        Self {
            progress,
            store,
            time_source,
            recent_unlock: None,
            observers: Vec::new(),
        }
    }

    /// Current progress (read-only).
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Register an unlock observer. Observers fire on every unlock, in
    /// subscription order.
    pub fn subscribe(&mut self, observer: UnlockObserver) {
        self.observers.push(observer);
    }

    /// The most recently unlocked achievement, if its toast is still up.
    pub fn recent_unlock(&self) -> Option<&'static Achievement> {
        self.recent_unlock.map(|(a, _)| a)
    }

    /// Dismiss the toast without touching unlock state.
    pub fn clear_recent_unlock(&mut self) {
        self.recent_unlock = None;
    }

    /// Auto-expire the toast after its display duration.
    pub fn tick(&mut self) {
        if let Some((_, shown_at)) = self.recent_unlock {
            if self.time_source.elapsed_since(shown_at) >= TOAST_DURATION {
                self.recent_unlock = None;
            }
        }
    }

    /// Record a file being opened in the viewer.
    pub fn track_file_open(&mut self, filename: &str) {
        self.progress.opened_files.insert(filename.to_string());
        if self.progress.opened_files.len() as u32 >= requirement(AchievementId::FileExplorer) {
            self.unlock(AchievementId::FileExplorer);
        }
        self.persist();
    }

    /// Record one executed fake-shell command.
    pub fn track_terminal_command(&mut self) {
        self.progress.command_count = self.progress.command_count.saturating_add(1);
        if self.progress.command_count >= requirement(AchievementId::TerminalWarrior) {
            self.unlock(AchievementId::TerminalWarrior);
        }
        self.persist();
    }

    /// Record a command palette action. Ids are normalized (trim +
    /// lowercase) so "Open-Contact" and "open-contact " count once.
    pub fn track_palette_command(&mut self, command_id: &str) {
        let normalized = command_id.trim().to_lowercase();
        self.progress.used_commands.insert(normalized);
        if self.progress.used_commands.len() as u32 >= requirement(AchievementId::CommandMaster) {
            self.unlock(AchievementId::CommandMaster);
        }
        self.persist();
    }

    /// Record a theme switch.
    pub fn track_theme_switch(&mut self) {
        self.progress.theme_switches = self.progress.theme_switches.saturating_add(1);
        if self.progress.theme_switches >= requirement(AchievementId::ThemeSwitcher) {
            self.unlock(AchievementId::ThemeSwitcher);
        }
        self.persist();
    }

    /// The hire command fired.
    pub fn track_hire(&mut self) {
        self.unlock(AchievementId::Hired);
        self.persist();
    }

    /// The Konami code was entered.
    pub fn track_konami_code(&mut self) {
        self.unlock(AchievementId::KonamiCode);
        self.persist();
    }

    /// Debug hatch: wipe all progress (secret `clearachievements` command).
    pub fn clear_all_achievements(&mut self) {
        tracing::info!("Clearing all achievement progress");
        self.progress = Progress::default();
        self.persist();
    }

    /// Debug hatch: unlock the whole catalog without touching counters
    /// (secret `allachievements` command). Bypasses observers and the toast.
    pub fn unlock_all_achievements(&mut self) {
        tracing::info!("Unlocking all achievements");
        self.progress.unlocked = CATALOG.iter().map(|a| a.id).collect();
        self.persist();
    }

    /// Unlock primitive: no-op when already unlocked, otherwise records the
    /// unlock, arms the toast, and notifies observers exactly once.
    fn unlock(&mut self, id: AchievementId) {
        if !self.progress.unlocked.insert(id) {
            return;
        }

        let achievement = definition(id);
        tracing::info!("Achievement unlocked: {}", achievement.title);
        self.recent_unlock = Some((achievement, self.time_source.now()));

        for observer in &mut self.observers {
            observer(achievement);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.progress) {
            // Never surfaced to the caller; tracking operations are total
            tracing::warn!("Failed to persist achievement progress: {}", e);
        }
    }
}

impl std::fmt::Debug for AchievementTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AchievementTracker")
            .field("progress", &self.progress)
            .field("recent_unlock", &self.recent_unlock)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::time_source::TestTimeSource;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn tracker() -> AchievementTracker {
        AchievementTracker::new(Box::new(MemoryStore::new()), Arc::new(TestTimeSource::new()))
    }

    #[test]
    fn test_file_explorer_needs_distinct_files() {
        let mut t = tracker();

        for _ in 0..10 {
            t.track_file_open("README.md");
        }
        assert!(!t.progress().unlocked.contains(&AchievementId::FileExplorer));

        t.track_file_open("projects.md");
        t.track_file_open("experience.md");
        t.track_file_open("contact.json");
        assert!(t.progress().unlocked.contains(&AchievementId::FileExplorer));
    }

    #[test]
    fn test_terminal_warrior_at_25_commands() {
        let mut t = tracker();

        for _ in 0..24 {
            t.track_terminal_command();
        }
        assert!(!t.progress().unlocked.contains(&AchievementId::TerminalWarrior));

        t.track_terminal_command();
        assert!(t.progress().unlocked.contains(&AchievementId::TerminalWarrior));
        assert_eq!(t.progress().command_count, 25);
    }

    #[test]
    fn test_palette_commands_normalized() {
        let mut t = tracker();

        t.track_palette_command("Open-Contact");
        t.track_palette_command("open-contact ");
        t.track_palette_command("  OPEN-CONTACT");
        assert_eq!(t.progress().used_commands.len(), 1);
        assert!(t.progress().used_commands.contains("open-contact"));
    }

    #[test]
    fn test_command_master_at_10_distinct() {
        let mut t = tracker();

        for i in 0..9 {
            t.track_palette_command(&format!("cmd-{}", i));
        }
        assert!(!t.progress().unlocked.contains(&AchievementId::CommandMaster));

        t.track_palette_command("cmd-9");
        assert!(t.progress().unlocked.contains(&AchievementId::CommandMaster));
    }

    #[test]
    fn test_theme_switcher_at_5() {
        let mut t = tracker();

        for _ in 0..5 {
            t.track_theme_switch();
        }
        assert!(t.progress().unlocked.contains(&AchievementId::ThemeSwitcher));
    }

    #[test]
    fn test_unlock_is_idempotent_and_fires_observer_once() {
        let mut t = tracker();
        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = fired.clone();
        t.subscribe(Box::new(move |_| fired_clone.set(fired_clone.get() + 1)));

        t.track_hire();
        t.track_hire();
        t.track_hire();

        assert_eq!(fired.get(), 1);
        assert!(t.progress().unlocked.contains(&AchievementId::Hired));
    }

    #[test]
    fn test_observer_fires_for_every_achievement() {
        let mut t = tracker();
        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = fired.clone();
        t.subscribe(Box::new(move |_| fired_clone.set(fired_clone.get() + 1)));

        t.track_hire();
        t.track_konami_code();
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_recent_unlock_toast_expires() {
        let time = TestTimeSource::shared();
        let mut t = AchievementTracker::new(Box::new(MemoryStore::new()), time.clone());

        t.track_konami_code();
        assert_eq!(
            t.recent_unlock().map(|a| a.id),
            Some(AchievementId::KonamiCode)
        );

        t.tick();
        assert!(t.recent_unlock().is_some());

        time.advance(TOAST_DURATION);
        t.tick();
        assert!(t.recent_unlock().is_none());
    }

    #[test]
    fn test_clear_recent_unlock_keeps_unlocked() {
        let mut t = tracker();
        t.track_hire();
        t.clear_recent_unlock();

        assert!(t.recent_unlock().is_none());
        assert!(t.progress().unlocked.contains(&AchievementId::Hired));
    }

    #[test]
    fn test_clear_all_achievements() {
        let store = MemoryStore::new();
        let mut t =
            AchievementTracker::new(Box::new(store.clone()), Arc::new(TestTimeSource::new()));

        t.track_file_open("README.md");
        t.track_theme_switch();
        t.track_hire();
        t.clear_all_achievements();

        assert_eq!(t.progress(), &Progress::default());

        // Persisted state is wiped too
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, Progress::default());
    }

    #[test]
    fn test_unlock_all_achievements_leaves_counters() {
        let mut t = tracker();
        t.track_terminal_command();
        t.track_terminal_command();

        t.unlock_all_achievements();

        assert_eq!(t.progress().unlocked.len(), CATALOG.len());
        assert_eq!(t.progress().command_count, 2);
    }

    #[test]
    fn test_progress_round_trip_through_store() {
        let store = MemoryStore::new();
        let time: SharedTimeSource = Arc::new(TestTimeSource::new());

        let mut t = AchievementTracker::new(Box::new(store.clone()), time.clone());
        t.track_file_open("README.md");
        t.track_file_open("contact.json");
        t.track_palette_command("theme-dark");
        t.track_theme_switch();
        t.track_hire();
        let saved = t.progress().clone();

        let reloaded = AchievementTracker::new(Box::new(store), time);
        assert_eq!(reloaded.progress(), &saved);
    }

    #[test]
    fn test_malformed_store_yields_default() {
        let store = MemoryStore::with_raw("{\"unlocked\": 42}");
        let t = AchievementTracker::new(Box::new(store), Arc::new(TestTimeSource::new()));
        assert_eq!(t.progress(), &Progress::default());
    }

    #[test]
    fn test_serialized_field_names_match_legacy_layout() {
        let mut t = tracker();
        t.track_file_open("README.md");

        let store = MemoryStore::new();
        let mut fresh_store = store.clone();
        fresh_store.save(t.progress()).unwrap();
        let raw = store.raw().unwrap();

        assert!(raw.contains("\"openedFiles\""));
        assert!(raw.contains("\"usedCommands\""));
        assert!(raw.contains("\"themeSwitches\""));
        assert!(raw.contains("\"commandCount\""));
    }

    #[test]
    fn test_catalog_lookup_total() {
        for entry in &CATALOG {
            assert_eq!(definition(entry.id).id, entry.id);
        }
    }
}
