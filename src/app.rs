//! Application state and event wiring.
//!
//! `App` owns every subsystem and connects them: terminal hooks feed the
//! achievement tracker, unlock observers arm the confetti flag, palette
//! actions open files or switch themes, and the Konami detector watches all
//! keys. Everything runs on the UI thread; the tracker sits behind
//! `Rc<RefCell<..>>` so the session's injected hooks can reach it.

use crate::achievements::{Achievement, AchievementTracker, Progress};
use crate::config::Config;
use crate::files::Workspace;
use crate::konami::KonamiDetector;
use crate::palette::{self, PaletteAction, PaletteCommand};
use crate::storage::ProgressStore;
use crate::terminal::TerminalSession;
use crate::theme::ThemeKey;
use crate::time_source::SharedTimeSource;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

/// Which pane keyboard input lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Terminal,
    Achievements,
    Palette,
}

pub struct App {
    pub config: Config,
    /// Where theme changes are persisted; `None` disables persistence
    /// (tests).
    config_path: Option<PathBuf>,
    pub workspace: Workspace,
    pub session: TerminalSession,
    tracker: Rc<RefCell<AchievementTracker>>,
    konami: KonamiDetector,

    pub palette_query: String,
    pub palette_selected: usize,
    pub show_terminal: bool,
    focus: Focus,
    confetti: Rc<Cell<bool>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        store: Box<dyn ProgressStore>,
        time_source: SharedTimeSource,
    ) -> Self {
        let tracker = Rc::new(RefCell::new(AchievementTracker::new(
            store,
            time_source.clone(),
        )));

        let confetti = Rc::new(Cell::new(false));
        {
            let confetti = confetti.clone();
            tracker
                .borrow_mut()
                .subscribe(Box::new(move |_| confetti.set(true)));
        }

        let mut session = TerminalSession::new(time_source);
        {
            let hooks = session.hooks_mut();
            let t = tracker.clone();
            hooks.on_command = Some(Box::new(move |_| t.borrow_mut().track_terminal_command()));
            let t = tracker.clone();
            hooks.on_hire = Some(Box::new(move || t.borrow_mut().track_hire()));
            let t = tracker.clone();
            hooks.on_clear_achievements =
                Some(Box::new(move || t.borrow_mut().clear_all_achievements()));
            let t = tracker.clone();
            hooks.on_unlock_all = Some(Box::new(move || t.borrow_mut().unlock_all_achievements()));
        }
        session.observe_theme(config.theme);

        Self {
            config,
            config_path,
            workspace: Workspace::new(),
            session,
            tracker,
            konami: KonamiDetector::new(),
            palette_query: String::new(),
            palette_selected: 0,
            show_terminal: true,
            focus: Focus::Terminal,
            confetti,
            should_quit: false,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Toast contents, if one is up.
    pub fn recent_unlock(&self) -> Option<&'static Achievement> {
        self.tracker.borrow().recent_unlock()
    }

    /// Snapshot of progress for the achievements view.
    pub fn progress(&self) -> Progress {
        self.tracker.borrow().progress().clone()
    }

    /// One-shot confetti flag armed by any unlock.
    pub fn take_confetti(&self) -> bool {
        self.confetti.replace(false)
    }

    /// Resolve delayed terminal output and expire the unlock toast.
    pub fn tick(&mut self) {
        self.session.tick();
        self.tracker.borrow_mut().tick();
    }

    /// Open a portfolio file (from the palette, a `[[name]]` link, or the
    /// explorer) and record it for the file-explorer achievement.
    pub fn open_file(&mut self, name: &str) {
        if self.workspace.open_file(name) {
            self.tracker.borrow_mut().track_file_open(name);
        }
    }

    /// Switch themes: persist, count toward the achievement, and let the
    /// terminal append its advisory lines.
    pub fn set_theme(&mut self, theme: ThemeKey) {
        self.config.theme = theme;
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to_file(path) {
                tracing::warn!("Failed to save config {:?}: {}", path, e);
            }
        }
        self.tracker.borrow_mut().track_theme_switch();
        self.session.observe_theme(theme);
    }

    /// Execute one palette entry.
    pub fn run_palette_command(&mut self, command: &PaletteCommand) {
        tracing::debug!("Palette command: {}", command.id);
        self.tracker.borrow_mut().track_palette_command(command.id);
        match command.action {
            PaletteAction::OpenFile(name) => self.open_file(name),
            PaletteAction::SetTheme(theme) => self.set_theme(theme),
            PaletteAction::ToggleTerminal => self.show_terminal = !self.show_terminal,
            PaletteAction::ShowAchievements => self.focus = Focus::Achievements,
            // The easter egg runs the hire command without echoing it
            PaletteAction::HireEasterEgg => self.session.submit("hire", true),
        }
    }

    /// Route one key event. Konami detection sees every key, then global
    /// chords, then the focused pane.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.konami.feed(key.code) {
            self.tracker.borrow_mut().track_konami_code();
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (key.code, ctrl) {
            (KeyCode::Char('q'), true) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Char('p'), true) | (KeyCode::F(1), false) => {
                self.toggle_palette();
                return;
            }
            (KeyCode::Char('j'), true) => {
                self.show_terminal = !self.show_terminal;
                return;
            }
            (KeyCode::Char('g'), true) => {
                self.focus = if self.focus == Focus::Achievements {
                    Focus::Terminal
                } else {
                    Focus::Achievements
                };
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Palette => self.handle_palette_key(key),
            Focus::Terminal => self.handle_terminal_key(key),
            Focus::Achievements => {
                if key.code == KeyCode::Esc {
                    self.focus = Focus::Terminal;
                }
            }
        }
    }

    fn toggle_palette(&mut self) {
        if self.focus == Focus::Palette {
            self.focus = Focus::Terminal;
        } else {
            self.focus = Focus::Palette;
            self.palette_query.clear();
            self.palette_selected = 0;
        }
    }

    fn handle_palette_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Terminal,
            KeyCode::Up => {
                self.palette_selected = self.palette_selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let count = palette::filter(&self.palette_query).len();
                if count > 0 && self.palette_selected + 1 < count {
                    self.palette_selected += 1;
                }
            }
            KeyCode::Backspace => {
                self.palette_query.pop();
                self.palette_selected = 0;
            }
            KeyCode::Enter => {
                let results = palette::filter(&self.palette_query);
                if let Some(&command) = results.get(self.palette_selected) {
                    self.focus = Focus::Terminal;
                    self.run_palette_command(command);
                }
            }
            KeyCode::Char(c) => {
                self.palette_query.push(c);
                self.palette_selected = 0;
            }
            _ => {}
        }
    }

    fn handle_terminal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                // A `[[name]]` link on the last output line opens on Enter
                // when the prompt is empty
                if self.session.input().is_empty() {
                    if let Some(link) = self.last_output_link() {
                        self.open_file(&link);
                        return;
                    }
                }
                self.session.submit_input();
            }
            KeyCode::Up => {
                self.session.recall_previous();
            }
            KeyCode::Down => {
                self.session.recall_next();
            }
            KeyCode::Backspace => self.session.backspace(),
            KeyCode::Char(c) => self.session.push_input(c),
            _ => {}
        }
    }

    /// The most recent file-open directive in the transcript, if any.
    fn last_output_link(&self) -> Option<String> {
        self.session
            .lines()
            .iter()
            .rev()
            .find_map(|line| {
                crate::terminal::file_links(&line.text)
                    .first()
                    .map(|s| s.to_string())
            })
    }
}
