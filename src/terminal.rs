//! The fake shell: a command interpreter over a fixed vocabulary.
//!
//! The session owns the transcript (an append-mostly log of command and
//! output lines), the prompt input buffer, and the command history. Commands
//! produce canned output after a simulated delay: submission appends a
//! placeholder line immediately, and `tick` replaces it with the real output
//! once the delay elapses. Each placeholder is addressed by a per-submission
//! token, so rapid back-to-back submissions resolve in order without
//! swapping or dropping lines, and a resolution whose placeholder was wiped
//! by `clear` lands nowhere.
//!
//! The session never opens files or touches achievement state itself; side
//! effects flow out through injected hooks.

use crate::theme::ThemeKey;
use crate::time_source::SharedTimeSource;
use std::time::{Duration, Instant};

/// Simulated command execution latency.
pub const OUTPUT_DELAY: Duration = Duration::from_millis(350);

/// The line a cleared transcript starts with.
pub const BANNER: &str = "Last login: just now";

pub const HELP_TEXT: &str =
    "Available commands: npm, npm run dev, npm run build, hire, help, clear";

pub const HIRE_SUCCESS: &str = "🎉 Excellent choice! Let's make something amazing together!";
pub const HIRE_CONTACT: &str = "📧 Reach out at: [[contact.json]]";

/// Theme advisory lines. Appended directly (no delay) on theme transitions.
pub const THEME_SUCCESS_MSG: &str = "Dark mode restored. Your retinas thank you.";
pub const THEME_WHY_MSG: &str = "Light mode? Bold choice.";
pub const THEME_WARNING_MSG: &str =
    "Warning: light mode may cause glare. Proceed with caution.";

/// Identifies one scheduled delayed output.
pub type PendingToken = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Echoed user input.
    Command,
    /// Shell output.
    Output,
    /// Placeholder awaiting delayed resolution.
    Pending(PendingToken),
}

/// One transcript entry. Immutable once appended; placeholders are the only
/// lines ever replaced, and only by their own resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub kind: LineKind,
    pub text: String,
}

impl TerminalLine {
    pub fn command(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Command,
            text: text.into(),
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Output,
            text: text.into(),
        }
    }

    fn pending(token: PendingToken) -> Self {
        Self {
            kind: LineKind::Pending(token),
            text: String::new(),
        }
    }
}

/// Side effects a command carries beyond its output lines, fired when the
/// delayed output resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandEffect {
    Hire,
    ClearAchievements,
    UnlockAll,
}

/// Injected collaborator callbacks.
#[derive(Default)]
pub struct SessionHooks {
    /// Every non-empty trimmed command, fired synchronously at submission.
    pub on_command: Option<Box<dyn FnMut(&str)>>,
    /// The hire command resolved.
    pub on_hire: Option<Box<dyn FnMut()>>,
    /// The secret clearachievements command resolved.
    pub on_clear_achievements: Option<Box<dyn FnMut()>>,
    /// The secret allachievements command resolved.
    pub on_unlock_all: Option<Box<dyn FnMut()>>,
}

struct PendingOutput {
    token: PendingToken,
    due: Instant,
    lines: Vec<&'static str>,
    /// Owned line for the "command not found" case.
    dynamic_line: Option<String>,
    effect: Option<CommandEffect>,
}

/// One terminal session. Created per run, never persisted.
pub struct TerminalSession {
    transcript: Vec<TerminalLine>,
    input: String,
    history: Vec<String>,
    /// Index into history counted from the newest entry; -1 = not recalling.
    history_cursor: isize,
    pending: Vec<PendingOutput>,
    next_token: PendingToken,
    hooks: SessionHooks,
    time_source: SharedTimeSource,
    prev_theme: Option<ThemeKey>,
    warning_shown: bool,
    success_shown: bool,
}

impl TerminalSession {
    pub fn new(time_source: SharedTimeSource) -> Self {
        Self {
            transcript: vec![TerminalLine::output(BANNER)],
            input: String::new(),
            history: Vec::new(),
            history_cursor: -1,
            pending: Vec::new(),
            next_token: 0,
            hooks: SessionHooks::default(),
            time_source,
            prev_theme: None,
            warning_shown: false,
            success_shown: false,
        }
    }

    pub fn hooks_mut(&mut self) -> &mut SessionHooks {
        &mut self.hooks
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Submit the current input buffer, as if Enter was pressed.
    pub fn submit_input(&mut self) {
        let raw = std::mem::take(&mut self.input);
        self.submit(&raw, false);
    }

    /// Interpret one command.
    ///
    /// `raw` may come from the prompt or be injected programmatically (the
    /// palette's hire action uses `skip_echo` to avoid a phantom echo line).
    /// An empty `raw` is silently ignored.
    pub fn submit(&mut self, raw: &str, skip_echo: bool) {
        if raw.is_empty() {
            return;
        }

        let command = raw.trim().to_lowercase();

        if !skip_echo {
            self.transcript.push(TerminalLine::command(raw));
        }

        if command == "clear" || command == "cls" {
            // Synchronous: wipe everything, including un-resolved placeholders.
            // Their resolutions will find no token and drop themselves.
            self.transcript = vec![TerminalLine::output(BANNER)];
            self.warning_shown = false;
            self.success_shown = false;
            self.input.clear();
            self.fire_on_command(&command);
            return;
        }

        let (lines, dynamic_line, effect): (Vec<&'static str>, Option<String>, _) =
            match command.as_str() {
                "" => (Vec::new(), None, None),
                "help" => (vec![HELP_TEXT], None, None),
                "npm" => (
                    vec!["added 123 packages, and audited 123 packages in 2s"],
                    None,
                    None,
                ),
                "npm run dev" => (
                    vec!["VITE v5.0.0 ready in 245 ms", "  ➜  Local:   http://localhost:5173/"],
                    None,
                    None,
                ),
                "npm run build" => (
                    vec!["vite v5.0.0 building for production...", "✓ 1234 modules transformed."],
                    None,
                    None,
                ),
                "hire" => (
                    vec![HIRE_SUCCESS, HIRE_CONTACT],
                    None,
                    Some(CommandEffect::Hire),
                ),
                "clearachievements" => (
                    vec!["All achievement progress cleared."],
                    None,
                    Some(CommandEffect::ClearAchievements),
                ),
                "allachievements" => (
                    vec!["All achievements unlocked."],
                    None,
                    Some(CommandEffect::UnlockAll),
                ),
                _ => (
                    Vec::new(),
                    Some(format!(
                        "Command not found: {}. Type 'help' for available commands.",
                        raw
                    )),
                    None,
                ),
            };

        if !lines.is_empty() || dynamic_line.is_some() {
            let token = self.next_token;
            self.next_token += 1;
            self.transcript.push(TerminalLine::pending(token));
            self.pending.push(PendingOutput {
                token,
                due: self.time_source.now() + OUTPUT_DELAY,
                lines,
                dynamic_line,
                effect,
            });
        }

        self.history.push(raw.to_string());
        self.history_cursor = -1;
        self.input.clear();
        self.fire_on_command(&command);
    }

    fn fire_on_command(&mut self, trimmed: &str) {
        if trimmed.is_empty() {
            return;
        }
        if let Some(on_command) = self.hooks.on_command.as_mut() {
            on_command(trimmed);
        }
    }

    /// Resolve every delayed output whose delay has elapsed.
    ///
    /// Resolutions happen in submission order. Each one locates its own
    /// placeholder by token; if the placeholder is gone (the transcript was
    /// cleared since submission) the output is dropped, but side-effect
    /// hooks still fire.
    pub fn tick(&mut self) {
        let now = self.time_source.now();
        while let Some(first) = self.pending.first() {
            if first.due > now {
                break;
            }
            let resolved = self.pending.remove(0);
            self.resolve(resolved);
        }
    }

    fn resolve(&mut self, pending: PendingOutput) {
        let outputs = pending
            .lines
            .iter()
            .map(|l| TerminalLine::output(*l))
            .chain(pending.dynamic_line.into_iter().map(TerminalLine::output));

        match self
            .transcript
            .iter()
            .position(|l| l.kind == LineKind::Pending(pending.token))
        {
            Some(idx) => {
                self.transcript.splice(idx..idx + 1, outputs);
            }
            None => {
                tracing::debug!(
                    token = pending.token,
                    "Dropping resolved output: placeholder no longer in transcript"
                );
            }
        }

        match pending.effect {
            Some(CommandEffect::Hire) => {
                if let Some(on_hire) = self.hooks.on_hire.as_mut() {
                    on_hire();
                }
            }
            Some(CommandEffect::ClearAchievements) => {
                if let Some(hook) = self.hooks.on_clear_achievements.as_mut() {
                    hook();
                }
            }
            Some(CommandEffect::UnlockAll) => {
                if let Some(hook) = self.hooks.on_unlock_all.as_mut() {
                    hook();
                }
            }
            None => {}
        }
    }

    /// Whether any delayed output is still unresolved.
    pub fn has_pending_output(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Recall the previous (older) history entry into the input buffer.
    ///
    /// Bounded at the oldest entry; never touches the transcript.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }
        let next = (self.history_cursor + 1).min(self.history.len() as isize - 1);
        self.history_cursor = next;
        self.input = self.history[self.history.len() - 1 - next as usize].clone();
        Some(&self.input)
    }

    /// Recall the next (newer) history entry; stepping past the newest
    /// leaves recall mode and clears the input buffer.
    pub fn recall_next(&mut self) -> Option<&str> {
        let next = self.history_cursor - 1;
        if next >= 0 {
            self.history_cursor = next;
            self.input = self.history[self.history.len() - 1 - next as usize].clone();
            Some(&self.input)
        } else {
            self.history_cursor = -1;
            self.input.clear();
            None
        }
    }

    /// Observe the current theme and append advisory lines on transitions.
    ///
    /// Dedup is by explicit flags scoped to the current transcript (reset on
    /// clear), not by scanning line content. The warning fires on any entry
    /// into light mode, whatever the previous theme; the "why" line
    /// intentionally repeats on every dark→light flip; "warning" and
    /// "success" appear at most once per transcript.
    pub fn observe_theme(&mut self, theme: ThemeKey) {
        match theme {
            ThemeKey::Light => {
                if self.prev_theme == Some(ThemeKey::Dark) {
                    self.transcript.push(TerminalLine::output(THEME_WHY_MSG));
                }
                if !self.warning_shown {
                    self.transcript.push(TerminalLine::output(THEME_WARNING_MSG));
                    self.warning_shown = true;
                }
            }
            ThemeKey::Dark => {
                if self.prev_theme == Some(ThemeKey::Light) && !self.success_shown {
                    self.transcript.push(TerminalLine::output(THEME_SUCCESS_MSG));
                    self.success_shown = true;
                }
            }
            ThemeKey::HighContrast => {}
        }
        self.prev_theme = Some(theme);
    }
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("transcript", &self.transcript.len())
            .field("history", &self.history.len())
            .field("history_cursor", &self.history_cursor)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Extract `[[name]]` file-open directives from an output line.
///
/// The view renders these as actionable links; the interpreter itself never
/// opens files.
pub fn file_links(text: &str) -> Vec<&str> {
    let mut links = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("[[") {
        let after = &rest[start + 2..];
        match after.find("]]") {
            Some(end) => {
                links.push(&after[..end]);
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::TestTimeSource;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn session() -> (TerminalSession, Arc<TestTimeSource>) {
        let time = TestTimeSource::shared();
        (TerminalSession::new(time.clone()), time)
    }

    fn output_texts(session: &TerminalSession) -> Vec<&str> {
        session
            .lines()
            .iter()
            .filter(|l| l.kind == LineKind::Output)
            .map(|l| l.text.as_str())
            .collect()
    }

    #[test]
    fn test_new_session_shows_banner() {
        let (s, _) = session();
        assert_eq!(s.lines(), &[TerminalLine::output(BANNER)]);
    }

    #[test]
    fn test_empty_raw_input_is_ignored() {
        let (mut s, _) = session();
        s.submit("", false);

        assert_eq!(s.lines().len(), 1);
        assert!(s.recall_previous().is_none());
    }

    #[test]
    fn test_whitespace_only_echoes_without_output() {
        let (mut s, time) = session();
        s.submit("   ", false);

        // Echo line only; no placeholder scheduled
        assert_eq!(s.lines().len(), 2);
        assert!(!s.has_pending_output());

        time.advance(OUTPUT_DELAY);
        s.tick();
        assert_eq!(s.lines().len(), 2);

        // But it does land in history
        assert_eq!(s.recall_previous(), Some("   "));
    }

    #[test]
    fn test_help_resolves_after_delay() {
        let (mut s, time) = session();
        s.submit("help", false);

        // Banner + echo + placeholder, nothing resolved yet
        assert_eq!(s.lines().len(), 3);
        assert!(matches!(s.lines()[2].kind, LineKind::Pending(_)));

        s.tick();
        assert!(matches!(s.lines()[2].kind, LineKind::Pending(_)));

        time.advance(OUTPUT_DELAY);
        s.tick();
        assert_eq!(s.lines()[2], TerminalLine::output(HELP_TEXT));
        assert!(!s.has_pending_output());
    }

    #[test]
    fn test_clear_is_synchronous() {
        let (mut s, time) = session();
        for cmd in ["help", "npm", "foobar"] {
            s.submit(cmd, false);
        }
        time.advance(OUTPUT_DELAY);
        s.tick();
        assert!(s.lines().len() > 1);

        s.submit("clear", false);
        assert_eq!(s.lines(), &[TerminalLine::output(BANNER)]);

        s.submit("CLS", false);
        assert_eq!(s.lines(), &[TerminalLine::output(BANNER)]);
    }

    #[test]
    fn test_resolution_after_clear_is_dropped() {
        let (mut s, time) = session();
        s.submit("help", false);
        s.submit("clear", false);

        time.advance(OUTPUT_DELAY);
        s.tick();

        // The pending resolution found no placeholder and landed nowhere
        assert_eq!(s.lines(), &[TerminalLine::output(BANNER)]);
    }

    #[test]
    fn test_command_not_found_message() {
        let (mut s, time) = session();
        s.submit("foobar", false);
        time.advance(OUTPUT_DELAY);
        s.tick();

        assert_eq!(
            s.lines()[2],
            TerminalLine::output(
                "Command not found: foobar. Type 'help' for available commands."
            )
        );
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let (mut s, time) = session();
        s.submit("  NPM Run Dev  ", false);
        time.advance(OUTPUT_DELAY);
        s.tick();

        let outputs = output_texts(&s);
        assert!(outputs.iter().any(|l| l.contains("VITE v5.0.0")));
    }

    #[test]
    fn test_hire_outputs_and_callback() {
        let (mut s, time) = session();
        let hired = Rc::new(Cell::new(0u32));
        let hired_clone = hired.clone();
        s.hooks_mut().on_hire = Some(Box::new(move || hired_clone.set(hired_clone.get() + 1)));

        s.submit("hire", false);
        // Callback is part of the delayed resolution
        assert_eq!(hired.get(), 0);

        time.advance(OUTPUT_DELAY);
        s.tick();

        assert_eq!(hired.get(), 1);
        assert_eq!(s.lines()[2], TerminalLine::output(HIRE_SUCCESS));
        assert_eq!(s.lines()[3], TerminalLine::output(HIRE_CONTACT));
        assert!(s.lines()[3].text.contains("[[contact.json]]"));
    }

    #[test]
    fn test_skip_echo_suppresses_command_line() {
        let (mut s, time) = session();
        s.submit("hire", true);

        assert!(s.lines().iter().all(|l| l.kind != LineKind::Command));

        time.advance(OUTPUT_DELAY);
        s.tick();
        assert_eq!(output_texts(&s).len(), 3); // banner + two hire lines
    }

    #[test]
    fn test_secret_commands_fire_hooks() {
        let (mut s, time) = session();
        let cleared = Rc::new(Cell::new(false));
        let unlocked = Rc::new(Cell::new(false));
        let (c, u) = (cleared.clone(), unlocked.clone());
        s.hooks_mut().on_clear_achievements = Some(Box::new(move || c.set(true)));
        s.hooks_mut().on_unlock_all = Some(Box::new(move || u.set(true)));

        s.submit("clearachievements", false);
        s.submit("allachievements", false);
        time.advance(OUTPUT_DELAY);
        s.tick();

        assert!(cleared.get());
        assert!(unlocked.get());
        let outputs = output_texts(&s);
        assert!(outputs.contains(&"All achievement progress cleared."));
        assert!(outputs.contains(&"All achievements unlocked."));
    }

    #[test]
    fn test_rapid_submissions_keep_order() {
        let (mut s, time) = session();
        s.submit("npm", false);
        s.submit("help", false);

        // Both placeholders present, in submission order
        assert_eq!(s.lines().len(), 5);

        time.advance(OUTPUT_DELAY);
        s.tick();

        assert_eq!(s.lines()[1], TerminalLine::command("npm"));
        assert_eq!(
            s.lines()[2],
            TerminalLine::output("added 123 packages, and audited 123 packages in 2s")
        );
        assert_eq!(s.lines()[3], TerminalLine::command("help"));
        assert_eq!(s.lines()[4], TerminalLine::output(HELP_TEXT));
    }

    #[test]
    fn test_staggered_submissions_resolve_independently() {
        let (mut s, time) = session();
        s.submit("npm", false);
        time.advance(OUTPUT_DELAY / 2);
        s.submit("help", false);

        time.advance(OUTPUT_DELAY / 2);
        s.tick();

        // First resolved, second still pending
        assert_eq!(
            s.lines()[2],
            TerminalLine::output("added 123 packages, and audited 123 packages in 2s")
        );
        assert!(matches!(s.lines()[4].kind, LineKind::Pending(_)));

        time.advance(OUTPUT_DELAY / 2);
        s.tick();
        assert_eq!(s.lines()[4], TerminalLine::output(HELP_TEXT));
    }

    #[test]
    fn test_history_recall_sequence() {
        let (mut s, _) = session();
        s.submit("a", false);
        s.submit("b", false);
        s.submit("c", false);

        assert_eq!(s.recall_previous(), Some("c"));
        assert_eq!(s.recall_previous(), Some("b"));
        assert_eq!(s.recall_next(), Some("c"));
        assert_eq!(s.recall_next(), None);
        assert_eq!(s.input(), "");
    }

    #[test]
    fn test_history_recall_bounded_at_oldest() {
        let (mut s, _) = session();
        s.submit("a", false);
        s.submit("b", false);

        assert_eq!(s.recall_previous(), Some("b"));
        assert_eq!(s.recall_previous(), Some("a"));
        assert_eq!(s.recall_previous(), Some("a"));
    }

    #[test]
    fn test_clear_bypasses_history() {
        let (mut s, _) = session();
        s.submit("help", false);
        s.submit("clear", false);

        assert_eq!(s.recall_previous(), Some("help"));
    }

    #[test]
    fn test_on_command_hook() {
        let (mut s, _) = session();
        let seen: Rc<std::cell::RefCell<Vec<String>>> = Rc::default();
        let seen_clone = seen.clone();
        s.hooks_mut().on_command = Some(Box::new(move |cmd| {
            seen_clone.borrow_mut().push(cmd.to_string())
        }));

        s.submit("  Help ", false);
        s.submit("   ", false);
        s.submit("clear", false);

        assert_eq!(*seen.borrow(), vec!["help".to_string(), "clear".to_string()]);
    }

    #[test]
    fn test_submit_clears_input_buffer() {
        let (mut s, _) = session();
        s.set_input("help");
        s.submit_input();

        assert_eq!(s.input(), "");
        assert_eq!(s.lines()[1], TerminalLine::command("help"));
    }

    #[test]
    fn test_theme_transition_messages() {
        let (mut s, _) = session();
        s.observe_theme(ThemeKey::Dark);
        assert_eq!(s.lines().len(), 1);

        s.observe_theme(ThemeKey::Light);
        assert_eq!(
            output_texts(&s),
            vec![BANNER, THEME_WHY_MSG, THEME_WARNING_MSG]
        );

        s.observe_theme(ThemeKey::Dark);
        assert_eq!(
            output_texts(&s),
            vec![BANNER, THEME_WHY_MSG, THEME_WARNING_MSG, THEME_SUCCESS_MSG]
        );

        // Second round trip: "why" repeats, "warning" and "success" do not
        s.observe_theme(ThemeKey::Light);
        s.observe_theme(ThemeKey::Dark);
        assert_eq!(
            output_texts(&s),
            vec![
                BANNER,
                THEME_WHY_MSG,
                THEME_WARNING_MSG,
                THEME_SUCCESS_MSG,
                THEME_WHY_MSG
            ]
        );
    }

    #[test]
    fn test_initial_light_theme_warns_once() {
        let (mut s, _) = session();
        s.observe_theme(ThemeKey::Light);
        s.observe_theme(ThemeKey::Light);

        assert_eq!(output_texts(&s), vec![BANNER, THEME_WARNING_MSG]);
    }

    #[test]
    fn test_clear_resets_advisory_dedup() {
        let (mut s, _) = session();
        s.observe_theme(ThemeKey::Light);
        s.submit("clear", false);

        s.observe_theme(ThemeKey::Dark);
        s.observe_theme(ThemeKey::Light);
        assert_eq!(
            output_texts(&s),
            vec![BANNER, THEME_SUCCESS_MSG, THEME_WHY_MSG, THEME_WARNING_MSG]
        );
    }

    #[test]
    fn test_high_contrast_transitions() {
        let (mut s, _) = session();
        s.observe_theme(ThemeKey::Dark);
        s.observe_theme(ThemeKey::HighContrast);
        assert_eq!(s.lines().len(), 1);

        // Entering light mode warns whatever the previous theme was; the
        // "why" line stays reserved for dark→light
        s.observe_theme(ThemeKey::Light);
        assert_eq!(output_texts(&s), vec![BANNER, THEME_WARNING_MSG]);

        s.observe_theme(ThemeKey::HighContrast);
        s.observe_theme(ThemeKey::Dark);
        assert_eq!(output_texts(&s), vec![BANNER, THEME_WARNING_MSG]);
    }

    #[test]
    fn test_file_links_extraction() {
        assert_eq!(file_links(HIRE_CONTACT), vec!["contact.json"]);
        assert_eq!(
            file_links("see [[a.md]] and [[b.json]]"),
            vec!["a.md", "b.json"]
        );
        assert!(file_links("no links here").is_empty());
        assert!(file_links("dangling [[oops").is_empty());
    }

    mod history_props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Any interleaving of submissions and recalls keeps the input
            // buffer equal to some history entry or empty.
            #[test]
            fn recall_never_panics_and_stays_in_history(steps in proptest::collection::vec(0u8..3, 0..40)) {
                let (mut s, _) = session();
                let mut submitted = 0u32;
                for step in steps {
                    match step {
                        0 => {
                            submitted += 1;
                            s.submit(&format!("cmd{}", submitted), false);
                        }
                        1 => { s.recall_previous(); }
                        _ => { s.recall_next(); }
                    }
                    let input = s.input().to_string();
                    prop_assert!(input.is_empty() || input.starts_with("cmd"));
                }
            }
        }
    }
}
