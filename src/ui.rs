//! Rendering: tab bar, viewer pane, terminal pane, palette popup,
//! achievements view, status bar, and the unlock toast.
//!
//! Pure view code; all state lives in `App`.

use crate::achievements::{AchievementId, Progress, CATALOG};
use crate::app::{App, Focus};
use crate::palette;
use crate::terminal::{LineKind, TerminalLine};
use crate::theme::Palette;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const TERMINAL_HEIGHT: u16 = 10;
pub const PROMPT: &str = "visitor@portfolio:~$";

pub fn draw(frame: &mut Frame, app: &App, confetti: bool) {
    let palette = app.config.theme.palette();
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    let terminal_height = if app.show_terminal {
        TERMINAL_HEIGHT.min(area.height.saturating_sub(3))
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(terminal_height),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tab_bar(frame, app, palette, chunks[0]);
    if app.focus() == Focus::Achievements {
        draw_achievements(frame, &app.progress(), palette, chunks[1]);
    } else {
        draw_viewer(frame, app, palette, chunks[1]);
    }
    if app.show_terminal {
        draw_terminal(frame, app, palette, chunks[2]);
    }
    draw_status_bar(frame, app, palette, confetti, chunks[3]);

    if app.focus() == Focus::Palette {
        draw_palette(frame, app, palette, area);
    }
    if let Some(achievement) = app.recent_unlock() {
        draw_toast(
            frame,
            palette,
            area,
            &format!("🏆 {} {}", achievement.icon, achievement.title),
            achievement.description,
        );
    }
}

fn draw_tab_bar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let mut spans = Vec::new();
    for &tab in app.workspace.open_tabs() {
        let active = app.workspace.active_file() == Some(tab);
        let style = if active {
            Style::default()
                .bg(palette.tab_active_bg)
                .fg(palette.fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(palette.tab_inactive_bg).fg(palette.dim_fg)
        };
        spans.push(Span::styled(format!(" {} ", tab), style));
        spans.push(Span::raw("│"));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            " codefolio ",
            Style::default().fg(palette.dim_fg),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.tab_inactive_bg)),
        area,
    );
}

fn draw_viewer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let lines: Vec<Line> = match app.workspace.active_content() {
        Some(content) => content
            .value
            .lines()
            .enumerate()
            .map(|(i, text)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>4} ", i + 1),
                        Style::default().fg(palette.dim_fg),
                    ),
                    Span::raw(text),
                ])
            })
            .collect(),
        None => landing_lines(palette),
    };
    frame.render_widget(Paragraph::new(lines), area);
}

fn landing_lines(palette: &Palette) -> Vec<Line<'static>> {
    vec![
        Line::raw(""),
        Line::styled(
            "  Zach Carter — full-stack developer",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled(
            "  Ctrl+P  command palette",
            Style::default().fg(palette.dim_fg),
        ),
        Line::styled(
            "  Ctrl+J  toggle terminal",
            Style::default().fg(palette.dim_fg),
        ),
        Line::styled(
            "  Ctrl+G  achievements",
            Style::default().fg(palette.dim_fg),
        ),
    ]
}

fn draw_terminal(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    if area.height == 0 {
        return;
    }
    let block = Block::default()
        .borders(Borders::TOP)
        .title(" TERMINAL ")
        .style(Style::default().bg(palette.terminal_bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Last N transcript lines plus the prompt line
    let visible = inner.height.saturating_sub(1) as usize;
    let transcript = app.session.lines();
    let start = transcript.len().saturating_sub(visible);

    let mut lines: Vec<Line> = transcript[start..]
        .iter()
        .map(|line| render_transcript_line(line, palette))
        .collect();

    let prompt_line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(palette.terminal_prompt)),
        Span::raw(" "),
        Span::raw(app.session.input().to_string()),
        Span::styled("█", Style::default().fg(palette.fg)),
    ]);
    lines.push(prompt_line);

    frame.render_widget(Paragraph::new(lines), inner);

    // Hardware cursor after the typed input
    let cursor_x = inner.x
        + PROMPT.width() as u16
        + 1
        + app.session.input().width() as u16;
    let cursor_y = inner.y + (transcript.len() - start) as u16;
    if cursor_y < inner.y + inner.height {
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), cursor_y));
    }
}

fn render_transcript_line<'a>(line: &'a TerminalLine, palette: &Palette) -> Line<'a> {
    match line.kind {
        LineKind::Command => Line::from(vec![
            Span::styled(PROMPT, Style::default().fg(palette.terminal_prompt)),
            Span::raw(" "),
            Span::raw(line.text.as_str()),
        ]),
        LineKind::Output => Line::from(linkified_spans(&line.text, palette)),
        LineKind::Pending(_) => Line::styled("…", Style::default().fg(palette.dim_fg)),
    }
}

/// Split an output line into spans, rendering `[[name]]` directives as
/// link-styled file names (brackets dropped).
fn linkified_spans<'a>(text: &'a str, palette: &Palette) -> Vec<Span<'a>> {
    let link_style = Style::default()
        .fg(palette.link_fg)
        .add_modifier(Modifier::UNDERLINED);
    let mut spans = Vec::new();
    let mut rest = text;
    loop {
        match rest.find("[[") {
            Some(start) => {
                let after = &rest[start + 2..];
                match after.find("]]") {
                    Some(end) => {
                        if start > 0 {
                            spans.push(Span::raw(&rest[..start]));
                        }
                        spans.push(Span::styled(&after[..end], link_style));
                        rest = &after[end + 2..];
                    }
                    None => {
                        spans.push(Span::raw(rest));
                        break;
                    }
                }
            }
            None => {
                if !rest.is_empty() {
                    spans.push(Span::raw(rest));
                }
                break;
            }
        }
    }
    spans
}

fn draw_achievements(frame: &mut Frame, progress: &Progress, palette: &Palette, area: Rect) {
    let mut lines = vec![
        Line::raw(""),
        Line::styled(
            "  Achievements",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
    ];

    for achievement in &CATALOG {
        let unlocked = progress.unlocked.contains(&achievement.id);
        let current = progress_count(progress, achievement.id);
        let marker = if unlocked { achievement.icon } else { "🔒" };
        let counter = if unlocked {
            "done".to_string()
        } else {
            format!("{}/{}", current.min(achievement.requirement), achievement.requirement)
        };
        let style = if unlocked {
            Style::default().fg(palette.fg)
        } else {
            Style::default().fg(palette.dim_fg)
        };
        lines.push(Line::styled(
            format!(
                "  {} {} — {} ({})",
                marker, achievement.title, achievement.description, counter
            ),
            style,
        ));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// Progress toward a requirement, derived from the tracked counters.
fn progress_count(progress: &Progress, id: AchievementId) -> u32 {
    match id {
        AchievementId::FileExplorer => progress.opened_files.len() as u32,
        AchievementId::CommandMaster => progress.used_commands.len() as u32,
        AchievementId::ThemeSwitcher => progress.theme_switches,
        AchievementId::TerminalWarrior => progress.command_count,
        AchievementId::Hired | AchievementId::KonamiCode => {
            u32::from(progress.unlocked.contains(&id))
        }
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, palette: &Palette, confetti: bool, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.config.theme),
            Style::default().bg(palette.accent).fg(palette.bg),
        ),
        Span::raw("  Ctrl+P palette · Ctrl+J terminal · Ctrl+G achievements · Ctrl+Q quit"),
    ];
    if confetti {
        spans.push(Span::raw("  🎉🎉🎉"));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(palette.tab_inactive_bg).fg(palette.dim_fg)),
        area,
    );
}

fn draw_palette(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let results = palette::filter(&app.palette_query);
    let height = (results.len() as u16 + 3).min(area.height.saturating_sub(2)).max(3);
    let width = (area.width * 2 / 3).clamp(20, 60).min(area.width);
    let popup = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: 1,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Command Palette ")
        .style(Style::default().bg(palette.toast_bg).fg(palette.fg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = vec![Line::from(vec![
        Span::styled("> ", Style::default().fg(palette.accent)),
        Span::raw(app.palette_query.as_str()),
    ])];
    for (i, command) in results.iter().enumerate() {
        let style = if i == app.palette_selected {
            Style::default()
                .bg(palette.accent)
                .fg(palette.bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg)
        };
        let mut text = format!(" {}", command.title);
        if let Some(subtitle) = command.subtitle {
            text.push_str(&format!(" — {}", subtitle));
        }
        lines.push(Line::styled(text, style));
    }
    if results.is_empty() {
        lines.push(Line::styled(
            " No matching commands",
            Style::default().fg(palette.dim_fg),
        ));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_toast(frame: &mut Frame, palette: &Palette, area: Rect, title: &str, body: &str) {
    let width = (title.width().max(body.width()) as u16 + 4).min(area.width);
    let popup = Rect {
        x: area.width.saturating_sub(width + 1),
        y: 1,
        width,
        height: 4.min(area.height),
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(palette.toast_bg).fg(palette.fg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::styled(
                title.to_string(),
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            Line::styled(body.to_string(), Style::default().fg(palette.dim_fg)),
        ]),
        inner,
    );
}
