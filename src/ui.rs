pub mod charting;
pub mod palette;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Widget, Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, Screen},
    config::Toggle,
    typing_policy::Mark,
    util::wpm_trend,
};
use palette::Palette;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_theme(self.settings.theme);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),    // screen body
                Constraint::Length(1), // status
                Constraint::Length(1), // key hints
            ])
            .split(area);

        match self.screen {
            Screen::Home => render_home(self, &palette, chunks[0], buf),
            Screen::Editor => render_editor(self, chunks[0], buf),
            Screen::Practice => render_practice(self, &palette, chunks[0], buf),
            Screen::Summary => render_summary(self, &palette, chunks[0], buf),
            Screen::History => render_history(self, &palette, chunks[0], buf),
            Screen::Settings => render_settings(self, chunks[0], buf),
        }

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.text.as_str(),
                Style::default()
                    .fg(palette.status)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        }

        Paragraph::new(Span::styled(
            key_hints(self.screen, self.settings.shortcuts_enabled),
            Style::default()
                .fg(palette.hint)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
}

pub fn key_hints(screen: Screen, shortcuts_enabled: bool) -> String {
    let hints: &[(&str, &str)] = match screen {
        Screen::Home => &[
            ("e", "write"),
            ("p", "practice"),
            ("h", "history"),
            ("s", "settings"),
            ("q", "quit"),
        ],
        Screen::Editor => &[("ctrl+s", "save"), ("ctrl+d", "done"), ("esc", "home")],
        Screen::Practice => &[("ctrl+d", "finish"), ("esc", "abandon")],
        Screen::Summary => &[
            ("p", "practice"),
            ("e", "edit"),
            ("h", "history"),
            ("b", "back"),
        ],
        Screen::History => &[("p", "practice"), ("x", "clear"), ("b", "back")],
        Screen::Settings => &[("↑/↓", "move"), ("space", "toggle"), ("b", "back")],
    };

    hints
        .iter()
        .filter(|(key, _)| shortcuts_enabled || *key != "ctrl+d")
        .map(|(key, action)| format!("({key}) {action}"))
        .join("  ")
}

fn render_home(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let last = app.last_session();
    let greeting = if last.is_some() {
        "Welcome back. Ready to practice?"
    } else {
        "Hey there, what's up?"
    };

    let mut lines = vec![
        Line::from(Span::styled(greeting, bold().fg(palette.accent))),
        Line::default(),
    ];

    if let Some(record) = last {
        lines.push(Line::from(Span::styled("Last session", dim_bold())));
        lines.push(Line::from(Span::styled(
            format!(
                "{} wpm   {}% acc",
                record.summary.wpm, record.summary.accuracy
            ),
            bold(),
        )));
        lines.push(Line::default());
    }

    let stats = app.note_stats();
    if stats.words > 0 {
        lines.push(Line::from(format!(
            "Saved note: {} word{}",
            stats.words,
            if stats.words == 1 { "" } else { "s" }
        )));
    }

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let body = Rect {
        y: area.y + top,
        height: area.height - top,
        ..area
    };

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(body, buf);
}

fn render_editor(app: &App, area: Rect, buf: &mut Buffer) {
    let mut text = app.note.clone();
    text.push('▏');

    let inner_height = area.height.saturating_sub(2);
    let line_count = text.lines().count().max(1) as u16;
    let scroll = line_count.saturating_sub(inner_height);

    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Note"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .render(area, buf);
}

fn visible(c: char, mark: Mark) -> String {
    match (c, mark) {
        ('\n', _) => "⏎".to_owned(),
        (' ', Mark::Incorrect) => "·".to_owned(),
        (c, _) => c.to_string(),
    }
}

/// Styled practice text: the reference with per-character feedback, split on
/// the reference's own line breaks.
pub fn practice_lines(
    reference: &[char],
    typed: &[char],
    marks: &[Mark],
    palette: &Palette,
) -> Vec<Line<'static>> {
    let correct = bold().fg(palette.correct);
    let incorrect = bold().fg(palette.incorrect);
    let current = dim_bold().add_modifier(Modifier::UNDERLINED);
    let untyped = dim_bold();

    let mut lines = Vec::new();
    let mut spans = Vec::new();

    for (idx, mark) in marks.iter().enumerate() {
        let expected = reference.get(idx).copied();
        let shown = match mark {
            Mark::Incorrect => typed.get(idx).copied().or(expected),
            _ => expected,
        }
        .unwrap_or(' ');

        let style = match mark {
            Mark::Correct => correct,
            Mark::Incorrect => incorrect,
            Mark::Current => current,
            Mark::Untyped => untyped,
        };
        spans.push(Span::styled(visible(shown, *mark), style));

        if expected == Some('\n') {
            lines.push(Line::from(std::mem::take(&mut spans)));
        }
    }

    if !spans.is_empty() || lines.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

fn render_practice(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.session() else {
        return;
    };

    let reference: Vec<char> = session.reference().chars().collect();
    let typed: Vec<char> = app.typed.chars().collect();
    let marks = match &app.feedback {
        Some(feedback) => feedback.marks.clone(),
        None => crate::typing_policy::classify(&reference, &typed),
    };
    let lines = practice_lines(&reference, &typed, &marks, palette);

    let single_line = lines.len() == 1 && session.reference().width() <= area.width as usize;
    let text_height = if single_line {
        1
    } else {
        area.height.saturating_sub(2)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // live stats
            Constraint::Length(1),
            Constraint::Min(text_height),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        result_line(app, session.wpm(), session.accuracy()),
        dim_bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(lines)
        .alignment(if single_line {
            // short notes read better centered
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);
}

/// WPM and accuracy, each shown only when its setting is on.
fn result_line(app: &App, wpm: u32, accuracy: u32) -> String {
    let mut parts = Vec::new();
    if app.settings.show_wpm {
        parts.push(format!("{wpm} wpm"));
    }
    if app.settings.show_accuracy {
        parts.push(format!("{accuracy}% acc"));
    }
    parts.join("   ")
}

fn render_summary(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let stats = app.note_stats();

    let mut lines = Vec::new();
    match &app.result {
        Some(result) => {
            lines.push(Line::from(Span::styled(
                "Great work!",
                bold().fg(palette.accent),
            )));
            let outcome = result_line(app, result.wpm, result.accuracy);
            if !outcome.is_empty() {
                lines.push(Line::from("Your typing results are in:"));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(outcome, bold())));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Note saved",
                bold().fg(palette.accent),
            )));
            lines.push(Line::from("Ready to practice it?"));
        }
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "{} word{}   {} min read",
            stats.words,
            if stats.words == 1 { "" } else { "s" },
            stats.read_minutes
        ),
        dim_bold(),
    )));

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let body = Rect {
        y: area.y + top,
        height: area.height - top,
        ..area
    };

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(body, buf);
}

fn render_history(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    if app.history.is_empty() {
        let message = if app.settings.history_enabled {
            "No practice sessions yet.\nPractice a note to see your progress!"
        } else {
            "Practice history is turned off in settings."
        };
        Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title("History"))
            .style(Style::default().fg(palette.hint))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),                               // chart
            Constraint::Length(1),                            // trend
            Constraint::Length(app.history.len() as u16 + 3), // table
        ])
        .split(area);

    let points = charting::history_points(&app.history);
    let (sessions, highest_wpm) = charting::compute_chart_params(&points);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(palette.chart))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("session")
                .bounds([1.0, sessions])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(charting::format_label(sessions), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(highest_wpm), bold()),
                ]),
        )
        .render(chunks[0], buf);

    if let Some(trend) = wpm_trend(&app.history) {
        Paragraph::new(Span::styled(
            format!("{:.0} wpm avg   {:.2} sd", trend.average, trend.std_dev),
            bold(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    let header = Row::new(vec!["Date", "WPM", "Accuracy", "Length"]).style(
        Style::default()
            .fg(palette.header)
            .add_modifier(Modifier::BOLD),
    );
    let rows = app.history.iter().map(|record| {
        Row::new(vec![
            Cell::from(record.summary.date.format("%Y-%m-%d %H:%M").to_string()),
            Cell::from(record.summary.wpm.to_string()),
            Cell::from(format!("{}%", record.summary.accuracy)),
            Cell::from(format!("{} chars", record.summary.length)),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Recent sessions"))
    .render(chunks[2], buf);
}

fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let toggles = Toggle::ALL.iter().map(|toggle| {
        let checkbox = if app.settings.get(*toggle) { "[x]" } else { "[ ]" };
        Row::new(vec![Cell::from(checkbox), Cell::from(toggle.to_string())])
    });
    let theme = Row::new(vec![
        Cell::from(app.settings.theme.to_string()),
        Cell::from("Theme"),
    ]);

    let rows = toggles
        .chain(std::iter::once(theme))
        .enumerate()
        .map(|(idx, row)| {
            if idx == app.settings_cursor {
                row.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        });

    Table::new(rows, [Constraint::Length(7), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typing_policy::classify;
    use ratatui::style::Color;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_practice_lines_split_on_reference_newlines() {
        let reference = chars("ab\ncd");
        let typed = chars("ab");
        let marks = classify(&reference, &typed);
        let lines = practice_lines(&reference, &typed, &marks, &Palette::dark());

        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "ab⏎");
        assert_eq!(line_text(&lines[1]), "cd");
    }

    #[test]
    fn test_practice_lines_show_wrong_input() {
        let reference = chars("a b");
        let typed = chars("ax ");
        let marks = classify(&reference, &typed);
        let lines = practice_lines(&reference, &typed, &marks, &Palette::dark());

        assert_eq!(line_text(&lines[0]), "ax·");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Green));
        assert_eq!(lines[0].spans[1].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_practice_lines_follow_palette() {
        let palette = Palette {
            correct: Color::Blue,
            ..Palette::light()
        };
        let reference = chars("ab");
        let typed = chars("a");
        let marks = classify(&reference, &typed);
        let lines = practice_lines(&reference, &typed, &marks, &palette);

        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Blue));
    }

    #[test]
    fn test_practice_lines_include_overflow() {
        let reference = chars("hi");
        let typed = chars("hello");
        let marks = classify(&reference, &typed);
        let lines = practice_lines(&reference, &typed, &marks, &Palette::dark());

        assert_eq!(line_text(&lines[0]), "hello");
    }

    #[test]
    fn test_practice_lines_underline_cursor() {
        let reference = chars("abc");
        let marks = classify(&reference, &[]);
        let lines = practice_lines(&reference, &[], &marks, &Palette::dark());

        assert!(lines[0].spans[0]
            .style
            .add_modifier
            .contains(Modifier::UNDERLINED));
        assert!(!lines[0].spans[1]
            .style
            .add_modifier
            .contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_key_hints() {
        assert_eq!(
            key_hints(Screen::Practice, true),
            "(ctrl+d) finish  (esc) abandon"
        );
        assert_eq!(key_hints(Screen::Practice, false), "(esc) abandon");
    }
}
