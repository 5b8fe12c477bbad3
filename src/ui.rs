use std::time::Instant;

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    history::{History, HISTORY_LIMIT},
    session::CharStatus,
};

const HORIZONTAL_MARGIN: u16 = 5;
const EMPTY_HISTORY: &str = "No results yet. Complete a test to see stats here.";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_at(self, Instant::now(), area, buf);
    }
}

/// Draw the app as of `now`
pub fn render_at(app: &App, now: Instant, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let finished = app.state() == AppState::Results;
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = app.session.target().width().max(app.session.typed().width());
    let prompt_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        (prompt_width as f64 / max_chars_per_line as f64).ceil() as u16 + 1
    };
    let results_lines = if finished { 2 } else { 0 };
    let history_lines = HISTORY_LIMIT as u16 + 2;
    let content = 1 + prompt_lines + 1 + results_lines + 1 + history_lines + 1;
    let filler = area.height.saturating_sub(content) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(filler),
            Constraint::Length(1), // timer
            Constraint::Length(prompt_lines),
            Constraint::Length(1), // padding
            Constraint::Length(results_lines),
            Constraint::Length(1), // padding
            Constraint::Length(history_lines),
            Constraint::Length(1), // legend
            Constraint::Min(0),
        ])
        .split(area);

    let timer = Paragraph::new(Span::styled(app.elapsed_display(now), dim_bold_style))
        .alignment(Alignment::Center);
    timer.render(chunks[1], buf);

    let prompt = Paragraph::new(Line::from(prompt_spans(app)))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[2], buf);

    if let Some(result) = app.session.result() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(chunks[4]);

        let stats = Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {}s",
                result.wpm, result.accuracy, result.elapsed_seconds
            ),
            bold_style,
        ))
        .alignment(Alignment::Center);
        stats.render(rows[0], buf);

        let verdict = Paragraph::new(Span::styled(
            app.verdict().unwrap_or_default().to_string(),
            Style::default().fg(Color::Cyan).patch(italic_style),
        ))
        .alignment(Alignment::Center);
        verdict.render(rows[1], buf);
    }

    history_widget(&app.history).render(chunks[6], buf);

    let legend = Paragraph::new(Span::styled(
        if finished {
            "(r)etry / (n)ew / (esc)ape"
        } else {
            "(tab) new sentence / (ctrl+r) retry / (esc)ape"
        },
        italic_style,
    ));
    legend.render(chunks[7], buf);
}

/// One span per position of the target, plus any overflow typed past its end
fn prompt_spans(app: &App) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let expected: Vec<char> = app.session.target().chars().collect();
    let typed: Vec<char> = app.session.typed().chars().collect();
    let caret = (!app.session.has_finished() && !expected.is_empty()).then(|| app.caret());

    app.char_statuses()
        .into_iter()
        .enumerate()
        .map(|(idx, status)| {
            let (text, style) = match status {
                CharStatus::Correct => (expected[idx].to_string(), green_bold_style),
                CharStatus::Incorrect => (
                    match typed[idx] {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    red_bold_style,
                ),
                CharStatus::Unset => (expected[idx].to_string(), dim_bold_style),
            };
            if caret == Some(idx) {
                Span::styled(text, style.add_modifier(Modifier::UNDERLINED))
            } else {
                Span::styled(text, style)
            }
        })
        .collect()
}

fn history_widget(history: &History) -> Paragraph<'static> {
    let lines: Vec<Line> = if history.is_empty() {
        vec![Line::from(Span::styled(
            EMPTY_HISTORY,
            Style::default().fg(Color::Gray),
        ))]
    } else {
        history
            .entries()
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::raw(format!(
                        "WPM: {} • Accuracy: {}%",
                        entry.wpm, entry.accuracy
                    )),
                    Span::styled(
                        format!(
                            "   {}",
                            entry
                                .recorded_at
                                .with_timezone(&Local)
                                .format("%Y-%m-%d %H:%M")
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                ])
            })
            .collect()
    };

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Recent results"))
        .alignment(Alignment::Center)
}
