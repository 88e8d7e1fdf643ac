use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;

use crate::config::Mode;
use crate::engine::{CharState, Session};
use crate::history::{calculate_stats, personal_best_for_config};
use crate::theme::Theme;
use crate::{App, Screen, MENU_ITEMS};

const HORIZONTAL_MARGIN: u16 = 5;

pub fn draw(app: &App, f: &mut Frame) {
    match app.screen {
        Screen::Menu => render_menu(app, f),
        Screen::Typing => render_typing(app, f),
        Screen::Results => render_results(app, f),
        Screen::Settings => render_settings(app, f),
        Screen::History => render_history(app, f),
    }
}

fn centered_block(area: Rect, content_height: u16) -> Rect {
    let pad = area.height.saturating_sub(content_height) / 2;
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(content_height),
            Constraint::Min(0),
        ])
        .split(area)[1]
}

fn render_menu(app: &App, f: &mut Frame) {
    let theme = &app.theme;
    let mut lines = vec![
        Line::from(Span::styled(
            "tapr",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    for (i, item) in MENU_ITEMS.iter().enumerate() {
        let style = if i == app.menu_cursor {
            Style::default()
                .fg(theme.caret)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.main)
        };
        let marker = if i == app.menu_cursor { "> " } else { "  " };
        lines.push(Line::from(Span::styled(format!("{marker}{item}"), style)));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "{} / {} / {}",
            app.config.mode, app.config.language, app.config.difficulty
        ),
        Style::default().fg(theme.sub),
    )));

    let height = lines.len() as u16;
    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(widget, centered_block(f.area(), height));
}

/// Builds the colored prompt line from slot states, with per-word extras
/// rendered inline before the separator that follows their word.
fn prompt_spans<'a>(session: &'a Session, theme: &Theme) -> Vec<Span<'a>> {
    let slots = session.slots();
    let cursor = session.cursor();

    let slot_span = |idx: usize| -> Span<'a> {
        let slot = &slots[idx];
        let mut style = match slot.state {
            CharState::Correct => Style::default().fg(theme.correct),
            CharState::Incorrect => Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
            CharState::Missed => Style::default().fg(theme.error).add_modifier(Modifier::DIM),
            CharState::Untyped => Style::default().fg(theme.sub),
        };
        if idx == cursor {
            style = style.add_modifier(Modifier::UNDERLINED).fg(theme.caret);
        }
        let shown = match slot.state {
            // show what was actually typed over an expected space
            CharState::Incorrect => match slot.typed.unwrap_or(slot.expected) {
                ' ' => '\u{b7}',
                c => c,
            },
            _ => slot.expected,
        };
        Span::styled(shown.to_string(), style)
    };

    let mut spans = Vec::with_capacity(slots.len());
    for (word, &(start, end)) in session.word_bounds().iter().enumerate() {
        for idx in start..end.min(slots.len()) {
            spans.push(slot_span(idx));
        }
        for &c in session.extras_for(word) {
            spans.push(Span::styled(
                c.to_string(),
                Style::default()
                    .fg(theme.extra_error)
                    .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
            ));
        }
        if end < slots.len() {
            spans.push(slot_span(end));
        }
    }
    spans
}

fn render_typing(app: &App, f: &mut Frame) {
    let Some(test) = app.test.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let session = &test.session;
    let area = f.area();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines =
        ((test.target.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

    let mut status: Vec<Span> = Vec::new();
    match test.params.mode {
        Mode::Time => {
            status.push(Span::styled(
                format!("{:.0}s ", test.remaining_secs.max(0.0)),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Mode::Words | Mode::Quote | Mode::Zen => {
            let (done, total) = session.word_progress();
            status.push(Span::styled(
                format!("{}/{} ", done.min(total), total),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }
    if app.config.live_wpm && session.has_started() {
        status.push(Span::styled(
            format!("{:.0} wpm ", session.net_wpm()),
            Style::default().fg(theme.main),
        ));
    }
    if app.config.live_accuracy && session.has_started() {
        status.push(Span::styled(
            format!("{:.0}% acc", session.accuracy()),
            Style::default().fg(theme.main),
        ));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(prompt_lines + 2) / 2),
            Constraint::Length(2),
            Constraint::Length(prompt_lines),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(status)).alignment(Alignment::Center),
        chunks[1],
    );

    let prompt = Paragraph::new(Line::from(prompt_spans(session, theme)))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false });
    f.render_widget(prompt, chunks[2]);
}

fn render_results(app: &App, f: &mut Frame) {
    let theme = &app.theme;
    let Some(result) = app.last_result.as_ref() else {
        return;
    };

    let mut lines = Vec::new();

    if let Some(test) = app.test.as_ref() {
        if let Some(reason) = test.session.fail_reason() {
            lines.push(Line::from(Span::styled(
                format!("failed: {reason}"),
                Style::default()
                    .fg(theme.error)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::default());
        }
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!("{:.0}", result.net_wpm),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" wpm", Style::default().fg(theme.sub)),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "raw {:.0}  acc {:.0}%  con {:.0}%",
            result.raw_wpm, result.accuracy, result.consistency
        ),
        Style::default().fg(theme.main),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "chars {}/{}/{}/{}",
            result.correct, result.incorrect, result.extra, result.missed
        ),
        Style::default().fg(theme.sub),
    )));

    if let Some(source) = app
        .test
        .as_ref()
        .and_then(|t| t.quote_source.as_deref())
    {
        lines.push(Line::from(Span::styled(
            format!("\u{2014} {source}"),
            Style::default()
                .fg(theme.sub)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let previous_best = personal_best_for_config(
        &app.history,
        result.mode,
        result.language,
        result.duration,
        result.word_count,
    )
    .map(|r| r.net_wpm)
    .unwrap_or(0.0);
    if result.net_wpm > previous_best && result.net_wpm > 0.0 {
        lines.push(Line::from(Span::styled(
            "new personal best!",
            Style::default()
                .fg(theme.correct)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(tab)retry (n)ew (esc)menu",
        Style::default().fg(theme.sub).add_modifier(Modifier::DIM),
    )));

    let height = lines.len() as u16;
    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(widget, centered_block(f.area(), height));
}

fn render_settings(app: &App, f: &mut Frame) {
    let theme = &app.theme;
    let mut lines = vec![
        Line::from(Span::styled(
            "settings",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    for (i, desc) in crate::settings::DESCRIPTORS.iter().enumerate() {
        let selected = i == app.settings.cursor;
        let label_style = if selected {
            Style::default()
                .fg(theme.caret)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.main)
        };
        let marker = if selected { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<14}", desc.label), label_style),
            Span::styled(
                format!("\u{2039} {} \u{203a}", (desc.get)(&app.config)),
                Style::default().fg(theme.sub),
            ),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(\u{2191}\u{2193})select (\u{2190}\u{2192})change (esc)save and back",
        Style::default().fg(theme.sub).add_modifier(Modifier::DIM),
    )));

    let height = lines.len() as u16;
    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(widget, centered_block(f.area(), height));
}

fn render_history(app: &App, f: &mut Frame) {
    let theme = &app.theme;
    let stats = calculate_stats(&app.history);

    let mut lines = vec![
        Line::from(Span::styled(
            "history",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "tests {}  avg {:.0}  best {:.0}  last10 {:.0}",
                stats.total_tests, stats.average_wpm, stats.best_wpm, stats.last10_avg
            ),
            Style::default().fg(theme.main),
        )),
        Line::default(),
    ];

    if app.history.is_empty() {
        lines.push(Line::from(Span::styled(
            "no results yet",
            Style::default().fg(theme.sub),
        )));
    }

    let visible = f.area().height.saturating_sub(8) as usize;
    for result in app
        .history
        .iter()
        .rev()
        .skip(app.history_scroll)
        .take(visible.max(1))
    {
        let ago = result
            .date
            .signed_duration_since(chrono::Local::now())
            .num_seconds();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>4.0} wpm ", result.net_wpm),
                Style::default().fg(theme.main),
            ),
            Span::styled(
                format!(
                    "{:>3.0}% {:<5} {:<10} ",
                    result.accuracy, result.mode, result.language
                ),
                Style::default().fg(theme.sub),
            ),
            Span::styled(
                HumanTime::from(ago).to_string(),
                Style::default().fg(theme.sub).add_modifier(Modifier::DIM),
            ),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(\u{2191}\u{2193})scroll (esc)back",
        Style::default().fg(theme.sub).add_modifier(Modifier::DIM),
    )));

    let height = lines.len() as u16;
    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(widget, centered_block(f.area(), height));
}
