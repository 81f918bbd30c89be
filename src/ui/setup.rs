//! Setup form: video URL, topic, and optional transcript

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::layout::{build_line_with_cursor, centered_rect};
use crate::app::state::{AppState, SetupField};
use crate::quiz::SessionState;
use crate::theme::Theme;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Draw the setup screen
pub fn draw(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg_primary)), area);

    let form_area = centered_rect(70, 80, area);
    let block = Block::default()
        .title(" tubequiz ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(inner);

    let intro = Paragraph::new(Line::from(Span::styled(
        "Watch a video and answer vocabulary questions as it plays.",
        Style::default().fg(theme.fg_muted),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(intro, chunks[0]);

    let generating = state.session.state() == SessionState::Generating;
    for (i, field) in SetupField::ALL.into_iter().enumerate() {
        let focused = !generating && state.form.focused == field;
        draw_field(frame, chunks[i + 1], state, field, focused, theme);
    }

    draw_status(frame, chunks[4], state, generating, theme);

    let hint = if generating {
        "[Esc] Quit"
    } else {
        "[Tab] Next field    [Ctrl-V] Paste    [Enter] Start quiz    [Esc] Quit"
    };
    let footer = Paragraph::new(Span::styled(hint, Style::default().fg(theme.fg_muted)))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[5]);
}

fn draw_field(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    field: SetupField,
    focused: bool,
    theme: &Theme,
) {
    let border_color = if focused { theme.border_focused } else { theme.border };
    let block = Block::default()
        .title(format!(" {} ", field.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_field = state.form.field(field);
    let style = Style::default().fg(theme.fg_primary);

    // Keep the cursor in view on long input
    let width = inner.width.saturating_sub(1) as usize;
    let skip = text_field.cursor.saturating_sub(width);
    let visible: String = text_field.input.chars().skip(skip).collect();

    let line = if focused {
        build_line_with_cursor(&visible, text_field.cursor - skip, style, theme)
    } else if text_field.input.is_empty() {
        Line::from(Span::styled(placeholder(field), Style::default().fg(theme.fg_muted)))
    } else {
        Line::from(Span::styled(visible, style))
    };
    frame.render_widget(Paragraph::new(line), inner);
}

fn placeholder(field: SetupField) -> &'static str {
    match field {
        SetupField::Url => "https://www.youtube.com/watch?v=...",
        SetupField::Topic => "e.g. phrasal verbs for cooking",
        SetupField::Transcript => "paste captions here for better questions",
    }
}

fn draw_status(frame: &mut Frame, area: Rect, state: &AppState, generating: bool, theme: &Theme) {
    let mut lines = vec![Line::from("")];

    if generating {
        let spinner = SPINNER[(state.tick / 4) % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{} Generating questions...", spinner),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        )));
    } else if let Some(error) = state.session.error() {
        lines.push(Line::from(Span::styled(error, Style::default().fg(theme.error))));
    }

    if let Some(notice) = &state.notice {
        lines.push(Line::from(Span::styled(notice.as_str(), Style::default().fg(theme.warning))));
    }

    let para = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}
