//! Player screen: timeline, score, and question slots

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, LineGauge, Paragraph, Wrap},
};

use super::layout::{centered_rect, format_timestamp, marker_column};
use crate::app::state::AppState;
use crate::quiz::{SessionState, SlotStatus};
use crate::theme::Theme;
use crate::video::PlaybackError;

const MARKER: &str = "◆";

/// Draw the player screen
pub fn draw(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg_primary)), area);

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .split(area);

    draw_header(frame, chunks[0], state, theme);
    draw_timeline(frame, chunks[1], state, theme);
    draw_slots(frame, chunks[2], state, theme);
    draw_footer(frame, chunks[3], state, theme);
}

fn slot_color(status: SlotStatus, theme: &Theme) -> Color {
    match status {
        SlotStatus::Upcoming => theme.fg_secondary,
        SlotStatus::Asking => theme.warning,
        SlotStatus::Correct => theme.success,
        SlotStatus::Incorrect => theme.error,
    }
}

fn draw_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let session = &state.session;
    let video = session.video_id().map(|id| id.watch_url()).unwrap_or_default();

    let player = if !state.player_ready {
        Span::styled("Loading", Style::default().fg(theme.fg_muted))
    } else if state.player_paused {
        Span::styled("Paused", Style::default().fg(theme.warning))
    } else {
        Span::styled("Playing", Style::default().fg(theme.success))
    };

    let score = session.score();
    let line = Line::from(vec![
        Span::styled(video, Style::default().fg(theme.fg_primary)),
        Span::raw("    "),
        player,
        Span::raw("    "),
        Span::styled(
            format!("Score {}/{}", score.correct, score.total),
            Style::default().fg(theme.accent_secondary).add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_timeline(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let session = &state.session;
    let duration =
        session.video_duration().unwrap_or(session.estimated_minutes() * 60.0).max(1.0);
    let time = session.playback_time();

    let block = Block::default()
        .title(" Timeline ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    let gauge = LineGauge::default()
        .ratio((time / duration).clamp(0.0, 1.0))
        .label(format!("{} / {}", format_timestamp(time), format_timestamp(duration)))
        .filled_style(Style::default().fg(theme.timeline_fill))
        .unfilled_style(Style::default().fg(theme.timeline_track));
    frame.render_widget(gauge, rows[0]);

    // Marker row lines up with the gauge track, which starts after the label
    let label_width = format!("{} / {} ", format_timestamp(time), format_timestamp(duration))
        .chars()
        .count() as u16;
    let track_width = rows[1].width.saturating_sub(label_width);
    let mut cells: Vec<Span> = vec![Span::raw(" "); track_width as usize];
    for (item, status) in session.items().iter().zip(session.slot_statuses()) {
        let column = marker_column(item.timestamp, duration, track_width) as usize;
        if let Some(cell) = cells.get_mut(column) {
            *cell = Span::styled(MARKER, Style::default().fg(slot_color(status, theme)));
        }
    }

    let mut spans = vec![Span::raw(" ".repeat(label_width as usize))];
    spans.extend(cells);
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
}

fn draw_slots(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let session = &state.session;
    let block = Block::default()
        .title(" Questions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    let lines: Vec<Line> = session
        .items()
        .iter()
        .zip(session.slot_statuses())
        .enumerate()
        .map(|(i, (item, status))| {
            let color = slot_color(status, theme);
            let label = match status {
                SlotStatus::Upcoming => "upcoming",
                SlotStatus::Asking => "asking now",
                SlotStatus::Correct => "\u{2713} correct",
                SlotStatus::Incorrect => "\u{2717} incorrect",
            };
            let focus = item.verb_focus.as_deref().unwrap_or("");
            Line::from(vec![
                Span::styled(format!(" {} ", MARKER), Style::default().fg(color)),
                Span::styled(
                    format!("{:>8}  ", format_timestamp(item.timestamp)),
                    Style::default().fg(theme.fg_muted),
                ),
                Span::styled(format!("Q{}  ", i + 1), Style::default().fg(theme.fg_primary)),
                Span::styled(format!("{:<12}", label), Style::default().fg(color)),
                Span::styled(focus, Style::default().fg(theme.fg_muted)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let hint = if state.card.is_some() {
        "[j/k] Move    [1-9] Pick    [Enter] Submit / Continue    [r] Restart    [q] Quit"
    } else {
        "[r] Restart    [q] Quit"
    };
    let footer = Paragraph::new(Span::styled(hint, Style::default().fg(theme.fg_muted)))
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

/// Draw a terminal playback error over the player
pub fn draw_error(frame: &mut Frame, error: &PlaybackError, theme: &Theme) {
    let overlay_area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, overlay_area);

    let title = match error {
        PlaybackError::Restricted => " Playback Restricted ",
        PlaybackError::Unavailable => " Video Unavailable ",
        PlaybackError::Generic { .. } => " Playback Error ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error))
        .style(Style::default().bg(theme.bg_secondary));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(error.to_string(), Style::default().fg(theme.fg_secondary))),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "[r] Choose another video    [q] Quit",
            Style::default().fg(theme.fg_muted),
        )),
    ];

    let para =
        Paragraph::new(text).block(block).alignment(Alignment::Center).wrap(Wrap { trim: true });
    frame.render_widget(para, overlay_area);
}

/// Draw the end-of-quiz summary
pub fn draw_summary(frame: &mut Frame, state: &AppState, theme: &Theme) {
    if state.session.state() != SessionState::Finished {
        return;
    }

    let overlay_area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Quiz Complete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));

    let score = state.session.score();
    let color = if score.correct == score.total { theme.success } else { theme.accent_primary };

    let mut result_spans = vec![];
    for (i, status) in state.session.slot_statuses().into_iter().enumerate() {
        let marker = if status == SlotStatus::Correct { " \u{2713} " } else { " \u{2717} " };
        result_spans.push(Span::styled(
            format!("Q{}{}", i + 1, marker),
            Style::default().fg(slot_color(status, theme)),
        ));
    }

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}/{} correct ({}%)", score.correct, score.total, score.percent()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(result_spans),
        Line::from(""),
        Line::from(Span::styled(
            "The video keeps playing.    [r] New quiz    [q] Quit",
            Style::default().fg(theme.fg_muted),
        )),
    ];

    let para = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(para, overlay_area);
}
