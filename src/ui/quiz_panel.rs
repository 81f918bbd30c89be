//! Quiz panel overlay component

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::layout::{centered_rect, format_timestamp};
use crate::quiz::{CardPhase, OptionMark, QuestionCard};
use crate::theme::Theme;

/// Draw the active question as a centered overlay
pub fn draw(frame: &mut Frame, card: &QuestionCard, theme: &Theme) {
    // Calculate centered overlay area (70% width, 70% height)
    let overlay_area = centered_rect(70, 70, frame.area());

    // Clear the background area
    frame.render_widget(Clear, overlay_area);

    let title = match card.phase() {
        CardPhase::Unanswered => " Question ",
        CardPhase::Submitted { correct: true, .. } => " Correct! ",
        CardPhase::Submitted { correct: false, .. } | CardPhase::Completed => " Not quite ",
    };
    let border_color = match card.phase() {
        CardPhase::Submitted { correct: true, .. } => theme.success,
        CardPhase::Submitted { correct: false, .. } => theme.error,
        _ => theme.border_focused,
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_secondary));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    draw_question(frame, inner, card, theme);
}

/// Draw question, options, and feedback once answered
fn draw_question(frame: &mut Frame, area: Rect, card: &QuestionCard, theme: &Theme) {
    let item = card.item();
    let mut lines = vec![];

    let mut header = format!("Paused at {}", format_timestamp(item.timestamp));
    if let Some(focus) = &item.verb_focus {
        header.push_str(&format!("  \u{00B7}  {}", focus));
    }
    lines.push(Line::from(Span::styled(header, Style::default().fg(theme.fg_muted))));
    lines.push(Line::from(""));

    // Question text
    lines.push(Line::from(Span::styled(
        &item.question,
        Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    // Options
    for (i, option) in item.options.iter().enumerate() {
        let (prefix, style) = match card.mark(i) {
            OptionMark::Neutral { highlighted: true } => (
                "\u{25CF}", // ●
                Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
            ),
            OptionMark::Neutral { highlighted: false } => {
                ("\u{25CB}", Style::default().fg(theme.fg_secondary)) // ○
            }
            OptionMark::Correct => {
                ("\u{2713}", Style::default().fg(theme.success).add_modifier(Modifier::BOLD))
            }
            OptionMark::Wrong => ("\u{2717}", Style::default().fg(theme.error)),
            OptionMark::Dimmed => (" ", Style::default().fg(theme.fg_muted)),
        };

        lines.push(Line::from(Span::styled(format!("  {} {}) {}", prefix, i + 1, option), style)));
    }

    lines.push(Line::from(""));

    if let CardPhase::Submitted { correct: false, .. } = card.phase() {
        lines.push(Line::from(vec![
            Span::styled("Answer: ", Style::default().fg(theme.fg_muted)),
            Span::styled(
                item.correct_option(),
                Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    if let Some(feedback) = card.feedback() {
        lines.push(Line::from(Span::styled(feedback, Style::default().fg(theme.info))));
        lines.push(Line::from(""));
    }

    // Hint
    let hint = if card.is_submitted() {
        "[Enter] Continue watching"
    } else {
        "[j/k] Move    [1-9] Pick    [Enter] Submit"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(theme.fg_muted))));

    let para = Paragraph::new(lines).alignment(Alignment::Left).wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::quiz::QuizItem;

    fn card() -> QuestionCard {
        QuestionCard::new(QuizItem {
            id: "q1".into(),
            timestamp: 95.0,
            question: "She ___ home yesterday.".into(),
            options: vec!["go".into(), "went".into(), "gone".into()],
            correct_answer_index: 1,
            feedback: "Past simple for finished time.".into(),
            verb_focus: Some("go".into()),
        })
    }

    fn render(card: &QuestionCard) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let theme = Theme::default();
        terminal.draw(|frame| draw(frame, card, &theme)).unwrap();
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn feedback_hidden_until_submitted() {
        let mut card = card();
        let before = render(&card);
        assert!(before.contains("yesterday"));
        assert!(before.contains("1:35"));
        assert!(!before.contains("Past simple"));

        card.select(1);
        let after = render(&card);
        assert!(after.contains("Correct!"));
        assert!(after.contains("Past simple"));
        assert!(!after.contains("Answer:"));
    }

    #[test]
    fn wrong_answer_reveals_correct_option() {
        let mut card = card();
        card.select(2);
        let screen = render(&card);
        assert!(screen.contains("Not quite"));
        assert!(screen.contains("Answer: went"));
    }
}
