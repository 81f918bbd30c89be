//! Display and answer collection for one question

use super::item::QuizItem;

/// Where the card is in its answer cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    /// All options selectable
    Unanswered,
    /// One option locked in; feedback visible
    Submitted { selected: usize, correct: bool },
    /// Outcome handed back to the caller
    Completed,
}

/// Style hint for one option, used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Before submission
    Neutral { highlighted: bool },
    /// The correct answer, after submission
    Correct,
    /// The learner's wrong pick
    Wrong,
    /// Any other option after submission
    Dimmed,
}

/// Presentation state for the active question
#[derive(Debug, Clone)]
pub struct QuestionCard {
    item: QuizItem,
    highlighted: usize,
    phase: CardPhase,
}

impl QuestionCard {
    pub fn new(item: QuizItem) -> Self {
        Self { item, highlighted: 0, phase: CardPhase::Unanswered }
    }

    pub fn item(&self) -> &QuizItem {
        &self.item
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, CardPhase::Submitted { .. })
    }

    /// Feedback text, only once an answer is locked in
    pub fn feedback(&self) -> Option<&str> {
        match self.phase {
            CardPhase::Unanswered => None,
            _ => Some(&self.item.feedback),
        }
    }

    pub fn move_up(&mut self) {
        if self.phase == CardPhase::Unanswered && self.highlighted > 0 {
            self.highlighted -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.phase == CardPhase::Unanswered && self.highlighted + 1 < self.item.options.len() {
            self.highlighted += 1;
        }
    }

    /// Lock in `option`. The first selection wins; later calls and
    /// out-of-range indices are ignored. Returns whether it was accepted.
    pub fn select(&mut self, option: usize) -> bool {
        if self.phase != CardPhase::Unanswered || option >= self.item.options.len() {
            return false;
        }
        self.highlighted = option;
        self.phase = CardPhase::Submitted { selected: option, correct: self.item.is_correct(option) };
        true
    }

    /// Lock in the highlighted option
    pub fn submit_highlighted(&mut self) -> bool {
        self.select(self.highlighted)
    }

    /// Hand the outcome back. Yields `Some(is_correct)` exactly once, and
    /// only after an answer was submitted.
    pub fn finish(&mut self) -> Option<bool> {
        match self.phase {
            CardPhase::Submitted { correct, .. } => {
                self.phase = CardPhase::Completed;
                Some(correct)
            }
            _ => None,
        }
    }

    /// How option `index` should be styled
    pub fn mark(&self, index: usize) -> OptionMark {
        match self.phase {
            CardPhase::Unanswered => OptionMark::Neutral { highlighted: index == self.highlighted },
            CardPhase::Submitted { selected, .. } => {
                if index == self.item.correct_answer_index {
                    OptionMark::Correct
                } else if index == selected {
                    OptionMark::Wrong
                } else {
                    OptionMark::Dimmed
                }
            }
            CardPhase::Completed => OptionMark::Dimmed,
        }
    }
}
