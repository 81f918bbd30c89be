//! UI rendering components

pub mod layout;
pub mod player;
pub mod quiz_panel;
pub mod setup;

use ratatui::Frame;

use crate::app::state::{AppState, Screen};
use crate::theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &AppState, theme: &Theme) {
    match state.screen() {
        Screen::Setup => setup::draw(frame, state, theme),
        Screen::Playing => {
            player::draw(frame, state, theme);

            // Overlays, most urgent last
            player::draw_summary(frame, state, theme);
            if let Some(card) = &state.card {
                quiz_panel::draw(frame, card, theme);
            }
            if let Some(error) = state.session.playback_error() {
                player::draw_error(frame, error, theme);
            }
        }
    }
}
