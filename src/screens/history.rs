use eframe::egui;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::info;

use crate::models::GameResult;
use crate::screens;
use crate::services::scoreboard::{Intent, Scoreboard};

pub enum HistoryAction {
    Stay,
    Back,
}

#[derive(Default)]
struct HistoryUiState {
    confirm_clear: bool,
    message: Option<String>,
}

static HISTORY_UI_STATE: OnceLock<Mutex<HistoryUiState>> = OnceLock::new();

fn history_ui_state() -> &'static Mutex<HistoryUiState> {
    HISTORY_UI_STATE.get_or_init(|| Mutex::new(HistoryUiState::default()))
}

pub fn ui(ui: &mut egui::Ui, ctx: &egui::Context, scoreboard: &mut Scoreboard) -> HistoryAction {
    let mut state = history_ui_state()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let mut action = HistoryAction::Stay;

    ui.horizontal(|ui| {
        if ui.button("← Back").clicked() {
            action = HistoryAction::Back;
        }
        ui.heading("Winner History");
        let games = scoreboard.history().len();
        if games > 0 {
            ui.label(
                egui::RichText::new(format!(
                    "{games} game{}",
                    if games == 1 { "" } else { "s" }
                ))
                .weak(),
            );
        }
    });
    ui.add_space(8.0);

    if let Some(message) = &state.message {
        ui.colored_label(egui::Color32::LIGHT_GREEN, message);
    }

    let history = scoreboard.history();
    if history.is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label("No game history yet.");
        });
    } else {
        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - 56.0).max(80.0))
            .show(ui, |ui| {
                for (index, game) in history.entries().iter().enumerate() {
                    game_card(ui, history.game_number(index), game);
                    ui.add_space(8.0);
                }
            });

        ui.add_space(8.0);
        let clear = egui::Button::new(
            egui::RichText::new("Clear History").color(egui::Color32::WHITE),
        )
        .fill(screens::DESTRUCTIVE);
        if ui.add(clear).clicked() {
            state.confirm_clear = true;
        }
    }

    if state.confirm_clear {
        match screens::confirm_window(
            ctx,
            "Clear History?",
            "This will permanently delete all saved games.",
            "Clear",
        ) {
            Some(true) => {
                state.confirm_clear = false;
                if scoreboard.apply(Intent::ClearHistory).is_ok() {
                    info!("History cleared from history screen");
                    state.message = Some("All game history has been deleted.".to_string());
                }
            }
            Some(false) => state.confirm_clear = false,
            None => {}
        }
    }

    if matches!(action, HistoryAction::Back) {
        state.message = None;
    }
    action
}

fn game_card(ui: &mut egui::Ui, game_number: usize, game: &GameResult) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format!("Game #{game_number}")).strong());
            ui.label(
                egui::RichText::new(game.finished_at.format("%Y-%m-%d %H:%M").to_string())
                    .weak(),
            );
        });
        for (place, entry) in game.players.iter().enumerate() {
            let text = format!("{}. {} - {} points", place + 1, entry.name, entry.total);
            if place == 0 {
                ui.label(egui::RichText::new(format!("🏆 {text}")).strong());
            } else {
                ui.label(text);
            }
        }
    });
}
