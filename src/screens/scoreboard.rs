use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use eframe::egui;
use tracing::{debug, info, warn};

use crate::models::{PhotoRef, PlayerColor, PlayerId, RankedPlayer};
use crate::screens::player_dialogs::{self, AddPlayerForm, DialogOutcome, EditPlayerForm};
use crate::screens::{self, DESTRUCTIVE, keypad};
use crate::services::config_loader::{RemiConfig, SortDirection};
use crate::services::photo_cache::{PhotoDecodeEvent, PhotoDecoder};
use crate::services::scoreboard::{GamePhase, Intent, Scoreboard, WinnerChange};

const COLUMN_WIDTH: f32 = 92.0;
const CELL_HEIGHT: f32 = 34.0;
const AVATAR_SIZE: f32 = 40.0;
const NOTICE_SECONDS: f64 = 4.0;

pub enum ScoreboardAction {
    Stay,
    OpenHistory,
}

enum Dialog {
    AddPlayer(AddPlayerForm),
    EditPlayer(EditPlayerForm),
    ConfirmCut(PlayerId),
    ConfirmDelete(PlayerId),
    ConfirmFinish,
    Winner(String),
}

struct Notice {
    text: String,
    is_error: bool,
    shown_at: f64,
}

impl Notice {
    fn info(text: impl Into<String>, now: f64) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            shown_at: now,
        }
    }

    fn error(text: impl Into<String>, now: f64) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            shown_at: now,
        }
    }
}

#[derive(Default)]
struct ScoreboardUiState {
    initialized: bool,
    dialog: Option<Dialog>,
    focused_player: Option<PlayerId>,
    keypad_open: bool,
    notice: Option<Notice>,
    photo_decoder: Option<PhotoDecoder>,
    photo_textures: HashMap<PlayerId, (PhotoRef, egui::TextureHandle)>,
}

thread_local! {
    static SCOREBOARD_UI_STATE: RefCell<ScoreboardUiState> =
        RefCell::new(ScoreboardUiState::default());
}

pub fn ui(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    scoreboard: &mut Scoreboard,
    config: &RemiConfig,
) -> ScoreboardAction {
    SCOREBOARD_UI_STATE.with(|cell| {
        let mut state = cell.borrow_mut();
        let now = now_seconds(ctx);
        if !state.initialized {
            state.keypad_open = config.presentation.show_keypad;
            state.photo_decoder = Some(PhotoDecoder::new(config.presentation.photo_max_dimension));
            state.initialized = true;
        }
        sync_photos(&mut state, ctx, scoreboard, now);

        let mut action = ScoreboardAction::Stay;
        let mut intents: Vec<Intent> = Vec::new();
        let ranked = scoreboard.ranked_view();
        let scoring = scoreboard.config().clone();

        ui.vertical_centered(|ui| {
            ui.heading(
                egui::RichText::new("SKOR REMI")
                    .size(40.0)
                    .strong()
                    .color(egui::Color32::from_rgb(250, 204, 21)),
            );
            let rule = match scoring.sort_direction {
                SortDirection::HighestWins => {
                    format!("First to {} points wins", scoring.winner_threshold)
                }
                SortDirection::LowestWins => format!(
                    "Game ends at {} points, lowest total wins",
                    scoring.winner_threshold
                ),
            };
            ui.label(rule);
            if scoreboard.phase() == GamePhase::WinnerDeclared
                && let Some(winner) = scoreboard.session().winner()
            {
                ui.colored_label(
                    egui::Color32::from_rgb(250, 204, 21),
                    format!("🏆 {winner} has won this game"),
                );
            }
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button("➕ Add Player").clicked() {
                state.dialog = Some(Dialog::AddPlayer(AddPlayerForm::new(
                    scoreboard.suggested_color(),
                )));
            }
            if ui
                .add_enabled(!ranked.is_empty(), egui::Button::new("➕ New Round"))
                .clicked()
            {
                intents.push(Intent::SubmitRound);
            }
            if ui.button("🏆 Winner History").clicked() {
                action = ScoreboardAction::OpenHistory;
            }
            ui.toggle_value(&mut state.keypad_open, "🔢 Keypad");
        });

        if let Some(notice) = &state.notice
            && now - notice.shown_at < NOTICE_SECONDS
        {
            let color = if notice.is_error {
                egui::Color32::LIGHT_RED
            } else {
                egui::Color32::LIGHT_GREEN
            };
            ui.colored_label(color, &notice.text);
            ctx.request_repaint_after(Duration::from_millis(250));
        }
        ui.separator();

        if ranked.is_empty() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.label("Add players to start keeping score.");
            });
        } else {
            let winner_id = scoreboard.session().winner_id();
            render_player_header(ui, &mut state, &ranked, scoring.sort_direction, winner_id);
            ui.separator();

            let rounds = scoreboard.session().rounds();
            let footer_reserve = CELL_HEIGHT * 2.0 + 48.0;
            egui::ScrollArea::vertical()
                .max_height((ui.available_height() - footer_reserve).max(80.0))
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    egui::Grid::new("rounds_grid")
                        .num_columns(ranked.len())
                        .spacing([8.0, 6.0])
                        .show(ui, |ui| {
                            for round in rounds {
                                for player in &ranked {
                                    let text = round
                                        .get(player.id)
                                        .map(|score| score.to_string())
                                        .unwrap_or_default();
                                    score_cell(ui, &text, player.color, 20.0);
                                }
                                ui.end_row();
                            }

                            for player in &ranked {
                                let mut text =
                                    scoreboard.session().pending_text(player.id).to_string();
                                let response = ui.add_sized(
                                    [COLUMN_WIDTH, CELL_HEIGHT],
                                    egui::TextEdit::singleline(&mut text)
                                        .hint_text("0")
                                        .font(egui::TextStyle::Heading),
                                );
                                if response.gained_focus() {
                                    state.focused_player = Some(player.id);
                                }
                                if response.changed() {
                                    intents.push(Intent::SetInProgressScore {
                                        player_id: player.id,
                                        raw: text,
                                    });
                                }
                            }
                            ui.end_row();
                        });
                });

            ui.separator();
            egui::Grid::new("totals_grid")
                .num_columns(ranked.len())
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    for player in &ranked {
                        score_cell(ui, &player.total.to_string(), player.color, 26.0);
                    }
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!rounds.is_empty(), egui::Button::new("↺ Undo Round"))
                    .clicked()
                {
                    intents.push(Intent::UndoLastRound);
                }
                let finish = egui::Button::new(
                    egui::RichText::new("🏆 Finish Game").color(egui::Color32::WHITE),
                )
                .fill(DESTRUCTIVE);
                if ui.add(finish).clicked() {
                    state.dialog = Some(Dialog::ConfirmFinish);
                }
            });
        }

        if state.keypad_open && !ranked.is_empty() {
            let target = state
                .focused_player
                .filter(|id| scoreboard.session().player(*id).is_some())
                .or_else(|| scoreboard.session().players().first().map(|player| player.id));
            let target_name = target
                .and_then(|id| scoreboard.session().player(id))
                .map(|player| player.name.clone());
            let mut open = state.keypad_open;
            if let Some(key) = keypad::ui(ctx, &mut open, target_name.as_deref())
                && let Some(player_id) = target
            {
                intents.push(Intent::PressKey { player_id, key });
            }
            state.keypad_open = open;
        }

        for intent in intents {
            dispatch(scoreboard, &mut state, intent, now);
        }
        show_dialog(ctx, scoreboard, &mut state, now);

        action
    })
}

fn render_player_header(
    ui: &mut egui::Ui,
    state: &mut ScoreboardUiState,
    ranked: &[RankedPlayer],
    direction: SortDirection,
    winner_id: Option<PlayerId>,
) {
    egui::Grid::new("player_header")
        .num_columns(ranked.len())
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            for player in ranked {
                ui.vertical_centered(|ui| {
                    ui.set_width(COLUMN_WIDTH);
                    if let Some((_, texture)) = state.photo_textures.get(&player.id) {
                        ui.add(
                            egui::Image::new(texture)
                                .fit_to_exact_size(egui::vec2(AVATAR_SIZE, AVATAR_SIZE))
                                .corner_radius(egui::CornerRadius::same(
                                    (AVATAR_SIZE * 0.5) as u8,
                                )),
                        );
                    }
                    let marker = if winner_id == Some(player.id) {
                        "🏆"
                    } else {
                        badge(player, direction).unwrap_or(" ")
                    };
                    ui.label(marker);
                    if ui
                        .link(egui::RichText::new(&player.name).strong().size(20.0))
                        .clicked()
                    {
                        state.dialog = Some(Dialog::EditPlayer(EditPlayerForm::new(
                            player.id,
                            &player.name,
                        )));
                    }
                    let cut = egui::Button::new(
                        egui::RichText::new("Cut").small().color(egui::Color32::WHITE),
                    )
                    .fill(DESTRUCTIVE);
                    if ui.add(cut).clicked() {
                        state.dialog = Some(Dialog::ConfirmCut(player.id));
                    }
                });
            }
            ui.end_row();
        });
}

/// Thumbs up for a leader who is ahead of zero, thumbs down for a last
/// place that is behind it. "Ahead" follows the ranking direction.
fn badge(player: &RankedPlayer, direction: SortDirection) -> Option<&'static str> {
    let ahead_of_zero = match direction {
        SortDirection::HighestWins => player.total > 0,
        SortDirection::LowestWins => player.total < 0,
    };
    let behind_zero = match direction {
        SortDirection::HighestWins => player.total < 0,
        SortDirection::LowestWins => player.total > 0,
    };
    if player.is_leader && ahead_of_zero {
        Some("👍")
    } else if player.is_last && behind_zero {
        Some("👎")
    } else {
        None
    }
}

fn score_cell(ui: &mut egui::Ui, text: &str, color: PlayerColor, font_size: f32) {
    let (fill, text_color) = screens::color_pair(color);
    egui::Frame::default()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::same(4))
        .show(ui, |ui| {
            ui.set_min_size(egui::vec2(COLUMN_WIDTH - 8.0, CELL_HEIGHT - 8.0));
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(text)
                        .size(font_size)
                        .strong()
                        .color(text_color),
                );
            });
        });
}

fn show_dialog(
    ctx: &egui::Context,
    scoreboard: &mut Scoreboard,
    state: &mut ScoreboardUiState,
    now: f64,
) {
    let used_colors = scoreboard.used_colors();
    let mut submitted: Option<Intent> = None;
    let mut close = false;
    let mut follow_up: Option<Dialog> = None;

    match &mut state.dialog {
        None => return,
        Some(Dialog::AddPlayer(form)) => {
            match player_dialogs::add_player_window(ctx, form, &used_colors) {
                DialogOutcome::Stay | DialogOutcome::AskDelete(_) => {}
                DialogOutcome::Close => close = true,
                DialogOutcome::Submit(intent) => submitted = Some(intent),
            }
        }
        Some(Dialog::EditPlayer(form)) => {
            let photo = scoreboard
                .session()
                .player(form.player_id)
                .and_then(|player| player.photo.as_ref());
            match player_dialogs::edit_player_window(ctx, form, photo) {
                DialogOutcome::Stay => {}
                DialogOutcome::Close => close = true,
                DialogOutcome::Submit(intent) => submitted = Some(intent),
                DialogOutcome::AskDelete(player_id) => {
                    follow_up = Some(Dialog::ConfirmDelete(player_id));
                }
            }
        }
        Some(Dialog::ConfirmCut(player_id)) => {
            let name = player_name(scoreboard, *player_id);
            match screens::confirm_window(
                ctx,
                "Cut Score?",
                &format!("Are you sure you want to cut {name}'s score? All their past scores will be reset to 0."),
                "Cut Score",
            ) {
                Some(true) => submitted = Some(Intent::CutPlayerScore(*player_id)),
                Some(false) => close = true,
                None => {}
            }
        }
        Some(Dialog::ConfirmDelete(player_id)) => {
            let name = player_name(scoreboard, *player_id);
            match screens::confirm_window(
                ctx,
                "Delete Player?",
                &format!("Are you sure you want to delete {name}? All their scores will be removed. This action cannot be undone."),
                "Delete",
            ) {
                Some(true) => submitted = Some(Intent::DeletePlayer(*player_id)),
                Some(false) => close = true,
                None => {}
            }
        }
        Some(Dialog::ConfirmFinish) => {
            match screens::confirm_window(
                ctx,
                "Finish the game?",
                "This will save the results and clear all players and scores. This action cannot be undone.",
                "Finish Game",
            ) {
                Some(true) => {
                    submitted = Some(Intent::FinishGame {
                        save_to_history: true,
                    })
                }
                Some(false) => close = true,
                None => {}
            }
        }
        Some(Dialog::Winner(name)) => match winner_window(ctx, name) {
            Some(true) => {
                submitted = Some(Intent::FinishGame {
                    save_to_history: true,
                })
            }
            Some(false) => close = true,
            None => {}
        },
    }

    if close {
        state.dialog = None;
    }
    if let Some(dialog) = follow_up {
        state.dialog = Some(dialog);
    }
    if let Some(intent) = submitted {
        // A declined intent leaves its dialog open.
        let previous = state.dialog.take();
        if !dispatch(scoreboard, state, intent, now) && state.dialog.is_none() {
            state.dialog = previous;
        }
    }
}

fn winner_window(ctx: &egui::Context, name: &str) -> Option<bool> {
    let mut answer = None;
    egui::Window::new("Congratulations!")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("The winner is").size(22.0));
                ui.label(
                    egui::RichText::new(name)
                        .size(32.0)
                        .strong()
                        .color(egui::Color32::from_rgb(250, 204, 21)),
                );
                ui.add_space(10.0);
                if ui.button("Start New Game").clicked() {
                    answer = Some(true);
                }
                if ui.button("Keep Playing").clicked() {
                    answer = Some(false);
                }
            });
        });
    answer
}

fn player_name(scoreboard: &Scoreboard, player_id: PlayerId) -> String {
    scoreboard
        .session()
        .player(player_id)
        .map(|player| player.name.clone())
        .unwrap_or_else(|| format!("player {player_id}"))
}

/// Applies one intent and updates dialogs and notices from the outcome.
/// Returns whether the board accepted it.
fn dispatch(
    scoreboard: &mut Scoreboard,
    state: &mut ScoreboardUiState,
    intent: Intent,
    now: f64,
) -> bool {
    let success_notice = match &intent {
        Intent::UndoLastRound => Some("The last round has been removed.".to_string()),
        Intent::CutPlayerScore(player_id) => Some(format!(
            "All scores for {} have been reset to 0.",
            player_name(scoreboard, *player_id)
        )),
        Intent::DeletePlayer(player_id) => Some(format!(
            "{} has been removed from the game.",
            player_name(scoreboard, *player_id)
        )),
        Intent::RenamePlayer { name, .. } => {
            Some(format!("Player name updated to {}", name.trim()))
        }
        _ => None,
    };
    let photo_changed_for = match &intent {
        Intent::SetPlayerPhoto { player_id, .. } => Some(*player_id),
        _ => None,
    };

    match scoreboard.apply(intent) {
        Ok(applied) => {
            match applied.winner {
                WinnerChange::Declared(name) => {
                    state.dialog = Some(Dialog::Winner(name));
                }
                WinnerChange::Cleared => {
                    if matches!(state.dialog, Some(Dialog::Winner(_))) {
                        state.dialog = None;
                    }
                }
                WinnerChange::Unchanged => {}
            }
            if let Some(player_id) = applied.added_player {
                state.focused_player.get_or_insert(player_id);
            }
            if let Some(player_id) = photo_changed_for
                && let Some(decoder) = state.photo_decoder.as_mut()
            {
                decoder.forget(player_id);
            }
            if let Some(result) = applied.finished {
                let winner = result
                    .winner()
                    .map(|entry| format!(", {} won with {}", entry.name, entry.total))
                    .unwrap_or_default();
                info!("Game {} stored in history", result.id);
                state.notice = Some(Notice::info(format!("Game saved{winner}"), now));
            } else if let Some(text) = success_notice {
                state.notice = Some(Notice::info(text, now));
            }
            true
        }
        Err(rejection) => {
            if rejection.is_user_notice() {
                state.notice = Some(Notice::error(capitalize(&rejection.to_string()), now));
            }
            false
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uploads decoded photos as textures and queues decodes for new ones.
fn sync_photos(
    state: &mut ScoreboardUiState,
    ctx: &egui::Context,
    scoreboard: &Scoreboard,
    now: f64,
) {
    let events = match state.photo_decoder.as_ref() {
        Some(decoder) => decoder.drain(),
        None => return,
    };

    for event in events {
        match event {
            PhotoDecodeEvent::Decoded {
                player_id,
                photo,
                image,
            } => {
                let current = scoreboard
                    .session()
                    .player(player_id)
                    .and_then(|player| player.photo.as_ref());
                if current != Some(&photo) {
                    debug!("Dropping stale photo for player {}", player_id);
                    continue;
                }
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
                let texture = ctx.load_texture(
                    format!("player_photo_{}", player_id.0),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                state.photo_textures.insert(player_id, (photo, texture));
            }
            PhotoDecodeEvent::Failed {
                player_id,
                photo,
                message,
            } => {
                warn!("Skipping photo for player {}: {}", player_id, message);
                state.notice = Some(Notice::error(
                    format!("Could not load photo {}", photo.path().display()),
                    now,
                ));
            }
        }
    }

    let players = scoreboard.session().players();
    state.photo_textures.retain(|player_id, (photo, _)| {
        players
            .iter()
            .any(|player| player.id == *player_id && player.photo.as_ref() == Some(&*photo))
    });

    if let Some(decoder) = state.photo_decoder.as_mut() {
        for player in players {
            if let Some(photo) = &player.photo
                && !state.photo_textures.contains_key(&player.id)
                && decoder.request(player.id, photo)
            {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
        }
    }
}

fn now_seconds(ctx: &egui::Context) -> f64 {
    ctx.input(|input| input.time)
}
