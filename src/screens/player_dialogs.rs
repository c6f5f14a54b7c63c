use std::collections::HashSet;
use std::path::PathBuf;

use eframe::egui;
use rfd::FileDialog;

use crate::models::{PhotoRef, PlayerColor, PlayerId};
use crate::screens::{self, DESTRUCTIVE};
use crate::services::scoreboard::Intent;

pub enum DialogOutcome {
    Stay,
    Close,
    Submit(Intent),
    AskDelete(PlayerId),
}

pub struct AddPlayerForm {
    pub name: String,
    pub color: PlayerColor,
    pub photo: Option<PhotoRef>,
}

impl AddPlayerForm {
    pub fn new(suggested_color: Option<PlayerColor>) -> Self {
        Self {
            name: String::new(),
            color: suggested_color.unwrap_or(PlayerColor::Red),
            photo: None,
        }
    }
}

pub struct EditPlayerForm {
    pub player_id: PlayerId,
    pub name: String,
}

impl EditPlayerForm {
    pub fn new(player_id: PlayerId, name: &str) -> Self {
        Self {
            player_id,
            name: name.to_string(),
        }
    }
}

pub fn pick_photo() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Choose player photo")
        .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp", "gif"])
        .pick_file()
}

fn photo_label(photo: &PhotoRef) -> String {
    photo
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| photo.path().display().to_string())
}

fn centered_window(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
}

pub fn add_player_window(
    ctx: &egui::Context,
    form: &mut AddPlayerForm,
    used_colors: &HashSet<PlayerColor>,
) -> DialogOutcome {
    let mut outcome = DialogOutcome::Stay;
    centered_window("Add a New Player").show(ctx, |ui| {
        ui.label("Enter the player's name and choose a colour for their column.");
        ui.add_space(8.0);

        let response = ui.add(
            egui::TextEdit::singleline(&mut form.name)
                .hint_text("Player Name")
                .desired_width(260.0),
        );
        let submitted_with_enter =
            response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            for color in PlayerColor::selectable() {
                let (fill, text) = screens::color_pair(color);
                let marker = if form.color == color { "●" } else { " " };
                let swatch = egui::Button::new(egui::RichText::new(marker).color(text))
                    .fill(fill)
                    .min_size(egui::vec2(32.0, 32.0))
                    .corner_radius(egui::CornerRadius::same(16));
                if ui
                    .add_enabled(!used_colors.contains(&color), swatch)
                    .on_hover_text(color.name())
                    .clicked()
                {
                    form.color = color;
                }
            }
        });
        ui.add_space(8.0);

        let mut clear_photo = false;
        ui.horizontal(|ui| {
            if ui.button("Choose photo…").clicked()
                && let Some(path) = pick_photo()
            {
                form.photo = Some(PhotoRef::new(path));
            }
            if let Some(photo) = &form.photo {
                ui.label(photo_label(photo));
                if ui.small_button("✕").clicked() {
                    clear_photo = true;
                }
            }
        });
        if clear_photo {
            form.photo = None;
        }
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                outcome = DialogOutcome::Close;
            }
            if ui.button("Add").clicked() || submitted_with_enter {
                outcome = DialogOutcome::Submit(Intent::AddPlayer {
                    name: form.name.clone(),
                    color: form.color,
                    photo: form.photo.clone(),
                });
            }
        });
    });
    outcome
}

pub fn edit_player_window(
    ctx: &egui::Context,
    form: &mut EditPlayerForm,
    current_photo: Option<&PhotoRef>,
) -> DialogOutcome {
    let mut outcome = DialogOutcome::Stay;
    centered_window("Edit Player").show(ctx, |ui| {
        ui.label("Update the name or delete the player.");
        ui.add_space(8.0);

        let response = ui.add(
            egui::TextEdit::singleline(&mut form.name)
                .hint_text("New Player Name")
                .desired_width(260.0),
        );
        let submitted_with_enter =
            response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button("Change photo…").clicked()
                && let Some(path) = pick_photo()
            {
                outcome = DialogOutcome::Submit(Intent::SetPlayerPhoto {
                    player_id: form.player_id,
                    photo: Some(PhotoRef::new(path)),
                });
            }
            if let Some(photo) = current_photo {
                ui.label(photo_label(photo));
                if ui.small_button("Remove photo").clicked() {
                    outcome = DialogOutcome::Submit(Intent::SetPlayerPhoto {
                        player_id: form.player_id,
                        photo: None,
                    });
                }
            }
        });
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            let delete = egui::Button::new(
                egui::RichText::new("Delete Player").color(egui::Color32::WHITE),
            )
            .fill(DESTRUCTIVE);
            if ui.add(delete).clicked() {
                outcome = DialogOutcome::AskDelete(form.player_id);
            }
            if ui.button("Cancel").clicked() {
                outcome = DialogOutcome::Close;
            }
            if ui.button("Save Name").clicked() || submitted_with_enter {
                outcome = DialogOutcome::Submit(Intent::RenamePlayer {
                    player_id: form.player_id,
                    name: form.name.clone(),
                });
            }
        });
    });
    outcome
}
