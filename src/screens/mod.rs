pub mod history;
pub mod keypad;
pub mod player_dialogs;
pub mod scoreboard;

use eframe::egui;

use crate::models::PlayerColor;

pub const DESTRUCTIVE: egui::Color32 = egui::Color32::from_rgb(200, 48, 48);

/// Fill and text colour for a player's column.
pub fn color_pair(color: PlayerColor) -> (egui::Color32, egui::Color32) {
    match color {
        PlayerColor::Default => (egui::Color32::from_gray(60), egui::Color32::WHITE),
        PlayerColor::Red => (egui::Color32::from_rgb(239, 68, 68), egui::Color32::WHITE),
        PlayerColor::Blue => (egui::Color32::from_rgb(59, 130, 246), egui::Color32::WHITE),
        PlayerColor::Green => (egui::Color32::from_rgb(34, 197, 94), egui::Color32::WHITE),
        PlayerColor::Yellow => (egui::Color32::from_rgb(234, 179, 8), egui::Color32::BLACK),
        PlayerColor::Purple => (egui::Color32::from_rgb(168, 85, 247), egui::Color32::WHITE),
        PlayerColor::Pink => (egui::Color32::from_rgb(236, 72, 153), egui::Color32::WHITE),
    }
}

/// Centered yes/no window. `Some(true)` on confirm, `Some(false)` on cancel,
/// `None` while still open.
pub fn confirm_window(
    ctx: &egui::Context,
    title: &str,
    message: &str,
    confirm_label: &str,
) -> Option<bool> {
    let mut answer = None;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    answer = Some(false);
                }
                let confirm = egui::Button::new(
                    egui::RichText::new(confirm_label).color(egui::Color32::WHITE),
                )
                .fill(DESTRUCTIVE);
                if ui.add(confirm).clicked() {
                    answer = Some(true);
                }
            });
        });
    answer
}
