use eframe::egui;

use crate::services::score_input::KeypadKey;

/// On-screen number pad. Returns the key pressed this frame, if any.
pub fn ui(ctx: &egui::Context, open: &mut bool, target_name: Option<&str>) -> Option<KeypadKey> {
    let mut pressed = None;
    egui::Window::new("Keypad")
        .open(open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -12.0))
        .show(ctx, |ui| {
            match target_name {
                Some(name) => ui.label(format!("Scoring for {name}")),
                None => ui.label("Tap a score field first"),
            };
            ui.add_space(6.0);
            egui::Grid::new("keypad_grid")
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    for (index, key) in KeypadKey::LAYOUT.iter().enumerate() {
                        let button =
                            egui::Button::new(egui::RichText::new(key.label()).size(26.0).strong());
                        if ui
                            .add_enabled(target_name.is_some(), button.min_size(egui::vec2(72.0, 52.0)))
                            .clicked()
                        {
                            pressed = Some(*key);
                        }
                        if index % 3 == 2 {
                            ui.end_row();
                        }
                    }
                });
        });
    pressed
}
